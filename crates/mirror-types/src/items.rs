//! Cell materials and inventory item stacks.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Material occupying a voxel cell.
///
/// Materials are numeric IDs assigned by the host world. ID `0` is the
/// default (empty) material: cells holding it are never captured into a
/// cell snapshot, and restoration resets untracked cells to it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Material(pub u32);

impl Material {
    /// The default, empty material.
    pub const AIR: Self = Self(0);
    /// Solid rock.
    pub const STONE: Self = Self(1);
    /// Loose soil.
    pub const DIRT: Self = Self(2);
    /// Soil with a grass surface.
    pub const GRASS: Self = Self(3);
    /// Wooden planks, typical of player-built structures.
    pub const PLANKS: Self = Self(4);
    /// Glass.
    pub const GLASS: Self = Self(5);

    /// Whether this is the default (empty) material.
    pub const fn is_default(self) -> bool {
        self.0 == Self::AIR.0
    }
}

impl core::fmt::Display for Material {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::AIR => f.write_str("air"),
            Self::STONE => f.write_str("stone"),
            Self::DIRT => f.write_str("dirt"),
            Self::GRASS => f.write_str("grass"),
            Self::PLANKS => f.write_str("planks"),
            Self::GLASS => f.write_str("glass"),
            Self(other) => write!(f, "material#{other}"),
        }
    }
}

/// A stack of identical items occupying one inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemStack {
    /// Item kind identifier (e.g. `"mirror_shard"`).
    pub item: String,
    /// Number of items in the stack.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack of `count` items of kind `item`.
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }

    /// Whether the stack holds no items.
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Return a copy with the count reduced by one, or `None` if the stack
    /// would become empty.
    pub fn decremented(&self) -> Option<Self> {
        let count = self.count.checked_sub(1).filter(|c| *c > 0)?;
        Some(Self {
            item: self.item.clone(),
            count,
        })
    }
}
