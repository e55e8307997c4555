//! Procedural base terrain for the in-memory host world.
//!
//! The host stores only cells that differ from the generated terrain, so a
//! world of any horizontal size costs memory proportional to its edits.

use serde::{Deserialize, Serialize};

use mirror_types::{BlockPos, Material};

/// Generator for the untouched state of a world's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Terrain {
    /// Every cell is empty.
    Void,
    /// A flat world: `fill` below `ground_level`, `surface` at it, air above.
    Flat {
        /// Y coordinate of the surface layer.
        ground_level: i32,
        /// Material of the surface layer.
        surface: Material,
        /// Material of every layer below the surface.
        fill: Material,
    },
}

impl Terrain {
    /// Material generated at `pos`.
    pub const fn material_at(&self, pos: BlockPos) -> Material {
        match *self {
            Self::Void => Material::AIR,
            Self::Flat {
                ground_level,
                surface,
                fill,
            } => {
                if pos.y > ground_level {
                    Material::AIR
                } else if pos.y == ground_level {
                    surface
                } else {
                    fill
                }
            }
        }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::Flat {
            ground_level: 64,
            surface: Material::GRASS,
            fill: Material::STONE,
        }
    }
}
