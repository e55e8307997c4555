//! Spatial primitives shared by the voxel store, the object registry and
//! the overlay core.
//!
//! Cells are addressed by integer [`BlockPos`] coordinates. Agents and
//! dynamic objects move continuously and are positioned with [`Vec3`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Integer coordinate of a single voxel cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BlockPos {
    /// East-west axis.
    pub x: i32,
    /// Vertical axis.
    pub y: i32,
    /// North-south axis.
    pub z: i32,
}

impl BlockPos {
    /// Create a new cell coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Return the cell containing a continuous position (floor on each axis).
    ///
    /// Components outside the `i32` range saturate.
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(pos: Vec3) -> Self {
        // `as` from f64 to i32 saturates and maps NaN to 0.
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            z: pos.z.floor() as i32,
        }
    }

    /// Return the continuous position of this cell's minimum corner.
    pub fn corner(self) -> Vec3 {
        Vec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Return a copy offset vertically by `dy`, saturating at the `i32` range.
    pub const fn above(self, dy: i32) -> Self {
        Self {
            x: self.x,
            y: self.y.saturating_add(dy),
            z: self.z,
        }
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Continuous 3D vector used for positions and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec3 {
    /// East-west component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// North-south component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise sum.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise difference.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn minus(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Length of the vector projected onto the horizontal (x/z) plane.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn horizontal_length(self) -> f64 {
        self.x.hypot(self.z)
    }

    /// Whether every component is exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

/// Inclusive vertical extent `[min_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VerticalBand {
    /// Lowest included Y coordinate.
    pub min_y: i32,
    /// Highest included Y coordinate.
    pub max_y: i32,
}

impl VerticalBand {
    /// Create a band from its inclusive bounds.
    pub const fn new(min_y: i32, max_y: i32) -> Self {
        Self { min_y, max_y }
    }

    /// Build a band of `center_y ± half_height`, clamped to `extent`.
    ///
    /// Returns `None` when the clamped band is empty (the center lies so far
    /// outside the extent that no layer overlaps).
    pub fn around(center_y: i32, half_height: u32, extent: Self) -> Option<Self> {
        let half = i32::try_from(half_height).unwrap_or(i32::MAX);
        let min_y = center_y.saturating_sub(half).max(extent.min_y);
        let max_y = center_y.saturating_add(half).min(extent.max_y);
        (min_y <= max_y).then_some(Self { min_y, max_y })
    }

    /// Whether `y` lies within the band.
    pub const fn contains(self, y: i32) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    /// Number of layers in the band (0 for an inverted band).
    pub fn layers(self) -> u32 {
        let span = i64::from(self.max_y)
            .saturating_sub(i64::from(self.min_y))
            .saturating_add(1);
        u32::try_from(span.max(0)).unwrap_or(u32::MAX)
    }
}

/// Axis-aligned box used for coarse object queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a box from two corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Whether `pos` lies inside the box (bounds inclusive).
    pub fn contains(&self, pos: Vec3) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }
}
