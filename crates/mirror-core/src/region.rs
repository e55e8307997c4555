//! Cylindrical overlay regions.
//!
//! A region is a vertical cylinder: a horizontal disk of `radius` cells
//! around the center column, spanning a clamped [`VerticalBand`]. Cell
//! membership uses exact integer math. Continuous positions (agents and
//! objects) are measured from the center cell's minimum corner, matching
//! how the voxel grid maps cells onto continuous space.

use mirror_types::{BlockPos, BoundingBox, Vec3, VerticalBand};

/// Cylindrical region covered by one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    center: BlockPos,
    radius: u32,
    band: VerticalBand,
}

impl Region {
    /// Create a region from explicit parts.
    pub const fn new(center: BlockPos, radius: u32, band: VerticalBand) -> Self {
        Self {
            center,
            radius,
            band,
        }
    }

    /// Build the region `center ± half_height` vertically, clamped to the
    /// world's `extent`.
    ///
    /// Returns `None` when no layer of the band overlaps the extent.
    pub fn around(
        center: BlockPos,
        radius: u32,
        half_height: u32,
        extent: VerticalBand,
    ) -> Option<Self> {
        VerticalBand::around(center.y, half_height, extent)
            .map(|band| Self::new(center, radius, band))
    }

    /// Center cell.
    pub const fn center(&self) -> BlockPos {
        self.center
    }

    /// Horizontal radius in cells.
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Vertical extent.
    pub const fn band(&self) -> VerticalBand {
        self.band
    }

    /// Whether the column `(x, z)` lies within the horizontal disk.
    pub fn column_in_disk(self, x: i32, z: i32) -> bool {
        let dx = i64::from(x).saturating_sub(i64::from(self.center.x));
        let dz = i64::from(z).saturating_sub(i64::from(self.center.z));
        let r = i64::from(self.radius);
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz)) <= r.saturating_mul(r)
    }

    /// Whether the cell lies in the region (disk and band).
    pub fn contains_cell(self, pos: BlockPos) -> bool {
        self.band.contains(pos.y) && self.column_in_disk(pos.x, pos.z)
    }

    /// Whether the cell's column lies in the disk, ignoring height.
    pub fn covers_block(self, pos: BlockPos) -> bool {
        self.column_in_disk(pos.x, pos.z)
    }

    /// Horizontal distance from the center to a continuous position.
    pub fn horizontal_distance(self, pos: Vec3) -> f64 {
        pos.minus(self.center.corner()).horizontal_length()
    }

    /// Whether a continuous position lies within the disk, ignoring height.
    ///
    /// This is the test used for agent membership and item containment.
    pub fn covers(self, pos: Vec3) -> bool {
        self.horizontal_distance(pos) <= f64::from(self.radius)
    }

    /// Whether a continuous position lies within the disk and inside the
    /// volume of the band's cells (`min_y` inclusive to `max_y + 1`
    /// exclusive).
    #[allow(clippy::arithmetic_side_effects)]
    pub fn contains_point(self, pos: Vec3) -> bool {
        let bottom = f64::from(self.band.min_y);
        let top = f64::from(self.band.max_y) + 1.0;
        pos.y >= bottom && pos.y < top && self.covers(pos)
    }

    /// Every cell of the region, column by column.
    pub fn cells(self) -> impl Iterator<Item = BlockPos> {
        let r = i32::try_from(self.radius).unwrap_or(i32::MAX);
        let band = self.band;
        let cx = self.center.x;
        let cz = self.center.z;
        (cx.saturating_sub(r)..=cx.saturating_add(r)).flat_map(move |x| {
            (cz.saturating_sub(r)..=cz.saturating_add(r))
                .filter(move |&z| self.column_in_disk(x, z))
                .flat_map(move |z| (band.min_y..=band.max_y).map(move |y| BlockPos::new(x, y, z)))
        })
    }

    /// Box enclosing every loose item that can belong to the region.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn item_bounds(self) -> BoundingBox {
        let corner = self.center.corner();
        let r = f64::from(self.radius);
        BoundingBox::new(
            Vec3::new(corner.x - r, f64::from(self.band.min_y), corner.z - r),
            Vec3::new(
                corner.x + r + 1.0,
                f64::from(self.band.max_y) + 1.0,
                corner.z + r + 1.0,
            ),
        )
    }

    /// Box scanned by the boundary guard: the region widened horizontally
    /// by `buffer`.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn guard_bounds(self, buffer: f64) -> BoundingBox {
        let corner = self.center.corner();
        let reach = f64::from(self.radius) + buffer;
        BoundingBox::new(
            Vec3::new(corner.x - reach, f64::from(self.band.min_y), corner.z - reach),
            Vec3::new(
                corner.x + reach,
                f64::from(self.band.max_y) + 1.0,
                corner.z + reach,
            ),
        )
    }

    /// Move `pos` along its horizontal ray from the center so that it sits
    /// `target` cells from the center. Height is preserved.
    ///
    /// Returns `None` for a position exactly on the center axis, where the
    /// direction is undefined.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn pull_to(self, pos: Vec3, target: f64) -> Option<Vec3> {
        let corner = self.center.corner();
        let offset = pos.minus(corner);
        let distance = offset.horizontal_length();
        if distance <= 0.0 || !distance.is_finite() {
            return None;
        }
        let scale = target / distance;
        Some(Vec3::new(
            corner.x + offset.x * scale,
            pos.y,
            corner.z + offset.z * scale,
        ))
    }
}
