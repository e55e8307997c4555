//! Containment of loose items at an overlay's rim.
//!
//! An item that was inside the disk one tick ago and is outside now has
//! just crossed the rim. The guard moves it back along its horizontal ray
//! from the center to just inside the rim and stops it. Items that were
//! already outside are left alone.

use tracing::debug;

use mirror_types::{Vec3, WorldId};
use mirror_world::ObjectRegistry;

use crate::config::OverlayConfig;
use crate::region::Region;

/// Rim containment settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryGuard {
    buffer: f64,
    inset: f64,
}

impl BoundaryGuard {
    /// Create a guard scanning `buffer` cells past the rim and placing
    /// escaped items `inset` cells inside it.
    pub const fn new(buffer: f64, inset: f64) -> Self {
        Self { buffer, inset }
    }

    /// Build a guard from overlay settings.
    pub const fn from_config(config: &OverlayConfig) -> Self {
        Self::new(config.boundary_buffer, config.containment_inset)
    }

    /// Where an item at `position` moving with `velocity` must be put back,
    /// or `None` if it has not just crossed the rim.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn check(&self, region: Region, position: Vec3, velocity: Vec3) -> Option<Vec3> {
        if region.covers(position) {
            return None;
        }
        let previous = position.minus(velocity);
        if !region.covers(previous) {
            return None;
        }
        let target = (f64::from(region.radius()) - self.inset).max(0.0);
        region.pull_to(position, target)
    }

    /// Pull back every loose item near `region` that crossed the rim on the
    /// last tick. Returns how many were moved.
    pub fn enforce<R: ObjectRegistry + ?Sized>(
        &self,
        registry: &mut R,
        world: WorldId,
        region: Region,
    ) -> u32 {
        let mut contained: u32 = 0;
        for object in registry.loose_items_in(world, &region.guard_bounds(self.buffer)) {
            let (Some(position), Some(velocity)) =
                (registry.position(object), registry.velocity(object))
            else {
                continue;
            };
            let Some(inside) = self.check(region, position, velocity) else {
                continue;
            };
            registry.set_position(object, inside);
            registry.set_velocity(object, Vec3::ZERO);
            contained = contained.saturating_add(1);
            debug!(object = %object, world = %world, "Item pulled back inside overlay");
        }
        contained
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mirror_types::{BlockPos, ItemStack, VerticalBand};
    use mirror_world::{InMemoryWorld, Terrain};

    use super::*;

    fn region() -> Region {
        Region::new(BlockPos::new(0, 64, 0), 10, VerticalBand::new(60, 70))
    }

    #[test]
    fn crossing_item_is_pulled_back() {
        let guard = BoundaryGuard::new(5.0, 2.0);
        let pos = guard
            .check(region(), Vec3::new(10.5, 65.0, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert!((pos.x - 8.0).abs() < 1e-9);
        assert!(pos.z.abs() < 1e-9);
        assert!((pos.y - 65.0).abs() < f64::EPSILON);
    }

    #[test]
    fn item_already_outside_is_ignored() {
        let guard = BoundaryGuard::new(5.0, 2.0);
        assert!(guard
            .check(region(), Vec3::new(13.0, 65.0, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn item_inside_is_ignored() {
        let guard = BoundaryGuard::new(5.0, 2.0);
        assert!(guard
            .check(region(), Vec3::new(9.0, 65.0, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn enforce_moves_and_stops_items() {
        let mut host = InMemoryWorld::new();
        let world = mirror_types::WorldId::new();
        host.add_world(world, VerticalBand::new(0, 128), Terrain::default())
            .unwrap();
        let escaping = host
            .drop_item(
                world,
                Vec3::new(9.5, 65.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                ItemStack::new("stone", 1),
            )
            .unwrap();
        let outside = host
            .drop_item(
                world,
                Vec3::new(12.0, 65.0, 0.0),
                Vec3::new(0.5, 0.0, 0.0),
                ItemStack::new("stone", 1),
            )
            .unwrap();

        // Give the first item a push across the rim.
        host.set_velocity(escaping, Vec3::new(1.5, 0.0, 0.0));
        host.step_objects();

        let guard = BoundaryGuard::new(5.0, 2.0);
        assert_eq!(guard.enforce(&mut host, world, region()), 1);
        let pos = host.position(escaping).unwrap();
        assert!((pos.x - 8.0).abs() < 1e-9);
        assert!(host.velocity(escaping).unwrap().is_zero());
        assert!((host.position(outside).unwrap().x - 12.5).abs() < 1e-9);
    }
}
