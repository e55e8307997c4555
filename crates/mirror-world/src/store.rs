//! Collaborator boundaries consumed by the overlay core.
//!
//! The voxel terrain, the agent/inventory store and the dynamic-object
//! registry are owned by the host simulation. The overlay core reaches
//! them only through these traits, so any host (a game server, the
//! in-memory world in [`memory`](crate::memory), a test double) can drive it.
//!
//! None of these methods fail. An agent or object that has vanished
//! between ticks is reported as `None` or `false`, and callers treat it as
//! already departed.

use serde::{Deserialize, Serialize};

use mirror_types::{
    AgentId, BlockPos, BoundingBox, ItemStack, Material, ObjectId, OverlayId, OverlayNotice,
    Vec3, VerticalBand, WorldId,
};

/// Where an agent currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentLocation {
    /// World the agent is in.
    pub world: WorldId,
    /// Continuous position within that world.
    pub position: Vec3,
}

/// Data carried by an anchor object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPayload {
    /// Overlay the anchor marks.
    pub overlay: OverlayId,
    /// Item rendered floating at the anchor (usually the consumed activator).
    pub display_item: ItemStack,
}

/// Read/write access to the persistent voxel terrain.
pub trait VoxelStore {
    /// Vertical extent of `world`, or `None` if the world is unknown.
    fn vertical_extent(&self, world: WorldId) -> Option<VerticalBand>;

    /// Current material of the cell at `pos`.
    fn cell(&self, world: WorldId, pos: BlockPos) -> Material;

    /// Overwrite the material of the cell at `pos`.
    fn set_cell(&mut self, world: WorldId, pos: BlockPos, material: Material);
}

/// Read/write access to agents and their slotted inventories.
pub trait AgentStore {
    /// Agents currently present in `world`.
    fn agents_in_world(&self, world: WorldId) -> Vec<AgentId>;

    /// Current location of `agent`, or `None` if it is not present.
    fn agent_location(&self, agent: AgentId) -> Option<AgentLocation>;

    /// Number of inventory slots `agent` has, or `None` if it is not present.
    fn inventory_capacity(&self, agent: AgentId) -> Option<u32>;

    /// Contents of one slot; `None` when the slot is empty or the agent is gone.
    fn inventory_slot(&self, agent: AgentId, slot: u32) -> Option<ItemStack>;

    /// Overwrite one slot. Returns `false` if the agent or slot does not exist.
    fn set_inventory_slot(&mut self, agent: AgentId, slot: u32, stack: ItemStack) -> bool;

    /// Empty every slot. Returns `false` if the agent does not exist.
    fn clear_inventory(&mut self, agent: AgentId) -> bool;

    /// Deliver a notice to the agent. Unknown agents are ignored.
    fn notify_agent(&mut self, agent: AgentId, notice: OverlayNotice);
}

/// Spawn/discard registry for dynamic objects.
pub trait ObjectRegistry {
    /// Spawn a passive anchor marker and return its handle.
    fn spawn_anchor(&mut self, world: WorldId, position: Vec3, payload: AnchorPayload)
    -> ObjectId;

    /// Remove an object. Returns `false` if it was already gone.
    fn discard(&mut self, object: ObjectId) -> bool;

    /// Loose-item objects in `world` whose position lies inside `bounds`.
    fn loose_items_in(&self, world: WorldId, bounds: &BoundingBox) -> Vec<ObjectId>;

    /// Anchors present in `world`, with the overlay each one marks.
    fn anchors_in(&self, world: WorldId) -> Vec<(ObjectId, OverlayId)>;

    /// Current position of an object.
    fn position(&self, object: ObjectId) -> Option<Vec3>;

    /// Displacement applied to the object on the last tick.
    fn velocity(&self, object: ObjectId) -> Option<Vec3>;

    /// Move an object. Returns `false` if it no longer exists.
    fn set_position(&mut self, object: ObjectId, position: Vec3) -> bool;

    /// Replace an object's velocity. Returns `false` if it no longer exists.
    fn set_velocity(&mut self, object: ObjectId, velocity: Vec3) -> bool;

    /// Discard every loose item inside `bounds` whose position also
    /// satisfies `inside`. Returns how many were discarded.
    fn discard_loose_items_in(
        &mut self,
        world: WorldId,
        bounds: &BoundingBox,
        inside: &dyn Fn(Vec3) -> bool,
    ) -> usize {
        let mut discarded: usize = 0;
        for object in self.loose_items_in(world, bounds) {
            let Some(pos) = self.position(object) else {
                continue;
            };
            if inside(pos) && self.discard(object) {
                discarded = discarded.saturating_add(1);
            }
        }
        discarded
    }
}

/// Everything the overlay core needs from its host.
///
/// Blanket-implemented for any type providing all three stores.
pub trait WorldHost: VoxelStore + AgentStore + ObjectRegistry {}

impl<T: VoxelStore + AgentStore + ObjectRegistry + ?Sized> WorldHost for T {}
