//! In-memory host world implementing every collaborator trait.
//!
//! [`InMemoryWorld`] is the host used by the engine binary and by the
//! overlay core's tests. It models:
//!
//! - worlds with a vertical extent, procedural [`Terrain`] and sparse cell
//!   overrides,
//! - agents with a location, a fixed number of inventory slots and a
//!   mailbox of received notices,
//! - loose-item objects that move by their velocity once per
//!   [`step_objects`](InMemoryWorld::step_objects) call, and passive anchors.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use mirror_types::{
    AgentId, BlockPos, BoundingBox, ItemStack, Material, ObjectId, OverlayId, OverlayNotice,
    Vec3, VerticalBand, WorldId,
};

use crate::error::WorldError;
use crate::store::{AgentLocation, AgentStore, AnchorPayload, ObjectRegistry, VoxelStore};
use crate::terrain::Terrain;

/// Cells of one world: generated terrain plus edited cells.
#[derive(Debug, Clone)]
struct WorldCells {
    extent: VerticalBand,
    terrain: Terrain,
    overrides: HashMap<BlockPos, Material>,
}

impl WorldCells {
    fn material_at(&self, pos: BlockPos) -> Material {
        if !self.extent.contains(pos.y) {
            return Material::AIR;
        }
        self.overrides
            .get(&pos)
            .copied()
            .unwrap_or_else(|| self.terrain.material_at(pos))
    }
}

/// An agent held by the in-memory host.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRecord {
    /// World the agent is in.
    pub world: WorldId,
    /// Continuous position.
    pub position: Vec3,
    /// Number of inventory slots.
    pub capacity: u32,
    /// Occupied slots.
    pub inventory: BTreeMap<u32, ItemStack>,
    /// Notices delivered to this agent, oldest first.
    pub notices: Vec<OverlayNotice>,
}

/// What kind of dynamic object a record holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// A dropped item stack that can be picked up or carried off.
    LooseItem(ItemStack),
    /// A passive overlay marker.
    Anchor(AnchorPayload),
}

/// A dynamic object held by the in-memory host.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    /// World the object is in.
    pub world: WorldId,
    /// Loose item or anchor.
    pub kind: ObjectKind,
    /// Continuous position.
    pub position: Vec3,
    /// Displacement applied on the last step.
    pub velocity: Vec3,
}

/// Host world kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorld {
    worlds: BTreeMap<WorldId, WorldCells>,
    agents: BTreeMap<AgentId, AgentRecord>,
    objects: BTreeMap<ObjectId, ObjectRecord>,
}

impl InMemoryWorld {
    /// Create an empty host with no worlds.
    pub const fn new() -> Self {
        Self {
            worlds: BTreeMap::new(),
            agents: BTreeMap::new(),
            objects: BTreeMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Worlds
    // -----------------------------------------------------------------------

    /// Register a world with the given vertical extent and terrain.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateWorld`] if `world` is already registered.
    pub fn add_world(
        &mut self,
        world: WorldId,
        extent: VerticalBand,
        terrain: Terrain,
    ) -> Result<(), WorldError> {
        if self.worlds.contains_key(&world) {
            return Err(WorldError::DuplicateWorld(world));
        }
        self.worlds.insert(
            world,
            WorldCells {
                extent,
                terrain,
                overrides: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Number of cells that differ from generated terrain in `world`.
    pub fn edited_cell_count(&self, world: WorldId) -> usize {
        self.worlds.get(&world).map_or(0, |w| w.overrides.len())
    }

    // -----------------------------------------------------------------------
    // Agents
    // -----------------------------------------------------------------------

    /// Add an agent with an empty inventory of `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::WorldNotFound`] for an unknown world and
    /// [`WorldError::DuplicateAgent`] if the agent already exists.
    pub fn add_agent(
        &mut self,
        agent: AgentId,
        world: WorldId,
        position: Vec3,
        capacity: u32,
    ) -> Result<(), WorldError> {
        if !self.worlds.contains_key(&world) {
            return Err(WorldError::WorldNotFound(world));
        }
        if self.agents.contains_key(&agent) {
            return Err(WorldError::DuplicateAgent(agent));
        }
        self.agents.insert(
            agent,
            AgentRecord {
                world,
                position,
                capacity,
                inventory: BTreeMap::new(),
                notices: Vec::new(),
            },
        );
        Ok(())
    }

    /// Move an agent, possibly into another world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::WorldNotFound`] or [`WorldError::AgentNotFound`].
    pub fn move_agent(
        &mut self,
        agent: AgentId,
        world: WorldId,
        position: Vec3,
    ) -> Result<(), WorldError> {
        if !self.worlds.contains_key(&world) {
            return Err(WorldError::WorldNotFound(world));
        }
        let record = self
            .agents
            .get_mut(&agent)
            .ok_or(WorldError::AgentNotFound(agent))?;
        record.world = world;
        record.position = position;
        Ok(())
    }

    /// Remove an agent from the host (e.g. disconnect). Returns its record.
    pub fn remove_agent(&mut self, agent: AgentId) -> Option<AgentRecord> {
        self.agents.remove(&agent)
    }

    /// Put `stack` into a slot, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] or [`WorldError::SlotOutOfRange`].
    pub fn give(&mut self, agent: AgentId, slot: u32, stack: ItemStack) -> Result<(), WorldError> {
        let record = self
            .agents
            .get_mut(&agent)
            .ok_or(WorldError::AgentNotFound(agent))?;
        if slot >= record.capacity {
            return Err(WorldError::SlotOutOfRange {
                agent,
                slot,
                capacity: record.capacity,
            });
        }
        if stack.is_empty() {
            record.inventory.remove(&slot);
        } else {
            record.inventory.insert(slot, stack);
        }
        Ok(())
    }

    /// Empty one slot, returning what it held.
    pub fn take(&mut self, agent: AgentId, slot: u32) -> Option<ItemStack> {
        self.agents
            .get_mut(&agent)
            .and_then(|record| record.inventory.remove(&slot))
    }

    /// Full record of an agent.
    pub fn agent(&self, agent: AgentId) -> Option<&AgentRecord> {
        self.agents.get(&agent)
    }

    /// Occupied slots of an agent.
    pub fn inventory(&self, agent: AgentId) -> Option<&BTreeMap<u32, ItemStack>> {
        self.agents.get(&agent).map(|record| &record.inventory)
    }

    /// Notices delivered to an agent so far.
    pub fn notices(&self, agent: AgentId) -> &[OverlayNotice] {
        self.agents
            .get(&agent)
            .map_or(&[][..], |record| record.notices.as_slice())
    }

    /// Take and clear an agent's delivered notices.
    pub fn drain_notices(&mut self, agent: AgentId) -> Vec<OverlayNotice> {
        self.agents
            .get_mut(&agent)
            .map(|record| core::mem::take(&mut record.notices))
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// Drop a loose item stack at `position` moving with `velocity`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::WorldNotFound`] for an unknown world.
    pub fn drop_item(
        &mut self,
        world: WorldId,
        position: Vec3,
        velocity: Vec3,
        stack: ItemStack,
    ) -> Result<ObjectId, WorldError> {
        if !self.worlds.contains_key(&world) {
            return Err(WorldError::WorldNotFound(world));
        }
        let id = ObjectId::new();
        self.objects.insert(
            id,
            ObjectRecord {
                world,
                kind: ObjectKind::LooseItem(stack),
                position,
                velocity,
            },
        );
        Ok(id)
    }

    /// Advance every loose item by its velocity.
    ///
    /// After a step, each item's velocity equals the displacement it just
    /// underwent, which is what the boundary guard's one-tick look-back
    /// relies on.
    pub fn step_objects(&mut self) {
        for record in self.objects.values_mut() {
            if matches!(record.kind, ObjectKind::LooseItem(_)) {
                record.position = record.position.plus(record.velocity);
            }
        }
    }

    /// Full record of an object.
    pub fn object(&self, object: ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(&object)
    }

    /// Number of loose items in `world`.
    pub fn loose_item_count(&self, world: WorldId) -> usize {
        self.objects
            .values()
            .filter(|r| r.world == world && matches!(r.kind, ObjectKind::LooseItem(_)))
            .count()
    }

    /// Number of anchors in `world`.
    pub fn anchor_count(&self, world: WorldId) -> usize {
        self.objects
            .values()
            .filter(|r| r.world == world && matches!(r.kind, ObjectKind::Anchor(_)))
            .count()
    }
}

impl VoxelStore for InMemoryWorld {
    fn vertical_extent(&self, world: WorldId) -> Option<VerticalBand> {
        self.worlds.get(&world).map(|w| w.extent)
    }

    fn cell(&self, world: WorldId, pos: BlockPos) -> Material {
        self.worlds
            .get(&world)
            .map_or(Material::AIR, |w| w.material_at(pos))
    }

    fn set_cell(&mut self, world: WorldId, pos: BlockPos, material: Material) {
        let Some(cells) = self.worlds.get_mut(&world) else {
            return;
        };
        if !cells.extent.contains(pos.y) {
            return;
        }
        if cells.terrain.material_at(pos) == material {
            cells.overrides.remove(&pos);
        } else {
            cells.overrides.insert(pos, material);
        }
    }
}

impl AgentStore for InMemoryWorld {
    fn agents_in_world(&self, world: WorldId) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|(_, record)| record.world == world)
            .map(|(id, _)| *id)
            .collect()
    }

    fn agent_location(&self, agent: AgentId) -> Option<AgentLocation> {
        self.agents.get(&agent).map(|record| AgentLocation {
            world: record.world,
            position: record.position,
        })
    }

    fn inventory_capacity(&self, agent: AgentId) -> Option<u32> {
        self.agents.get(&agent).map(|record| record.capacity)
    }

    fn inventory_slot(&self, agent: AgentId, slot: u32) -> Option<ItemStack> {
        self.agents
            .get(&agent)
            .and_then(|record| record.inventory.get(&slot))
            .cloned()
    }

    fn set_inventory_slot(&mut self, agent: AgentId, slot: u32, stack: ItemStack) -> bool {
        self.give(agent, slot, stack).is_ok()
    }

    fn clear_inventory(&mut self, agent: AgentId) -> bool {
        self.agents.get_mut(&agent).is_some_and(|record| {
            record.inventory.clear();
            true
        })
    }

    fn notify_agent(&mut self, agent: AgentId, notice: OverlayNotice) {
        if let Some(record) = self.agents.get_mut(&agent) {
            debug!(%agent, %notice, "Notice delivered");
            record.notices.push(notice);
        }
    }
}

impl ObjectRegistry for InMemoryWorld {
    fn spawn_anchor(
        &mut self,
        world: WorldId,
        position: Vec3,
        payload: AnchorPayload,
    ) -> ObjectId {
        let id = ObjectId::new();
        self.objects.insert(
            id,
            ObjectRecord {
                world,
                kind: ObjectKind::Anchor(payload),
                position,
                velocity: Vec3::ZERO,
            },
        );
        id
    }

    fn discard(&mut self, object: ObjectId) -> bool {
        self.objects.remove(&object).is_some()
    }

    fn loose_items_in(&self, world: WorldId, bounds: &BoundingBox) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, r)| {
                r.world == world
                    && matches!(r.kind, ObjectKind::LooseItem(_))
                    && bounds.contains(r.position)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn anchors_in(&self, world: WorldId) -> Vec<(ObjectId, OverlayId)> {
        self.objects
            .iter()
            .filter(|(_, r)| r.world == world)
            .filter_map(|(id, r)| match &r.kind {
                ObjectKind::Anchor(payload) => Some((*id, payload.overlay)),
                ObjectKind::LooseItem(_) => None,
            })
            .collect()
    }

    fn position(&self, object: ObjectId) -> Option<Vec3> {
        self.objects.get(&object).map(|r| r.position)
    }

    fn velocity(&self, object: ObjectId) -> Option<Vec3> {
        self.objects.get(&object).map(|r| r.velocity)
    }

    fn set_position(&mut self, object: ObjectId, position: Vec3) -> bool {
        self.objects.get_mut(&object).is_some_and(|r| {
            r.position = position;
            true
        })
    }

    fn set_velocity(&mut self, object: ObjectId, velocity: Vec3) -> bool {
        self.objects.get_mut(&object).is_some_and(|r| {
            r.velocity = velocity;
            true
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn host_with_world() -> (InMemoryWorld, WorldId) {
        let mut host = InMemoryWorld::new();
        let world = WorldId::new();
        host.add_world(world, VerticalBand::new(-64, 319), Terrain::default())
            .unwrap();
        (host, world)
    }

    #[test]
    fn duplicate_world_rejected() {
        let (mut host, world) = host_with_world();
        let result = host.add_world(world, VerticalBand::new(0, 10), Terrain::Void);
        assert!(matches!(result, Err(WorldError::DuplicateWorld(_))));
    }

    #[test]
    fn cells_fall_back_to_terrain() {
        let (mut host, world) = host_with_world();
        let pos = BlockPos::new(10, 64, -3);
        assert_eq!(host.cell(world, pos), Material::GRASS);

        host.set_cell(world, pos, Material::PLANKS);
        assert_eq!(host.cell(world, pos), Material::PLANKS);
        assert_eq!(host.edited_cell_count(world), 1);

        // Writing the generated material back drops the override.
        host.set_cell(world, pos, Material::GRASS);
        assert_eq!(host.edited_cell_count(world), 0);
    }

    #[test]
    fn cells_outside_extent_are_empty_and_read_only() {
        let (mut host, world) = host_with_world();
        let pos = BlockPos::new(0, 400, 0);
        host.set_cell(world, pos, Material::STONE);
        assert_eq!(host.cell(world, pos), Material::AIR);
        assert_eq!(host.edited_cell_count(world), 0);
    }

    #[test]
    fn inventory_slots_respect_capacity() {
        let (mut host, world) = host_with_world();
        let agent = AgentId::new();
        host.add_agent(agent, world, Vec3::ZERO, 4).unwrap();

        assert!(host.set_inventory_slot(agent, 3, ItemStack::new("apple", 2)));
        assert!(!host.set_inventory_slot(agent, 4, ItemStack::new("apple", 2)));
        assert_eq!(host.inventory_slot(agent, 3), Some(ItemStack::new("apple", 2)));

        assert!(host.clear_inventory(agent));
        assert_eq!(host.inventory_slot(agent, 3), None);
    }

    #[test]
    fn vanished_agent_reports_nothing() {
        let (mut host, world) = host_with_world();
        let agent = AgentId::new();
        host.add_agent(agent, world, Vec3::ZERO, 4).unwrap();
        host.remove_agent(agent);

        assert!(host.agent_location(agent).is_none());
        assert!(host.inventory_capacity(agent).is_none());
        assert!(!host.clear_inventory(agent));
        host.notify_agent(agent, OverlayNotice::InventoryRecorded);
        assert!(host.notices(agent).is_empty());
    }

    #[test]
    fn agents_listed_per_world() {
        let (mut host, world) = host_with_world();
        let other = WorldId::new();
        host.add_world(other, VerticalBand::new(0, 128), Terrain::Void)
            .unwrap();
        let a = AgentId::new();
        let b = AgentId::new();
        host.add_agent(a, world, Vec3::ZERO, 4).unwrap();
        host.add_agent(b, other, Vec3::ZERO, 4).unwrap();

        assert_eq!(host.agents_in_world(world), vec![a]);
        host.move_agent(a, other, Vec3::ZERO).unwrap();
        assert!(host.agents_in_world(world).is_empty());
    }

    #[test]
    fn step_moves_items_by_velocity() {
        let (mut host, world) = host_with_world();
        let id = host
            .drop_item(
                world,
                Vec3::new(0.0, 65.0, 0.0),
                Vec3::new(1.5, 0.0, -0.5),
                ItemStack::new("stone", 1),
            )
            .unwrap();
        host.step_objects();
        assert_eq!(host.position(id), Some(Vec3::new(1.5, 65.0, -0.5)));
        // Velocity is retained as the last displacement.
        assert_eq!(host.velocity(id), Some(Vec3::new(1.5, 0.0, -0.5)));
    }

    #[test]
    fn anchors_do_not_move_and_are_not_loose_items() {
        let (mut host, world) = host_with_world();
        let overlay = OverlayId::new();
        let anchor = host.spawn_anchor(
            world,
            Vec3::new(0.5, 66.0, 0.5),
            AnchorPayload {
                overlay,
                display_item: ItemStack::new("mirror_shard", 1),
            },
        );
        host.step_objects();
        let everywhere = BoundingBox::new(
            Vec3::new(-100.0, -100.0, -100.0),
            Vec3::new(100.0, 100.0, 100.0),
        );
        assert!(host.loose_items_in(world, &everywhere).is_empty());
        assert_eq!(host.anchors_in(world), vec![(anchor, overlay)]);
        assert_eq!(host.anchor_count(world), 1);
    }

    #[test]
    fn discard_loose_items_applies_filter() {
        let (mut host, world) = host_with_world();
        let near = host
            .drop_item(world, Vec3::new(1.0, 65.0, 1.0), Vec3::ZERO, ItemStack::new("a", 1))
            .unwrap();
        let far = host
            .drop_item(world, Vec3::new(9.0, 65.0, 9.0), Vec3::ZERO, ItemStack::new("b", 1))
            .unwrap();
        let bounds = BoundingBox::new(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 100.0, 10.0),
        );
        let removed = host.discard_loose_items_in(world, &bounds, &|pos| pos.x < 5.0);
        assert_eq!(removed, 1);
        assert!(host.object(near).is_none());
        assert!(host.object(far).is_some());
    }
}
