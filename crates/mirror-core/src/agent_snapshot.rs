//! Inventory snapshots for enrolled agents.

use std::collections::BTreeMap;

use mirror_types::{AgentId, ItemStack};
use mirror_world::AgentStore;

/// Slot-indexed copy of one agent's inventory, taken on enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSnapshot {
    agent: AgentId,
    slots: BTreeMap<u32, ItemStack>,
}

impl AgentSnapshot {
    /// Copy every occupied slot of `agent`'s inventory.
    ///
    /// Returns `None` if the agent is not present in the store.
    pub fn capture<A: AgentStore + ?Sized>(store: &A, agent: AgentId) -> Option<Self> {
        let capacity = store.inventory_capacity(agent)?;
        let slots = (0..capacity)
            .filter_map(|slot| {
                store
                    .inventory_slot(agent, slot)
                    .filter(|stack| !stack.is_empty())
                    .map(|stack| (slot, stack))
            })
            .collect();
        Some(Self { agent, slots })
    }

    /// Overwrite the agent's inventory with the recorded contents.
    ///
    /// Every slot is cleared first, so items acquired after capture are
    /// gone. Returns `false` if the agent is no longer present.
    pub fn restore<A: AgentStore + ?Sized>(&self, store: &mut A) -> bool {
        if !store.clear_inventory(self.agent) {
            return false;
        }
        for (&slot, stack) in &self.slots {
            store.set_inventory_slot(self.agent, slot, stack.clone());
        }
        true
    }

    /// Agent the snapshot belongs to.
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// Recorded stack in `slot`.
    pub fn slot(&self, slot: u32) -> Option<&ItemStack> {
        self.slots.get(&slot)
    }

    /// Number of occupied slots recorded.
    pub fn occupied_slots(&self) -> usize {
        self.slots.len()
    }
}

/// An overlay's snapshots, keyed by agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSnapshotStore {
    snapshots: BTreeMap<AgentId, AgentSnapshot>,
}

impl AgentSnapshotStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            snapshots: BTreeMap::new(),
        }
    }

    /// Store a snapshot, replacing any earlier one for the same agent.
    pub fn insert(&mut self, snapshot: AgentSnapshot) {
        self.snapshots.insert(snapshot.agent, snapshot);
    }

    /// Remove and return the snapshot for `agent`.
    pub fn remove(&mut self, agent: AgentId) -> Option<AgentSnapshot> {
        self.snapshots.remove(&agent)
    }

    /// Whether `agent` has a snapshot here.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.snapshots.contains_key(&agent)
    }

    /// Snapshot for `agent`.
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots.get(&agent)
    }

    /// Agents with a snapshot, in id order.
    pub fn agents(&self) -> Vec<AgentId> {
        self.snapshots.keys().copied().collect()
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot is held.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Remove and return every snapshot.
    pub fn drain(&mut self) -> Vec<AgentSnapshot> {
        core::mem::take(&mut self.snapshots).into_values().collect()
    }
}
