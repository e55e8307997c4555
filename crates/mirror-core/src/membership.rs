//! Agent enrollment and per-tick membership reconciliation.
//!
//! An agent is enrolled in at most one overlay at a time. [`Enrollments`]
//! holds that global agent-to-overlay mapping; each [`Overlay`] holds the
//! inventory snapshots of its own enrolled agents. The two are always
//! updated together.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use mirror_types::{AgentId, OverlayId, OverlayNotice};
use mirror_world::AgentStore;

use crate::agent_snapshot::AgentSnapshot;
use crate::overlay::Overlay;

/// Which overlay each enrolled agent belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrollments {
    owners: BTreeMap<AgentId, OverlayId>,
}

impl Enrollments {
    /// Whether `agent` is enrolled anywhere.
    pub fn is_enrolled(&self, agent: AgentId) -> bool {
        self.owners.contains_key(&agent)
    }

    /// Overlay `agent` is enrolled in.
    pub fn owner_of(&self, agent: AgentId) -> Option<OverlayId> {
        self.owners.get(&agent).copied()
    }

    /// Enroll `agent` in `overlay` unless it is already enrolled.
    /// Returns whether the claim succeeded.
    pub fn claim(&mut self, agent: AgentId, overlay: OverlayId) -> bool {
        match self.owners.entry(agent) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(overlay);
                true
            }
        }
    }

    /// Release `agent` if (and only if) `overlay` owns it.
    pub fn release(&mut self, agent: AgentId, overlay: OverlayId) -> bool {
        if self.owners.get(&agent) == Some(&overlay) {
            self.owners.remove(&agent);
            return true;
        }
        false
    }

    /// Number of enrolled agents.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no agent is enrolled.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Drop every enrollment.
    pub fn clear(&mut self) {
        self.owners.clear();
    }
}

/// Agents that joined or left an overlay during one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipChanges {
    /// Agents enrolled because they walked in.
    pub enrolled: Vec<AgentId>,
    /// Agents released because they walked out (or changed world).
    pub departed: Vec<AgentId>,
}

/// Capture `agent`'s inventory and enroll it in `overlay`.
///
/// Returns `false` without side effects if the agent is already enrolled
/// anywhere or is not present in the store.
pub fn enroll_agent<A: AgentStore + ?Sized>(
    store: &mut A,
    enrollments: &mut Enrollments,
    overlay: &mut Overlay,
    agent: AgentId,
) -> bool {
    if enrollments.is_enrolled(agent) {
        return false;
    }
    let Some(snapshot) = AgentSnapshot::capture(&*store, agent) else {
        return false;
    };
    enrollments.claim(agent, overlay.id());
    overlay.track(snapshot);
    store.notify_agent(agent, OverlayNotice::InventoryRecorded);
    debug!(agent = %agent, overlay = %overlay.id(), "Agent enrolled");
    true
}

/// Bring `overlay`'s membership in line with where agents actually are.
///
/// Enrolled agents now outside the disk (or in another world) get their
/// inventory rolled back and are released. Agents whose location is
/// unknown this tick stay enrolled. Agents in the overlay's world, inside
/// the disk and not enrolled anywhere are enrolled and told how long the
/// overlay has left.
pub fn reconcile_membership<A: AgentStore + ?Sized>(
    store: &mut A,
    enrollments: &mut Enrollments,
    overlay: &mut Overlay,
    remaining_seconds: u64,
) -> MembershipChanges {
    let mut changes = MembershipChanges::default();
    let region = overlay.region();
    let world = overlay.world();

    for agent in overlay.affected_agents() {
        let Some(location) = store.agent_location(agent) else {
            continue;
        };
        if location.world == world && region.covers(location.position) {
            continue;
        }
        enrollments.release(agent, overlay.id());
        let restored = overlay
            .untrack(agent)
            .is_some_and(|snapshot| snapshot.restore(store));
        if restored {
            store.notify_agent(agent, OverlayNotice::LeftRestored);
        }
        debug!(agent = %agent, overlay = %overlay.id(), "Agent left overlay");
        changes.departed.push(agent);
    }

    for agent in store.agents_in_world(world) {
        if enrollments.is_enrolled(agent) {
            continue;
        }
        let inside = store
            .agent_location(agent)
            .is_some_and(|loc| loc.world == world && region.covers(loc.position));
        if inside && enroll_agent(store, enrollments, overlay, agent) {
            store.notify_agent(agent, OverlayNotice::Entered { remaining_seconds });
            changes.enrolled.push(agent);
        }
    }

    changes
}
