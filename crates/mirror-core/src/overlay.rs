//! The overlay aggregate: one temporary, reversible region of a world.
//!
//! An [`Overlay`] owns everything needed to undo itself: the sparse cell
//! snapshot taken at creation, the inventory snapshots of every agent
//! currently enrolled, and the handle of the anchor object marking its
//! center. [`Overlay::restore`] runs the full rollback exactly once.

use chrono::{DateTime, Utc};
use tracing::info;

use mirror_types::{AgentId, BlockPos, ObjectId, OverlayId, OverlayNotice, OverlayStatus, WorldId};
use mirror_world::{ObjectRegistry, VoxelStore, WorldHost};

use crate::agent_snapshot::{AgentSnapshot, AgentSnapshotStore};
use crate::cell_snapshot::CellSnapshot;
use crate::clock::whole_seconds;
use crate::membership::Enrollments;
use crate::region::Region;

/// Handle to an overlay's anchor object.
///
/// Not `Clone`: the handle is consumed when the anchor is discarded, so an
/// overlay can discard its anchor at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct AnchorHandle(ObjectId);

impl AnchorHandle {
    pub(crate) const fn new(object: ObjectId) -> Self {
        Self(object)
    }

    /// Object id of the anchor.
    pub const fn object(&self) -> ObjectId {
        self.0
    }

    fn discard<R: ObjectRegistry + ?Sized>(self, registry: &mut R) -> bool {
        registry.discard(self.0)
    }
}

/// Lifecycle phase of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    /// Snapshots are held and the overlay is tracked by its manager.
    Active,
    /// Rollback has run; the snapshots are spent.
    Restored,
}

/// Outcome of one overlay rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Overlay that was restored.
    pub overlay: OverlayId,
    /// World it belonged to.
    pub world: WorldId,
    /// Loose items removed from the region.
    pub items_discarded: usize,
    /// Cells built during the overlay and emptied.
    pub cells_cleared: u64,
    /// Recorded cells written back.
    pub cells_rewritten: u64,
    /// Agents whose inventory was rolled back.
    pub agents_restored: Vec<AgentId>,
    /// Agents released without a rollback because they were not present.
    pub agents_absent: Vec<AgentId>,
    /// Whether the anchor object was found and discarded.
    pub anchor_discarded: bool,
}

impl RestoreReport {
    const fn empty(overlay: OverlayId, world: WorldId) -> Self {
        Self {
            overlay,
            world,
            items_discarded: 0,
            cells_cleared: 0,
            cells_rewritten: 0,
            agents_restored: Vec::new(),
            agents_absent: Vec::new(),
            anchor_discarded: false,
        }
    }
}

/// A temporary, reversible region of a world.
#[derive(Debug)]
pub struct Overlay {
    id: OverlayId,
    world: WorldId,
    region: Region,
    started_at_tick: u64,
    expires_at_tick: u64,
    activated_at: DateTime<Utc>,
    cells: CellSnapshot,
    agents: AgentSnapshotStore,
    anchor: Option<AnchorHandle>,
    phase: OverlayPhase,
    /// Smallest countdown threshold already announced.
    last_countdown: Option<u64>,
}

impl Overlay {
    /// Create an overlay over `region` and capture its cells.
    ///
    /// No agent is enrolled and no anchor is attached yet.
    pub(crate) fn capture<V: VoxelStore + ?Sized>(
        store: &V,
        world: WorldId,
        region: Region,
        now: u64,
        duration_ticks: u64,
    ) -> Self {
        Self {
            id: OverlayId::new(),
            world,
            region,
            started_at_tick: now,
            expires_at_tick: now.saturating_add(duration_ticks),
            activated_at: Utc::now(),
            cells: CellSnapshot::capture(store, world, region),
            agents: AgentSnapshotStore::new(),
            anchor: None,
            phase: OverlayPhase::Active,
            last_countdown: None,
        }
    }

    /// Overlay identifier.
    pub const fn id(&self) -> OverlayId {
        self.id
    }

    /// World the overlay belongs to.
    pub const fn world(&self) -> WorldId {
        self.world
    }

    /// Center cell.
    pub const fn center(&self) -> BlockPos {
        self.region.center()
    }

    /// Region covered.
    pub const fn region(&self) -> Region {
        self.region
    }

    /// Tick at which the overlay was created.
    pub const fn started_at_tick(&self) -> u64 {
        self.started_at_tick
    }

    /// Tick at which the overlay collapses.
    pub const fn expires_at_tick(&self) -> u64 {
        self.expires_at_tick
    }

    /// Wall-clock time of activation.
    pub const fn activated_at(&self) -> DateTime<Utc> {
        self.activated_at
    }

    /// Cells recorded at creation.
    pub const fn cell_snapshot(&self) -> &CellSnapshot {
        &self.cells
    }

    /// Inventory snapshots of enrolled agents.
    pub const fn agent_snapshots(&self) -> &AgentSnapshotStore {
        &self.agents
    }

    /// Agents currently enrolled, in id order.
    pub fn affected_agents(&self) -> Vec<AgentId> {
        self.agents.agents()
    }

    /// Whether `agent` is enrolled in this overlay.
    pub fn is_tracking(&self, agent: AgentId) -> bool {
        self.agents.contains(agent)
    }

    /// Anchor object id, while the anchor is attached.
    pub fn anchor(&self) -> Option<ObjectId> {
        self.anchor.as_ref().map(AnchorHandle::object)
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Whether `now` has reached the expiry tick.
    pub const fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at_tick
    }

    /// Ticks left before collapse (0 once expired).
    pub const fn remaining_ticks(&self, now: u64) -> u64 {
        self.expires_at_tick.saturating_sub(now)
    }

    /// Whole seconds left before collapse.
    pub const fn remaining_seconds(&self, now: u64, ticks_per_second: u64) -> u64 {
        whole_seconds(self.remaining_ticks(now), ticks_per_second)
    }

    pub(crate) fn attach_anchor(&mut self, handle: AnchorHandle) {
        self.anchor = Some(handle);
    }

    pub(crate) fn track(&mut self, snapshot: AgentSnapshot) {
        self.agents.insert(snapshot);
    }

    pub(crate) fn untrack(&mut self, agent: AgentId) -> Option<AgentSnapshot> {
        self.agents.remove(agent)
    }

    /// Return the countdown threshold newly reached at `now`, if any.
    ///
    /// Each threshold is reported once. When several are reached at the
    /// same time (for example after a skipped tick), only the smallest is.
    pub(crate) fn countdown_due(
        &mut self,
        now: u64,
        ticks_per_second: u64,
        thresholds: &[u64],
    ) -> Option<u64> {
        let remaining = self.remaining_seconds(now, ticks_per_second);
        let reached = thresholds
            .iter()
            .copied()
            .filter(|&t| remaining <= t)
            .min()?;
        match self.last_countdown {
            Some(last) if reached >= last => None,
            _ => {
                self.last_countdown = Some(reached);
                Some(reached)
            }
        }
    }

    /// Roll the region and every enrolled agent back to the snapshots.
    ///
    /// Order: loose items in the region are discarded, cells built during
    /// the overlay are emptied, recorded cells are written back, enrolled
    /// agents get their inventory back (agents no longer present are just
    /// released), and the anchor is discarded. Enrollments held by this
    /// overlay are released in `enrollments`.
    ///
    /// A second call is a no-op returning an empty report.
    pub fn restore<H: WorldHost + ?Sized>(
        &mut self,
        host: &mut H,
        enrollments: &mut Enrollments,
    ) -> RestoreReport {
        let mut report = RestoreReport::empty(self.id, self.world);
        if self.phase == OverlayPhase::Restored {
            return report;
        }

        let region = self.region;
        report.items_discarded = host.discard_loose_items_in(
            self.world,
            &region.item_bounds(),
            &|pos| region.contains_point(pos),
        );

        let cells = self.cells.restore(host, self.world, region);
        report.cells_cleared = cells.cleared;
        report.cells_rewritten = cells.rewritten;

        for snapshot in self.agents.drain() {
            let agent = snapshot.agent();
            enrollments.release(agent, self.id);
            if snapshot.restore(host) {
                host.notify_agent(agent, OverlayNotice::CollapsedRestored);
                report.agents_restored.push(agent);
            } else {
                report.agents_absent.push(agent);
            }
        }

        if let Some(anchor) = self.anchor.take() {
            report.anchor_discarded = anchor.discard(host);
        }

        self.phase = OverlayPhase::Restored;

        info!(
            overlay = %self.id,
            world = %self.world,
            center = %region.center(),
            items_discarded = report.items_discarded,
            cells_cleared = report.cells_cleared,
            cells_rewritten = report.cells_rewritten,
            agents_restored = report.agents_restored.len(),
            agents_absent = report.agents_absent.len(),
            "Overlay restored"
        );

        report
    }

    /// Point-in-time status for observers.
    pub fn status(&self, now: u64) -> OverlayStatus {
        OverlayStatus {
            id: self.id,
            world: self.world,
            center: self.region.center(),
            radius: self.region.radius(),
            band: self.region.band(),
            started_at_tick: self.started_at_tick,
            expires_at_tick: self.expires_at_tick,
            remaining_ticks: self.remaining_ticks(now),
            activated_at: self.activated_at,
            captured_cells: u64::try_from(self.cells.len()).unwrap_or(u64::MAX),
            affected_agents: self.affected_agents(),
        }
    }
}
