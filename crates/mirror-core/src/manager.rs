//! The overlay manager: registry, quota, creation, per-tick processing and
//! shutdown.
//!
//! The manager is driven entirely by its host. The host calls
//! [`OverlayManager::tick`] once per world per simulation tick, after its
//! own physics step, passing the current tick number. Nothing here runs
//! in the background and nothing blocks.
//!
//! # Tick phases (per overlay, in creation order)
//!
//! 1. **Expiry** -- an overlay whose lifetime is over is restored and
//!    marked for removal; nothing else happens to it this tick.
//! 2. **Membership** -- enrolled agents who left are rolled back and
//!    released; agents who walked in are enrolled.
//! 3. **Boundary guard** -- loose items that just crossed the rim are
//!    pulled back inside.
//! 4. **Countdown** -- enrolled agents are told when a countdown threshold
//!    is reached.
//!
//! Expired overlays are removed from the registry after the sweep.

use std::collections::BTreeMap;

use tracing::{debug, info};

use mirror_types::{
    AgentId, BlockPos, ItemStack, OverlayId, OverlayNotice, OverlayStatus, WorldId,
};
use mirror_world::{AnchorPayload, WorldHost};

use crate::boundary::BoundaryGuard;
use crate::clock::whole_seconds;
use crate::config::{MirrorConfig, OverlayConfig};
use crate::error::OverlayError;
use crate::membership::{self, Enrollments};
use crate::overlay::{AnchorHandle, Overlay, RestoreReport};
use crate::region::Region;

/// Everything needed to create an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    /// World to create the overlay in.
    pub world: WorldId,
    /// Center cell of the region.
    pub center: BlockPos,
    /// Agent activating the overlay.
    pub trigger: AgentId,
    /// Item rendered at the anchor.
    pub display_item: ItemStack,
}

/// What happened in one world during one call to [`OverlayManager::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTickSummary {
    /// The tick that was processed.
    pub tick: u64,
    /// World that was processed.
    pub world: WorldId,
    /// Overlays processed this tick (including ones that expired).
    pub overlays_processed: usize,
    /// Overlays that expired and were restored.
    pub restored: Vec<RestoreReport>,
    /// Agents enrolled because they walked into an overlay.
    pub enrolled: Vec<(OverlayId, AgentId)>,
    /// Agents released because they walked out of an overlay.
    pub departed: Vec<(OverlayId, AgentId)>,
    /// Loose items pulled back inside a rim.
    pub items_contained: u32,
    /// Countdown notices delivered.
    pub countdown_notices: u32,
}

impl OverlayTickSummary {
    const fn new(tick: u64, world: WorldId) -> Self {
        Self {
            tick,
            world,
            overlays_processed: 0,
            restored: Vec::new(),
            enrolled: Vec::new(),
            departed: Vec::new(),
            items_contained: 0,
            countdown_notices: 0,
        }
    }

    /// Whether nothing observable happened.
    pub fn is_quiet(&self) -> bool {
        self.restored.is_empty()
            && self.enrolled.is_empty()
            && self.departed.is_empty()
            && self.items_contained == 0
            && self.countdown_notices == 0
    }
}

/// Registry of every active overlay across all worlds.
#[derive(Debug)]
pub struct OverlayManager {
    config: OverlayConfig,
    ticks_per_second: u64,
    guard: BoundaryGuard,
    /// Active overlay ids per world, in creation order.
    worlds: BTreeMap<WorldId, Vec<OverlayId>>,
    overlays: BTreeMap<OverlayId, Overlay>,
    enrollments: Enrollments,
}

impl OverlayManager {
    /// Create an empty manager.
    pub fn new(config: OverlayConfig, ticks_per_second: u64) -> Self {
        let guard = BoundaryGuard::from_config(&config);
        Self {
            config,
            ticks_per_second,
            guard,
            worlds: BTreeMap::new(),
            overlays: BTreeMap::new(),
            enrollments: Enrollments::default(),
        }
    }

    /// Create an empty manager from the full configuration.
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(config.overlay.clone(), config.time.ticks_per_second)
    }

    /// Overlay settings in use.
    pub const fn config(&self) -> &OverlayConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether `world` has room for another overlay.
    pub fn can_create(&self, world: WorldId) -> bool {
        let limit = usize::try_from(self.config.max_per_world).unwrap_or(usize::MAX);
        self.active_count(world) < limit
    }

    /// Whether `agent` is enrolled in any overlay.
    pub fn is_agent_enrolled(&self, agent: AgentId) -> bool {
        self.enrollments.is_enrolled(agent)
    }

    /// Overlay `agent` is enrolled in.
    pub fn enrollment_of(&self, agent: AgentId) -> Option<OverlayId> {
        self.enrollments.owner_of(agent)
    }

    /// Number of active overlays in `world`.
    pub fn active_count(&self, world: WorldId) -> usize {
        self.worlds.get(&world).map_or(0, Vec::len)
    }

    /// Number of active overlays across all worlds.
    pub fn total_active(&self) -> usize {
        self.overlays.len()
    }

    /// Worlds with at least one active overlay.
    pub fn active_worlds(&self) -> Vec<WorldId> {
        self.worlds.keys().copied().collect()
    }

    /// Whether `overlay` is active.
    pub fn contains(&self, overlay: OverlayId) -> bool {
        self.overlays.contains_key(&overlay)
    }

    /// Active overlay by id.
    pub fn overlay(&self, overlay: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&overlay)
    }

    /// Active overlays in `world`, in creation order.
    pub fn overlays_in(&self, world: WorldId) -> Vec<&Overlay> {
        self.worlds
            .get(&world)
            .map(|ids| ids.iter().filter_map(|id| self.overlays.get(id)).collect())
            .unwrap_or_default()
    }

    /// First overlay in creation order whose disk covers `pos`'s column.
    pub fn overlay_at(&self, world: WorldId, pos: BlockPos) -> Option<&Overlay> {
        self.overlays_in(world)
            .into_iter()
            .find(|overlay| overlay.region().covers_block(pos))
    }

    /// Status snapshots of every active overlay in `world`.
    pub fn statuses(&self, world: WorldId, now: u64) -> Vec<OverlayStatus> {
        self.overlays_in(world)
            .into_iter()
            .map(|overlay| overlay.status(now))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create an overlay centered on `request.center`.
    ///
    /// Captures the region's cells, enrolls the triggering agent and every
    /// other agent currently inside the disk (agents enrolled elsewhere are
    /// skipped), spawns the anchor and registers the overlay.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::QuotaExceeded`] when the world is full,
    /// [`OverlayError::AlreadyEnrolled`] when the trigger is already
    /// enrolled, [`OverlayError::AgentUnavailable`] when the trigger is not
    /// present, [`OverlayError::UnknownWorld`] when the host does not know
    /// the world, and [`OverlayError::CenterOutOfBounds`] when the region
    /// would have no layers. Nothing is captured or spawned on error.
    pub fn create_overlay<H: WorldHost + ?Sized>(
        &mut self,
        host: &mut H,
        request: OverlayRequest,
        now: u64,
    ) -> Result<OverlayId, OverlayError> {
        let OverlayRequest {
            world,
            center,
            trigger,
            display_item,
        } = request;

        if !self.can_create(world) {
            info!(
                world = %world,
                agent = %trigger,
                limit = self.config.max_per_world,
                "Overlay quota reached"
            );
            return Err(OverlayError::QuotaExceeded {
                world,
                limit: self.config.max_per_world,
            });
        }
        if let Some(overlay) = self.enrollments.owner_of(trigger) {
            return Err(OverlayError::AlreadyEnrolled {
                agent: trigger,
                overlay,
            });
        }
        if host.inventory_capacity(trigger).is_none() {
            return Err(OverlayError::AgentUnavailable(trigger));
        }
        let extent = host
            .vertical_extent(world)
            .ok_or(OverlayError::UnknownWorld(world))?;
        let region = Region::around(
            center,
            self.config.radius,
            self.config.vertical_half_height,
            extent,
        )
        .ok_or(OverlayError::CenterOutOfBounds { world, center })?;

        let mut overlay = Overlay::capture(&*host, world, region, now, self.config.duration_ticks);
        let id = overlay.id();

        membership::enroll_agent(host, &mut self.enrollments, &mut overlay, trigger);
        for agent in host.agents_in_world(world) {
            if agent == trigger || self.enrollments.is_enrolled(agent) {
                continue;
            }
            let inside = host
                .agent_location(agent)
                .is_some_and(|loc| loc.world == world && region.covers(loc.position));
            if inside {
                membership::enroll_agent(host, &mut self.enrollments, &mut overlay, agent);
            }
        }

        let anchor_at = center.corner().plus(self.config.anchor_offset);
        let anchor = host.spawn_anchor(
            world,
            anchor_at,
            AnchorPayload {
                overlay: id,
                display_item,
            },
        );
        overlay.attach_anchor(AnchorHandle::new(anchor));

        info!(
            overlay = %id,
            world = %world,
            center = %center,
            trigger = %trigger,
            min_y = region.band().min_y,
            max_y = region.band().max_y,
            layers = region.band().layers(),
            captured_cells = overlay.cell_snapshot().len(),
            enrolled = overlay.agent_snapshots().len(),
            expires_at_tick = overlay.expires_at_tick(),
            "Overlay created"
        );

        self.worlds.entry(world).or_default().push(id);
        self.overlays.insert(id, overlay);
        Ok(id)
    }

    /// Process every active overlay in `world` for tick `now`.
    pub fn tick<H: WorldHost + ?Sized>(
        &mut self,
        host: &mut H,
        world: WorldId,
        now: u64,
    ) -> OverlayTickSummary {
        let mut summary = OverlayTickSummary::new(now, world);
        let ids = self.worlds.get(&world).cloned().unwrap_or_default();
        let mut expired: Vec<OverlayId> = Vec::new();

        for id in ids {
            let Some(overlay) = self.overlays.get_mut(&id) else {
                continue;
            };
            summary.overlays_processed = summary.overlays_processed.saturating_add(1);

            if overlay.is_expired(now) {
                summary
                    .restored
                    .push(overlay.restore(host, &mut self.enrollments));
                expired.push(id);
                continue;
            }

            let remaining = overlay.remaining_seconds(now, self.ticks_per_second);
            let changes =
                membership::reconcile_membership(host, &mut self.enrollments, overlay, remaining);
            summary
                .enrolled
                .extend(changes.enrolled.into_iter().map(|agent| (id, agent)));
            summary
                .departed
                .extend(changes.departed.into_iter().map(|agent| (id, agent)));

            let contained = self.guard.enforce(host, world, overlay.region());
            summary.items_contained = summary.items_contained.saturating_add(contained);

            if let Some(remaining_seconds) =
                overlay.countdown_due(now, self.ticks_per_second, &self.config.countdown_seconds)
            {
                for agent in overlay.affected_agents() {
                    host.notify_agent(agent, OverlayNotice::Countdown { remaining_seconds });
                    summary.countdown_notices = summary.countdown_notices.saturating_add(1);
                }
                debug!(overlay = %id, remaining_seconds, "Countdown notice sent");
            }
        }

        self.remove_overlays(world, &expired);
        summary
    }

    /// Force-restore every active overlay in every world, then clear all
    /// registries. Safe to call repeatedly and with nothing active.
    pub fn shutdown<H: WorldHost + ?Sized>(&mut self, host: &mut H) -> Vec<RestoreReport> {
        let worlds = core::mem::take(&mut self.worlds);
        let mut reports = Vec::new();

        for ids in worlds.into_values() {
            for id in ids {
                if let Some(overlay) = self.overlays.get_mut(&id) {
                    reports.push(overlay.restore(host, &mut self.enrollments));
                }
            }
        }

        self.overlays.clear();
        self.enrollments.clear();

        if !reports.is_empty() {
            info!(restored = reports.len(), "Overlay manager shut down");
        }
        reports
    }

    /// Discard anchors in `world` whose overlay is no longer registered.
    /// Returns how many were discarded.
    pub fn reap_orphan_anchors<H: WorldHost + ?Sized>(
        &self,
        host: &mut H,
        world: WorldId,
    ) -> usize {
        let mut reaped: usize = 0;
        for (object, overlay) in host.anchors_in(world) {
            if self.overlays.contains_key(&overlay) {
                continue;
            }
            if host.discard(object) {
                reaped = reaped.saturating_add(1);
                debug!(object = %object, overlay = %overlay, "Orphan anchor discarded");
            }
        }
        reaped
    }

    /// Seconds of lifetime a new overlay gets.
    pub const fn duration_seconds(&self) -> u64 {
        whole_seconds(self.config.duration_ticks, self.ticks_per_second)
    }

    fn remove_overlays(&mut self, world: WorldId, expired: &[OverlayId]) {
        if expired.is_empty() {
            return;
        }
        for id in expired {
            self.overlays.remove(id);
        }
        let now_empty = self.worlds.get_mut(&world).is_some_and(|ids| {
            ids.retain(|id| !expired.contains(id));
            ids.is_empty()
        });
        if now_empty {
            self.worlds.remove(&world);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use mirror_types::{Material, Vec3, VerticalBand};
    use mirror_world::{InMemoryWorld, ObjectRegistry, Terrain, VoxelStore};

    use super::*;

    const TPS: u64 = 20;

    fn small_config() -> OverlayConfig {
        OverlayConfig {
            radius: 6,
            vertical_half_height: 3,
            duration_ticks: 100,
            ..OverlayConfig::default()
        }
    }

    struct Fixture {
        host: InMemoryWorld,
        world: WorldId,
        manager: OverlayManager,
    }

    fn fixture() -> Fixture {
        let mut host = InMemoryWorld::new();
        let world = WorldId::new();
        host.add_world(world, VerticalBand::new(0, 128), Terrain::default())
            .unwrap();
        Fixture {
            host,
            world,
            manager: OverlayManager::new(small_config(), TPS),
        }
    }

    fn spawn(f: &mut Fixture, pos: Vec3) -> AgentId {
        let agent = AgentId::new();
        f.host.add_agent(agent, f.world, pos, 9).unwrap();
        agent
    }

    fn request(f: &Fixture, center: BlockPos, trigger: AgentId) -> OverlayRequest {
        OverlayRequest {
            world: f.world,
            center,
            trigger,
            display_item: ItemStack::new("mirror_shard", 1),
        }
    }

    fn create(f: &mut Fixture, center: BlockPos, trigger: AgentId, now: u64) -> OverlayId {
        let req = request(f, center, trigger);
        f.manager.create_overlay(&mut f.host, req, now).unwrap()
    }

    #[test]
    fn create_enrolls_trigger_and_bystanders() {
        let mut f = fixture();
        let trigger = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        let bystander = spawn(&mut f, Vec3::new(3.0, 65.0, -2.0));
        let far = spawn(&mut f, Vec3::new(30.0, 65.0, 0.0));

        let id = create(&mut f, BlockPos::new(0, 64, 0), trigger, 0);
        assert!(f.manager.contains(id));
        assert_eq!(f.manager.enrollment_of(trigger), Some(id));
        assert_eq!(f.manager.enrollment_of(bystander), Some(id));
        assert!(!f.manager.is_agent_enrolled(far));

        let overlay = f.manager.overlay(id).unwrap();
        assert_eq!(overlay.region().band(), VerticalBand::new(61, 67));
        let anchor = overlay.anchor().unwrap();
        let pos = f.host.position(anchor).unwrap();
        assert_eq!(pos, Vec3::new(0.5, 66.0, 0.5));
    }

    #[test]
    fn quota_is_enforced_per_world() {
        let mut f = fixture();
        for i in 0..5 {
            let agent = spawn(&mut f, Vec3::new(f64::from(i) * 100.0, 65.0, 0.0));
            create(&mut f, BlockPos::new(i * 100, 64, 0), agent, 0);
        }
        assert!(!f.manager.can_create(f.world));

        let extra = spawn(&mut f, Vec3::new(1000.0, 65.0, 0.0));
        let req = request(&f, BlockPos::new(1000, 64, 0), extra);
        let err = f.manager.create_overlay(&mut f.host, req, 0).unwrap_err();
        assert!(matches!(err, OverlayError::QuotaExceeded { limit: 5, .. }));
        assert!(!f.manager.is_agent_enrolled(extra));
        assert_eq!(f.host.anchor_count(f.world), 5);

        // Room frees up once the overlays expire.
        f.manager.tick(&mut f.host, f.world, 100);
        assert_eq!(f.manager.active_count(f.world), 0);
        let req = request(&f, BlockPos::new(1000, 64, 0), extra);
        assert!(f.manager.create_overlay(&mut f.host, req, 100).is_ok());

        // Another world is unaffected.
        let other = WorldId::new();
        f.host
            .add_world(other, VerticalBand::new(0, 128), Terrain::default())
            .unwrap();
        assert!(f.manager.can_create(other));
    }

    #[test]
    fn single_expiry_frees_single_slot() {
        let mut f = fixture();
        for i in 0..5 {
            let agent = spawn(&mut f, Vec3::new(f64::from(i) * 100.0, 65.0, 0.0));
            let now = u64::try_from(i).unwrap() * 10;
            create(&mut f, BlockPos::new(i * 100, 64, 0), agent, now);
        }
        let extra = spawn(&mut f, Vec3::new(1000.0, 65.0, 0.0));
        let req = request(&f, BlockPos::new(1000, 64, 0), extra);
        assert!(matches!(
            f.manager.create_overlay(&mut f.host, req, 50),
            Err(OverlayError::QuotaExceeded { limit: 5, .. })
        ));

        // Only the overlay created at tick 0 has run out.
        let summary = f.manager.tick(&mut f.host, f.world, 100);
        assert_eq!(summary.restored.len(), 1);
        assert_eq!(f.manager.active_count(f.world), 4);
        assert!(f.manager.can_create(f.world));

        let req = request(&f, BlockPos::new(1000, 64, 0), extra);
        assert!(f.manager.create_overlay(&mut f.host, req, 100).is_ok());
        assert_eq!(f.manager.active_count(f.world), 5);
        assert!(!f.manager.can_create(f.world));
    }

    #[test]
    fn agent_moves_from_overlap_into_second_overlay() {
        let mut f = fixture();
        let a = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        let b = spawn(&mut f, Vec3::new(8.5, 65.0, 0.5));
        let walker = spawn(&mut f, Vec3::new(4.0, 65.0, 0.5));
        let first = create(&mut f, BlockPos::new(0, 64, 0), a, 0);
        let second = create(&mut f, BlockPos::new(8, 64, 0), b, 0);
        assert_eq!(f.manager.enrollment_of(walker), Some(first));

        f.host
            .move_agent(walker, f.world, Vec3::new(11.0, 65.0, 0.5))
            .unwrap();
        let summary = f.manager.tick(&mut f.host, f.world, 1);
        assert_eq!(summary.departed, vec![(first, walker)]);
        assert_eq!(summary.enrolled, vec![(second, walker)]);
        assert_eq!(f.manager.enrollment_of(walker), Some(second));
    }

    #[test]
    fn enrolled_agent_cannot_activate() {
        let mut f = fixture();
        let agent = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        let id = create(&mut f, BlockPos::new(0, 64, 0), agent, 0);

        let req = request(&f, BlockPos::new(50, 64, 0), agent);
        let err = f.manager.create_overlay(&mut f.host, req, 1).unwrap_err();
        assert_eq!(
            err,
            OverlayError::AlreadyEnrolled {
                agent,
                overlay: id
            }
        );
        assert_eq!(f.manager.active_count(f.world), 1);
    }

    #[test]
    fn missing_trigger_and_world_are_rejected() {
        let mut f = fixture();
        let ghost = AgentId::new();
        let req = request(&f, BlockPos::new(0, 64, 0), ghost);
        assert_eq!(
            f.manager.create_overlay(&mut f.host, req, 0),
            Err(OverlayError::AgentUnavailable(ghost))
        );

        let agent = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        let mut req = request(&f, BlockPos::new(0, 64, 0), agent);
        let unknown = WorldId::new();
        req.world = unknown;
        assert_eq!(
            f.manager.create_overlay(&mut f.host, req, 0),
            Err(OverlayError::UnknownWorld(unknown))
        );
        assert_eq!(f.manager.total_active(), 0);
        assert!(!f.manager.is_agent_enrolled(agent));
    }

    #[test]
    fn expiry_restores_and_unregisters() {
        let mut f = fixture();
        let agent = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        f.host.give(agent, 0, ItemStack::new("bread", 4)).unwrap();
        let id = create(&mut f, BlockPos::new(0, 64, 0), agent, 10);

        f.host.set_cell(f.world, BlockPos::new(1, 65, 1), Material::PLANKS);
        f.host.give(agent, 3, ItemStack::new("diamond", 2)).unwrap();

        let summary = f.manager.tick(&mut f.host, f.world, 109);
        assert!(summary.restored.is_empty());
        assert!(f.manager.contains(id));

        let summary = f.manager.tick(&mut f.host, f.world, 110);
        assert_eq!(summary.restored.len(), 1);
        assert!(!f.manager.contains(id));
        assert!(!f.manager.is_agent_enrolled(agent));
        assert!(f.manager.active_worlds().is_empty());
        assert_eq!(f.host.cell(f.world, BlockPos::new(1, 65, 1)), Material::AIR);
        assert_eq!(f.host.inventory(agent).unwrap().len(), 1);
        assert_eq!(f.host.anchor_count(f.world), 0);
        assert!(f.manager.can_create(f.world));
    }

    #[test]
    fn expired_overlay_skips_other_phases() {
        let mut f = fixture();
        let agent = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        create(&mut f, BlockPos::new(0, 64, 0), agent, 0);
        let walker = spawn(&mut f, Vec3::new(2.0, 65.0, 0.0));
        // The walker is not enrolled at creation time because it spawned
        // after; on the expiry tick it must not be enrolled either.
        let summary = f.manager.tick(&mut f.host, f.world, 100);
        assert!(summary.enrolled.is_empty());
        assert!(!f.manager.is_agent_enrolled(walker));
    }

    #[test]
    fn tick_tracks_membership_and_guard() {
        let mut f = fixture();
        let agent = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        let id = create(&mut f, BlockPos::new(0, 64, 0), agent, 0);
        let walker = spawn(&mut f, Vec3::new(20.0, 65.0, 0.0));

        f.host
            .move_agent(walker, f.world, Vec3::new(2.0, 65.0, 2.0))
            .unwrap();
        f.host
            .move_agent(agent, f.world, Vec3::new(-20.0, 65.0, 0.0))
            .unwrap();
        let item = f
            .host
            .drop_item(
                f.world,
                Vec3::new(5.5, 65.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                ItemStack::new("planks", 1),
            )
            .unwrap();
        f.host.step_objects();

        let summary = f.manager.tick(&mut f.host, f.world, 1);
        assert_eq!(summary.enrolled, vec![(id, walker)]);
        assert_eq!(summary.departed, vec![(id, agent)]);
        assert_eq!(summary.items_contained, 1);
        assert!(f.host.position(item).unwrap().x < 6.0);
        assert!(f.host.notices(walker).contains(&OverlayNotice::Entered {
            remaining_seconds: 4
        }));
    }

    #[test]
    fn countdown_notices_reach_enrolled_agents() {
        let mut f = fixture();
        let agent = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        create(&mut f, BlockPos::new(0, 64, 0), agent, 0);
        f.host.drain_notices(agent);

        let mut sent = 0;
        for now in 1..100 {
            sent += f.manager.tick(&mut f.host, f.world, now).countdown_notices;
        }
        // A 5s lifetime starts below every threshold, so they collapse into
        // a single notice on the first tick.
        assert_eq!(sent, 1);
        assert_eq!(
            f.host.notices(agent),
            &[OverlayNotice::Countdown {
                remaining_seconds: 5
            }]
        );
    }

    #[test]
    fn shutdown_restores_everything_and_is_idempotent() {
        let mut f = fixture();
        let a = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        let b = spawn(&mut f, Vec3::new(100.5, 65.0, 0.5));
        create(&mut f, BlockPos::new(0, 64, 0), a, 0);
        create(&mut f, BlockPos::new(100, 64, 0), b, 0);
        f.host.set_cell(f.world, BlockPos::new(100, 66, 0), Material::GLASS);

        let reports = f.manager.shutdown(&mut f.host);
        assert_eq!(reports.len(), 2);
        assert_eq!(f.manager.total_active(), 0);
        assert!(!f.manager.is_agent_enrolled(a));
        assert_eq!(f.host.cell(f.world, BlockPos::new(100, 66, 0)), Material::AIR);
        assert_eq!(f.host.anchor_count(f.world), 0);

        assert!(f.manager.shutdown(&mut f.host).is_empty());
        assert!(OverlayManager::new(small_config(), TPS)
            .shutdown(&mut f.host)
            .is_empty());
    }

    #[test]
    fn queries_find_overlays_by_position() {
        let mut f = fixture();
        let a = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        let b = spawn(&mut f, Vec3::new(8.5, 65.0, 0.5));
        let first = create(&mut f, BlockPos::new(0, 64, 0), a, 0);
        let second = create(&mut f, BlockPos::new(8, 64, 0), b, 0);

        // Overlapping disks: creation order wins.
        let at = |f: &Fixture, pos: BlockPos| f.manager.overlay_at(f.world, pos).map(Overlay::id);
        assert_eq!(at(&f, BlockPos::new(4, 10, 0)), Some(first));
        assert_eq!(at(&f, BlockPos::new(13, 64, 0)), Some(second));
        assert!(f.manager.overlay_at(f.world, BlockPos::new(40, 64, 0)).is_none());

        let statuses = f.manager.statuses(f.world, 20);
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses.first().unwrap().remaining_ticks, 80);
    }

    #[test]
    fn orphan_anchors_are_reaped() {
        let mut f = fixture();
        let agent = spawn(&mut f, Vec3::new(0.5, 65.0, 0.5));
        create(&mut f, BlockPos::new(0, 64, 0), agent, 0);
        f.host.spawn_anchor(
            f.world,
            Vec3::new(50.0, 66.0, 50.0),
            AnchorPayload {
                overlay: OverlayId::new(),
                display_item: ItemStack::new("mirror_shard", 1),
            },
        );
        assert_eq!(f.manager.reap_orphan_anchors(&mut f.host, f.world), 1);
        assert_eq!(f.host.anchor_count(f.world), 1);
    }
}
