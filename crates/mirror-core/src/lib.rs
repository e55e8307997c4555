//! Core of the Mirror world-overlay subsystem.
//!
//! An overlay turns a cylindrical region of a persistent voxel world into
//! a temporary sandbox. On creation the region's cells and the inventories
//! of the agents inside are captured. For the overlay's lifetime agents
//! may build, break and trade freely. When it expires (or the server shuts
//! down) everything is rolled back: built cells vanish, broken cells
//! return, loose items in the region are discarded and every enrolled
//! agent gets its recorded inventory back. Agents who walk out early are
//! rolled back on the spot, and items thrown across the rim are pulled
//! back inside.
//!
//! # Modules
//!
//! - [`agent_snapshot`] -- Per-agent inventory snapshots.
//! - [`boundary`] -- Rim containment for loose items ([`BoundaryGuard`]).
//! - [`cell_snapshot`] -- Sparse cell capture and two-pass restoration.
//! - [`clock`] -- Discrete simulation clock ([`SimClock`]).
//! - [`config`] -- YAML configuration ([`MirrorConfig`]).
//! - [`error`] -- Overlay creation errors ([`OverlayError`]).
//! - [`manager`] -- Registry, quota, creation and tick loop
//!   ([`OverlayManager`]).
//! - [`membership`] -- Enrollment and per-tick membership reconciliation.
//! - [`overlay`] -- The [`Overlay`] aggregate and its rollback.
//! - [`region`] -- Cylindrical [`Region`] geometry.

pub mod agent_snapshot;
pub mod boundary;
pub mod cell_snapshot;
pub mod clock;
pub mod config;
pub mod error;
pub mod manager;
pub mod membership;
pub mod overlay;
pub mod region;

// Re-export primary types at crate root.
pub use agent_snapshot::{AgentSnapshot, AgentSnapshotStore};
pub use boundary::BoundaryGuard;
pub use cell_snapshot::{CellRestoreStats, CellSnapshot};
pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, LoggingConfig, MirrorConfig, OverlayConfig, TimeConfig};
pub use error::OverlayError;
pub use manager::{OverlayManager, OverlayRequest, OverlayTickSummary};
pub use membership::{Enrollments, MembershipChanges, enroll_agent, reconcile_membership};
pub use overlay::{AnchorHandle, Overlay, OverlayPhase, RestoreReport};
pub use region::Region;
