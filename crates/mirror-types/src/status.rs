//! Read-only overlay status snapshots for observers and dashboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geometry::{BlockPos, VerticalBand};
use crate::ids::{AgentId, OverlayId, WorldId};

/// Point-in-time view of one active overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OverlayStatus {
    /// Overlay identifier.
    pub id: OverlayId,
    /// World the overlay belongs to.
    pub world: WorldId,
    /// Center of the overlay's region.
    pub center: BlockPos,
    /// Horizontal radius of the region in cells.
    pub radius: u32,
    /// Vertical extent of the region.
    pub band: VerticalBand,
    /// Simulation tick at which the overlay was created.
    pub started_at_tick: u64,
    /// Simulation tick at which the overlay collapses.
    pub expires_at_tick: u64,
    /// Ticks left before collapse.
    pub remaining_ticks: u64,
    /// Wall-clock time of activation.
    pub activated_at: DateTime<Utc>,
    /// Number of cells captured in the cell snapshot.
    pub captured_cells: u64,
    /// Agents currently tracked by the overlay.
    pub affected_agents: Vec<AgentId>,
}
