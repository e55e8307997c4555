//! Error types for overlay creation.

use mirror_types::{AgentId, BlockPos, OverlayId, WorldId};

/// Reasons an overlay could not be created.
///
/// None of these leave partial state behind: the check happens before any
/// cell or inventory is captured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    /// The world already holds the maximum number of active overlays.
    #[error("world {world} already has {limit} active overlays")]
    QuotaExceeded {
        /// World that is full.
        world: WorldId,
        /// Configured per-world maximum.
        limit: u32,
    },

    /// The triggering agent is already enrolled in an overlay.
    #[error("agent {agent} is already enrolled in overlay {overlay}")]
    AlreadyEnrolled {
        /// The agent that tried to activate.
        agent: AgentId,
        /// Overlay it is enrolled in.
        overlay: OverlayId,
    },

    /// The triggering agent is not present in the agent store.
    #[error("agent {0} is not present")]
    AgentUnavailable(AgentId),

    /// The host does not know the requested world.
    #[error("world {0} is not known to the host")]
    UnknownWorld(WorldId),

    /// The center is so far outside the world's vertical extent that the
    /// region would contain no layers.
    #[error("center {center} lies outside the vertical extent of world {world}")]
    CenterOutOfBounds {
        /// World the overlay was requested in.
        world: WorldId,
        /// Requested center.
        center: BlockPos,
    },
}
