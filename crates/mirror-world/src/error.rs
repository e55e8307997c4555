//! Error types for the `mirror-world` crate.
//!
//! The collaborator traits in [`store`](crate::store) are infallible by
//! contract: a missing agent or object is reported as `None`/`false`. The
//! errors here come from setting up and scripting the in-memory host world.

use mirror_types::{AgentId, WorldId};

/// Errors that can occur while building or scripting an [`InMemoryWorld`].
///
/// [`InMemoryWorld`]: crate::memory::InMemoryWorld
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The world is not registered with the host.
    #[error("world not found: {0}")]
    WorldNotFound(WorldId),

    /// A world with this identity was already registered.
    #[error("duplicate world id: {0}")]
    DuplicateWorld(WorldId),

    /// The agent is not present in the host.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An agent with this identity was already added.
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(AgentId),

    /// The slot index lies beyond the agent's inventory capacity.
    #[error("slot {slot} out of range for agent {agent} (capacity {capacity})")]
    SlotOutOfRange {
        /// The agent whose inventory was addressed.
        agent: AgentId,
        /// The requested slot index.
        slot: u32,
        /// The agent's slot count.
        capacity: u32,
    },
}
