//! Collaborator boundaries and an in-memory host world for the Mirror
//! world-overlay subsystem.
//!
//! The overlay core does not own terrain, agents or dynamic objects. This
//! crate defines the traits through which it reaches them and ships a
//! complete in-memory host used by the engine binary and by tests.
//!
//! # Modules
//!
//! - [`error`] -- Error types for host-world setup ([`WorldError`]).
//! - [`memory`] -- [`InMemoryWorld`], a host implementing every store.
//! - [`store`] -- [`VoxelStore`], [`AgentStore`], [`ObjectRegistry`] and the
//!   combined [`WorldHost`] bound.
//! - [`terrain`] -- Procedural base terrain for the in-memory host.

pub mod error;
pub mod memory;
pub mod store;
pub mod terrain;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use memory::{AgentRecord, InMemoryWorld, ObjectKind, ObjectRecord};
pub use store::{
    AgentLocation, AgentStore, AnchorPayload, ObjectRegistry, VoxelStore, WorldHost,
};
pub use terrain::Terrain;
