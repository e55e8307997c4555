//! Shared type definitions for the Mirror world-overlay subsystem.
//!
//! Every crate in the workspace speaks these types: the host world uses
//! them at the collaborator boundary and the overlay core uses them for
//! its own state. Types are exported to `TypeScript` via `ts-rs` for
//! dashboards that render overlay status.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for overlays, agents, worlds, objects
//! - [`geometry`] -- Cell coordinates, vectors, vertical bands, boxes
//! - [`items`] -- Cell materials and inventory item stacks
//! - [`notice`] -- Typed notices delivered to agents
//! - [`status`] -- Serializable overlay status snapshots

pub mod geometry;
pub mod ids;
pub mod items;
pub mod notice;
pub mod status;

// Re-export all public types at crate root for convenience.
pub use geometry::{BlockPos, BoundingBox, Vec3, VerticalBand};
pub use ids::{AgentId, ObjectId, OverlayId, WorldId};
pub use items::{ItemStack, Material};
pub use notice::OverlayNotice;
pub use status::OverlayStatus;
