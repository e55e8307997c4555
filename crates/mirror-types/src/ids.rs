//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Overlays, agents, worlds and dynamic objects each get a distinct ID type
//! so the compiler rejects an agent ID where an overlay ID is expected. All
//! IDs use UUID v7 (time-ordered), which keeps overlay IDs sortable by
//! creation time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an active overlay (mirror sandbox).
    OverlayId
}

define_id! {
    /// Unique identifier for an agent with a position and an inventory.
    AgentId
}

define_id! {
    /// Identity of a persistent world. Overlays in different worlds are
    /// fully independent.
    WorldId
}

define_id! {
    /// Handle to a dynamic object (loose item or anchor) in the object registry.
    ObjectId
}
