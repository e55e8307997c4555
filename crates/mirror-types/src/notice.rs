//! Notices delivered to agents through the agent store.
//!
//! The overlay core never formats user-facing text itself. It hands a
//! typed [`OverlayNotice`] to the host, which may render it however it
//! likes; the [`Display`](core::fmt::Display) impl gives a plain default.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Something an agent should be told about its overlay membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum OverlayNotice {
    /// The agent's inventory was captured on enrollment.
    InventoryRecorded,
    /// The agent walked into an active overlay after it was created.
    Entered {
        /// Whole seconds until the overlay collapses.
        remaining_seconds: u64,
    },
    /// The agent left the overlay and its inventory was rolled back.
    LeftRestored,
    /// The overlay collapsed and the agent's inventory was rolled back.
    CollapsedRestored,
    /// The overlay is about to collapse.
    Countdown {
        /// Whole seconds until the overlay collapses.
        remaining_seconds: u64,
    },
    /// An overlay was activated by this agent.
    Activated {
        /// Lifetime of the new overlay in seconds.
        duration_seconds: u64,
    },
    /// Activation was refused because the world has reached its overlay quota.
    QuotaReached {
        /// Maximum overlays allowed per world.
        limit: u32,
    },
    /// Activation was refused because the agent is already inside an overlay.
    NestedActivation,
}

impl core::fmt::Display for OverlayNotice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InventoryRecorded => f.write_str("[Mirror] Inventory recorded"),
            Self::Entered { remaining_seconds } => {
                write!(f, "[Mirror] Entered mirror world - {remaining_seconds}s remaining")
            }
            Self::LeftRestored => f.write_str("[Mirror] Left mirror zone - inventory restored"),
            Self::CollapsedRestored => {
                f.write_str("[Mirror] Mirror collapsed - inventory restored")
            }
            Self::Countdown { remaining_seconds } => {
                write!(f, "[Mirror] {remaining_seconds}s until collapse!")
            }
            Self::Activated { duration_seconds } => {
                write!(f, "[Mirror] Mirror world activated! Duration: {duration_seconds} seconds")
            }
            Self::QuotaReached { limit } => write!(
                f,
                "[Mirror] Maximum mirror worlds reached ({limit}). Wait for one to expire."
            ),
            Self::NestedActivation => {
                f.write_str("[Mirror] Cannot create a mirror world inside another mirror world!")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn countdown_renders_seconds() {
        let notice = OverlayNotice::Countdown {
            remaining_seconds: 10,
        };
        assert_eq!(notice.to_string(), "[Mirror] 10s until collapse!");
    }

    #[test]
    fn notice_serializes_with_kind_tag() {
        let json = serde_json::to_value(OverlayNotice::Entered {
            remaining_seconds: 42,
        })
        .unwrap();
        assert_eq!(json["kind"], "entered");
        assert_eq!(json["remaining_seconds"], 42);
    }
}
