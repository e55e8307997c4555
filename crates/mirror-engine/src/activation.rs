//! Activating an overlay from an agent's inventory.
//!
//! Activation costs one activator item. The item is taken out of the
//! agent's inventory before the overlay captures anything, so it is never
//! part of the agent's snapshot and is not handed back when the overlay
//! collapses. If creation is refused the item is returned to its slot.

use tracing::info;

use mirror_core::{OverlayError, OverlayManager, OverlayRequest};
use mirror_types::{AgentId, BlockPos, ItemStack, OverlayId, OverlayNotice};
use mirror_world::WorldHost;

/// Item consumed to activate an overlay.
pub const ACTIVATOR_ITEM: &str = "mirror_shard";

/// Result of one activation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// An overlay was created around the agent.
    Activated(OverlayId),
    /// The agent carries no activator.
    NoActivator,
    /// Creation was refused; the activator was refunded.
    Refused(OverlayError),
}

/// Spend one activator from `agent`'s inventory to create an overlay
/// centered on the agent's cell.
pub fn try_activate<H: WorldHost + ?Sized>(
    host: &mut H,
    manager: &mut OverlayManager,
    agent: AgentId,
    now: u64,
) -> ActivationOutcome {
    let Some(location) = host.agent_location(agent) else {
        return ActivationOutcome::Refused(OverlayError::AgentUnavailable(agent));
    };
    let Some((slot, stack)) = find_activator(&*host, agent) else {
        return ActivationOutcome::NoActivator;
    };

    let remaining = stack.decremented().unwrap_or_else(|| ItemStack::new(ACTIVATOR_ITEM, 0));
    host.set_inventory_slot(agent, slot, remaining);

    let request = OverlayRequest {
        world: location.world,
        center: BlockPos::containing(location.position),
        trigger: agent,
        display_item: ItemStack::new(ACTIVATOR_ITEM, 1),
    };

    match manager.create_overlay(host, request, now) {
        Ok(overlay) => {
            host.notify_agent(
                agent,
                OverlayNotice::Activated {
                    duration_seconds: manager.duration_seconds(),
                },
            );
            info!(agent = %agent, overlay = %overlay, tick = now, "Activator consumed");
            ActivationOutcome::Activated(overlay)
        }
        Err(err) => {
            host.set_inventory_slot(agent, slot, stack);
            match &err {
                OverlayError::QuotaExceeded { limit, .. } => {
                    host.notify_agent(agent, OverlayNotice::QuotaReached { limit: *limit });
                }
                OverlayError::AlreadyEnrolled { .. } => {
                    host.notify_agent(agent, OverlayNotice::NestedActivation);
                }
                OverlayError::AgentUnavailable(_)
                | OverlayError::UnknownWorld(_)
                | OverlayError::CenterOutOfBounds { .. } => {}
            }
            ActivationOutcome::Refused(err)
        }
    }
}

fn find_activator<H: WorldHost + ?Sized>(host: &H, agent: AgentId) -> Option<(u32, ItemStack)> {
    let capacity = host.inventory_capacity(agent)?;
    (0..capacity).find_map(|slot| {
        host.inventory_slot(agent, slot)
            .filter(|stack| stack.item == ACTIVATOR_ITEM && !stack.is_empty())
            .map(|stack| (slot, stack))
    })
}
