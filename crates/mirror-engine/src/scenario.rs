//! Scripted agents driving the overlay subsystem.
//!
//! The engine has no real players. Instead a seeded scenario spawns agents
//! on a flat world and, every tick, walks them around at random. Agents
//! outside any overlay occasionally spend an activator; agents inside one
//! build, dig, pick up loot and throw items, which is exactly the activity
//! an overlay must roll back.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info};

use mirror_core::OverlayManager;
use mirror_types::{AgentId, BlockPos, ItemStack, Material, Vec3, VerticalBand, WorldId};
use mirror_world::{InMemoryWorld, Terrain, VoxelStore};

use crate::activation::{ACTIVATOR_ITEM, ActivationOutcome, try_activate};
use crate::error::EngineError;

/// Vertical extent of the scenario world.
const WORLD_EXTENT: VerticalBand = VerticalBand::new(-64, 319);

/// Height agents walk at (one above the default terrain surface).
const WALK_Y: f64 = 65.0;

/// Slots every spawned agent starts with filled.
const STARTING_SLOTS: u32 = 3;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Scenario settings, loaded from the `scenario` section of
/// `mirror-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// Seed for every random choice the scenario makes.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of agents to spawn.
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,

    /// Stop after this many ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Inventory slots per agent.
    #[serde(default = "default_inventory_slots")]
    pub inventory_slots: u32,

    /// Activators each agent starts with.
    #[serde(default = "default_starting_activators")]
    pub starting_activators: u32,

    /// Half-width of the square agents spawn in.
    #[serde(default = "default_spawn_spread")]
    pub spawn_spread: f64,

    /// Maximum horizontal step per tick on each axis.
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f64,

    /// Per-tick chance that an agent outside any overlay activates one.
    #[serde(default = "default_activation_chance")]
    pub activation_chance: f64,

    /// Per-tick chance that an enrolled agent builds or digs.
    #[serde(default = "default_edit_chance")]
    pub edit_chance: f64,

    /// Per-tick chance that an enrolled agent picks up loot.
    #[serde(default = "default_loot_chance")]
    pub loot_chance: f64,

    /// Per-tick chance that an enrolled agent throws an item.
    #[serde(default = "default_throw_chance")]
    pub throw_chance: f64,
}

impl ScenarioConfig {
    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scenario`] for a chance outside `[0, 1]`, a
    /// negative or non-finite distance, or no free inventory slot beyond
    /// the starting items.
    pub fn validate(&self) -> Result<(), EngineError> {
        let chances = [
            ("activation_chance", self.activation_chance),
            ("edit_chance", self.edit_chance),
            ("loot_chance", self.loot_chance),
            ("throw_chance", self.throw_chance),
        ];
        for (name, chance) in chances {
            if !(0.0..=1.0).contains(&chance) {
                return Err(EngineError::Scenario {
                    message: format!("scenario.{name} must be between 0 and 1, got {chance}"),
                });
            }
        }
        for (name, distance) in [
            ("spawn_spread", self.spawn_spread),
            ("walk_speed", self.walk_speed),
        ] {
            if !distance.is_finite() || distance < 0.0 {
                return Err(EngineError::Scenario {
                    message: format!("scenario.{name} must be a finite, non-negative distance"),
                });
            }
        }
        if self.inventory_slots <= STARTING_SLOTS {
            return Err(EngineError::Scenario {
                message: format!("scenario.inventory_slots must be more than {STARTING_SLOTS}"),
            });
        }
        Ok(())
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            agent_count: default_agent_count(),
            max_ticks: default_max_ticks(),
            inventory_slots: default_inventory_slots(),
            starting_activators: default_starting_activators(),
            spawn_spread: default_spawn_spread(),
            walk_speed: default_walk_speed(),
            activation_chance: default_activation_chance(),
            edit_chance: default_edit_chance(),
            loot_chance: default_loot_chance(),
            throw_chance: default_throw_chance(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_agent_count() -> u32 {
    12
}

const fn default_max_ticks() -> u64 {
    3600
}

const fn default_inventory_slots() -> u32 {
    41
}

const fn default_starting_activators() -> u32 {
    2
}

const fn default_spawn_spread() -> f64 {
    150.0
}

const fn default_walk_speed() -> f64 {
    0.3
}

const fn default_activation_chance() -> f64 {
    0.002
}

const fn default_edit_chance() -> f64 {
    0.05
}

const fn default_loot_chance() -> f64 {
    0.01
}

const fn default_throw_chance() -> f64 {
    0.02
}

// -----------------------------------------------------------------------
// Scenario
// -----------------------------------------------------------------------

/// What the scripted agents did during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Overlays activated.
    pub activations: u32,
    /// Activation attempts refused.
    pub refusals: u32,
    /// Cells built or dug.
    pub cells_edited: u32,
    /// Loot items picked up.
    pub loot_picked: u32,
    /// Items thrown.
    pub items_thrown: u32,
}

/// A seeded population of scripted agents in one world.
#[derive(Debug)]
pub struct Scenario {
    config: ScenarioConfig,
    rng: StdRng,
    world: WorldId,
    agents: Vec<AgentId>,
}

impl Scenario {
    /// Create the scenario world in `host` and spawn its agents.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scenario`] for an invalid config and
    /// [`EngineError::World`] if the host rejects the world or an agent.
    pub fn setup(config: ScenarioConfig, host: &mut InMemoryWorld) -> Result<Self, EngineError> {
        config.validate()?;

        let world = WorldId::new();
        host.add_world(world, WORLD_EXTENT, Terrain::default())?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let capacity = usize::try_from(config.agent_count).unwrap_or(0);
        let mut agents = Vec::with_capacity(capacity);
        let spread = config.spawn_spread;

        for _ in 0..config.agent_count {
            let agent = AgentId::new();
            let position = Vec3::new(
                rng.random_range(-spread..=spread),
                WALK_Y,
                rng.random_range(-spread..=spread),
            );
            host.add_agent(agent, world, position, config.inventory_slots)?;
            host.give(
                agent,
                0,
                ItemStack::new(ACTIVATOR_ITEM, config.starting_activators),
            )?;
            host.give(agent, 1, ItemStack::new("bread", 16))?;
            host.give(agent, 2, ItemStack::new("planks", 64))?;
            agents.push(agent);
        }

        info!(
            world = %world,
            agents = agents.len(),
            seed = config.seed,
            "Scenario world created"
        );

        Ok(Self {
            config,
            rng,
            world,
            agents,
        })
    }

    /// The scenario's world.
    pub const fn world(&self) -> WorldId {
        self.world
    }

    /// Spawned agents.
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Scenario settings.
    pub const fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Let every agent act once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] if the host rejects a move or an
    /// item drop.
    pub fn step(
        &mut self,
        host: &mut InMemoryWorld,
        manager: &mut OverlayManager,
        now: u64,
    ) -> Result<StepStats, EngineError> {
        let mut stats = StepStats::default();
        let agents = self.agents.clone();

        for agent in agents {
            let Some(record) = host.agent(agent) else {
                continue;
            };
            let position = self.wander(record.position);
            host.move_agent(agent, self.world, position)?;

            if manager.is_agent_enrolled(agent) {
                if self.rng.random_bool(self.config.edit_chance) {
                    self.edit_near(host, position);
                    stats.cells_edited = stats.cells_edited.saturating_add(1);
                }
                if self.rng.random_bool(self.config.loot_chance) {
                    self.pick_up_loot(host, agent)?;
                    stats.loot_picked = stats.loot_picked.saturating_add(1);
                }
                if self.rng.random_bool(self.config.throw_chance) {
                    self.throw_item(host, position)?;
                    stats.items_thrown = stats.items_thrown.saturating_add(1);
                }
            } else if self.rng.random_bool(self.config.activation_chance) {
                match try_activate(host, manager, agent, now) {
                    ActivationOutcome::Activated(overlay) => {
                        debug!(
                            agent = %agent,
                            overlay = %overlay,
                            "Scripted agent opened an overlay"
                        );
                        stats.activations = stats.activations.saturating_add(1);
                    }
                    ActivationOutcome::Refused(reason) => {
                        debug!(agent = %agent, %reason, "Scripted activation refused");
                        stats.refusals = stats.refusals.saturating_add(1);
                    }
                    ActivationOutcome::NoActivator => {}
                }
            }
        }

        Ok(stats)
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn wander(&mut self, from: Vec3) -> Vec3 {
        let speed = self.config.walk_speed;
        let step = Vec3::new(
            self.rng.random_range(-speed..=speed),
            0.0,
            self.rng.random_range(-speed..=speed),
        );
        let next = from.plus(step);
        // Stay within twice the spawn square.
        let limit = self.config.spawn_spread.max(1.0) * 2.0;
        if next.x.abs() > limit || next.z.abs() > limit {
            from
        } else {
            Vec3::new(next.x, WALK_Y, next.z)
        }
    }

    fn edit_near(&mut self, host: &mut InMemoryWorld, position: Vec3) {
        let cell = BlockPos::containing(position);
        let target = BlockPos::new(
            cell.x.saturating_add(self.rng.random_range(-3..=3)),
            cell.y,
            cell.z.saturating_add(self.rng.random_range(-3..=3)),
        );
        if self.rng.random_bool(0.5) {
            host.set_cell(self.world, target, Material::PLANKS);
        } else {
            host.set_cell(self.world, target.above(-1), Material::AIR);
        }
    }

    fn pick_up_loot(
        &mut self,
        host: &mut InMemoryWorld,
        agent: AgentId,
    ) -> Result<(), EngineError> {
        let slot = self
            .rng
            .random_range(STARTING_SLOTS..self.config.inventory_slots);
        let count = self.rng.random_range(1..=8);
        host.give(agent, slot, ItemStack::new("ore", count))?;
        Ok(())
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn throw_item(&mut self, host: &mut InMemoryWorld, from: Vec3) -> Result<(), EngineError> {
        let angle = self.rng.random_range(0.0..core::f64::consts::TAU);
        let speed = self.rng.random_range(0.5..=2.0);
        let velocity = Vec3::new(angle.cos() * speed, 0.0, angle.sin() * speed);
        host.drop_item(
            self.world,
            from.plus(Vec3::new(0.0, 1.0, 0.0)),
            velocity,
            ItemStack::new("cobblestone", 1),
        )?;
        Ok(())
    }
}
