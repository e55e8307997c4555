//! Host simulation binary for the Mirror world-overlay subsystem.
//!
//! Wires the overlay manager into a fixed-rate tick loop over an in-memory
//! world populated by scripted agents. It loads configuration, builds the
//! scenario, and runs until the configured tick limit or Ctrl-C, then
//! force-restores every overlay still active.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `mirror-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the simulation clock from the time config
//! 4. Build the scenario world and spawn its agents
//! 5. Run the tick loop: agents act, objects move, overlays tick
//! 6. Shut the overlay manager down and log the result

mod activation;
mod error;
mod scenario;

use std::path::Path;
use std::time::Duration;

use mirror_core::{MirrorConfig, OverlayManager, OverlayTickSummary, SimClock};
use mirror_world::InMemoryWorld;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::scenario::{Scenario, ScenarioConfig};

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "mirror-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the scenario cannot be
/// built, or the clock overflows.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let loaded = load_config()?;
    let from_file = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("mirror-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    config.validate()?;
    info!(
        max_per_world = config.overlay.max_per_world,
        duration_ticks = config.overlay.duration_ticks,
        radius = config.overlay.radius,
        vertical_half_height = config.overlay.vertical_half_height,
        ticks_per_second = config.time.ticks_per_second,
        tick_interval_ms = config.time.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Create simulation clock.
    let mut clock = SimClock::new(&config.time)?;

    // 4. Build the scenario.
    let mut host = InMemoryWorld::new();
    let mut scenario = Scenario::setup(load_scenario_config()?, &mut host)?;
    let max_ticks = scenario.config().max_ticks;
    let mut manager = OverlayManager::from_config(&config);

    // 5. Tick loop.
    let mut interval = tokio::time::interval(Duration::from_millis(config.time.tick_interval_ms));
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    info!(
        max_ticks,
        agents = scenario.agents().len(),
        "Entering tick loop"
    );
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut interrupt => {
                if let Err(err) = result {
                    warn!(error = %err, "Failed to listen for Ctrl-C");
                }
                info!(tick = clock.tick(), "Interrupt received");
                break;
            }
        }

        let now = clock.advance()?;
        let stats = scenario.step(&mut host, &mut manager, now)?;
        if stats.activations > 0 || stats.refusals > 0 {
            debug!(
                tick = now,
                activations = stats.activations,
                refusals = stats.refusals,
                "Activation attempts"
            );
        }

        host.step_objects();
        for world in manager.active_worlds() {
            let summary = manager.tick(&mut host, world, now);
            log_summary(&summary);
        }

        if now.checked_rem(clock.ticks_per_second()) == Some(0) {
            report_status(&mut host, &manager, &scenario, now);
        }

        if now >= max_ticks {
            info!(tick = now, "Tick limit reached");
            break;
        }
    }

    // 6. Shut down.
    let reports = manager.shutdown(&mut host);
    info!(
        overlays_restored = reports.len(),
        total_ticks = clock.tick(),
        elapsed_seconds = clock.elapsed_seconds(),
        "mirror-engine shutdown complete"
    );

    Ok(())
}

/// Log the parts of a tick summary worth seeing.
fn log_summary(summary: &OverlayTickSummary) {
    if summary.is_quiet() {
        return;
    }
    info!(
        tick = summary.tick,
        world = %summary.world,
        overlays = summary.overlays_processed,
        restored = summary.restored.len(),
        enrolled = summary.enrolled.len(),
        departed = summary.departed.len(),
        items_contained = summary.items_contained,
        countdown_notices = summary.countdown_notices,
        "Overlay tick"
    );
}

/// Once per second: reap stray anchors and dump overlay status.
fn report_status(
    host: &mut InMemoryWorld,
    manager: &OverlayManager,
    scenario: &Scenario,
    now: u64,
) {
    let world = scenario.world();
    let reaped = manager.reap_orphan_anchors(host, world);
    if reaped > 0 {
        warn!(world = %world, reaped, "Orphan anchors discarded");
    }

    let statuses = manager.statuses(world, now);
    if statuses.is_empty() {
        return;
    }
    match serde_json::to_string(&statuses) {
        Ok(json) => debug!(tick = now, overlays = statuses.len(), status = %json, "Overlay status"),
        Err(err) => warn!(error = %err, "Failed to serialize overlay status"),
    }
}

/// Load the Mirror configuration from `mirror-config.yaml`.
///
/// Returns `None` when the file does not exist.
fn load_config() -> Result<Option<MirrorConfig>, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = MirrorConfig::from_file(config_path)?;
        Ok(Some(config))
    } else {
        Ok(None)
    }
}

/// Load scenario configuration from `mirror-config.yaml`.
///
/// Reads the `scenario` section from the YAML config file. If the file
/// does not exist or lacks the `scenario` key, defaults are used.
fn load_scenario_config() -> Result<ScenarioConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(ScenarioConfig::default());
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Scenario {
        message: format!("failed to read config file: {e}"),
    })?;

    // Parse the full YAML and extract just the "scenario" section.
    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| EngineError::Scenario {
        message: format!("failed to parse config YAML: {e}"),
    })?;

    raw.get("scenario").map_or_else(
        || Ok(ScenarioConfig::default()),
        |section| {
            serde_yml::from_value(section.clone()).map_err(|e| EngineError::Scenario {
                message: format!("failed to parse scenario config: {e}"),
            })
        },
    )
}
