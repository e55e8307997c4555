//! Configuration loading and typed config structures for the Mirror
//! subsystem.
//!
//! The canonical configuration lives in `mirror-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields the standard overlay behaviour: five overlays per world, sixty
//! second lifetime, radius 50, thirty layers above and below the center.

use std::path::Path;

use serde::Deserialize;

use mirror_types::Vec3;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Mirror configuration.
///
/// Mirrors the structure of `mirror-config.yaml`. Sections not consumed by
/// the overlay core (such as the engine's `scenario`) are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MirrorConfig {
    /// Overlay sizing, lifetime and containment settings.
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Tick rate settings.
    #[serde(default)]
    pub time: TimeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MirrorConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check every section for values the subsystem cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.overlay.validate()?;
        self.time.validate()
    }
}

/// Overlay sizing, lifetime and containment settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlayConfig {
    /// Maximum simultaneously active overlays in one world.
    #[serde(default = "default_max_per_world")]
    pub max_per_world: u32,

    /// Overlay lifetime in ticks.
    #[serde(default = "default_duration_ticks")]
    pub duration_ticks: u64,

    /// Horizontal radius of the overlay region in cells.
    #[serde(default = "default_radius")]
    pub radius: u32,

    /// Layers captured above and below the center.
    #[serde(default = "default_vertical_half_height")]
    pub vertical_half_height: u32,

    /// Extra horizontal margin scanned around the region for escaping items.
    #[serde(default = "default_boundary_buffer")]
    pub boundary_buffer: f64,

    /// How far inside the rim an escaping item is placed back.
    #[serde(default = "default_containment_inset")]
    pub containment_inset: f64,

    /// Remaining-seconds thresholds at which agents get a countdown notice.
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: Vec<u64>,

    /// Offset from the center cell's corner at which the anchor is spawned.
    #[serde(default = "default_anchor_offset")]
    pub anchor_offset: Vec3,
}

impl OverlayConfig {
    /// Check overlay settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero quota, lifetime or radius,
    /// a negative or non-finite buffer, or an inset not smaller than the
    /// radius.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_per_world == 0 {
            return Err(invalid("overlay.max_per_world", "must be at least 1"));
        }
        if self.duration_ticks == 0 {
            return Err(invalid("overlay.duration_ticks", "must be at least 1"));
        }
        if self.radius == 0 {
            return Err(invalid("overlay.radius", "must be at least 1"));
        }
        if !self.boundary_buffer.is_finite() || self.boundary_buffer < 0.0 {
            return Err(invalid(
                "overlay.boundary_buffer",
                "must be a finite, non-negative distance",
            ));
        }
        if !self.containment_inset.is_finite()
            || self.containment_inset < 0.0
            || self.containment_inset >= f64::from(self.radius)
        {
            return Err(invalid(
                "overlay.containment_inset",
                "must be non-negative and smaller than the radius",
            ));
        }
        Ok(())
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_per_world: default_max_per_world(),
            duration_ticks: default_duration_ticks(),
            radius: default_radius(),
            vertical_half_height: default_vertical_half_height(),
            boundary_buffer: default_boundary_buffer(),
            containment_inset: default_containment_inset(),
            countdown_seconds: default_countdown_seconds(),
            anchor_offset: default_anchor_offset(),
        }
    }
}

/// Tick rate settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Simulation ticks per second of overlay lifetime.
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u64,

    /// Real-time milliseconds between ticks in the engine loop.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl TimeConfig {
    /// Check tick rate settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either value is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(invalid("time.ticks_per_second", "must be at least 1"));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("time.tick_interval_ms", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: default_ticks_per_second(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_max_per_world() -> u32 {
    5
}

const fn default_duration_ticks() -> u64 {
    1200
}

const fn default_radius() -> u32 {
    50
}

const fn default_vertical_half_height() -> u32 {
    30
}

const fn default_boundary_buffer() -> f64 {
    5.0
}

const fn default_containment_inset() -> f64 {
    2.0
}

fn default_countdown_seconds() -> Vec<u64> {
    vec![30, 10, 5]
}

const fn default_anchor_offset() -> Vec3 {
    Vec3::new(0.5, 2.0, 0.5)
}

const fn default_ticks_per_second() -> u64 {
    20
}

const fn default_tick_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MirrorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.overlay.max_per_world, 5);
        assert_eq!(config.overlay.duration_ticks, 1200);
        assert_eq!(config.overlay.radius, 50);
        assert_eq!(config.overlay.vertical_half_height, 30);
        assert_eq!(config.overlay.countdown_seconds, vec![30, 10, 5]);
        assert_eq!(config.time.ticks_per_second, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
overlay:
  max_per_world: 2
  duration_ticks: 400
  radius: 12
  vertical_half_height: 4
  boundary_buffer: 3.0
  containment_inset: 1.5
  countdown_seconds: [10, 3]
  anchor_offset: { x: 0.5, y: 1.0, z: 0.5 }

time:
  ticks_per_second: 10
  tick_interval_ms: 100

logging:
  level: debug

scenario:
  seed: 9
";
        let config = MirrorConfig::parse(yaml).unwrap();
        assert_eq!(config.overlay.max_per_world, 2);
        assert_eq!(config.overlay.duration_ticks, 400);
        assert_eq!(config.overlay.radius, 12);
        assert_eq!(config.overlay.countdown_seconds, vec![10, 3]);
        assert_eq!(config.overlay.anchor_offset, Vec3::new(0.5, 1.0, 0.5));
        assert_eq!(config.time.ticks_per_second, 10);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = MirrorConfig::parse("overlay:\n  radius: 8\n").unwrap();
        assert_eq!(config.overlay.radius, 8);
        assert_eq!(config.overlay.max_per_world, 5);
        assert_eq!(config.time, TimeConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = MirrorConfig::parse("").unwrap();
        assert_eq!(config, MirrorConfig::default());
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        let result = MirrorConfig::parse("overlay: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn validate_rejects_zero_quota() {
        let mut config = MirrorConfig::default();
        config.overlay.max_per_world = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "overlay.max_per_world",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_inset_beyond_radius() {
        let mut config = MirrorConfig::default();
        config.overlay.radius = 2;
        config.overlay.containment_inset = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_tick_rate() {
        let mut config = MirrorConfig::default();
        config.time.ticks_per_second = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("mirror-config.yaml");
        if path.exists() {
            let config = MirrorConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
