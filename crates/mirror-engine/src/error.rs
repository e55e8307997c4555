//! Error types for the Mirror engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the tick loop.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: mirror_core::ConfigError,
    },

    /// Simulation clock failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: mirror_core::ClockError,
    },

    /// Host world setup or mutation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: mirror_world::WorldError,
    },

    /// Scenario configuration could not be loaded or is unusable.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the scenario failure.
        message: String,
    },
}
