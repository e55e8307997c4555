//! Discrete simulation clock.
//!
//! Every duration in the overlay subsystem is measured in ticks. The clock
//! counts ticks with checked arithmetic and converts tick spans into whole
//! seconds for agent-facing notices.

use crate::config::TimeConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration (e.g. zero ticks per second).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Fixed-rate simulation clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    /// Current tick number (0 before the first advance).
    tick: u64,

    /// Simulation ticks per real-time second.
    ticks_per_second: u64,
}

impl SimClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ticks_per_second` is 0.
    pub fn new(config: &TimeConfig) -> Result<Self, ClockError> {
        Self::from_parts(0, config.ticks_per_second)
    }

    /// Create a clock at an explicit tick (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ticks_per_second` is 0.
    pub fn from_parts(tick: u64, ticks_per_second: u64) -> Result<Self, ClockError> {
        if ticks_per_second == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "ticks_per_second must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick,
            ticks_per_second,
        })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the configured ticks per second.
    pub const fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }

    /// Whole seconds elapsed since tick 0.
    pub const fn elapsed_seconds(&self) -> u64 {
        whole_seconds(self.tick, self.ticks_per_second)
    }
}

/// Convert a tick span into whole seconds, rounding down.
///
/// Returns 0 when `ticks_per_second` is 0.
pub const fn whole_seconds(ticks: u64, ticks_per_second: u64) -> u64 {
    match ticks.checked_div(ticks_per_second) {
        Some(seconds) => seconds,
        None => 0,
    }
}
