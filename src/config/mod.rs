//! Module: config
//!
//! Purpose: Parameter sets for the buffer producers.
//!
//! Architecture:
//! - `RcParameters`: the value object swapped atomically by the RC generator
//! - `AudioConfig`: read-ahead sizing for the audio converter
//! - `TransmitterConfig`: both, loadable from JSON (see [`file`])
//! - Every struct is `#[serde(default)]`: partial documents fill from defaults
//!
//! Safety: Safe. Plain `Copy` data; validation is explicit via `validate()`.

pub mod file;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default carrier, middle of the FM band to minimize potential interference (MHz).
pub const DEFAULT_RC_FREQUENCY_MHZ: f64 = 100.1;

/// Default read-ahead batch, in decoded samples.
pub const DEFAULT_READ_AHEAD: usize = 1024;

/// Broadcast parameters for the RC command signal.
///
/// All durations are integer multiples of `burst_us`. The synchronization
/// phase sends `synchronization_burst_count` bursts of
/// `burst_us × synchronization_multiple`, each followed by a `burst_us` gap.
/// The signal phase sends `burst_count` bursts of `burst_us`, each followed by
/// a `burst_us` gap. The burst count is the command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcParameters {
    /// Carrier frequency for bursts (MHz).
    pub frequency: f64,

    /// Inert frequency broadcast during gaps (MHz).
    pub dead_frequency: f64,

    /// Base time unit.
    pub burst_us: u32,

    /// Number of synchronization bursts per cycle.
    pub synchronization_burst_count: u32,

    /// Synchronization burst length, in multiples of `burst_us`.
    pub synchronization_multiple: u32,

    /// Number of signal bursts per cycle (the command).
    pub burst_count: u32,
}

impl Default for RcParameters {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_RC_FREQUENCY_MHZ,
            dead_frequency: DEFAULT_RC_FREQUENCY_MHZ,
            burst_us: 1000,
            synchronization_burst_count: 4,
            synchronization_multiple: 3,
            burst_count: 50,
        }
    }
}

impl RcParameters {
    /// Defaults with a different command.
    pub fn with_burst_count(burst_count: u32) -> Self {
        Self {
            burst_count,
            ..Default::default()
        }
    }

    /// Hold of one synchronization burst.
    ///
    /// Saturates on overflow; `validate()` rejects such sets.
    #[inline]
    pub fn synchronization_hold(&self) -> u32 {
        self.burst_us.saturating_mul(self.synchronization_multiple)
    }

    /// Samples in one full command cycle (bursts and gaps).
    pub fn samples_per_cycle(&self) -> u64 {
        2 * (u64::from(self.synchronization_burst_count) + u64::from(self.burst_count))
    }

    /// Reject sets that would produce degenerate signals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_frequency("frequency", self.frequency)?;
        check_frequency("dead_frequency", self.dead_frequency)?;
        check_non_zero("burst_us", self.burst_us)?;
        check_non_zero("synchronization_burst_count", self.synchronization_burst_count)?;
        check_non_zero("synchronization_multiple", self.synchronization_multiple)?;
        check_non_zero("burst_count", self.burst_count)?;

        if self.burst_us.checked_mul(self.synchronization_multiple).is_none() {
            return Err(ConfigError::invalid(
                "synchronization_multiple",
                "synchronization burst overflows the hold field",
            ));
        }
        Ok(())
    }
}

fn check_frequency(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::invalid(field, "must be a positive finite frequency"));
    }
    Ok(())
}

fn check_non_zero(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::invalid(field, "must be non-zero"));
    }
    Ok(())
}

/// Audio converter sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Capacity of the read-ahead batch, in decoded samples.
    pub read_ahead: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            read_ahead: DEFAULT_READ_AHEAD,
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_ahead == 0 {
            return Err(ConfigError::invalid("read_ahead", "must be non-zero"));
        }
        Ok(())
    }
}

/// Complete transmitter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmitterConfig {
    pub rc: RcParameters,
    pub audio: AudioConfig,
}

impl TransmitterConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rc.validate()?;
        self.audio.validate()
    }
}
