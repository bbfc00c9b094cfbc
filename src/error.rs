//! Error types for the buffer producers and their control surfaces.
//!
//! End of stream is not an error: producers signal it with `Ok(0)` from
//! [`fill`](crate::producer::BufferProducer::fill).

use thiserror::Error;

/// Errors returned by [`BufferProducer`](crate::producer::BufferProducer) operations.
#[derive(Debug, Error)]
pub enum ProducerError {
    /// The byte budget cannot hold the next complete unit and nothing was written.
    #[error("byte budget of {budget} bytes cannot hold the next {needed}-byte unit")]
    BudgetTooSmall { needed: usize, budget: usize },

    /// The producer has no restart point.
    #[error("reset is not supported by this producer")]
    ResetUnsupported,

    /// The decoded source reports a sample rate that gives no usable hold time.
    #[error("unsupported sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Image buffer does not match the fixed scan geometry.
    #[error("image must be {expected} bytes, got {actual}")]
    InvalidImage { expected: usize, actual: usize },

    /// The producer was configured with values `validate()` rejects.
    #[error("invalid producer configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The underlying decode read failed.
    #[error("audio source error: {0}")]
    Source(#[from] std::io::Error),
}

/// Usage errors on the RC generator control surface.
#[derive(Debug, Error)]
pub enum RcError {
    /// `initialize` has not been called, or the broadcast was stopped.
    #[error("RC broadcast not initialized")]
    NotInitialized,

    /// `initialize` called again without an intervening `stop`.
    #[error("RC broadcast already initialized")]
    AlreadyInitialized,

    /// A real-time producer is already attached to this broadcast.
    #[error("RC broadcast already has a running producer")]
    AlreadyRunning,

    /// The staged parameter set was rejected.
    #[error("invalid RC parameters: {0}")]
    InvalidParameters(#[from] ConfigError),
}

/// Configuration validation and loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range.
    #[error("{field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    /// Malformed JSON.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config file could not be read or written.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { field, reason }
    }
}
