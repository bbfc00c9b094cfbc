//! Audio subsystem: decoded mono audio to RF frequency-shift samples
//!
//! Architecture:
//! - Source: caller-supplied decoded samples behind `DecodedSource`
//! - Converter: read-ahead batch, one source read per drained batch
//! - Restartable: `reset()` rewinds the source without reopening it

pub mod converter;
pub mod source;

pub use converter::{carrier_offset, hold_for_rate, AudioRfConverter, EXCURSION};
pub use source::{DecodedSource, MemorySource};
