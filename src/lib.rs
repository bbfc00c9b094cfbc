//! # rpitx-producers
//!
//! Sample producers for a DMA-driven RF transmitter.
//!
//! ## Architecture
//!
//! Every producer implements [`BufferProducer`]. The external real-time loop
//! owns the byte buffer and asks a producer to fill it with 16-byte
//! [`RfSample`] records (frequency, hold). Producers are isolated:
//! - They never see the transmit path, only a byte budget
//! - They never block on a lock held by a formatting thread
//! - They log through an RT-safe [`LogStream`], drained off the RT thread
//!
//! Producers:
//! - [`RcSignalGenerator`]: keyed-carrier RC command bursts, live-updatable
//!   through [`RcBroadcast`]
//! - [`AudioRfConverter`]: decoded mono audio as frequency-shift samples
//! - [`SstvEncoder`]: one still image as Martin 1 SSTV tones

pub mod audio;
pub mod config;
pub mod error;
pub mod logging;
pub mod producer;
pub mod rc;
pub mod sample;
pub mod sstv;

pub use audio::{AudioRfConverter, DecodedSource, MemorySource};
pub use config::{AudioConfig, RcParameters, TransmitterConfig};
pub use error::{ConfigError, ProducerError, RcError};
pub use logging::{LogEntry, LogLevel, LogStream};
pub use producer::BufferProducer;
pub use rc::{RcBroadcast, RcSignalGenerator, RcState};
pub use sample::{RfSample, SampleWriter, SAMPLE_SIZE};
pub use sstv::{ImageFrame, SstvEncoder};
