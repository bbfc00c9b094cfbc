//! Audio-to-RF frequency-shift converter
//!
//! Maps each decoded audio sample to one RF sample whose frequency is the
//! carrier offset for that amplitude, held for one audio sample period.
//!
//! Decode and fill are interleaved: the converter keeps one read-ahead batch
//! and issues exactly one source read each time the batch runs dry.

use std::io;
use std::sync::Arc;

use super::source::DecodedSource;
use crate::config::AudioConfig;
use crate::error::ProducerError;
use crate::logging::LogStream;
use crate::producer::BufferProducer;
use crate::sample::{RfSample, SampleWriter, SAMPLE_SIZE};
use crate::{rt_debug, rt_info, rt_warn};

/// Peak frequency deviation for a full-scale sample.
pub const EXCURSION: f32 = 6000.0;

/// Carrier offset for an audio sample in `[-1.0, 1.0]`.
#[inline]
pub fn carrier_offset(x: f32) -> f64 {
    f64::from(x * EXCURSION) * 2.0
}

/// Hold per output sample for a source sample rate: one period in nanoseconds.
pub fn hold_for_rate(sample_rate: u32) -> Result<u32, ProducerError> {
    if sample_rate == 0 || sample_rate > 1_000_000_000 {
        return Err(ProducerError::InvalidSampleRate(sample_rate));
    }
    Ok((1e9 / f64::from(sample_rate)) as u32)
}

/// Streams a [`DecodedSource`] as RF frequency-shift samples.
pub struct AudioRfConverter<S> {
    source: S,
    hold: u32,

    // Read-ahead batch: samples [offset, filled) are decoded but not yet emitted
    batch: Vec<f32>,
    offset: usize,
    filled: usize,

    exhausted: bool,
    // Read failure hit after samples were already written; reported next call
    deferred: Option<io::Error>,
    emitted: u64,
    log: Arc<LogStream>,
}

impl<S: DecodedSource> AudioRfConverter<S> {
    /// Create with the default read-ahead size.
    pub fn new(source: S) -> Result<Self, ProducerError> {
        Self::with_config(source, &AudioConfig::default())
    }

    /// Create with an explicit read-ahead size.
    pub fn with_config(source: S, config: &AudioConfig) -> Result<Self, ProducerError> {
        config.validate()?;
        let hold = hold_for_rate(source.sample_rate())?;
        log::debug!(
            "audio converter: {} Hz source, hold {} per sample, read-ahead {}",
            source.sample_rate(),
            hold,
            config.read_ahead
        );
        Ok(Self {
            source,
            hold,
            batch: vec![0.0; config.read_ahead],
            offset: 0,
            filled: 0,
            exhausted: false,
            deferred: None,
            emitted: 0,
            log: Arc::new(LogStream::new()),
        })
    }

    /// Hold applied to every output sample.
    #[inline]
    pub fn hold(&self) -> u32 {
        self.hold
    }

    /// Samples converted since creation or the last reset.
    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Check if the source reported end of stream.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// RT log stream, to be drained from a non-RT thread.
    pub fn log_stream(&self) -> Arc<LogStream> {
        Arc::clone(&self.log)
    }

    /// Give the source back.
    pub fn into_source(self) -> S {
        self.source
    }

    fn stream_time(&self) -> u64 {
        self.emitted * u64::from(self.hold)
    }
}

impl<S: DecodedSource> BufferProducer for AudioRfConverter<S> {
    fn fill(&mut self, buffer: &mut [u8]) -> Result<usize, ProducerError> {
        if self.exhausted {
            return Ok(0);
        }
        if let Some(e) = self.deferred.take() {
            return Err(e.into());
        }
        if buffer.len() < SAMPLE_SIZE {
            return Err(ProducerError::BudgetTooSmall {
                needed: SAMPLE_SIZE,
                budget: buffer.len(),
            });
        }

        let mut writer = SampleWriter::new(buffer);
        loop {
            while self.offset < self.filled && writer.fits(1) {
                let x = self.batch[self.offset];
                writer.push(RfSample::new(carrier_offset(x), self.hold));
                self.offset += 1;
                self.emitted += 1;
            }
            if !writer.fits(1) {
                break;
            }

            // Batch drained with room left
            let capacity = self.batch.len();
            let result = self.source.read_frames(&mut self.batch).and_then(|read| {
                if read > capacity {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "source reported more samples than requested",
                    ));
                }
                Ok(read)
            });
            let read = match result {
                Ok(read) => read,
                Err(e) if writer.written() > 0 => {
                    rt_warn!(self.log, self.stream_time(), "audio read failed: {}", e);
                    self.deferred = Some(e);
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            self.offset = 0;
            self.filled = read;
            if read == 0 {
                self.exhausted = true;
                rt_info!(
                    self.log,
                    self.stream_time(),
                    "audio source exhausted after {} samples",
                    self.emitted
                );
                break;
            }
        }

        Ok(writer.written())
    }

    fn reset(&mut self) -> Result<(), ProducerError> {
        self.source.rewind()?;
        rt_debug!(
            self.log,
            self.stream_time(),
            "audio stream rewound after {} samples",
            self.emitted
        );
        self.offset = 0;
        self.filled = 0;
        self.exhausted = false;
        self.deferred = None;
        self.emitted = 0;
        Ok(())
    }
}
