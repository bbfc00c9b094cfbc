//! Martin 1 SSTV encoder
//!
//! Emits the header once, then 240 lines of sync + separator followed by a
//! green, blue and red scan each, then the trailer. Emission is split into
//! indivisible units (the whole header, one line start, one channel scan, the
//! whole trailer) so a fill stops only between units and resumes exactly there.

use std::sync::Arc;

use super::image::{Channel, ImageFrame, LINES, PIXELS_PER_LINE};
use super::tones::{ScanMode, Tone, HEADER_TONES, MARTIN_1, TRAILER, TRAILER_TONES};
use crate::error::ProducerError;
use crate::logging::LogStream;
use crate::producer::BufferProducer;
use crate::sample::{SampleWriter, SAMPLE_SIZE};
use crate::{rt_debug, rt_info};

const MODE: &ScanMode = &MARTIN_1;

/// Where the encoder resumes on the next fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Header,
    LineStart,
    Scan(Channel),
    Trailer,
    Done,
}

impl Phase {
    /// Samples in the next unit of this phase.
    fn unit_len(self) -> usize {
        match self {
            Phase::Header => HEADER_TONES,
            Phase::LineStart => 2,
            Phase::Scan(_) => PIXELS_PER_LINE + 1,
            Phase::Trailer => TRAILER_TONES,
            Phase::Done => 0,
        }
    }
}

/// Write one tone, returning its emitted hold.
#[inline]
fn emit(writer: &mut SampleWriter<'_>, tone: Tone) -> u64 {
    let sample = tone.sample();
    writer.push(sample);
    u64::from(sample.hold)
}

/// Streams one image as Martin 1 tone samples.
///
/// Single pass: once the trailer is out every fill returns 0.
pub struct SstvEncoder<B> {
    image: ImageFrame<B>,
    phase: Phase,
    line: usize,
    stream_time: u64,
    log: Arc<LogStream>,
}

impl<B: AsRef<[u8]>> SstvEncoder<B> {
    pub fn new(image: ImageFrame<B>) -> Self {
        log::debug!("sstv encoder: {} (VIS {})", MODE.name, MODE.vis_code);
        Self {
            image,
            phase: Phase::Header,
            line: 0,
            stream_time: 0,
            log: Arc::new(LogStream::new()),
        }
    }

    /// Current scan line, 0-based. Equals `LINES` once all lines are out.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Check if the trailer has been emitted.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// RT log stream, to be drained from a non-RT thread.
    pub fn log_stream(&self) -> Arc<LogStream> {
        Arc::clone(&self.log)
    }

    /// Emit the unit for the current phase and advance. Caller checked it fits.
    fn emit_unit(&mut self, writer: &mut SampleWriter<'_>) {
        let mut elapsed = 0;
        match self.phase {
            Phase::Header => {
                for tone in MODE.header() {
                    elapsed += emit(writer, tone);
                }
                self.phase = Phase::LineStart;
            }
            Phase::LineStart => {
                elapsed += emit(writer, MODE.sync);
                elapsed += emit(writer, MODE.separator);
                self.phase = Phase::Scan(Channel::SCAN_ORDER[0]);
            }
            Phase::Scan(channel) => {
                for value in self.image.channel_values(self.line, channel) {
                    elapsed += emit(writer, MODE.pixel_tone(value));
                }
                elapsed += emit(writer, MODE.separator);
                self.phase = match channel.next() {
                    Some(next) => Phase::Scan(next),
                    None => {
                        self.line += 1;
                        if self.line == LINES {
                            Phase::Trailer
                        } else {
                            Phase::LineStart
                        }
                    }
                };
            }
            Phase::Trailer => {
                for tone in TRAILER {
                    elapsed += emit(writer, tone);
                }
                self.phase = Phase::Done;
            }
            Phase::Done => {}
        }
        self.stream_time += elapsed;

        match self.phase {
            Phase::LineStart if self.line == 0 => {
                rt_debug!(self.log, self.stream_time, "header sent");
            }
            Phase::Done => {
                rt_info!(self.log, self.stream_time, "image sent: {} lines", self.line);
            }
            _ => {}
        }
    }
}

impl<B: AsRef<[u8]>> BufferProducer for SstvEncoder<B> {
    fn fill(&mut self, buffer: &mut [u8]) -> Result<usize, ProducerError> {
        let budget = buffer.len();
        let mut writer = SampleWriter::new(buffer);

        while self.phase != Phase::Done && writer.fits(self.phase.unit_len()) {
            self.emit_unit(&mut writer);
        }

        if writer.written() == 0 && self.phase != Phase::Done {
            return Err(ProducerError::BudgetTooSmall {
                needed: self.phase.unit_len() * SAMPLE_SIZE,
                budget,
            });
        }
        Ok(writer.written())
    }
}
