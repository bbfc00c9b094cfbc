//! Module: sample
//!
//! Purpose: The `(frequency, hold)` record every buffer producer emits, and the
//! helpers that serialize it into the transmit loop's byte buffers.
//!
//! Architecture:
//! - Fixed 16-byte record: `f64` frequency, `u32` hold, 4 bytes of zero padding
//! - Native endianness (the transmit loop reads the buffer in-process)
//! - Producers only ever write whole records
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// Serialized size of one [`RfSample`] in bytes.
pub const SAMPLE_SIZE: usize = core::mem::size_of::<RfSample>();

const FREQUENCY_BYTES: core::ops::Range<usize> = 0..8;
const HOLD_BYTES: core::ops::Range<usize> = 8..12;
const PADDING_BYTES: core::ops::Range<usize> = 12..16;

/// A single keying instruction for the transmit path.
///
/// The transmitter holds `frequency` for `hold` base time units before the
/// next sample takes effect. The unit of `frequency` depends on the producer
/// (MHz for RF producers, Hz for the SSTV tone encoder), as does the unit of
/// `hold`.
///
/// Memory layout:
/// ```text
/// [frequency:8][hold:4][padding:4] = 16 bytes
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RfSample {
    /// Carrier or tone frequency.
    pub frequency: f64,

    /// Time to hold `frequency`, in the producer's base unit. Never zero.
    pub hold: u32,

    padding: u32,
}

impl RfSample {
    /// Create a sample.
    #[inline]
    pub const fn new(frequency: f64, hold: u32) -> Self {
        Self {
            frequency,
            hold,
            padding: 0,
        }
    }

    /// Serialize into the first [`SAMPLE_SIZE`] bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than [`SAMPLE_SIZE`].
    #[inline]
    pub fn write_to(&self, out: &mut [u8]) {
        out[FREQUENCY_BYTES].copy_from_slice(&self.frequency.to_ne_bytes());
        out[HOLD_BYTES].copy_from_slice(&self.hold.to_ne_bytes());
        out[PADDING_BYTES].fill(0);
    }

    /// Deserialize one record. Returns `None` if `bytes` is too short.
    #[inline]
    pub fn read_from(bytes: &[u8]) -> Option<Self> {
        let record = bytes.get(..SAMPLE_SIZE)?;
        let mut frequency = [0u8; 8];
        frequency.copy_from_slice(&record[FREQUENCY_BYTES]);
        let mut hold = [0u8; 4];
        hold.copy_from_slice(&record[HOLD_BYTES]);
        Some(Self::new(f64::from_ne_bytes(frequency), u32::from_ne_bytes(hold)))
    }
}

/// Iterate the whole records in a filled buffer.
///
/// Trailing bytes that do not form a complete record are ignored.
pub fn decode_samples(bytes: &[u8]) -> impl Iterator<Item = RfSample> + '_ {
    bytes.chunks_exact(SAMPLE_SIZE).filter_map(RfSample::read_from)
}

/// Append-only cursor writing whole samples into a byte budget.
pub struct SampleWriter<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> SampleWriter<'a> {
    /// Wrap an output buffer. The byte budget is `buf.len()`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, written: 0 }
    }

    /// Bytes written so far (always a multiple of [`SAMPLE_SIZE`]).
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Whole samples that still fit.
    #[inline]
    pub fn remaining(&self) -> usize {
        (self.buf.len() - self.written) / SAMPLE_SIZE
    }

    /// Check whether a unit of `count` samples fits in the remaining budget.
    #[inline]
    pub fn fits(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    /// Write one sample. Returns `false` (writing nothing) if it does not fit.
    #[inline]
    pub fn push(&mut self, sample: RfSample) -> bool {
        if !self.fits(1) {
            return false;
        }
        debug_assert!(sample.hold > 0, "zero hold emitted");
        sample.write_to(&mut self.buf[self.written..self.written + SAMPLE_SIZE]);
        self.written += SAMPLE_SIZE;
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
