//! Module: tones
//!
//! Purpose: Martin 1 tone table, VIS identification code and the fixed
//! header/trailer sequences.
//!
//! Architecture:
//! - Tone durations are stored in tenths of a microsecond
//! - Emitted holds are scaled by `DURATION_SCALE` into the transmit loop's unit
//! - VIS bits are derived from the mode's code, LSB first, even parity last
//!
//! Safety: Safe. Const tables only.

use crate::sample::RfSample;

/// Scale from table durations to emitted hold units.
pub const DURATION_SCALE: u32 = 100;

/// One audio tone: frequency (Hz) held for `duration` tenths of a microsecond.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency: f64,
    pub duration: u32,
}

impl Tone {
    pub const fn new(frequency: f64, duration: u32) -> Self {
        Self {
            frequency,
            duration,
        }
    }

    /// The tone as an emitted sample.
    #[inline]
    pub fn sample(self) -> RfSample {
        RfSample::new(self.frequency, self.duration * DURATION_SCALE)
    }
}

/// Half a second of silence opening and closing a transmission.
pub const SILENCE: Tone = Tone::new(0.0, 5_000_000);

/// VIS data bit 1.
pub const VIS_ONE: Tone = Tone::new(1100.0, 300_000);

/// VIS data bit 0.
pub const VIS_ZERO: Tone = Tone::new(1300.0, 300_000);

/// VIS stop bit.
pub const VIS_STOP: Tone = Tone::new(1200.0, 300_000);

/// Silence, attention tones, then VIS lead / break / mid / start.
const LEADER: [Tone; 13] = [
    SILENCE,
    Tone::new(1900.0, 100_000),
    Tone::new(1500.0, 1_000_000),
    Tone::new(1900.0, 1_000_000),
    Tone::new(1500.0, 1_000_000),
    Tone::new(2300.0, 1_000_000),
    Tone::new(1500.0, 1_000_000),
    Tone::new(2300.0, 1_000_000),
    Tone::new(1500.0, 1_000_000),
    Tone::new(1900.0, 3_000_000),
    Tone::new(1200.0, 100_000),
    Tone::new(1900.0, 3_000_000),
    Tone::new(1200.0, 300_000),
];

/// VIS data bits: 7 code bits plus parity.
pub const VIS_BITS: usize = 8;

/// Tones in the header.
pub const HEADER_TONES: usize = LEADER.len() + VIS_BITS + 1;

/// Closing sequence.
pub const TRAILER: [Tone; 5] = [
    Tone::new(2300.0, 3_000_000),
    Tone::new(1200.0, 100_000),
    Tone::new(2300.0, 1_000_000),
    Tone::new(1200.0, 300_000),
    SILENCE,
];

/// Tones in the trailer.
pub const TRAILER_TONES: usize = TRAILER.len();

/// Line timing and pixel mapping of a scan mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanMode {
    pub name: &'static str,
    /// VIS identification code (7 bits).
    pub vis_code: u8,
    /// Horizontal sync at the start of every line.
    pub sync: Tone,
    /// Separator after the sync and after each channel scan.
    pub separator: Tone,
    /// Hold of one pixel tone.
    pub pixel_duration: u32,
    /// Tone for a channel value of 0 (Hz).
    pub pixel_base: f64,
    /// Tone span over the full 0..=255 channel range (Hz).
    pub pixel_span: u32,
}

/// Martin 1: 240 lines of 320 pixels, green / blue / red scans.
pub const MARTIN_1: ScanMode = ScanMode {
    name: "Martin 1",
    vis_code: 44,
    sync: Tone::new(1200.0, 48_720),
    separator: Tone::new(1500.0, 5_720),
    pixel_duration: 4_576,
    pixel_base: 1500.0,
    pixel_span: 800,
};

impl ScanMode {
    /// VIS data bits in transmission order: code LSB first, then even parity.
    pub fn vis_bits(&self) -> [bool; VIS_BITS] {
        let mut bits = [false; VIS_BITS];
        for (i, bit) in bits.iter_mut().take(VIS_BITS - 1).enumerate() {
            *bit = (self.vis_code >> i) & 1 == 1;
        }
        bits[VIS_BITS - 1] = (self.vis_code & 0x7F).count_ones() % 2 == 1;
        bits
    }

    /// Full header: leader, VIS data bits, VIS stop.
    pub fn header(&self) -> [Tone; HEADER_TONES] {
        let mut tones = [VIS_STOP; HEADER_TONES];
        tones[..LEADER.len()].copy_from_slice(&LEADER);
        for (slot, bit) in tones[LEADER.len()..].iter_mut().zip(self.vis_bits()) {
            *slot = if bit { VIS_ONE } else { VIS_ZERO };
        }
        tones
    }

    /// Tone for one channel value.
    ///
    /// The offset is computed in integer arithmetic, truncating.
    #[inline]
    pub fn pixel_tone(&self, value: u8) -> Tone {
        let offset = u32::from(value) * self.pixel_span / 256;
        Tone::new(self.pixel_base + f64::from(offset), self.pixel_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_martin1_vis_bits() {
        // 44 = 0101100b, three ones, parity 1
        assert_eq!(
            MARTIN_1.vis_bits(),
            [false, false, true, true, false, true, false, true]
        );
    }

    #[test]
    fn test_header_shape() {
        let header = MARTIN_1.header();
        assert_eq!(header.len(), 22);
        assert_eq!(header[0], SILENCE);
        assert_eq!(header[12], Tone::new(1200.0, 300_000));

        let bits: Vec<f64> = header[13..21].iter().map(|t| t.frequency).collect();
        assert_eq!(
            bits,
            vec![1300.0, 1300.0, 1100.0, 1100.0, 1300.0, 1100.0, 1300.0, 1100.0]
        );
        assert_eq!(header[21], VIS_STOP);
    }

    #[test]
    fn test_pixel_tone_truncates() {
        assert_eq!(MARTIN_1.pixel_tone(0).frequency, 1500.0);
        // 255 * 800 / 256 = 796.875 -> 796
        assert_eq!(MARTIN_1.pixel_tone(255).frequency, 2296.0);
        // 1 * 800 / 256 = 3.125 -> 3
        assert_eq!(MARTIN_1.pixel_tone(1).frequency, 1503.0);
        assert_eq!(MARTIN_1.pixel_tone(128).duration, 4_576);
    }

    #[test]
    fn test_tone_sample_scaled() {
        assert_eq!(SILENCE.sample(), RfSample::new(0.0, 500_000_000));
        assert_eq!(MARTIN_1.sync.sample().hold, 4_872_000);
    }
}
