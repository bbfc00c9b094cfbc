//! SSTV: still image to Martin 1 tone samples
//!
//! - Tones: mode timing, VIS code, header and trailer tables
//! - Image: fixed 240×320 RGB frame over caller-owned bytes
//! - Encoder: resumable single-pass emission in whole units

pub mod encoder;
pub mod image;
pub mod tones;

pub use encoder::SstvEncoder;
pub use image::{Channel, ImageFrame, FRAME_BYTES, LINES, PIXELS_PER_LINE};
pub use tones::{ScanMode, Tone, MARTIN_1};
