//! Fixed-geometry RGB frame for the SSTV encoder.

use crate::error::ProducerError;

/// Scan lines per frame.
pub const LINES: usize = 240;

/// Pixels per scan line.
pub const PIXELS_PER_LINE: usize = 320;

/// Interleaved color bytes per pixel (R, G, B).
pub const BYTES_PER_PIXEL: usize = 3;

/// Bytes in one frame.
pub const FRAME_BYTES: usize = LINES * PIXELS_PER_LINE * BYTES_PER_PIXEL;

/// Color channel, in the order each line scans them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Green,
    Blue,
    Red,
}

impl Channel {
    /// Per-line scan order.
    pub const SCAN_ORDER: [Channel; 3] = [Channel::Green, Channel::Blue, Channel::Red];

    /// Offset of this channel's byte within an RGB pixel.
    #[inline]
    pub fn byte_offset(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Channel scanned after this one on the same line.
    #[inline]
    pub fn next(self) -> Option<Channel> {
        match self {
            Channel::Green => Some(Channel::Blue),
            Channel::Blue => Some(Channel::Red),
            Channel::Red => None,
        }
    }
}

/// A 240×320 frame, row-major, interleaved RGB bytes.
///
/// `B` is caller-owned storage; the frame never copies it.
#[derive(Debug, Clone)]
pub struct ImageFrame<B> {
    data: B,
}

impl<B: AsRef<[u8]>> ImageFrame<B> {
    /// Wrap pixel data. Fails unless it is exactly [`FRAME_BYTES`] long.
    pub fn new(data: B) -> Result<Self, ProducerError> {
        let actual = data.as_ref().len();
        if actual != FRAME_BYTES {
            return Err(ProducerError::InvalidImage {
                expected: FRAME_BYTES,
                actual,
            });
        }
        Ok(Self { data })
    }

    /// One channel value.
    ///
    /// # Panics
    ///
    /// Panics if `line` or `pixel` is out of range.
    #[inline]
    pub fn value(&self, line: usize, pixel: usize, channel: Channel) -> u8 {
        self.line(line)[pixel * BYTES_PER_PIXEL + channel.byte_offset()]
    }

    /// One channel of a scan line, left to right.
    pub fn channel_values(&self, line: usize, channel: Channel) -> impl Iterator<Item = u8> + '_ {
        self.line(line)
            .chunks_exact(BYTES_PER_PIXEL)
            .map(move |pixel| pixel[channel.byte_offset()])
    }

    fn line(&self, line: usize) -> &[u8] {
        let stride = PIXELS_PER_LINE * BYTES_PER_PIXEL;
        &self.data.as_ref()[line * stride..(line + 1) * stride]
    }
}
