//! Decoded audio sources
//!
//! The converter reads mono `f32` samples sequentially through
//! [`DecodedSource`]. File decoding lives behind this trait.

use std::io;

/// A sequentially read stream of decoded mono samples.
pub trait DecodedSource {
    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Read up to `out.len()` samples. Returns 0 at end of stream.
    ///
    /// May block; the real-time loop tolerates it as a bounded stall.
    fn read_frames(&mut self, out: &mut [f32]) -> io::Result<usize>;

    /// Move the read cursor back to the first sample.
    fn rewind(&mut self) -> io::Result<()>;
}

impl<T: DecodedSource + ?Sized> DecodedSource for Box<T> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn read_frames(&mut self, out: &mut [f32]) -> io::Result<usize> {
        (**self).read_frames(out)
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }
}

/// Already decoded samples held by the caller.
///
/// Keeps only a cursor; `S` may borrow (`&[f32]`) or share (`Arc<[f32]>`).
#[derive(Debug, Clone)]
pub struct MemorySource<S> {
    samples: S,
    sample_rate: u32,
    cursor: usize,
}

impl<S: AsRef<[f32]>> MemorySource<S> {
    pub fn new(samples: S, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            cursor: 0,
        }
    }

    /// Samples not yet read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.samples.as_ref().len() - self.cursor
    }
}

impl<S: AsRef<[f32]>> DecodedSource for MemorySource<S> {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_frames(&mut self, out: &mut [f32]) -> io::Result<usize> {
        let samples = &self.samples.as_ref()[self.cursor..];
        let count = samples.len().min(out.len());
        out[..count].copy_from_slice(&samples[..count]);
        self.cursor += count;
        Ok(count)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.cursor = 0;
        Ok(())
    }
}
