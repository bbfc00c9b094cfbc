//! The contract shared by every buffer producer.
//!
//! The external real-time loop owns a byte buffer, calls [`BufferProducer::fill`]
//! repeatedly and streams the decoded [`RfSample`](crate::sample::RfSample)s to
//! the transmit path. It stops on the first `Ok(0)`.
//!
//! # Rules
//!
//! - Only whole samples are written; the returned count is a multiple of
//!   [`SAMPLE_SIZE`](crate::sample::SAMPLE_SIZE) and never exceeds the budget
//! - `Ok(0)` is permanent: exhaustion or stop, nothing written
//! - Cancellation is cooperative and observed at the top of the next call

use crate::error::ProducerError;

/// A stateful algorithm emitting `(frequency, hold)` samples on demand.
pub trait BufferProducer {
    /// Write as many whole samples as the producer's units allow into `buffer`.
    ///
    /// The byte budget is `buffer.len()`. Returns the bytes written.
    fn fill(&mut self, buffer: &mut [u8]) -> Result<usize, ProducerError>;

    /// Rewind to the producer's restart point.
    ///
    /// Invoked by the real-time loop on stream restart. Producers without a
    /// restart point keep the default, which refuses.
    fn reset(&mut self) -> Result<(), ProducerError> {
        Err(ProducerError::ResetUnsupported)
    }
}

impl<P: BufferProducer + ?Sized> BufferProducer for Box<P> {
    fn fill(&mut self, buffer: &mut [u8]) -> Result<usize, ProducerError> {
        (**self).fill(buffer)
    }

    fn reset(&mut self) -> Result<(), ProducerError> {
        (**self).reset()
    }
}
