//! RC command signal generator.
//!
//! Keyed-carrier control signal for toy-grade non-proportional RC vehicles.
//! Pure logic, no hardware dependencies. Fully testable on host.
//!
//! # Signal shape
//!
//! ```text
//!  +-----------+   +-----------+   +--+  +--+  +--+  +--+
//!  |  sync     |   |  sync     |   |  |  |  |  |  |  |  |
//! -+           +---+           +---+  +--+  +--+  +--+  +--  ...repeat
//!   burst_us × multiple  gap       burst_us bursts and gaps
//!  |<-- synchronization phase -->| |<--- signal phase --->|
//! ```
//!
//! Gaps are broadcast on the dead frequency: the DMA-driven transmitter cannot
//! pause, so "off" is a carrier the receiver ignores.
//!
//! # Threads
//!
//! [`RcBroadcast`] lives on the control thread; [`RcSignalGenerator`] is moved
//! onto the real-time thread. Parameter updates are staged under a mutex and
//! picked up by the generator only at the end of a full command cycle, so
//! every transmitted command is self-consistent. The lock is held for a plain
//! struct copy on either side, never while formatting samples.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::RcParameters;
use crate::error::{ProducerError, RcError};
use crate::logging::{LogStream, RT_LOG_TARGET};
use crate::producer::BufferProducer;
use crate::sample::{RfSample, SampleWriter, SAMPLE_SIZE};
use crate::rt_info;

/// FSM state: which kind of sample is emitted next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RcState {
    /// Carrier for `burst_us × synchronization_multiple`.
    Synchronization,
    /// Dead frequency for `burst_us`.
    SynchronizationGap,
    /// Carrier for `burst_us`.
    Signal,
    /// Dead frequency for `burst_us`; the cycle boundary follows the last one.
    SignalGap,
}

/// Staged parameter set plus the pending flag.
///
/// The flag is only ever written while holding the lock. The RT side peeks at
/// it without the lock and re-reads the staged slot under the lock, so an
/// update staged concurrently with the peek is picked up on the next cycle and
/// never lost.
struct ParameterExchange {
    staged: Mutex<Option<RcParameters>>,
    pending: AtomicBool,
}

impl ParameterExchange {
    fn new() -> Self {
        Self {
            staged: Mutex::new(None),
            pending: AtomicBool::new(false),
        }
    }

    fn stage(&self, params: RcParameters) {
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        *staged = Some(params);
        self.pending.store(true, Ordering::Release);
    }

    fn take(&self) -> Option<RcParameters> {
        if !self.pending.load(Ordering::Acquire) {
            return None;
        }
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        let params = staged.take();
        self.pending.store(false, Ordering::Release);
        params
    }
}

/// State shared between the control handle and the generator.
struct Shared {
    exchange: ParameterExchange,
    stop: AtomicBool,
    running: AtomicBool,
    log: LogStream,
}

impl Shared {
    fn new() -> Self {
        Self {
            exchange: ParameterExchange::new(),
            stop: AtomicBool::new(false),
            running: AtomicBool::new(false),
            log: LogStream::new(),
        }
    }
}

/// Control-thread handle for one RC broadcast.
///
/// # Example
///
/// ```
/// use rpitx_producers::config::RcParameters;
/// use rpitx_producers::rc::RcBroadcast;
/// use rpitx_producers::producer::BufferProducer;
///
/// let mut broadcast = RcBroadcast::new();
/// broadcast.initialize().unwrap();
/// broadcast.set_parameters(RcParameters::with_burst_count(55)).unwrap();
///
/// let mut generator = broadcast.producer().unwrap();
/// let mut buffer = [0u8; 16 * 64];
/// assert_eq!(generator.fill(&mut buffer).unwrap(), buffer.len());
///
/// broadcast.stop();
/// assert_eq!(generator.fill(&mut buffer).unwrap(), 0);
/// ```
pub struct RcBroadcast {
    shared: Option<Arc<Shared>>,
}

impl RcBroadcast {
    /// Create an uninitialized handle.
    pub fn new() -> Self {
        Self { shared: None }
    }

    /// Establish default parameters. Must precede any other operation.
    ///
    /// Also valid after [`stop`](Self::stop), returning to the default state.
    pub fn initialize(&mut self) -> Result<(), RcError> {
        if self.shared.is_some() {
            return Err(RcError::AlreadyInitialized);
        }
        self.shared = Some(Arc::new(Shared::new()));
        log::info!(
            "RC broadcast initialized with defaults {:?}",
            RcParameters::default()
        );
        Ok(())
    }

    /// Check if `initialize` has been called since the last `stop`.
    pub fn is_initialized(&self) -> bool {
        self.shared.is_some()
    }

    /// Check if a generator is currently attached.
    pub fn is_running(&self) -> bool {
        self.shared
            .as_ref()
            .is_some_and(|shared| shared.running.load(Ordering::Acquire))
    }

    /// Stage a new parameter set for the next cycle boundary.
    ///
    /// A later call before the boundary replaces an earlier one.
    pub fn set_parameters(&self, params: RcParameters) -> Result<(), RcError> {
        let shared = self.shared()?;
        params.validate()?;
        shared.exchange.stage(params);
        log::debug!("staged RC parameters {:?}", params);
        Ok(())
    }

    /// Attach the real-time generator.
    ///
    /// Only one generator may be attached at a time; it detaches when dropped.
    /// A set staged before this call is the generator's initial active set.
    pub fn producer(&self) -> Result<RcSignalGenerator, RcError> {
        let shared = self.shared()?;
        if shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RcError::AlreadyRunning);
        }
        log::info!("RC generator attached");
        Ok(RcSignalGenerator::attach(Arc::clone(shared)))
    }

    /// Request termination and release the parameter exchange.
    ///
    /// The generator observes the request at the top of its next `fill`.
    /// Calling `stop` when not initialized does nothing.
    pub fn stop(&mut self) {
        match self.shared.take() {
            Some(shared) => {
                shared.stop.store(true, Ordering::Release);
                shared.log.forward(RT_LOG_TARGET);
                log::info!("RC broadcast stop requested");
            }
            None => log::debug!("RC broadcast stop with nothing running"),
        }
    }

    /// Drain the generator's RT log entries into the `log` facade.
    pub fn forward_log(&self) -> usize {
        self.shared
            .as_ref()
            .map_or(0, |shared| shared.log.forward(RT_LOG_TARGET))
    }

    fn shared(&self) -> Result<&Arc<Shared>, RcError> {
        self.shared.as_ref().ok_or(RcError::NotInitialized)
    }
}

impl Default for RcBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RcBroadcast {
    fn drop(&mut self) {
        // A generator left running has no one to stop it.
        self.stop();
    }
}

/// Real-time side of an RC broadcast.
///
/// Emits the cyclic synchronization / signal burst pattern forever, until the
/// owning [`RcBroadcast`] is stopped.
pub struct RcSignalGenerator {
    shared: Arc<Shared>,

    // Active parameter set, replaced only at the cycle boundary
    params: RcParameters,

    // FSM state
    state: RcState,
    burst: u32,

    cycles: u64,
    stream_time: u64,
    stopped: bool,
}

impl RcSignalGenerator {
    fn attach(shared: Arc<Shared>) -> Self {
        let params = shared.exchange.take().unwrap_or_default();
        Self {
            shared,
            params,
            state: RcState::Synchronization,
            burst: 0,
            cycles: 0,
            stream_time: 0,
            stopped: false,
        }
    }

    /// State of the next sample to be emitted.
    #[inline]
    pub fn state(&self) -> RcState {
        self.state
    }

    /// Parameter set used by the cycle in progress.
    #[inline]
    pub fn active_parameters(&self) -> &RcParameters {
        &self.params
    }

    /// Number of complete command cycles emitted.
    #[inline]
    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    /// Sum of the holds emitted so far, in `burst_us` units.
    #[inline]
    pub fn stream_time(&self) -> u64 {
        self.stream_time
    }

    /// Advance the FSM by one sample.
    fn next_sample(&mut self) -> RfSample {
        let p = self.params;
        let mut boundary = false;

        let sample = match self.state {
            RcState::Synchronization => {
                self.state = RcState::SynchronizationGap;
                RfSample::new(p.frequency, p.synchronization_hold())
            }
            RcState::SynchronizationGap => {
                self.burst += 1;
                if self.burst == p.synchronization_burst_count {
                    self.burst = 0;
                    self.state = RcState::Signal;
                } else {
                    self.state = RcState::Synchronization;
                }
                RfSample::new(p.dead_frequency, p.burst_us)
            }
            RcState::Signal => {
                self.state = RcState::SignalGap;
                RfSample::new(p.frequency, p.burst_us)
            }
            RcState::SignalGap => {
                self.burst += 1;
                if self.burst == p.burst_count {
                    self.burst = 0;
                    self.state = RcState::Synchronization;
                    boundary = true;
                } else {
                    self.state = RcState::Signal;
                }
                RfSample::new(p.dead_frequency, p.burst_us)
            }
        };

        self.stream_time += u64::from(sample.hold);
        if boundary {
            self.finish_cycle();
        }
        sample
    }

    fn finish_cycle(&mut self) {
        self.cycles += 1;
        if let Some(next) = self.shared.exchange.take() {
            self.params = next;
            rt_info!(
                self.shared.log,
                self.stream_time,
                "cycle {}: applied {} bursts at {} MHz",
                self.cycles,
                next.burst_count,
                next.frequency
            );
        }
    }
}

impl BufferProducer for RcSignalGenerator {
    fn fill(&mut self, buffer: &mut [u8]) -> Result<usize, ProducerError> {
        if self.stopped {
            return Ok(0);
        }
        if self.shared.stop.load(Ordering::Acquire) {
            self.stopped = true;
            rt_info!(
                self.shared.log,
                self.stream_time,
                "stop observed after {} cycles",
                self.cycles
            );
            return Ok(0);
        }
        if buffer.len() < SAMPLE_SIZE {
            return Err(ProducerError::BudgetTooSmall {
                needed: SAMPLE_SIZE,
                budget: buffer.len(),
            });
        }

        let mut writer = SampleWriter::new(buffer);
        while writer.fits(1) {
            let sample = self.next_sample();
            writer.push(sample);
        }
        Ok(writer.written())
    }
}

impl Drop for RcSignalGenerator {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
    }
}
