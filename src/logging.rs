//! RT-safe logging for the buffer producers.
//!
//! # Architecture
//!
//! ```text
//! RT Thread               LogStream              Control Thread
//! ─────────               ─────────              ──────────────
//!
//! rt_log!() ───────────▶ [L0][L1][L2] ─────────▶ log::log!()
//! inside fill()           lock-free queue         forward()
//! non-blocking            fixed capacity          blocking ok
//! ```
//!
//! # Rules
//!
//! - `fill` never calls the `log` facade; it uses the `rt_*!` macros
//! - Formatting goes to a stack buffer, no allocation
//! - Messages are dropped (and counted) when the queue is full
//! - Control-path code logs through `log` directly

use core::sync::atomic::{AtomicU32, Ordering};

use crossbeam::queue::ArrayQueue;

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 120;

/// Default log queue capacity (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Target used when forwarding RT entries into the `log` facade.
pub const RT_LOG_TARGET: &str = "rpitx_producers::rt";

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Stream time at which the event happened, in the producer's hold units.
    pub stream_time: u64,
    /// Log level.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    /// Message text. A message truncated mid-character is repaired lossily.
    pub fn message(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.msg[..self.len as usize])
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            stream_time: 0,
            level: LogLevel::Info,
            len: 0,
            msg: [0; MAX_MSG_LEN],
        }
    }
}

/// Lock-free log stream (multiple producers, single draining consumer).
pub struct LogStream {
    entries: ArrayQueue<LogEntry>,
    dropped: AtomicU32,
}

impl LogStream {
    /// Create a stream with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(LOG_BUFFER_SIZE)
    }

    /// Create a stream holding at most `capacity` undrained entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: ArrayQueue::new(capacity),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (RT-safe, never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (queue full).
    #[inline]
    pub fn push(&self, stream_time: u64, level: LogLevel, msg: &[u8]) -> bool {
        let mut entry = LogEntry {
            stream_time,
            level,
            ..LogEntry::default()
        };
        let len = msg.len().min(MAX_MSG_LEN);
        entry.msg[..len].copy_from_slice(&msg[..len]);
        entry.len = len as u8;

        if self.entries.push(entry).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Drain next log entry.
    ///
    /// Returns `None` if no entries available.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        self.entries.pop()
    }

    /// Drain every pending entry into the `log` facade.
    ///
    /// Call from a non-RT thread. Returns the number of entries forwarded.
    pub fn forward(&self, target: &str) -> usize {
        let mut forwarded = 0;
        while let Some(entry) = self.drain() {
            let level: log::Level = entry.level.into();
            log::log!(
                target: target,
                level,
                "[t={}] {}",
                entry.stream_time,
                entry.message()
            );
            forwarded += 1;
        }

        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            log::warn!(target: target, "{} RT log messages dropped", dropped);
        }
        forwarded
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Get number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

impl Default for LogStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written. Output beyond the buffer is cut.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// RT-safe log macro.
///
/// Use this inside `fill` instead of the `log` macros.
///
/// # Example
///
/// ```ignore
/// rt_log!(LogLevel::Info, self.log, self.stream_time, "cycle {} done", n);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($level:expr, $stream:expr, $stream_time:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($stream_time, $level, &buf[..len]);
    }};
}

/// RT-safe info log.
#[macro_export]
macro_rules! rt_info {
    ($stream:expr, $stream_time:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Info, $stream, $stream_time, $($arg)*)
    };
}

/// RT-safe warning log.
#[macro_export]
macro_rules! rt_warn {
    ($stream:expr, $stream_time:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Warn, $stream, $stream_time, $($arg)*)
    };
}

/// RT-safe error log.
#[macro_export]
macro_rules! rt_error {
    ($stream:expr, $stream_time:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Error, $stream, $stream_time, $($arg)*)
    };
}

/// RT-safe debug log.
#[macro_export]
macro_rules! rt_debug {
    ($stream:expr, $stream_time:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Debug, $stream, $stream_time, $($arg)*)
    };
}

/// RT-safe trace log (maximum verbosity).
#[macro_export]
macro_rules! rt_trace {
    ($stream:expr, $stream_time:expr, $($arg:tt)*) => {
        $crate::rt_log!($crate::logging::LogLevel::Trace, $stream, $stream_time, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::with_capacity(16);

        assert!(stream.push(1000, LogLevel::Info, b"test message"));
        assert!(stream.has_entries());
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.stream_time, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), "test message");

        assert!(!stream.has_entries());
    }

    #[test]
    fn test_log_stream_full() {
        let stream = LogStream::with_capacity(4);

        assert!(stream.push(1, LogLevel::Info, b"1"));
        assert!(stream.push(2, LogLevel::Info, b"2"));
        assert!(stream.push(3, LogLevel::Info, b"3"));
        assert!(stream.push(4, LogLevel::Info, b"4"));

        // Should drop
        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);

        // Drain one, should be able to push again
        stream.drain();
        assert!(stream.push(6, LogLevel::Info, b"6"));
    }

    #[test]
    fn test_long_message_truncated() {
        let stream = LogStream::with_capacity(2);
        let long = [b'x'; MAX_MSG_LEN + 40];
        stream.push(0, LogLevel::Warn, &long);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("Hello {}", 42));
        assert_eq!(&buf[..len], b"Hello 42");
    }

    #[test]
    fn test_rt_macro_pushes_formatted() {
        let stream = LogStream::with_capacity(4);
        crate::rt_debug!(stream, 77, "burst {} of {}", 3, 50);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Debug);
        assert_eq!(entry.stream_time, 77);
        assert_eq!(entry.message(), "burst 3 of 50");
    }

    #[test]
    fn test_forward_drains_everything() {
        let _ = env_logger::builder().is_test(true).try_init();

        let stream = LogStream::with_capacity(4);
        stream.push(1, LogLevel::Info, b"one");
        stream.push(2, LogLevel::Error, b"two");

        assert_eq!(stream.forward(RT_LOG_TARGET), 2);
        assert!(!stream.has_entries());
    }

    #[test]
    fn test_forward_clears_dropped_count() {
        let _ = env_logger::builder().is_test(true).try_init();

        let stream = LogStream::with_capacity(1);
        stream.push(1, LogLevel::Info, b"kept");
        stream.push(2, LogLevel::Info, b"lost");
        assert_eq!(stream.dropped(), 1);

        assert_eq!(stream.forward(RT_LOG_TARGET), 1);
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_multiple_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::with_capacity(64));
        let mut handles = vec![];

        // Spawn 4 producer threads
        for i in 0..4 {
            let stream = Arc::clone(&stream);
            let handle = thread::spawn(move || {
                for j in 0..10 {
                    let msg = format!("Thread {} msg {}", i, j);
                    stream.push(j as u64, LogLevel::Info, msg.as_bytes());
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // 4 threads × 10 messages
        let mut count = 0;
        while stream.drain().is_some() {
            count += 1;
        }
        assert_eq!(count, 40, "All messages should be present");
    }
}
