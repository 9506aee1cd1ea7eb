//! Progress reporting and cancellation for encoding runs.
//!
//! The encoder processes its input in chunks of roughly 4096 positions. After
//! every chunk the pending output is written to the sink and the reporter is
//! consulted:
//! - `on_progress` receives the uncompressed and compressed byte counts and
//!   may return `false` to request cancellation
//! - `should_cancel` is polled as well, so a flag set from another thread is
//!   observed at the next chunk boundary
//!
//! Cancellation is never observed inside a parse window.
//!
//! # Example
//!
//! ```rust
//! use lzopt::progress::{ProgressReporter, progress_fn};
//!
//! let mut calls = 0;
//! let mut progress = progress_fn(|in_bytes, _out_bytes| {
//!     calls += 1;
//!     in_bytes < 1 << 20
//! });
//! assert!(progress.on_progress(4096, 1200));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress reporting trait for encoding runs.
///
/// Both methods have defaults, so implementors only override what they need.
pub trait ProgressReporter: Send {
    /// Called once per completed chunk.
    ///
    /// `in_bytes` is the number of input bytes encoded so far and
    /// `out_bytes` the number of compressed bytes produced so far.
    /// Returns `true` to continue or `false` to request cancellation.
    fn on_progress(&mut self, in_bytes: u64, out_bytes: u64) -> bool {
        let _ = (in_bytes, out_bytes);
        true
    }

    /// Checks if cancellation has been requested.
    ///
    /// Default implementation returns `false` (no cancellation).
    fn should_cancel(&self) -> bool {
        false
    }
}

/// A progress reporter that does nothing (null object pattern).
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// Progress counters with timing.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Uncompressed bytes encoded so far.
    pub in_bytes: u64,
    /// Compressed bytes produced so far.
    pub out_bytes: u64,
    /// Number of progress callbacks received.
    pub callbacks: usize,
    /// Processing start time.
    pub start_time: Instant,
    /// Time of last update.
    pub last_update: Instant,
}

impl Default for ProgressState {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            in_bytes: 0,
            out_bytes: 0,
            callbacks: 0,
            start_time: now,
            last_update: now,
        }
    }
}

impl ProgressState {
    /// Creates a new progress state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compression ratio (compressed / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.in_bytes == 0 {
            0.0
        } else {
            self.out_bytes as f64 / self.in_bytes as f64
        }
    }

    /// Returns elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the encoding rate in input bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            0.0
        } else {
            self.in_bytes as f64 / elapsed
        }
    }
}

/// A progress reporter that collects statistics.
#[derive(Debug, Default, Clone)]
pub struct StatisticsProgress {
    /// The progress state.
    pub state: ProgressState,
    /// Whether cancellation was requested.
    pub cancelled: bool,
}

impl StatisticsProgress {
    /// Creates a new statistics progress reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected state.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }
}

impl ProgressReporter for StatisticsProgress {
    fn on_progress(&mut self, in_bytes: u64, out_bytes: u64) -> bool {
        self.state.in_bytes = in_bytes;
        self.state.out_bytes = out_bytes;
        self.state.callbacks += 1;
        self.state.last_update = Instant::now();
        !self.cancelled
    }

    fn should_cancel(&self) -> bool {
        self.cancelled
    }
}

/// A thread-safe progress reporter using atomics.
///
/// Allows progress to be monitored, and the run cancelled, from another thread.
#[derive(Debug)]
pub struct AtomicProgress {
    in_bytes: AtomicU64,
    out_bytes: AtomicU64,
    cancelled: AtomicBool,
    start_time: Instant,
}

impl Default for AtomicProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicProgress {
    /// Creates a new atomic progress reporter.
    pub fn new() -> Self {
        Self {
            in_bytes: AtomicU64::new(0),
            out_bytes: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            start_time: Instant::now(),
        }
    }

    /// Creates a shared atomic progress reporter.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns uncompressed bytes encoded so far.
    pub fn in_bytes(&self) -> u64 {
        self.in_bytes.load(Ordering::Relaxed)
    }

    /// Returns compressed bytes produced so far.
    pub fn out_bytes(&self) -> u64 {
        self.out_bytes.load(Ordering::Relaxed)
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Requests cancellation at the next chunk boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns elapsed time since creation.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn record(&self, in_bytes: u64, out_bytes: u64) -> bool {
        self.in_bytes.store(in_bytes, Ordering::Relaxed);
        self.out_bytes.store(out_bytes, Ordering::Relaxed);
        !self.is_cancelled()
    }
}

impl ProgressReporter for AtomicProgress {
    fn on_progress(&mut self, in_bytes: u64, out_bytes: u64) -> bool {
        self.record(in_bytes, out_bytes)
    }

    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// Progress reporter for shared `Arc<AtomicProgress>`.
impl ProgressReporter for Arc<AtomicProgress> {
    fn on_progress(&mut self, in_bytes: u64, out_bytes: u64) -> bool {
        self.record(in_bytes, out_bytes)
    }

    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// A progress reporter that calls a closure.
pub struct ClosureProgress<F> {
    callback: F,
}

impl<F> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    /// Creates a progress reporter from a closure.
    ///
    /// The closure receives `(in_bytes, out_bytes)` and returns
    /// `true` to continue or `false` to cancel.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    fn on_progress(&mut self, in_bytes: u64, out_bytes: u64) -> bool {
        (self.callback)(in_bytes, out_bytes)
    }
}

/// Creates a closure-based progress reporter.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    ClosureProgress::new(f)
}
