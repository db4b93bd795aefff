//! Progress reporting for long-running setup calls.
//!
//! This module provides a simple progress callback mechanism that the setup
//! pipeline uses to report its stages to callers.
//!
//! # Example
//!
//! ```ignore
//! use seamless_setup::algo::progress::Progress;
//! use seamless_setup::algo::integration::setup_integration_with_progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let data = setup_integration_with_progress(&input, &cutter, &comber, &options, &progress)?;
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress within a sub-range.
    ///
    /// Maps progress from `[0, sub_total]` to `[range_current, range_current + 1]`
    /// within a total of `range_total` steps, so a single stage can report its
    /// own items inside the slice allotted to it.
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        range_current: usize,
        range_total: usize,
        message: &str,
    ) {
        if sub_total == 0 || range_total == 0 {
            return;
        }
        // Fixed-point, three decimal digits per stage
        let sub_fraction = (sub_current * 1000) / sub_total;
        let effective = range_current * 1000 + sub_fraction;
        let total_scaled = range_total * 1000;
        (self.callback)(effective, total_scaled, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

/// Per-item progress inside one stage of a pipeline.
///
/// Safe to tick from several threads; reports are throttled to every
/// `stride` items.
pub(crate) struct StageTicker<'a> {
    progress: Option<&'a Progress>,
    stage: usize,
    stages: usize,
    items: usize,
    stride: usize,
    done: AtomicUsize,
    message: &'static str,
}

impl<'a> StageTicker<'a> {
    pub(crate) fn new(
        progress: Option<&'a Progress>,
        stage: usize,
        stages: usize,
        items: usize,
        message: &'static str,
    ) -> Self {
        Self {
            progress,
            stage,
            stages,
            items,
            stride: (items / 100).max(1),
            done: AtomicUsize::new(0),
            message,
        }
    }

    /// Count one finished item.
    pub(crate) fn tick(&self) {
        let Some(progress) = self.progress else {
            return;
        };
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.stride == 0 || done == self.items {
            progress.report_sub(done, self.items, self.stage, self.stages, self.message);
        }
    }
}
