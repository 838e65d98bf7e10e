//! Progress reporting for the slow stages (loading rows, drawing samples).
//!
//! Stages only see the [`ProgressCallback`] trait; how progress is rendered
//! is chosen by the binary.

use std::sync::Arc;

/// Receives progress updates from a running stage.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work once it is known.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update. Used by tests and library callers that do not
/// render progress.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
