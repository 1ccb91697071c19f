//! Progress reporting for dataset loading and ZIP geocoding.
//!
//! [`ProgressCallback`] keeps the loader independent of any terminal
//! rendering. The CLI plugs in `indicatif` bars; library callers and tests
//! use [`NullProgress`].

/// Receives progress updates while rows are read or enriched.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of rows expected.
    fn set_total(&self, total: u64);

    /// Advances by `delta` rows.
    fn inc(&self, delta: u64);

    /// Replaces the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the stage complete with a final message.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
