//! stream/progress.rs
//! Progress reporting hook.
//!
//! All callbacks run on the calling thread, after the matching write.

use crate::types::StreamError;

pub trait ProgressObserver {
    /// Run started; `total` is the input length when known.
    fn on_start(&self, _total: Option<u64>) {}

    /// `n` input bytes were fully processed and their output written.
    /// On decrypt the header's bytes are counted with the first block, or on
    /// their own at the end when the container has no blocks.
    fn on_bytes(&self, _n: u64) {}

    fn on_done(&self) {}

    fn on_failed(&self, _err: &StreamError) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}
