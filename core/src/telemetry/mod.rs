//! telemetry/mod.rs
//! Counters, stage timers and the snapshot returned by every successful run.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
