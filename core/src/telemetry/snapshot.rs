//! telemetry/snapshot.rs
//!
//! Immutable summary of one finished run.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::crypto::Algorithm;
use crate::stream::types::PipelineState;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub state: PipelineState,
    pub algorithm: Algorithm,
    pub block_size: u64,
    pub blocks: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    pub bytes_overhead: u64,
    pub throughput_plaintext_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
    /// Captured output when the run wrote to `OutputSink::Memory`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub output: Option<Vec<u8>>,
}

impl TelemetrySnapshot {
    pub fn from(
        state: PipelineState,
        algorithm: Algorithm,
        block_size: u64,
        counters: &TelemetryCounters,
        timer: &TelemetryTimer,
    ) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_plaintext as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            state,
            algorithm,
            block_size,
            blocks: counters.blocks,
            bytes_plaintext: counters.bytes_plaintext,
            bytes_ciphertext: counters.bytes_ciphertext,
            bytes_overhead: counters.bytes_overhead,
            throughput_plaintext_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
            output: None,
        }
    }

    pub fn attach_output(&mut self, buf: Vec<u8>) {
        self.output = Some(buf);
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Counter invariants: ciphertext = plaintext + overhead.
    pub fn sanity_check(&self) -> bool {
        self.bytes_ciphertext == self.bytes_plaintext + self.bytes_overhead
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
