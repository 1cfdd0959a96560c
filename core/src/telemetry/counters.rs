//! telemetry/counters.rs
//! Mutable counters collected while a pipeline runs.
//!
//! Converted into an immutable `TelemetrySnapshot` at pipeline end.

use serde::{Serialize, Deserialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub blocks: u64,
    pub bytes_plaintext: u64,
    /// Container bytes, header included.
    pub bytes_ciphertext: u64,
    /// Header plus per-block nonce and tag.
    pub bytes_overhead: u64,
}

impl TelemetryCounters {
    /// Record the container header.
    pub fn add_header(&mut self, header_len: usize) {
        self.bytes_ciphertext += header_len as u64;
        self.bytes_overhead += header_len as u64;
    }

    /// Record one block.
    ///
    /// - `pt_len`: plaintext bytes in the block
    /// - `nonce_len`, `tag_len`: framing around the ciphertext
    pub fn add_block(&mut self, pt_len: usize, nonce_len: usize, tag_len: usize) {
        self.blocks += 1;
        self.bytes_plaintext += pt_len as u64;
        self.bytes_ciphertext += (nonce_len + pt_len + tag_len) as u64;
        self.bytes_overhead += (nonce_len + tag_len) as u64;
    }
}
