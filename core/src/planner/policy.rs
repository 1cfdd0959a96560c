//! planner/policy.rs
//! Adaptive block size policy.
//!
//! - Inputs smaller than half of free memory become a single block.
//! - Larger inputs use a quarter of free memory, capped at `MAX_BLOCK_SIZE`.
//! - The result is never below `MIN_BLOCK_SIZE`, so an empty input still
//!   records a valid header.

use crate::constants::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};
use crate::planner::memory::{MemoryProbe, MemoryQueryError};

/// Pick a plaintext block size for `input_size` bytes given `available` free bytes.
pub fn plan_block_size(input_size: u64, available: u64) -> Result<u64, MemoryQueryError> {
    if available == 0 {
        return Err(MemoryQueryError::ZeroAvailable);
    }

    let planned = if input_size < available / 2 {
        input_size
    } else {
        (available / 4).min(MAX_BLOCK_SIZE)
    };

    Ok(planned.max(MIN_BLOCK_SIZE))
}

/// Query `probe` and plan in one step.
pub fn plan_with_probe(input_size: u64, probe: &dyn MemoryProbe) -> Result<u64, MemoryQueryError> {
    let available = probe.available_memory()?;
    plan_block_size(input_size, available)
}
