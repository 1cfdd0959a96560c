//! planner/memory.rs
//! Available-memory probes.

use std::fmt;
use sysinfo::System;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryQueryError {
    /// Platform has no memory statistics.
    Unsupported,
    /// Probe reported zero free bytes.
    ZeroAvailable,
}

impl fmt::Display for MemoryQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryQueryError::Unsupported =>
                write!(f, "memory query failed: platform not supported"),
            MemoryQueryError::ZeroAvailable =>
                write!(f, "memory query failed: zero bytes available"),
        }
    }
}

impl std::error::Error for MemoryQueryError {}

/// Source of the free-memory figure the planner sizes blocks against.
pub trait MemoryProbe: Send + Sync {
    /// Currently available memory in bytes.
    fn available_memory(&self) -> Result<u64, MemoryQueryError>;
}

/// Live system figure via `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMemory;

impl MemoryProbe for SystemMemory {
    fn available_memory(&self) -> Result<u64, MemoryQueryError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(MemoryQueryError::Unsupported);
        }

        let mut sys = System::new();
        sys.refresh_memory();

        match sys.available_memory() {
            0 => Err(MemoryQueryError::ZeroAvailable),
            bytes => Ok(bytes),
        }
    }
}

/// Fixed figure for deterministic callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMemory(pub u64);

impl MemoryProbe for FixedMemory {
    fn available_memory(&self) -> Result<u64, MemoryQueryError> {
        match self.0 {
            0 => Err(MemoryQueryError::ZeroAvailable),
            bytes => Ok(bytes),
        }
    }
}
