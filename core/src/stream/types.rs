//! stream/types.rs
//! Blocks in flight and run-level control state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Serialize, Deserialize};

/// Plaintext block produced by the encrypt-side source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainBlock {
    pub index: u64,
    /// Offset of the first byte in the plaintext stream.
    pub offset: u64,
    pub bytes: Bytes,
}

/// Framed block produced by the decrypt-side source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlock {
    pub index: u64,
    /// Offset of the nonce in the container.
    pub offset: u64,
    pub nonce: Bytes,
    /// Ciphertext followed by the tag.
    pub sealed: Bytes,
}

impl SealedBlock {
    pub fn wire_len(&self) -> usize {
        self.nonce.len() + self.sealed.len()
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pipeline lifecycle: `Idle -> HeaderWritten|HeaderRead -> Streaming -> Drained|Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    HeaderWritten,
    HeaderRead,
    Streaming,
    Drained,
    Failed,
}
