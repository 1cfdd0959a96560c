use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::{
    crypto::CryptoError,
    headers::HeaderError,
    planner::MemoryQueryError,
};

/// Which I/O operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Open,
    Create,
    Read,
    Write,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoOp::Open => "open",
            IoOp::Create => "create",
            IoOp::Read => "read",
            IoOp::Write => "write",
        })
    }
}

/// Unified stream error covering header, crypto, framing, I/O and planning.
/// - Block-level variants carry the block index and the byte offset of the
///   block within the stream it was read from.
/// - The first error of a run is the one surfaced; nothing is retried.
#[derive(Debug)]
pub enum StreamError {
    /// Header could not be decoded or failed validation.
    Header(HeaderError),

    /// Algorithm lookup, key setup or key derivation failed.
    Crypto(CryptoError),

    /// Block tag did not verify (wrong password or tampering).
    Authentication { block_index: u64, offset: u64 },

    /// Container ended inside a block.
    TruncatedCiphertext { block_index: u64, offset: u64, expected: u64, actual: u64 },

    /// Underlying I/O failed.
    Io { op: IoOp, path: Option<PathBuf>, offset: Option<u64>, source: io::Error },

    /// Free memory could not be determined for block planning.
    MemoryQuery(MemoryQueryError),

    /// Run was cancelled through its `CancelToken`.
    Cancelled,

    /// Stage wiring failed (a channel closed early or a stage panicked).
    PipelineError(&'static str),

    /// Caller supplied inconsistent parameters.
    Validation(String),
}

impl StreamError {
    pub fn io(op: IoOp, source: io::Error) -> Self {
        StreamError::Io { op, path: None, offset: None, source }
    }

    pub fn io_at(op: IoOp, offset: u64, source: io::Error) -> Self {
        StreamError::Io { op, path: None, offset: Some(offset), source }
    }

    pub fn io_path(op: IoOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StreamError::Io { op, path: Some(path.into()), offset: None, source }
    }

    /// Attach a path to an I/O error that was raised without one.
    pub fn with_path(self, p: impl Into<PathBuf>) -> Self {
        match self {
            StreamError::Io { op, path: None, offset, source } =>
                StreamError::Io { op, path: Some(p.into()), offset, source },
            other => other,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, StreamError::Authentication { .. })
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Header(e) => write!(f, "header error: {}", e),
            StreamError::Crypto(e) => write!(f, "crypto error: {}", e),
            StreamError::Authentication { block_index, offset } =>
                write!(f, "authentication failed at block {} (offset {}): wrong password or corrupted data",
                       block_index, offset),
            StreamError::TruncatedCiphertext { block_index, offset, expected, actual } =>
                write!(f, "truncated ciphertext at block {} (offset {}): expected {} bytes, got {}",
                       block_index, offset, expected, actual),
            StreamError::Io { op, path, offset, source } => {
                write!(f, "I/O error ({})", op)?;
                if let Some(p) = path {
                    write!(f, " on {}", p.display())?;
                }
                if let Some(o) = offset {
                    write!(f, " at offset {}", o)?;
                }
                write!(f, ": {}", source)
            }
            StreamError::MemoryQuery(e) => write!(f, "{}", e),
            StreamError::Cancelled => write!(f, "operation cancelled"),
            StreamError::PipelineError(msg) => write!(f, "pipeline error: {}", msg),
            StreamError::Validation(msg) => write!(f, "validation error: {}", msg),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Header(e) => Some(e),
            StreamError::Crypto(e) => Some(e),
            StreamError::Io { source, .. } => Some(source),
            StreamError::MemoryQuery(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HeaderError> for StreamError {
    fn from(e: HeaderError) -> Self {
        StreamError::Header(e)
    }
}

impl From<CryptoError> for StreamError {
    fn from(e: CryptoError) -> Self {
        StreamError::Crypto(e)
    }
}

impl From<MemoryQueryError> for StreamError {
    fn from(e: MemoryQueryError) -> Self {
        StreamError::MemoryQuery(e)
    }
}
