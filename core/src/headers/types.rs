//! headers/types.rs
//! Header struct and header errors.

use std::fmt;

use serde::Serialize;

use crate::constants::{MAGIC_CRPT, DEFAULT_SALT_SIZE};
use crate::crypto::Algorithm;
use crate::utils::{enum_name_or_hex, fmt_bytes};

/// Container header.
///
/// `salt_size` is not stored separately: it is always `salt.len()`, so the
/// encoded length prefix cannot drift from the stored bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub magic: [u8; 4],     // "CRPT"
    pub algorithm_id: u16,  // see constants::algorithm_ids
    pub block_size: u64,    // plaintext bytes per block (last may be shorter)
    pub salt: Vec<u8>,      // KDF salt, random per container
    pub nonce_size: u32,    // per-block nonce length
}

impl Header {
    /// Fixed bytes around the salt: magic + id + block size + salt len + nonce size.
    pub const FIXED_LEN: usize = 4 + 2 + 8 + 4 + 4;

    /// Build a header for `algorithm`, taking the nonce size from the algorithm.
    pub fn new(algorithm: Algorithm, block_size: u64, salt: Vec<u8>) -> Self {
        Self {
            magic: MAGIC_CRPT,
            algorithm_id: algorithm.id(),
            block_size,
            salt,
            nonce_size: algorithm.nonce_size() as u32,
        }
    }

    /// Canonical header for tests.
    pub fn test_header() -> Self {
        Self::new(Algorithm::Aes256Gcm, 64 * 1024, vec![0xA5; DEFAULT_SALT_SIZE])
    }

    pub fn salt_size(&self) -> u32 {
        self.salt.len() as u32
    }

    /// Total encoded length, i.e. the offset of block 0.
    pub fn encoded_len(&self) -> usize {
        Self::FIXED_LEN + self.salt.len()
    }

    /// Resolve the algorithm id against the registry.
    pub fn algorithm(&self) -> Result<Algorithm, HeaderError> {
        Algorithm::from_id(self.algorithm_id)
            .ok_or(HeaderError::UnknownAlgorithm { raw: self.algorithm_id })
    }

    /// Cross-field checks run on both encode and decode.
    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.magic != MAGIC_CRPT {
            return Err(HeaderError::BadMagic { have: self.magic, need: MAGIC_CRPT });
        }
        if self.block_size == 0 {
            return Err(HeaderError::InvalidBlockSize);
        }
        if self.salt.len() > u32::MAX as usize {
            return Err(HeaderError::SaltTooLarge { len: self.salt.len() });
        }

        let algorithm = self.algorithm()?;
        if self.nonce_size as usize != algorithm.nonce_size() {
            return Err(HeaderError::NonceSizeMismatch {
                algorithm_id: self.algorithm_id,
                have: self.nonce_size,
                need: algorithm.nonce_size() as u32,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum HeaderError {
    /// Magic marker is not "CRPT".
    BadMagic { have: [u8; 4], need: [u8; 4] },

    /// Stream ended inside a fixed-size field.
    TruncatedHeader { field: &'static str },

    /// Declared salt length exceeds what the stream holds.
    InvalidSaltLength { declared: u32, available: usize },

    /// Block size zero.
    InvalidBlockSize,

    /// Algorithm id not in the registry.
    UnknownAlgorithm { raw: u16 },

    /// Stored nonce size disagrees with the algorithm.
    NonceSizeMismatch { algorithm_id: u16, have: u32, need: u32 },

    /// Salt cannot be length-prefixed with a u32.
    SaltTooLarge { len: usize },

    /// Underlying reader failed for a reason other than end of stream.
    Io(std::io::Error),
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use HeaderError::*;
        match self {
            BadMagic { have, need } =>
                write!(f, "bad magic: expected {}, got {}", fmt_bytes(need), fmt_bytes(have)),
            TruncatedHeader { field } =>
                write!(f, "truncated header: stream ended inside `{}`", field),
            InvalidSaltLength { declared, available } =>
                write!(f, "invalid salt length: declared {} bytes, stream holds {}", declared, available),
            InvalidBlockSize =>
                write!(f, "invalid block size: zero"),
            UnknownAlgorithm { raw } =>
                write!(f, "unknown algorithm: {}", enum_name_or_hex::<Algorithm>(*raw)),
            NonceSizeMismatch { algorithm_id, have, need } =>
                write!(f, "nonce size {} does not match {} (expects {})",
                       have, enum_name_or_hex::<Algorithm>(*algorithm_id), need),
            SaltTooLarge { len } =>
                write!(f, "salt too large: {} bytes", len),
            Io(e) =>
                write!(f, "header read failed: {}", e),
        }
    }
}

impl std::error::Error for HeaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeaderError::Io(e) => Some(e),
            _ => None,
        }
    }
}
