//! crypto/types.rs
//! Algorithm registry and crypto errors.

use std::fmt;
use std::str::FromStr;

use num_enum::TryFromPrimitive;
use serde::{Serialize, Deserialize};

use crate::constants::{algorithm_names, TAG_LEN};
use crate::utils::enum_name_or_hex;

/// Closed set of supported AEAD algorithms.
///
/// Discriminants are the on-disk ids and must stay equal to `constants::algorithm_ids`.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum Algorithm {
    Aes128Gcm = 1,
    Aes192Gcm = 2,
    Aes256Gcm = 3,
    XChaCha20Poly1305 = 4,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Aes128Gcm,
        Algorithm::Aes192Gcm,
        Algorithm::Aes256Gcm,
        Algorithm::XChaCha20Poly1305,
    ];

    /// Look up by header id.
    pub fn from_id(id: u16) -> Option<Self> {
        Self::try_from_primitive(id).ok()
    }

    /// Look up by the name accepted on the encrypt path.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Aes128Gcm => algorithm_names::AES128_GCM,
            Algorithm::Aes192Gcm => algorithm_names::AES192_GCM,
            Algorithm::Aes256Gcm => algorithm_names::AES256_GCM,
            Algorithm::XChaCha20Poly1305 => algorithm_names::XCHACHA20_POLY1305,
        }
    }

    /// Derived key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Algorithm::Aes128Gcm => 16,
            Algorithm::Aes192Gcm => 24,
            Algorithm::Aes256Gcm | Algorithm::XChaCha20Poly1305 => 32,
        }
    }

    pub fn nonce_size(self) -> usize {
        match self {
            Algorithm::XChaCha20Poly1305 => 24,
            _ => 12,
        }
    }

    pub fn tag_size(self) -> usize {
        TAG_LEN
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::from_name(s).ok_or_else(|| CryptoError::UnsupportedAlgorithmName { name: s.to_string() })
    }
}

#[derive(Debug)]
pub enum CryptoError {
    /// Header carries an id outside the registry.
    UnsupportedAlgorithmId { id: u16 },

    /// Caller named an algorithm outside the registry.
    UnsupportedAlgorithmName { name: String },

    /// Key length does not match the algorithm.
    InvalidKeyLen { expected: usize, actual: usize },

    /// Nonce length does not match the algorithm.
    InvalidNonceLen { expected: usize, actual: usize },

    /// KDF rejected its inputs.
    KeyDerivation(String),

    /// AEAD tag did not verify.
    AuthenticationFailure,

    /// Any other primitive failure.
    Failure(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CryptoError::*;
        match self {
            UnsupportedAlgorithmId { id } =>
                write!(f, "unsupported algorithm: {}", enum_name_or_hex::<Algorithm>(*id)),
            UnsupportedAlgorithmName { name } =>
                write!(f, "unsupported algorithm: {:?} (expected one of {})", name,
                       Algorithm::ALL.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")),
            InvalidKeyLen { expected, actual } =>
                write!(f, "invalid key length: expected={}, actual={}", expected, actual),
            InvalidNonceLen { expected, actual } =>
                write!(f, "invalid nonce length: expected={}, actual={}", expected, actual),
            KeyDerivation(msg) =>
                write!(f, "key derivation failed: {}", msg),
            AuthenticationFailure =>
                write!(f, "authentication failed: AEAD tag mismatch"),
            Failure(msg) =>
                write!(f, "crypto failure: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}
