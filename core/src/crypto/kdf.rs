//! crypto/kdf.rs
//! Password-based key derivation.
//!
//! Design:
//! - PBKDF2-HMAC-SHA3-256 over (password, salt) with a fixed round count.
//! - Output length follows the algorithm (16/24/32 bytes).
//! - Called once per run; keys are never cached.
//!
//! The `KeyDeriver` trait is the seam the pipeline derives through, so tests can
//! swap in a cheap or counting implementation.

use pbkdf2::pbkdf2_hmac;
use sha3::Sha3_256;
use zeroize::Zeroizing;

use crate::constants::PBKDF2_ITERATIONS;
use crate::crypto::types::CryptoError;

/// Derive a symmetric key from a password and salt.
pub trait KeyDeriver: Send + Sync {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        key_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

/// PBKDF2 with HMAC-SHA3-256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Sha3 {
    pub iterations: u32,
}

impl Pbkdf2Sha3 {
    /// Non-default round count. Containers written with anything other than
    /// `PBKDF2_ITERATIONS` only open with the same count.
    pub fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }
}

impl Default for Pbkdf2Sha3 {
    fn default() -> Self {
        Self { iterations: PBKDF2_ITERATIONS }
    }
}

impl KeyDeriver for Pbkdf2Sha3 {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        key_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if key_len == 0 {
            return Err(CryptoError::KeyDerivation("key length must be non-zero".into()));
        }
        if self.iterations == 0 {
            return Err(CryptoError::KeyDerivation("iteration count must be non-zero".into()));
        }
        if salt.is_empty() {
            return Err(CryptoError::KeyDerivation("salt must not be empty".into()));
        }

        let mut key = Zeroizing::new(vec![0u8; key_len]);
        pbkdf2_hmac::<Sha3_256>(password, salt, self.iterations, key.as_mut_slice());
        Ok(key)
    }
}

/// Convenience wrapper over the default deriver.
#[inline]
pub fn derive_key(password: &[u8], salt: &[u8], key_len: usize) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    Pbkdf2Sha3::default().derive(password, salt, key_len)
}
