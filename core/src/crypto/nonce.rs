//! crypto/nonce.rs
//! Random salts and per-block nonces.
//!
//! Every nonce comes straight from the OS CSPRNG. With 96-bit nonces the
//! birthday bound sits far above any block count a single key can see here,
//! and XChaCha's 192-bit nonce removes the concern entirely.

use rand::rngs::OsRng;
use rand::RngCore;

/// Fresh random bytes of the requested length.
#[inline]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    OsRng.fill_bytes(&mut out);
    out
}

/// Salt for one container.
#[inline]
pub fn generate_salt(len: usize) -> Vec<u8> {
    random_bytes(len)
}

/// Nonce for one block.
#[inline]
pub fn generate_nonce(len: usize) -> Vec<u8> {
    random_bytes(len)
}
