//! crypto/aead.rs
//! AEAD interface over the closed algorithm set.
//!
//! Design notes:
//! - One enum variant per algorithm; every operation is a single match.
//! - Blocks carry no associated data: each block is nonce ++ ciphertext ++ tag.
//! - A fresh random nonce is drawn for every `encrypt_block` call.
//! - Tag verification fails closed: no partial plaintext is ever returned.

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, Nonce, Tag};
use aes_gcm::aead::consts::U12;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use chacha20poly1305::XChaCha20Poly1305;

use crate::constants::TAG_LEN;
use crate::crypto::nonce::generate_nonce;
use crate::crypto::types::{Algorithm, CryptoError};

/// AES-192 in GCM mode; `aes-gcm` does not export a ready-made alias.
pub type Aes192Gcm = AesGcm<aes_gcm::aes::Aes192, U12>;

/// Keyed cipher instance, immutable for one run.
#[derive(Clone)]
pub enum CipherAlgorithm {
    Aes128Gcm(Aes128Gcm),
    Aes192Gcm(Aes192Gcm),
    Aes256Gcm(Aes256Gcm),
    XChaCha20Poly1305(XChaCha20Poly1305),
}

impl std::fmt::Debug for CipherAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_tuple("CipherAlgorithm").field(&self.algorithm()).finish()
    }
}

fn key_init<C: KeyInit>(key: &[u8], expected: usize) -> Result<C, CryptoError> {
    C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLen { expected, actual: key.len() })
}

fn seal_with<C: AeadInPlace>(cipher: &C, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let nonce_len = C::NonceSize::USIZE;
    let nonce = generate_nonce(nonce_len);

    let mut out = Vec::with_capacity(nonce_len + plaintext.len() + TAG_LEN);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(plaintext);

    let tag = cipher
        .encrypt_in_place_detached(Nonce::<C>::from_slice(&nonce), &[], &mut out[nonce_len..])
        .map_err(|_| CryptoError::Failure("AEAD seal failed".into()))?;
    out.extend_from_slice(&tag);
    Ok(out)
}

fn open_with<C: AeadInPlace>(cipher: &C, nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let nonce_len = C::NonceSize::USIZE;
    if nonce.len() != nonce_len {
        return Err(CryptoError::InvalidNonceLen { expected: nonce_len, actual: nonce.len() });
    }
    if sealed.len() < TAG_LEN {
        return Err(CryptoError::AuthenticationFailure);
    }

    let (ct, tag) = sealed.split_at(sealed.len() - TAG_LEN);
    let mut buf = ct.to_vec();
    cipher
        .decrypt_in_place_detached(Nonce::<C>::from_slice(nonce), &[], &mut buf, Tag::<C>::from_slice(tag))
        .map_err(|_| CryptoError::AuthenticationFailure)?;
    Ok(buf)
}

impl CipherAlgorithm {
    /// Key the cipher for `algorithm`. `key` must be exactly `algorithm.key_len()` bytes.
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self, CryptoError> {
        let expected = algorithm.key_len();
        if key.len() != expected {
            return Err(CryptoError::InvalidKeyLen { expected, actual: key.len() });
        }

        Ok(match algorithm {
            Algorithm::Aes128Gcm => Self::Aes128Gcm(key_init(key, expected)?),
            Algorithm::Aes192Gcm => Self::Aes192Gcm(key_init(key, expected)?),
            Algorithm::Aes256Gcm => Self::Aes256Gcm(key_init(key, expected)?),
            Algorithm::XChaCha20Poly1305 => Self::XChaCha20Poly1305(key_init(key, expected)?),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Aes128Gcm(_) => Algorithm::Aes128Gcm,
            Self::Aes192Gcm(_) => Algorithm::Aes192Gcm,
            Self::Aes256Gcm(_) => Algorithm::Aes256Gcm,
            Self::XChaCha20Poly1305(_) => Algorithm::XChaCha20Poly1305,
        }
    }

    pub fn nonce_size(&self) -> usize {
        match self {
            Self::Aes128Gcm(_) => <Aes128Gcm as AeadCore>::NonceSize::USIZE,
            Self::Aes192Gcm(_) => <Aes192Gcm as AeadCore>::NonceSize::USIZE,
            Self::Aes256Gcm(_) => <Aes256Gcm as AeadCore>::NonceSize::USIZE,
            Self::XChaCha20Poly1305(_) => <XChaCha20Poly1305 as AeadCore>::NonceSize::USIZE,
        }
    }

    pub fn tag_size(&self) -> usize {
        TAG_LEN
    }

    /// Seal one block: returns `nonce ++ ciphertext ++ tag`.
    pub fn encrypt_block(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            Self::Aes128Gcm(c) => seal_with(c, plaintext),
            Self::Aes192Gcm(c) => seal_with(c, plaintext),
            Self::Aes256Gcm(c) => seal_with(c, plaintext),
            Self::XChaCha20Poly1305(c) => seal_with(c, plaintext),
        }
    }

    /// Open one block given its nonce and `ciphertext ++ tag`.
    ///
    /// Errors:
    /// - `AuthenticationFailure` on any tag mismatch (wrong key, tampering).
    /// - `InvalidNonceLen` if `nonce` is not `nonce_size()` bytes.
    pub fn decrypt_block(&self, nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            Self::Aes128Gcm(c) => open_with(c, nonce, sealed),
            Self::Aes192Gcm(c) => open_with(c, nonce, sealed),
            Self::Aes256Gcm(c) => open_with(c, nonce, sealed),
            Self::XChaCha20Poly1305(c) => open_with(c, nonce, sealed),
        }
    }
}
