//! Format and compatibility constants.
//!
//! Every value here is part of the on-disk contract. Changing any of them
//! makes previously written containers unreadable.

/// Magic marker at offset 0 of every container.
pub const MAGIC_CRPT: [u8; 4] = *b"CRPT";

/// File extension used for containers by path-naming collaborators.
pub const CONTAINER_EXTENSION: &str = "crpt";

/// Random salt length written by the encrypt path.
pub const DEFAULT_SALT_SIZE: usize = 16;

/// PBKDF2-HMAC-SHA3-256 rounds.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Upper bound for a planned block once the input no longer fits in half of free RAM.
pub const MAX_BLOCK_SIZE: u64 = 2 * 1024 * 1024 * 1024; // 2 GiB

/// Planner never hands out a zero block size.
pub const MIN_BLOCK_SIZE: u64 = 1;

/// AEAD tag length shared by every supported cipher.
pub const TAG_LEN: usize = 16;

/// Cipher algorithm identifiers (mirrored in headers).
pub mod algorithm_ids {
    pub const AES128_GCM: u16 = 1;
    pub const AES192_GCM: u16 = 2;
    pub const AES256_GCM: u16 = 3;
    pub const XCHACHA20_POLY1305: u16 = 4;
}

/// Algorithm names accepted on the encrypt path.
pub mod algorithm_names {
    pub const AES128_GCM: &str = "aes128-gcm";
    pub const AES192_GCM: &str = "aes192-gcm";
    pub const AES256_GCM: &str = "aes256-gcm";
    pub const XCHACHA20_POLY1305: &str = "chacha20-poly1305";
}

/// Algorithm picked when the caller does not name one.
pub const DEFAULT_ALGORITHM: &str = algorithm_names::AES256_GCM;
