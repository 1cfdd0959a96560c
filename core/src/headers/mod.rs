//! headers/mod.rs
//! Container header: magic, algorithm id, block size, salt, nonce size.
//!
//! Notes:
//! - Fixed prefix (magic, id, block size, salt length) followed by the
//!   variable salt and a trailing nonce size.
//! - Little-endian across all multi-byte integers.
//! - The header is not authenticated; decode validates the magic before any
//!   other field is trusted and the per-block tags catch everything else.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
