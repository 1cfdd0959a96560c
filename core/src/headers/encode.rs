//! headers/encode.rs
//!
//! Header encoding.
//!
//! Design notes:
//! - Field order must match `decode.rs` exactly.
//! - Validation runs before encoding so an invalid header never reaches disk.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::headers::types::{Header, HeaderError};

/// Serialize a `Header` into its little-endian wire form.
///
/// # Returns
/// - `Ok(Vec<u8>)` of exactly `header.encoded_len()` bytes.
/// - `Err(HeaderError)` if validation fails (bad magic, zero block size,
///   unknown algorithm, nonce size mismatch).
pub fn encode_header_le(h: &Header) -> Result<Vec<u8>, HeaderError> {
    h.validate()?;

    let mut out = Vec::with_capacity(h.encoded_len());

    // Writes into a Vec cannot fail.
    out.extend_from_slice(&h.magic);                                         // 0..4
    out.write_u16::<LittleEndian>(h.algorithm_id).map_err(HeaderError::Io)?; // 4..6
    out.write_u64::<LittleEndian>(h.block_size).map_err(HeaderError::Io)?;   // 6..14
    out.write_u32::<LittleEndian>(h.salt_size()).map_err(HeaderError::Io)?;  // 14..18
    out.extend_from_slice(&h.salt);                                          // 18..18+S
    out.write_u32::<LittleEndian>(h.nonce_size).map_err(HeaderError::Io)?;   // 18+S..22+S

    debug_assert_eq!(out.len(), h.encoded_len(), "encoding wrote incorrect length");

    Ok(out)
}
