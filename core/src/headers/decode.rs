//! headers/decode.rs
//!
//! Header decoding from a byte stream.
//!
//! Design notes:
//! - Magic is read and checked first; nothing else is trusted on mismatch.
//! - End of stream inside a fixed field is `TruncatedHeader`, inside the salt
//!   it is `InvalidSaltLength`.
//! - The salt is read through `Read::take` so a hostile length prefix cannot
//!   force a large up-front allocation.
//! - Algorithm/nonce-size consistency is left to `Header::validate`, which the
//!   decrypt path runs before deriving any key.

use std::io::{self, Read};
use byteorder::{LittleEndian, ReadBytesExt};

use crate::constants::MAGIC_CRPT;
use crate::headers::types::{Header, HeaderError};

fn truncated(field: &'static str) -> impl FnOnce(io::Error) -> HeaderError {
    move |e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HeaderError::TruncatedHeader { field },
        _ => HeaderError::Io(e),
    }
}

/// Read a header from the front of `r`, leaving `r` positioned at block 0.
pub fn decode_header_le<R: Read + ?Sized>(r: &mut R) -> Result<Header, HeaderError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic).map_err(truncated("magic"))?;
    if magic != MAGIC_CRPT {
        return Err(HeaderError::BadMagic { have: magic, need: MAGIC_CRPT });
    }

    let algorithm_id = r.read_u16::<LittleEndian>().map_err(truncated("algorithm_id"))?;
    let block_size = r.read_u64::<LittleEndian>().map_err(truncated("block_size"))?;
    let salt_size = r.read_u32::<LittleEndian>().map_err(truncated("salt_size"))?;

    let mut salt = Vec::new();
    (&mut *r)
        .take(u64::from(salt_size))
        .read_to_end(&mut salt)
        .map_err(HeaderError::Io)?;
    if salt.len() != salt_size as usize {
        return Err(HeaderError::InvalidSaltLength {
            declared: salt_size,
            available: salt.len(),
        });
    }

    let nonce_size = r.read_u32::<LittleEndian>().map_err(truncated("nonce_size"))?;

    if block_size == 0 {
        return Err(HeaderError::InvalidBlockSize);
    }

    Ok(Header {
        magic,
        algorithm_id,
        block_size,
        salt,
        nonce_size,
    })
}
