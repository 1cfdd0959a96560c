//! cryptool-core
//!
//! Streaming chunked-AEAD file container: password-derived key, one of four
//! AEAD ciphers, and a bounded two-stage pipeline that never holds the whole
//! input in memory.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod headers;
pub mod crypto;
pub mod planner;
pub mod telemetry;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::{Algorithm, KeyDeriver, Pbkdf2Sha3};
    pub use crate::headers::Header;
    pub use crate::planner::{FixedMemory, MemoryProbe, SystemMemory};
    pub use crate::stream::{
        decrypt_file, decrypt_stream, encrypt_file, encrypt_stream, inspect_header, ApiConfig,
        CancelToken, DecryptParams, EncryptParams, HeaderInfo, InputSource, NoopProgress,
        OutputSink, ProgressObserver,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::StreamError;
}
