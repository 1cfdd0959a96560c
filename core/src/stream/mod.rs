//! stream: block-streaming encrypt/decrypt over the CRPT container.
//!
//! Layers, bottom up:
//! - `io`: input/output normalization and block readers
//! - `pipeline`: source thread + transform/sink wiring
//! - `core`: public entry points (key derivation, planning, header I/O)

pub mod types;
pub mod io;
pub mod progress;
pub mod pipeline;
pub mod core;

pub use types::{CancelToken, PipelineState, PlainBlock, SealedBlock};

pub use io::{
    InputSource,
    OutputSink,
};

pub use progress::{NoopProgress, ProgressObserver};

pub use self::core::{
    ApiConfig,
    DecryptParams,
    EncryptParams,
    HeaderInfo,
    encrypt_stream,
    decrypt_stream,
    encrypt_file,
    decrypt_file,
    inspect_header,
};
