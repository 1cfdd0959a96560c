//! stream/core.rs
//! Stable public API: encrypt/decrypt over streams and files, header inspection.
//!
//! Order of work on decrypt: header (magic first), algorithm lookup, header
//! validation, then key derivation. A file that is not a container never
//! costs a KDF run.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::constants::{DEFAULT_ALGORITHM, DEFAULT_SALT_SIZE, TAG_LEN};
use crate::crypto::{generate_salt, Algorithm, CipherAlgorithm, CryptoError, KeyDeriver, Pbkdf2Sha3};
use crate::headers::Header;
use crate::planner::{plan_with_probe, MemoryProbe, SystemMemory};
use crate::stream::io::{open_input, open_output, read_header, take_captured, InputSource, OutputSink};
use crate::stream::pipeline::{run_decrypt_pipeline, run_encrypt_pipeline, PipelineContext};
use crate::stream::progress::ProgressObserver;
use crate::stream::types::CancelToken;
use crate::telemetry::{Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::{IoOp, StreamError};

const FILE_BUF_CAPACITY: usize = 64 * 1024;

#[derive(Clone)]
pub struct ApiConfig {
    /// Free-memory source for block planning.
    pub memory: Arc<dyn MemoryProbe>,

    /// Password-to-key function.
    pub kdf: Arc<dyn KeyDeriver>,

    /// Checked by the source before each read and by the sink before each write.
    pub cancel: CancelToken,

    /// Fixed block size; skips planning (and the memory query) when set.
    /// Required for encrypt inputs of unknown length.
    pub block_size: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            memory: Arc::new(SystemMemory),
            kdf: Arc::new(Pbkdf2Sha3::default()),
            cancel: CancelToken::new(),
            block_size: None,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("cancel", &self.cancel)
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = Some(block_size);
        self
    }

    pub fn with_kdf(mut self, kdf: impl KeyDeriver + 'static) -> Self {
        self.kdf = Arc::new(kdf);
        self
    }

    pub fn with_memory(mut self, memory: impl MemoryProbe + 'static) -> Self {
        self.memory = Arc::new(memory);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[derive(Clone)]
pub struct EncryptParams<'a> {
    pub password: &'a [u8],
    pub algorithm: Algorithm,
}

impl<'a> EncryptParams<'a> {
    pub fn new(password: &'a [u8], algorithm: Algorithm) -> Self {
        Self { password, algorithm }
    }

    /// Resolve `name` against the registry; `None` picks the default algorithm.
    pub fn from_name(password: &'a [u8], name: Option<&str>) -> Result<Self, StreamError> {
        let algorithm: Algorithm = name.unwrap_or(DEFAULT_ALGORITHM).parse()?;
        Ok(Self { password, algorithm })
    }
}

impl fmt::Debug for EncryptParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptParams")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct DecryptParams<'a> {
    pub password: &'a [u8],
}

impl<'a> DecryptParams<'a> {
    pub fn new(password: &'a [u8]) -> Self {
        Self { password }
    }
}

/// Decoded header plus what can be inferred from it without a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    pub header: Header,
    pub algorithm: Algorithm,
    pub header_len: u64,
    pub container_len: Option<u64>,
    /// Expected plaintext length when the container length is known and its
    /// block layout is consistent.
    pub plaintext_len: Option<u64>,
}

fn derive_cipher(
    kdf: &dyn KeyDeriver,
    password: &[u8],
    header: &Header,
    algorithm: Algorithm,
    timer: &mut TelemetryTimer,
) -> Result<CipherAlgorithm, StreamError> {
    let key: Zeroizing<Vec<u8>> =
        timer.time(Stage::DeriveKey, || kdf.derive(password, &header.salt, algorithm.key_len()))?;
    Ok(CipherAlgorithm::new(algorithm, &key)?)
}

/// Decoded header -> registered algorithm, with the header checked against it.
fn resolve_algorithm(header: &Header) -> Result<Algorithm, StreamError> {
    let algorithm = Algorithm::from_id(header.algorithm_id)
        .ok_or(CryptoError::UnsupportedAlgorithmId { id: header.algorithm_id })?;
    header.validate()?;
    Ok(algorithm)
}

fn report<T>(progress: &dyn ProgressObserver, res: Result<T, StreamError>) -> Result<T, StreamError> {
    match &res {
        Ok(_) => progress.on_done(),
        Err(e) => progress.on_failed(e),
    }
    res
}

/// 🔐 Encrypt `input` into a CRPT container on `output`.
pub fn encrypt_stream(
    input: InputSource,
    output: OutputSink,
    params: &EncryptParams<'_>,
    config: &ApiConfig,
    progress: &dyn ProgressObserver,
) -> Result<TelemetrySnapshot, StreamError> {
    report(progress, encrypt_inner(input, output, params, config, progress))
}

fn encrypt_inner(
    input: InputSource,
    output: OutputSink,
    params: &EncryptParams<'_>,
    config: &ApiConfig,
    progress: &dyn ProgressObserver,
) -> Result<TelemetrySnapshot, StreamError> {
    let mut timer = TelemetryTimer::new();
    let algorithm = params.algorithm;
    let opened = open_input(input)?;

    let block_size = match (config.block_size, opened.len) {
        (Some(0), _) => return Err(StreamError::Validation("block size must be non-zero".into())),
        (Some(fixed), _) => fixed,
        (None, Some(len)) => plan_with_probe(len, config.memory.as_ref())?,
        (None, None) => {
            return Err(StreamError::Validation(
                "input length unknown: set a fixed block size to encrypt this input".into(),
            ))
        }
    };
    debug!(input_len = ?opened.len, block_size, "block size chosen");

    let header = Header::new(algorithm, block_size, generate_salt(DEFAULT_SALT_SIZE));
    let cipher = derive_cipher(config.kdf.as_ref(), params.password, &header, algorithm, &mut timer)?;

    if config.cancel.is_cancelled() {
        return Err(StreamError::Cancelled);
    }

    let (writer, captured) = open_output(output)?;
    progress.on_start(opened.len);

    let ctx = PipelineContext {
        cipher: &cipher,
        cancel: &config.cancel,
        progress,
    };
    let mut snapshot = run_encrypt_pipeline(opened.reader, writer, &header, &ctx, timer)?;

    if let Some(buf) = captured {
        snapshot.attach_output(take_captured(&buf)?);
    }
    info!(%algorithm, blocks = snapshot.blocks, bytes = snapshot.bytes_plaintext, "encrypted");
    Ok(snapshot)
}

/// 🔓 Decrypt a CRPT container from `input` onto `output`.
pub fn decrypt_stream(
    input: InputSource,
    output: OutputSink,
    params: &DecryptParams<'_>,
    config: &ApiConfig,
    progress: &dyn ProgressObserver,
) -> Result<TelemetrySnapshot, StreamError> {
    report(progress, decrypt_inner(input, output, params, config, progress))
}

fn decrypt_inner(
    input: InputSource,
    output: OutputSink,
    params: &DecryptParams<'_>,
    config: &ApiConfig,
    progress: &dyn ProgressObserver,
) -> Result<TelemetrySnapshot, StreamError> {
    let mut timer = TelemetryTimer::new();
    let mut opened = open_input(input)?;

    let header = read_header(&mut opened.reader)?;
    let algorithm = resolve_algorithm(&header)?;
    let remaining = opened
        .len
        .map(|len| len.saturating_sub(header.encoded_len() as u64));
    debug!(%algorithm, block_size = header.block_size, ?remaining, "header read");

    let cipher = derive_cipher(config.kdf.as_ref(), params.password, &header, algorithm, &mut timer)?;

    if config.cancel.is_cancelled() {
        return Err(StreamError::Cancelled);
    }

    let (writer, captured) = open_output(output)?;
    progress.on_start(opened.len);

    let ctx = PipelineContext {
        cipher: &cipher,
        cancel: &config.cancel,
        progress,
    };
    let mut snapshot = run_decrypt_pipeline(opened.reader, writer, &header, remaining, &ctx, timer)?;

    if let Some(buf) = captured {
        snapshot.attach_output(take_captured(&buf)?);
    }
    info!(%algorithm, blocks = snapshot.blocks, bytes = snapshot.bytes_plaintext, "decrypted");
    Ok(snapshot)
}

/// Read and validate the header of `input` without deriving any key.
pub fn inspect_header(input: InputSource) -> Result<HeaderInfo, StreamError> {
    let mut opened = open_input(input)?;
    let header = read_header(&mut opened.reader)?;
    let algorithm = resolve_algorithm(&header)?;
    let header_len = header.encoded_len() as u64;

    let plaintext_len = opened
        .len
        .and_then(|len| expected_plaintext_len(&header, len.checked_sub(header_len)?));

    Ok(HeaderInfo {
        algorithm,
        header_len,
        container_len: opened.len,
        plaintext_len,
        header,
    })
}

/// Plaintext length implied by `payload` container bytes after the header,
/// or `None` when the bytes cannot be a whole number of blocks.
fn expected_plaintext_len(header: &Header, payload: u64) -> Option<u64> {
    let framing = u64::from(header.nonce_size) + TAG_LEN as u64;
    let full = header.block_size.checked_add(framing)?;
    let (whole, rest) = (payload / full, payload % full);
    let tail = match rest {
        0 => 0,
        r if r > framing => r - framing,
        _ => return None,
    };
    whole.checked_mul(header.block_size)?.checked_add(tail)
}

// ================= File entry points =================
//
// File runs write into a temporary sibling of the output and rename it over
// the output only once the run drained. A failed run never touches an
// existing output; dropping the staged file removes it.

struct FileRun {
    input: File,
    len: u64,
    staged: NamedTempFile,
}

/// Open `input`, reject `output == input`, and stage a temp file next to `output`.
fn open_file_run(input: &Path, output: &Path) -> Result<FileRun, StreamError> {
    let file = File::open(input).map_err(|e| StreamError::io_path(IoOp::Open, input, e))?;
    let len = file
        .metadata()
        .map_err(|e| StreamError::io_path(IoOp::Open, input, e))?
        .len();

    if let (Ok(a), Ok(b)) = (fs::canonicalize(input), fs::canonicalize(output)) {
        if a == b {
            return Err(StreamError::Validation(format!(
                "input and output are the same file: {}",
                input.display()
            )));
        }
    }

    let parent = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(parent).map_err(|e| StreamError::io_path(IoOp::Create, output, e))?;
    debug!(staged = %staged.path().display(), output = %output.display(), "staging output");

    Ok(FileRun { input: file, len, staged })
}

impl FileRun {
    fn source(&self) -> Result<InputSource, StreamError> {
        let input = self.input.try_clone().map_err(|e| StreamError::io(IoOp::Open, e))?;
        Ok(InputSource::Reader {
            reader: Box::new(BufReader::with_capacity(FILE_BUF_CAPACITY, input)),
            len: Some(self.len),
        })
    }

    fn sink(&self) -> Result<OutputSink, StreamError> {
        let out = self.staged.as_file().try_clone().map_err(|e| StreamError::io(IoOp::Create, e))?;
        Ok(OutputSink::Writer(Box::new(BufWriter::with_capacity(FILE_BUF_CAPACITY, out))))
    }

    /// Sync the staged file and move it over `output`.
    fn commit(self, output: &Path) -> Result<(), StreamError> {
        self.staged
            .as_file()
            .sync_all()
            .map_err(|e| StreamError::io(IoOp::Write, e))?;
        self.staged
            .persist(output)
            .map_err(|e| StreamError::io_path(IoOp::Create, output, e.error))?;
        Ok(())
    }
}

/// Drive one file-to-file run: stage, run, commit on success. Progress sees
/// `on_done` only once the output is in place.
fn run_file<F>(
    input: &Path,
    output: &Path,
    progress: &dyn ProgressObserver,
    run: F,
) -> Result<TelemetrySnapshot, StreamError>
where
    F: FnOnce(InputSource, OutputSink) -> Result<TelemetrySnapshot, StreamError>,
{
    let res = open_file_run(input, output).and_then(|file_run| {
        let snapshot = run(file_run.source()?, file_run.sink()?)?;
        file_run.commit(output)?;
        Ok(snapshot)
    });

    let res = res.map_err(|e| {
        debug!(output = %output.display(), error = %e, "file run failed; output left untouched");
        match e {
            e @ StreamError::Io { op: IoOp::Read | IoOp::Open, .. } => e.with_path(input),
            e @ StreamError::Io { .. } => e.with_path(output),
            other => other,
        }
    });
    report(progress, res)
}

/// Encrypt the file at `input` into a container at `output`.
///
/// `algorithm` is a registry name (`aes256-gcm`, ...). `output` is replaced
/// only when the run succeeds.
pub fn encrypt_file(
    input: &Path,
    output: &Path,
    password: &[u8],
    algorithm: &str,
    config: &ApiConfig,
    progress: &dyn ProgressObserver,
) -> Result<TelemetrySnapshot, StreamError> {
    let params = match EncryptParams::from_name(password, Some(algorithm)) {
        Ok(p) => p,
        Err(e) => return report(progress, Err(e)),
    };
    run_file(input, output, progress, |source, sink| {
        encrypt_inner(source, sink, &params, config, progress)
    })
}

/// Decrypt the container at `input` into `output`. `output` is replaced only
/// when every block authenticated.
pub fn decrypt_file(
    input: &Path,
    output: &Path,
    password: &[u8],
    config: &ApiConfig,
    progress: &dyn ProgressObserver,
) -> Result<TelemetrySnapshot, StreamError> {
    let params = DecryptParams::new(password);
    run_file(input, output, progress, |source, sink| {
        decrypt_inner(source, sink, &params, config, progress)
    })
}
