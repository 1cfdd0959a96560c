//! stream/pipeline.rs
//! Pipeline wiring: one source thread, transform + sink on the calling thread.
//!
//! - The stages share a bounded channel of capacity one carrying
//!   `Result<Block, StreamError>`; data and errors travel the same slot.
//! - The sink stops at the first `Err`, drops the receiver and joins the
//!   source, whose next `send` then fails and ends it.
//! - Blocks are written in the order they were read; there is no reordering
//!   and no parallel transform.
//! - A block is written only after its transform fully succeeded.

use std::io::{Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, trace, warn};

use crate::constants::TAG_LEN;
use crate::crypto::{CipherAlgorithm, CryptoError};
use crate::headers::Header;
use crate::stream::io::{self, CiphertextBlockReader, PlaintextBlockReader};
use crate::stream::progress::ProgressObserver;
use crate::stream::types::{CancelToken, PipelineState, PlainBlock, SealedBlock};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{IoOp, StreamError};

/// Everything a run shares read-only between its stages.
pub struct PipelineContext<'a> {
    pub cipher: &'a CipherAlgorithm,
    pub cancel: &'a CancelToken,
    pub progress: &'a dyn ProgressObserver,
}

/// Source loop shared by both directions. Returns the time spent reading.
fn run_source<T>(
    tx: Sender<Result<T, StreamError>>,
    cancel: CancelToken,
    mut next: impl FnMut() -> Result<Option<T>, StreamError>,
) -> Duration {
    let mut read_time = Duration::ZERO;
    loop {
        if cancel.is_cancelled() {
            debug!("source observed cancellation");
            let _ = tx.send(Err(StreamError::Cancelled));
            break;
        }

        let t = Instant::now();
        let item = next();
        read_time += t.elapsed();

        match item {
            Ok(Some(block)) => {
                if tx.send(Ok(block)).is_err() {
                    // Sink is gone; it already holds the error that ended the run.
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    }
    read_time
}

fn join_source(handle: thread::ScopedJoinHandle<'_, Duration>) -> Result<Duration, StreamError> {
    handle
        .join()
        .map_err(|_| StreamError::PipelineError("source thread panicked"))
}

// ============================================================
// Encrypt pipeline
// ============================================================

pub fn run_encrypt_pipeline<R, W>(
    reader: R,
    mut writer: W,
    header: &Header,
    ctx: &PipelineContext<'_>,
    mut timer: TelemetryTimer,
) -> Result<TelemetrySnapshot, StreamError>
where
    R: Read + Send,
    W: Write,
{
    let mut counters = TelemetryCounters::default();
    let algorithm = ctx.cipher.algorithm();
    debug!(%algorithm, block_size = header.block_size, "encrypt pipeline start");

    if ctx.cancel.is_cancelled() {
        return Err(StreamError::Cancelled);
    }

    let header_len = timer.time(Stage::Write, || io::write_header(&mut writer, header))?;
    counters.add_header(header_len);
    debug!(state = ?PipelineState::HeaderWritten, header_len);

    let block_size = header.block_size;
    let (tx, rx) = bounded::<Result<PlainBlock, StreamError>>(1);
    let cancel = ctx.cancel.clone();

    let read_time = thread::scope(|scope| -> Result<Duration, StreamError> {
        let source = scope.spawn(move || {
            let mut blocks = PlaintextBlockReader::new(reader, block_size);
            run_source(tx, cancel, || blocks.next_block())
        });

        debug!(state = ?PipelineState::Streaming);
        let drained = drain_encrypt(&rx, &mut writer, header_len as u64, ctx, &mut counters, &mut timer);
        drop(rx);

        let read_time = join_source(source)?;
        drained.map(|_| read_time)
    })
    .map_err(|e| {
        warn!(state = ?PipelineState::Failed, error = %e, "encrypt pipeline failed");
        e
    })?;

    timer.add_stage_time(Stage::Read, read_time);
    timer
        .time(Stage::Write, || writer.flush())
        .map_err(|e| StreamError::io(IoOp::Write, e))?;
    timer.finish();

    debug!(state = ?PipelineState::Drained, blocks = counters.blocks, "encrypt pipeline done");
    Ok(TelemetrySnapshot::from(PipelineState::Drained, algorithm, block_size, &counters, &timer))
}

fn drain_encrypt<W: Write>(
    rx: &Receiver<Result<PlainBlock, StreamError>>,
    writer: &mut W,
    mut out_offset: u64,
    ctx: &PipelineContext<'_>,
    counters: &mut TelemetryCounters,
    timer: &mut TelemetryTimer,
) -> Result<(), StreamError> {
    let nonce_len = ctx.cipher.nonce_size();

    for msg in rx.iter() {
        let block = msg?;

        let wire = timer.time(Stage::Encrypt, || ctx.cipher.encrypt_block(&block.bytes))?;

        if ctx.cancel.is_cancelled() {
            return Err(StreamError::Cancelled);
        }
        timer
            .time(Stage::Write, || writer.write_all(&wire))
            .map_err(|e| StreamError::io_at(IoOp::Write, out_offset, e))?;

        trace!(index = block.index, offset = block.offset, len = block.bytes.len(), "block sealed");
        out_offset += wire.len() as u64;
        counters.add_block(block.bytes.len(), nonce_len, TAG_LEN);
        ctx.progress.on_bytes(block.bytes.len() as u64);
    }
    Ok(())
}

// ============================================================
// Decrypt pipeline
// ============================================================

/// `reader` must be positioned just past the header, which the caller already
/// decoded (it needs the salt and algorithm before a key exists).
/// `remaining` is the number of container bytes after the header, when known.
pub fn run_decrypt_pipeline<R, W>(
    reader: R,
    mut writer: W,
    header: &Header,
    remaining: Option<u64>,
    ctx: &PipelineContext<'_>,
    mut timer: TelemetryTimer,
) -> Result<TelemetrySnapshot, StreamError>
where
    R: Read + Send,
    W: Write,
{
    let mut counters = TelemetryCounters::default();
    let algorithm = ctx.cipher.algorithm();
    let header_len = header.encoded_len();
    counters.add_header(header_len);
    debug!(%algorithm, block_size = header.block_size, state = ?PipelineState::HeaderRead, "decrypt pipeline start");

    let (tx, rx) = bounded::<Result<SealedBlock, StreamError>>(1);
    let cancel = ctx.cancel.clone();
    let blocks = CiphertextBlockReader::new(reader, header, header_len as u64, remaining);

    let (read_time, unreported) = thread::scope(|scope| -> Result<(Duration, u64), StreamError> {
        let source = scope.spawn(move || {
            let mut blocks = blocks;
            run_source(tx, cancel, || blocks.next_block())
        });

        debug!(state = ?PipelineState::Streaming);
        let drained = drain_decrypt(&rx, &mut writer, header_len as u64, ctx, &mut counters, &mut timer);
        drop(rx);

        let read_time = join_source(source)?;
        drained.map(|unreported| (read_time, unreported))
    })
    .map_err(|e| {
        warn!(state = ?PipelineState::Failed, error = %e, "decrypt pipeline failed");
        e
    })?;

    timer.add_stage_time(Stage::Read, read_time);
    timer
        .time(Stage::Write, || writer.flush())
        .map_err(|e| StreamError::io(IoOp::Write, e))?;
    timer.finish();
    if unreported > 0 {
        ctx.progress.on_bytes(unreported);
    }

    debug!(state = ?PipelineState::Drained, blocks = counters.blocks, "decrypt pipeline done");
    Ok(TelemetrySnapshot::from(PipelineState::Drained, algorithm, header.block_size, &counters, &timer))
}

/// Progress counts container bytes consumed. The header's bytes ride on the
/// first block's increment; returns whatever is still unreported (the header,
/// when the container holds no blocks).
fn drain_decrypt<W: Write>(
    rx: &Receiver<Result<SealedBlock, StreamError>>,
    writer: &mut W,
    header_len: u64,
    ctx: &PipelineContext<'_>,
    counters: &mut TelemetryCounters,
    timer: &mut TelemetryTimer,
) -> Result<u64, StreamError> {
    let mut out_offset = 0u64;
    let mut unreported = header_len;

    for msg in rx.iter() {
        let block = msg?;

        let plaintext = timer
            .time(Stage::Decrypt, || ctx.cipher.decrypt_block(&block.nonce, &block.sealed))
            .map_err(|e| match e {
                CryptoError::AuthenticationFailure => StreamError::Authentication {
                    block_index: block.index,
                    offset: block.offset,
                },
                other => StreamError::Crypto(other),
            })?;

        if ctx.cancel.is_cancelled() {
            return Err(StreamError::Cancelled);
        }
        timer
            .time(Stage::Write, || writer.write_all(&plaintext))
            .map_err(|e| StreamError::io_at(IoOp::Write, out_offset, e))?;

        trace!(index = block.index, offset = block.offset, len = plaintext.len(), "block opened");
        out_offset += plaintext.len() as u64;
        counters.add_block(plaintext.len(), block.nonce.len(), TAG_LEN);
        ctx.progress.on_bytes(unreported + block.wire_len() as u64);
        unreported = 0;
    }
    Ok(unreported)
}
