//! stream/io.rs
//! Normalized input/output plus the block readers on both sides of the pipeline.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::constants::TAG_LEN;
use crate::headers::{decode_header_le, encode_header_le, Header};
use crate::stream::types::{PlainBlock, SealedBlock};
use crate::types::{IoOp, StreamError};

/// Largest buffer allocated before any bytes arrive. Bigger blocks grow as
/// data is actually read, so a hostile block size cannot force an allocation.
const PREALLOC_LIMIT: u64 = 8 * 1024 * 1024;

const IO_BUF_CAPACITY: usize = 64 * 1024;

/// Canonical input abstraction
pub enum InputSource {
    /// Arbitrary reader; `len` enables exact last-block sizing on decrypt.
    Reader { reader: Box<dyn Read + Send>, len: Option<u64> },
    File(PathBuf),
    Memory(Vec<u8>),
}

impl InputSource {
    /// Reader of unknown length.
    pub fn reader(r: impl Read + Send + 'static) -> Self {
        InputSource::Reader { reader: Box::new(r), len: None }
    }
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    /// Capture into memory; the bytes come back on the telemetry snapshot.
    Memory,
}

/// Opened input: the reader plus its total length when known.
pub struct OpenedInput {
    pub reader: Box<dyn Read + Send>,
    pub len: Option<u64>,
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> Result<OpenedInput, StreamError> {
    match src {
        InputSource::Reader { reader, len } => Ok(OpenedInput { reader, len }),
        InputSource::File(p) => {
            let file = File::open(&p).map_err(|e| StreamError::io_path(IoOp::Open, &p, e))?;
            let len = file
                .metadata()
                .map_err(|e| StreamError::io_path(IoOp::Open, &p, e))?
                .len();
            Ok(OpenedInput {
                reader: Box::new(BufReader::with_capacity(IO_BUF_CAPACITY, file)),
                len: Some(len),
            })
        }
        InputSource::Memory(b) => {
            let len = b.len() as u64;
            Ok(OpenedInput { reader: Box::new(Cursor::new(b)), len: Some(len) })
        }
    }
}

/// Normalize output sink into a boxed writer, returning the capture buffer for `Memory`.
pub fn open_output(
    sink: OutputSink,
) -> Result<(Box<dyn Write + Send>, Option<Arc<Mutex<Vec<u8>>>>), StreamError> {
    match sink {
        OutputSink::Writer(w) => Ok((w, None)),
        OutputSink::File(p) => {
            let file = File::create(&p).map_err(|e| StreamError::io_path(IoOp::Create, &p, e))?;
            Ok((Box::new(BufWriter::with_capacity(IO_BUF_CAPACITY, file)), None))
        }
        OutputSink::Memory => {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let writer = SharedBufferWriter { buf: buf.clone() };
            Ok((Box::new(writer), Some(buf)))
        }
    }
}

/// Writer appending into a shared buffer, so the caller can read it back after the run.
pub struct SharedBufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture buffer poisoned"))?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Take the bytes out of a capture buffer.
pub fn take_captured(buf: &Arc<Mutex<Vec<u8>>>) -> Result<Vec<u8>, StreamError> {
    buf.lock()
        .map(|mut g| std::mem::take(&mut *g))
        .map_err(|_| StreamError::PipelineError("capture buffer poisoned"))
}

// ================= Header =================

pub fn write_header<W: Write + ?Sized>(w: &mut W, h: &Header) -> Result<usize, StreamError> {
    let buf = encode_header_le(h)?;
    w.write_all(&buf).map_err(|e| StreamError::io_at(IoOp::Write, 0, e))?;
    Ok(buf.len())
}

pub fn read_header<R: Read + ?Sized>(r: &mut R) -> Result<Header, StreamError> {
    Ok(decode_header_le(r)?)
}

// ================= Utilities =================

/// Read up to `len` bytes, stopping early only at end of stream.
pub fn read_exact_or_eof<R: Read + ?Sized>(r: &mut R, len: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT) as usize);
    (&mut *r).take(len).read_to_end(&mut buf)?;
    Ok(buf)
}

// ================= Block readers =================

/// Splits a plaintext stream into blocks of `block_size` bytes; only the last may be shorter.
pub struct PlaintextBlockReader<R: Read> {
    inner: R,
    block_size: u64,
    index: u64,
    offset: u64,
    done: bool,
}

impl<R: Read> PlaintextBlockReader<R> {
    pub fn new(inner: R, block_size: u64) -> Self {
        Self { inner, block_size, index: 0, offset: 0, done: false }
    }

    /// Next block, or `None` at end of stream. An empty stream yields no blocks.
    pub fn next_block(&mut self) -> Result<Option<PlainBlock>, StreamError> {
        if self.done {
            return Ok(None);
        }

        let buf = read_exact_or_eof(&mut self.inner, self.block_size)
            .map_err(|e| StreamError::io_at(IoOp::Read, self.offset, e))?;

        if buf.is_empty() {
            self.done = true;
            return Ok(None);
        }
        if (buf.len() as u64) < self.block_size {
            self.done = true;
        }

        let block = PlainBlock {
            index: self.index,
            offset: self.offset,
            bytes: Bytes::from(buf),
        };
        self.index += 1;
        self.offset += block.bytes.len() as u64;
        Ok(Some(block))
    }
}

/// Reads `nonce ++ ciphertext ++ tag` blocks following the header.
///
/// With a known `remaining` length the size of every block, the last included,
/// is fixed before reading. Without it, each block reads up to a full block and
/// a short body is accepted only because end of stream was reached.
pub struct CiphertextBlockReader<R: Read> {
    inner: R,
    nonce_size: u64,
    /// `block_size + tag`, saturating.
    full_body: u64,
    remaining: Option<u64>,
    index: u64,
    offset: u64,
    done: bool,
}

impl<R: Read> CiphertextBlockReader<R> {
    /// `start_offset` is the container offset of block 0 (the header length).
    /// `remaining` is the number of container bytes after the header, when known.
    pub fn new(inner: R, header: &Header, start_offset: u64, remaining: Option<u64>) -> Self {
        Self {
            inner,
            nonce_size: u64::from(header.nonce_size),
            full_body: header.block_size.saturating_add(TAG_LEN as u64),
            remaining,
            index: 0,
            offset: start_offset,
            done: false,
        }
    }

    fn truncated(&self, expected: u64, actual: u64) -> StreamError {
        StreamError::TruncatedCiphertext {
            block_index: self.index,
            offset: self.offset,
            expected,
            actual,
        }
    }

    /// Next framed block, or `None` on a clean block boundary at end of stream.
    pub fn next_block(&mut self) -> Result<Option<SealedBlock>, StreamError> {
        if self.done || self.remaining == Some(0) {
            self.done = true;
            return Ok(None);
        }
        if let Some(rem) = self.remaining {
            if rem < self.nonce_size {
                self.done = true;
                return Err(self.truncated(self.nonce_size, rem));
            }
        }

        let nonce = read_exact_or_eof(&mut self.inner, self.nonce_size)
            .map_err(|e| StreamError::io_at(IoOp::Read, self.offset, e))?;

        if nonce.is_empty() && self.remaining.is_none() {
            self.done = true;
            return Ok(None);
        }
        if (nonce.len() as u64) < self.nonce_size {
            self.done = true;
            return Err(self.truncated(self.nonce_size, nonce.len() as u64));
        }

        let min_body = TAG_LEN as u64 + 1;
        let body_len = match self.remaining {
            Some(rem) => {
                let after_nonce = rem.saturating_sub(self.nonce_size);
                let body = after_nonce.min(self.full_body);
                if body < min_body {
                    self.done = true;
                    return Err(self.truncated(self.nonce_size + min_body, self.nonce_size + body));
                }
                body
            }
            None => self.full_body,
        };

        let body = read_exact_or_eof(&mut self.inner, body_len)
            .map_err(|e| StreamError::io_at(IoOp::Read, self.offset + self.nonce_size, e))?;
        let got = body.len() as u64;

        match self.remaining {
            Some(_) if got < body_len => {
                self.done = true;
                return Err(self.truncated(self.nonce_size + body_len, self.nonce_size + got));
            }
            None if got < min_body => {
                self.done = true;
                return Err(self.truncated(self.nonce_size + min_body, self.nonce_size + got));
            }
            None if got < self.full_body => {
                // Short body means the stream ended: this was the last block.
                self.done = true;
            }
            _ => {}
        }

        let wire = self.nonce_size + got;
        let block = SealedBlock {
            index: self.index,
            offset: self.offset,
            nonce: Bytes::from(nonce),
            sealed: Bytes::from(body),
        };

        self.index += 1;
        self.offset += wire;
        if let Some(rem) = self.remaining.as_mut() {
            *rem = rem.saturating_sub(wire);
        }
        Ok(Some(block))
    }
}
