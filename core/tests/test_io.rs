// Block readers on both sides of the pipeline, driven directly.

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use cryptool_core::crypto::Algorithm;
    use cryptool_core::headers::Header;
    use cryptool_core::stream::io::{
        open_input, read_exact_or_eof, CiphertextBlockReader, InputSource, PlaintextBlockReader,
    };
    use cryptool_core::types::{IoOp, StreamError};

    /// Hands out one byte per `read` call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(1);
            self.0.read(&mut buf[..n])
        }
    }

    /// Yields `ok` bytes, then fails.
    struct Broken {
        ok: usize,
    }

    impl Read for Broken {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.ok == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }
            let n = buf.len().min(self.ok);
            buf[..n].fill(0xEE);
            self.ok -= n;
            Ok(n)
        }
    }

    fn plain_sizes<R: Read>(mut r: PlaintextBlockReader<R>) -> Vec<usize> {
        let mut out = Vec::new();
        while let Some(b) = r.next_block().unwrap() {
            out.push(b.bytes.len());
        }
        out
    }

// ## 1️⃣ Plaintext side

    #[test]
    fn read_exact_or_eof_handles_partial_reads() {
        let mut r = Trickle(Cursor::new((0u8..10).collect()));
        assert_eq!(read_exact_or_eof(&mut r, 4).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(read_exact_or_eof(&mut r, 100).unwrap(), vec![4, 5, 6, 7, 8, 9]);
        assert!(read_exact_or_eof(&mut r, 4).unwrap().is_empty());
    }

    #[test]
    fn plaintext_blocks_split_on_block_size() {
        assert_eq!(plain_sizes(PlaintextBlockReader::new(Cursor::new(vec![1u8; 10]), 4)), vec![4, 4, 2]);
        assert_eq!(plain_sizes(PlaintextBlockReader::new(Cursor::new(vec![1u8; 8]), 4)), vec![4, 4]);
        assert_eq!(plain_sizes(PlaintextBlockReader::new(Cursor::new(vec![1u8; 5]), 4)), vec![4, 1]);
        assert!(plain_sizes(PlaintextBlockReader::new(Cursor::new(Vec::new()), 4)).is_empty());
    }

    #[test]
    fn plaintext_blocks_fill_up_across_short_reads() {
        let r = Trickle(Cursor::new(vec![9u8; 11]));
        assert_eq!(plain_sizes(PlaintextBlockReader::new(r, 5)), vec![5, 5, 1]);
    }

    #[test]
    fn plaintext_blocks_carry_index_and_offset() {
        let mut r = PlaintextBlockReader::new(Cursor::new((0u8..7).collect::<Vec<_>>()), 3);
        let b0 = r.next_block().unwrap().unwrap();
        let b1 = r.next_block().unwrap().unwrap();
        let b2 = r.next_block().unwrap().unwrap();
        assert_eq!((b0.index, b0.offset, &b0.bytes[..]), (0, 0, &[0, 1, 2][..]));
        assert_eq!((b1.index, b1.offset, &b1.bytes[..]), (1, 3, &[3, 4, 5][..]));
        assert_eq!((b2.index, b2.offset, &b2.bytes[..]), (2, 6, &[6][..]));
        assert!(r.next_block().unwrap().is_none());
    }

    #[test]
    fn plaintext_read_error_carries_offset() {
        let mut r = PlaintextBlockReader::new(Broken { ok: 6 }, 4);
        assert!(r.next_block().unwrap().is_some());
        match r.next_block().unwrap_err() {
            StreamError::Io { op: IoOp::Read, offset: Some(4), .. } => {}
            other => panic!("expected read error at 4, got {other:?}"),
        }
    }

// ## 2️⃣ Ciphertext side
//
// Header: AES-256-GCM, block size 4 → nonce 12, full body 4 + 16 = 20, full block 32 bytes.

    const START: u64 = 38;

    fn header() -> Header {
        Header::new(Algorithm::Aes256Gcm, 4, vec![0; 16])
    }

    /// Wire layout of blocks with the given plaintext lengths (content is irrelevant here).
    fn payload(pt_lens: &[usize]) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, len) in pt_lens.iter().enumerate() {
            out.extend(std::iter::repeat(i as u8).take(12 + len + 16));
        }
        out
    }

    fn collect<R: Read>(mut r: CiphertextBlockReader<R>) -> Result<Vec<(u64, u64, usize)>, StreamError> {
        let mut out = Vec::new();
        while let Some(b) = r.next_block()? {
            assert_eq!(b.nonce.len(), 12);
            out.push((b.index, b.offset, b.sealed.len()));
        }
        Ok(out)
    }

    #[test]
    fn ciphertext_blocks_with_known_length() {
        let p = payload(&[4, 4, 1]);
        let len = p.len() as u64;
        let blocks = collect(CiphertextBlockReader::new(Cursor::new(p), &header(), START, Some(len))).unwrap();
        assert_eq!(blocks, vec![(0, START, 20), (1, START + 32, 20), (2, START + 64, 17)]);
    }

    #[test]
    fn ciphertext_blocks_with_unknown_length() {
        let p = payload(&[4, 4, 1]);
        let blocks = collect(CiphertextBlockReader::new(Trickle(Cursor::new(p)), &header(), START, None)).unwrap();
        assert_eq!(blocks, vec![(0, START, 20), (1, START + 32, 20), (2, START + 64, 17)]);
    }

    #[test]
    fn no_blocks_after_header() {
        assert!(collect(CiphertextBlockReader::new(Cursor::new(Vec::new()), &header(), START, Some(0))).unwrap().is_empty());
        assert!(collect(CiphertextBlockReader::new(Cursor::new(Vec::new()), &header(), START, None)).unwrap().is_empty());
    }

    #[test]
    fn short_nonce_is_truncated_ciphertext() {
        let mut p = payload(&[4]);
        p.extend_from_slice(&[0; 5]);
        let len = p.len() as u64;

        for remaining in [Some(len), None] {
            let err = collect(CiphertextBlockReader::new(Cursor::new(p.clone()), &header(), START, remaining)).unwrap_err();
            match err {
                StreamError::TruncatedCiphertext { block_index, offset, expected, actual } => {
                    assert_eq!((block_index, offset, expected, actual), (1, START + 32, 12, 5), "{remaining:?}");
                }
                other => panic!("expected TruncatedCiphertext, got {other:?}"),
            }
        }
    }

    #[test]
    fn body_shorter_than_tag_is_truncated_ciphertext() {
        let mut p = payload(&[4]);
        p.extend_from_slice(&[0; 12 + 10]);
        let len = p.len() as u64;

        for remaining in [Some(len), None] {
            let err = collect(CiphertextBlockReader::new(Cursor::new(p.clone()), &header(), START, remaining)).unwrap_err();
            match err {
                StreamError::TruncatedCiphertext { block_index, expected, actual, .. } => {
                    assert_eq!((block_index, expected, actual), (1, 12 + 17, 12 + 10), "{remaining:?}");
                }
                other => panic!("expected TruncatedCiphertext, got {other:?}"),
            }
        }
    }

    #[test]
    fn stream_shorter_than_declared_length_is_truncated() {
        let p = payload(&[4, 4]);
        let declared = p.len() as u64 + 32;
        let err = collect(CiphertextBlockReader::new(Cursor::new(p), &header(), START, Some(declared))).unwrap_err();
        assert!(matches!(err, StreamError::TruncatedCiphertext { block_index: 2, .. }));
    }

    #[test]
    fn huge_block_size_does_not_preallocate() {
        // Header claims 2 GiB blocks; the stream holds one tiny block.
        let h = Header::new(Algorithm::Aes256Gcm, 2 * 1024 * 1024 * 1024, vec![0; 16]);
        let p = payload(&[3]);
        let blocks = collect(CiphertextBlockReader::new(Cursor::new(p), &h, START, None)).unwrap();
        assert_eq!(blocks, vec![(0, START, 19)]);
    }

// ## 3️⃣ Input normalization

    #[test]
    fn input_lengths() {
        assert_eq!(open_input(InputSource::Memory(vec![0; 9])).unwrap().len, Some(9));
        assert_eq!(open_input(InputSource::reader(Cursor::new(vec![0; 9]))).unwrap().len, None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.bin");
        std::fs::write(&path, [1u8; 33]).unwrap();
        assert_eq!(open_input(InputSource::File(path)).unwrap().len, Some(33));
    }

    #[test]
    fn missing_input_file_is_open_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        match open_input(InputSource::File(path.clone())) {
            Err(StreamError::Io { op: IoOp::Open, path: Some(p), .. }) => assert_eq!(p, path),
            Err(other) => panic!("expected open error, got {other:?}"),
            Ok(_) => panic!("expected open error"),
        }
    }
}
