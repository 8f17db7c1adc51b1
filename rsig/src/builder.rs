use std::io::{BufWriter, Read, Seek, SeekFrom, Write};

use log::debug;

use rcore::buf::fill_buf;
use rcore::checksum::RollingChecksum;
use rcore::hash::HashAlgorithm;
use rcore::progress::{report, ProgressOperation, ProgressReport, ProgressSink};
use rcore::registry::{default_checksum, default_hash};

use crate::format::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::signature::ChunkSignature;
use crate::writer::SignatureWriter;
use crate::SignatureError;

/// Cuts a basis file into fixed size chunks and writes their signature
pub struct SignatureBuilder<'a> {
    hash: Box<dyn HashAlgorithm>,
    checksum: Box<dyn RollingChecksum>,
    chunk_size: usize,
    progress: Option<ProgressSink<'a>>,
}

impl<'a> SignatureBuilder<'a> {
    pub fn new() -> Self {
        SignatureBuilder {
            hash: default_hash(),
            checksum: default_checksum(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: None,
        }
    }

    pub fn hash_algorithm(mut self, hash: Box<dyn HashAlgorithm>) -> Self {
        self.hash = hash;
        self
    }

    pub fn rolling_checksum(mut self, checksum: Box<dyn RollingChecksum>) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Result<Self, SignatureError> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size) {
            return Err(SignatureError::InvalidChunkSize(size));
        }
        self.chunk_size = size;
        Ok(self)
    }

    pub fn with_progress<F: FnMut(ProgressReport) + 'a>(mut self, sink: F) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Signature the whole of `basis` into `out`, returns the number of chunks
    pub fn build<R: Read + Seek, W: Write>(mut self, basis: &mut R, out: &mut W) -> Result<u64, SignatureError> {
        let total = basis.seek(SeekFrom::End(0))?;
        basis.seek(SeekFrom::Start(0))?;

        let mut writer = SignatureWriter::new(BufWriter::new(out));
        writer.write_metadata(self.hash.as_ref(), self.checksum.as_ref())?;

        let mut buf = vec![0u8; self.chunk_size];
        let mut start_offset = 0u64;
        let mut count = 0u64;

        loop {
            match fill_buf(basis, &mut buf)? {
                (true, 0) => break,
                (eof, len) => {
                    let block = &buf[..len];
                    writer.write_chunk(&ChunkSignature {
                        start_offset,
                        length: len as u16,
                        rolling_checksum: self.checksum.calculate(block),
                        hash: self.hash.compute(block),
                    })?;

                    start_offset += len as u64;
                    count += 1;
                    report(&mut self.progress, ProgressOperation::BuildingSignature, start_offset, total);

                    if eof {
                        break;
                    }
                }
            }
        }

        writer.into_inner().flush()?;

        debug!(
            "Built signature: {} chunks of {} bytes over {} basis bytes",
            count, self.chunk_size, start_offset
        );
        Ok(count)
    }
}

impl Default for SignatureBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_signature_builder {
    use super::*;
    use crate::reader::SignatureReader;
    use rcore::checksum::Adler32V2;
    use rcore::hash::Blake3;
    use std::io::Cursor;

    fn basis(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn chunks_cover_basis() {
        let data = basis(5000);
        let mut out = Vec::new();

        let count = SignatureBuilder::new()
            .build(&mut Cursor::new(data.clone()), &mut out)
            .unwrap();
        assert_eq!(count, 3);

        let sig = SignatureReader::new(Cursor::new(out)).read_signature().unwrap();
        let lengths: Vec<u16> = sig.chunks().iter().map(|c| c.length).collect();
        assert_eq!(lengths, vec![2048, 2048, 904]);
        assert_eq!(sig.basis_length(), 5000);

        for c in sig.chunks() {
            let start = c.start_offset as usize;
            let block = &data[start..start + c.length as usize];
            assert_eq!(c.hash, sig.hash_algorithm().compute(block));
            assert_eq!(c.rolling_checksum, sig.rolling_checksum().calculate(block));
        }
    }

    #[test]
    fn custom_algorithms_and_size() {
        let data = basis(1024);
        let mut out = Vec::new();

        SignatureBuilder::new()
            .hash_algorithm(Box::new(Blake3))
            .rolling_checksum(Box::new(Adler32V2))
            .chunk_size(256)
            .unwrap()
            .build(&mut Cursor::new(data), &mut out)
            .unwrap();

        let sig = SignatureReader::new(Cursor::new(out)).read_signature().unwrap();
        assert_eq!(sig.hash_algorithm().name(), "BLAKE3");
        assert_eq!(sig.rolling_checksum().name(), "Adler32V2");
        assert_eq!(sig.len(), 4);
    }

    #[test]
    fn empty_basis() {
        let mut out = Vec::new();
        let count = SignatureBuilder::new()
            .build(&mut Cursor::new(Vec::new()), &mut out)
            .unwrap();

        assert_eq!(count, 0);
        let sig = SignatureReader::new(Cursor::new(out)).read_signature().unwrap();
        assert!(sig.is_empty());
    }

    #[test]
    fn invalid_chunk_size() {
        assert!(matches!(
            SignatureBuilder::new().chunk_size(64),
            Err(SignatureError::InvalidChunkSize(64))
        ));
        assert!(matches!(
            SignatureBuilder::new().chunk_size(40_000),
            Err(SignatureError::InvalidChunkSize(40_000))
        ));
    }

    #[test]
    fn progress_tracks_basis() {
        let mut reports = Vec::new();
        let mut out = Vec::new();

        SignatureBuilder::new()
            .with_progress(|r| reports.push(r))
            .build(&mut Cursor::new(basis(4096)), &mut out)
            .unwrap();

        let positions: Vec<u64> = reports.iter().map(|r| r.current_position).collect();
        assert_eq!(positions, vec![2048, 4096]);
        assert!(reports.iter().all(|r| r.total == 4096));
    }
}
