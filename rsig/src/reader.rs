use std::io::{BufReader, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use rcore::progress::{report, ProgressOperation, ProgressReport, ProgressSink};
use rcore::registry::{create_checksum, create_hash};
use rcore::wire::{expect_bytes, read_name, END_OF_METADATA};

use crate::format::{record_size, MAX_CHUNK_SIZE, SIGNATURE_MAGIC, SIGNATURE_VERSION};
use crate::signature::Signature;
use crate::SignatureError;

const READ_BUF_SIZE: usize = 64 * 1024;

/// Strict streaming parser for signature files.
///
/// Reading starts at the stream's current position and runs to its end. The
/// stream has to be seekable so the record table can be checked against the
/// stream length before any record is decoded.
pub struct SignatureReader<'a, R: Read + Seek> {
    inner: R,
    progress: Option<ProgressSink<'a>>,
}

impl<'a, R: Read + Seek> SignatureReader<'a, R> {
    pub fn new(reader: R) -> Self {
        SignatureReader {
            inner: reader,
            progress: None,
        }
    }

    /// Get a [`ProgressReport`] after the metadata and after every record
    pub fn with_progress<F: FnMut(ProgressReport) + 'a>(mut self, sink: F) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Parse the whole stream, either every record is valid or nothing is
    /// returned.
    pub fn read_signature(mut self) -> Result<Signature, SignatureError> {
        let start = self.inner.stream_position()?;
        let total = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(start))?;

        let mut reader = BufReader::with_capacity(READ_BUF_SIZE, &mut self.inner);

        expect_bytes(&mut reader, SIGNATURE_MAGIC, "unknown header")?;

        let version = reader.read_u8()?;
        if version == 0 || version > SIGNATURE_VERSION {
            return Err(SignatureError::UnsupportedVersion(version));
        }

        let hash_name = read_name(&mut reader)?;
        let checksum_name = read_name(&mut reader)?;

        expect_bytes(&mut reader, END_OF_METADATA, "missing end of metadata marker")?;

        let mut position = reader.stream_position()?;
        report(&mut self.progress, ProgressOperation::ReadingSignature, position, total);

        let hash = create_hash(&hash_name)?;
        let checksum = create_checksum(&checksum_name)?;

        let hash_length = hash.hash_length();
        let record = record_size(hash_length) as u64;
        let remaining = total.saturating_sub(position);

        if remaining % record != 0 {
            return Err(SignatureError::CorruptFormat(
                "at least one chunk has data missing",
            ));
        }

        // Never sized from the stream length, grows as records are decoded
        let count = remaining / record;
        let mut signature = Signature::new(hash, checksum);

        for _ in 0..count {
            let length = reader.read_u16::<LittleEndian>()?;
            if length == 0 || length as usize > MAX_CHUNK_SIZE {
                return Err(SignatureError::CorruptFormat("chunk length out of range"));
            }

            let rolling_checksum = reader.read_u32::<LittleEndian>()?;

            let mut chunk_hash = vec![0u8; hash_length];
            reader.read_exact(&mut chunk_hash)?;

            signature.push(length, rolling_checksum, chunk_hash);

            position += record;
            report(&mut self.progress, ProgressOperation::ReadingSignature, position, total);
        }

        debug!(
            "Read signature: {} chunks, {} basis bytes, {}/{}",
            signature.len(),
            signature.basis_length(),
            hash_name,
            checksum_name
        );

        Ok(signature)
    }
}
