//! On disk delta format
//!
//! Unless otherwise noted everything is stored in Little Endian format.
//!
//! | Type          | Name            | Description |
//! | ------------: | --------------- | ----------- |
//! | [u8; 7]       | magic           | ASCII `FRSNCDT` |
//! | u8            | version         | Format version, currently `0x01` |
//! | varint + utf8 | hash name       | Algorithm of the expected hash |
//! | u32           | hash length     | Must match the algorithm's output length |
//! | [u8; N]       | expected hash   | Hash of the file this delta rebuilds |
//! | [u8; 3]       | end of metadata | ASCII `>>>` |
//! | command*      | commands        | Until the end of the stream |
//!
//! A command is one of:
//!
//! | Tag    | Fields                    | Description |
//! | :----: | ------------------------- | ----------- |
//! | `0x60` | u64 start, u64 length     | Copy from the basis |
//! | `0x80` | u64 length, [u8; length]  | Literal data |

use std::cmp;
use std::io::{BufReader, ErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use rcore::hash::HashAlgorithm;
use rcore::registry::create_hash;
use rcore::wire::{expect_bytes, read_name, write_name, END_OF_METADATA};

use crate::applier::COPY_BUFFER_SIZE;
use crate::source::{DeltaOp, DeltaSource};
use crate::PatchError;

pub const DELTA_MAGIC: &[u8; 7] = b"FRSNCDT";
pub const DELTA_VERSION: u8 = 0x01;

pub const COPY_COMMAND: u8 = 0x60;
pub const DATA_COMMAND: u8 = 0x80;

/// Streaming decoder for delta files.
///
/// The metadata is parsed up front by [`BinaryDeltaReader::new`], the
/// commands are decoded lazily as the iterator is driven. Literal data is
/// handed out in pieces of at most [`COPY_BUFFER_SIZE`] bytes however long
/// the command claims to be.
pub struct BinaryDeltaReader<R: Read> {
    inner: BufReader<R>,
    hash: Box<dyn HashAlgorithm>,
    expected_hash: Vec<u8>,
    // Literal bytes of the current data command not handed out yet
    pending_data: u64,
    done: bool,
}

impl<R: Read> BinaryDeltaReader<R> {
    pub fn new(reader: R) -> Result<Self, PatchError> {
        let mut inner = BufReader::new(reader);

        expect_bytes(&mut inner, DELTA_MAGIC, "unknown header")?;

        let version = inner.read_u8()?;
        if version == 0 || version > DELTA_VERSION {
            return Err(PatchError::UnsupportedVersion(version));
        }

        let hash_name = read_name(&mut inner)?;
        let hash = create_hash(&hash_name)?;

        let hash_length = inner.read_u32::<LittleEndian>()? as usize;
        if hash_length != hash.hash_length() {
            return Err(PatchError::CorruptFormat("expected hash has the wrong length"));
        }

        let mut expected_hash = vec![0u8; hash_length];
        inner.read_exact(&mut expected_hash)?;

        expect_bytes(&mut inner, END_OF_METADATA, "missing end of metadata marker")?;

        Ok(BinaryDeltaReader {
            inner,
            hash,
            expected_hash,
            pending_data: 0,
            done: false,
        })
    }

    // None on a clean end of stream between two commands
    fn read_command(&mut self) -> Result<Option<u8>, PatchError> {
        let mut tag = [0u8; 1];
        loop {
            match self.inner.read(&mut tag) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(tag[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_data(&mut self) -> Result<DeltaOp, PatchError> {
        let len = cmp::min(self.pending_data, COPY_BUFFER_SIZE as u64) as usize;

        let mut data = vec![0u8; len];
        self.inner.read_exact(&mut data)?;
        self.pending_data -= len as u64;

        Ok(DeltaOp::WriteData(data))
    }

    fn next_op(&mut self) -> Result<Option<DeltaOp>, PatchError> {
        if self.pending_data > 0 {
            return self.next_data().map(Some);
        }

        match self.read_command()? {
            None => Ok(None),
            Some(COPY_COMMAND) => {
                let start = self.inner.read_u64::<LittleEndian>()?;
                let length = self.inner.read_u64::<LittleEndian>()?;
                Ok(Some(DeltaOp::Copy { start, length }))
            }
            Some(DATA_COMMAND) => {
                self.pending_data = self.inner.read_u64::<LittleEndian>()?;
                self.next_data().map(Some)
            }
            Some(_) => Err(PatchError::CorruptFormat("unknown command")),
        }
    }
}

impl<R: Read> Iterator for BinaryDeltaReader<R> {
    type Item = Result<DeltaOp, PatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_op() {
            Ok(Some(op)) => Some(Ok(op)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> DeltaSource for BinaryDeltaReader<R> {
    fn hash_algorithm(&self) -> &dyn HashAlgorithm {
        self.hash.as_ref()
    }

    fn expected_hash(&self) -> &[u8] {
        &self.expected_hash
    }
}

/// Encoder for delta files, whoever computes the delta drives this
pub struct BinaryDeltaWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryDeltaWriter<W> {
    pub fn new(writer: W) -> Self {
        BinaryDeltaWriter { inner: writer }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_metadata(&mut self, hash: &dyn HashAlgorithm, expected_hash: &[u8]) -> std::io::Result<()> {
        self.inner.write_all(DELTA_MAGIC)?;
        self.inner.write_u8(DELTA_VERSION)?;
        write_name(&mut self.inner, hash.name())?;
        self.inner.write_u32::<LittleEndian>(expected_hash.len() as u32)?;
        self.inner.write_all(expected_hash)?;
        self.inner.write_all(END_OF_METADATA)
    }

    pub fn write_copy(&mut self, start: u64, length: u64) -> std::io::Result<()> {
        self.inner.write_u8(COPY_COMMAND)?;
        self.inner.write_u64::<LittleEndian>(start)?;
        self.inner.write_u64::<LittleEndian>(length)
    }

    pub fn write_data(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.inner.write_u8(DATA_COMMAND)?;
        self.inner.write_u64::<LittleEndian>(data.len() as u64)?;
        self.inner.write_all(data)
    }
}

#[cfg(test)]
mod test_binary_delta {
    use super::*;
    use rcore::hash::{Blake3, Xxh64};
    use std::io::Cursor;

    fn sample() -> Vec<u8> {
        let mut writer = BinaryDeltaWriter::new(Vec::new());
        writer.write_metadata(&Xxh64, &Xxh64.compute(b"FGHIJXYZ")).unwrap();
        writer.write_copy(5, 5).unwrap();
        writer.write_data(b"XYZ").unwrap();
        writer.into_inner()
    }

    #[test]
    fn metadata_layout() {
        let data = sample();
        assert_eq!(&data[..14], b"FRSNCDT\x01\x05XXH64");
        assert_eq!(&data[14..18], &[8, 0, 0, 0]);
        assert_eq!(&data[26..29], b">>>");
    }

    #[test]
    fn reads_back_commands() {
        let reader = BinaryDeltaReader::new(Cursor::new(sample())).unwrap();

        assert_eq!(reader.hash_algorithm().name(), "XXH64");
        assert_eq!(reader.expected_hash(), &Xxh64.compute(b"FGHIJXYZ")[..]);

        let ops: Vec<DeltaOp> = reader.map(|op| op.unwrap()).collect();
        assert_eq!(
            ops,
            vec![
                DeltaOp::Copy { start: 5, length: 5 },
                DeltaOp::WriteData(b"XYZ".to_vec()),
            ]
        );
    }

    #[test]
    fn metadata_only() {
        let mut writer = BinaryDeltaWriter::new(Vec::new());
        writer.write_metadata(&Blake3, &Blake3.compute(b"")).unwrap();

        let mut reader = BinaryDeltaReader::new(Cursor::new(writer.into_inner())).unwrap();
        assert!(reader.next().is_none());
    }

    #[test]
    fn large_data_is_split() {
        let literal = vec![0x5au8; COPY_BUFFER_SIZE + 10];

        let mut writer = BinaryDeltaWriter::new(Vec::new());
        writer.write_metadata(&Xxh64, &Xxh64.compute(&literal)).unwrap();
        writer.write_data(&literal).unwrap();

        let reader = BinaryDeltaReader::new(Cursor::new(writer.into_inner())).unwrap();
        let sizes: Vec<usize> = reader
            .map(|op| match op.unwrap() {
                DeltaOp::WriteData(d) => d.len(),
                DeltaOp::Copy { .. } => panic!("unexpected copy"),
            })
            .collect();

        assert_eq!(sizes, vec![COPY_BUFFER_SIZE, 10]);
    }

    #[test]
    fn corrupt_magic() {
        let mut data = sample();
        data[2] = b'?';

        let err = BinaryDeltaReader::new(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, PatchError::CorruptFormat(_)));
    }

    #[test]
    fn newer_version() {
        let mut data = sample();
        data[7] = DELTA_VERSION + 1;

        let err = BinaryDeltaReader::new(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, PatchError::UnsupportedVersion(2)));
    }

    #[test]
    fn unknown_algorithm() {
        let data = b"FRSNCDT\x01\x03MD5\x10\x00\x00\x00".to_vec();

        let err = BinaryDeltaReader::new(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, PatchError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn wrong_hash_length() {
        let mut data = sample();
        data[14] = 7;

        let err = BinaryDeltaReader::new(Cursor::new(data)).err().unwrap();
        assert!(matches!(err, PatchError::CorruptFormat(_)));
    }

    #[test]
    fn unknown_command_ends_iteration() {
        let mut data = sample();
        data.push(0x42);

        let mut reader = BinaryDeltaReader::new(Cursor::new(data)).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(PatchError::CorruptFormat(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_copy_is_io() {
        let mut data = sample();
        data.truncate(data.len() - 3 - 9 - 10);

        let mut reader = BinaryDeltaReader::new(Cursor::new(data)).unwrap();
        assert!(matches!(
            reader.next(),
            Some(Err(PatchError::IO(ref e))) if e.kind() == ErrorKind::UnexpectedEof
        ));
    }
}
