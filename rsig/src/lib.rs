//! Signature file format
//!
//! A signature describes a basis file as a table of fixed size chunks, each
//! with a weak rolling checksum and a strong hash. The file is self
//! describing, the names of both algorithms are stored in the header so a
//! reader never needs to know in advance what produced it.
//!
//! Unless otherwise noted everything is stored in Little Endian format.
//!
//! | Type          | Name                | Description |
//! | ------------: | ------------------- | ----------- |
//! | [u8; 7]       | magic               | ASCII `FRSNCSG` |
//! | u8            | version             | Format version, currently `0x01` |
//! | varint + utf8 | hash name           | e.g. `XXH64` |
//! | varint + utf8 | rolling name        | e.g. `Adler32` |
//! | [u8; 3]       | end of metadata     | ASCII `>>>` |
//! | record*       | chunks              | Until the end of the stream |
//!
//! Each record is:
//!
//! | Type     | Name     | Description |
//! | -------: | -------- | ----------- |
//! | u16      | length   | Chunk length, `1..=32767` |
//! | u32      | checksum | Rolling checksum of the chunk |
//! | [u8; N]  | hash     | Strong hash, `N` is the hash algorithm's length |
//!
//! There is no record count, it falls out of the stream length. A stream whose
//! tail is not a whole number of records is rejected before any record is
//! read.
//!
//! # Versions
//!
//! Every version from `1` up to [`format::SIGNATURE_VERSION`] is readable.
//! Anything newer is refused with [`SignatureError::UnsupportedVersion`], as is
//! the never issued version `0`.

pub mod builder;
pub mod format;
pub mod reader;
pub mod signature;
pub mod writer;

use thiserror::Error;

use rcore::registry::AlgorithmError;
use rcore::wire::WireError;

use crate::format::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE, SIGNATURE_VERSION};

pub use crate::builder::SignatureBuilder;
pub use crate::reader::SignatureReader;
pub use crate::signature::{ChunkSignature, Signature};
pub use crate::writer::SignatureWriter;

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("the signature file appears to be corrupt: {0}")]
    CorruptFormat(&'static str),
    #[error("the signature file uses format version {0}, this build only reads versions 1 to {max}", max = SIGNATURE_VERSION)]
    UnsupportedVersion(u8),
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] AlgorithmError),
    #[error("invalid chunk size {0}, must be between {min} and {max}", min = MIN_CHUNK_SIZE, max = MAX_CHUNK_SIZE)]
    InvalidChunkSize(usize),
}

impl From<WireError> for SignatureError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::IO(e) => SignatureError::IO(e),
            WireError::Corrupt(what) => SignatureError::CorruptFormat(what),
        }
    }
}
