use std::fmt;
use std::hash::Hasher as StdHasher;
use std::io::{copy, Read};

use twox_hash::XxHash64;

use crate::buf::fill_buf;

// Read size used when hashing a whole stream
const HASH_BUF_SIZE: usize = 64 * 1024;

/// A strong hash whose output is persisted in signature and delta files.
///
/// Outputs are plain byte vectors and are compared byte for byte.
pub trait HashAlgorithm: Send + Sync {
    /// Canonical name, this is what gets written to disk
    fn name(&self) -> &'static str;

    /// Length in bytes of every digest this algorithm produces
    fn hash_length(&self) -> usize;

    /// Hash everything from the reader's current position to its end in a
    /// single forward pass.
    fn compute_reader(&self, reader: &mut dyn Read) -> std::io::Result<Vec<u8>>;

    /// Hash an in-memory region, slice it to hash a sub range of a buffer.
    fn compute(&self, data: &[u8]) -> Vec<u8>;
}

impl fmt::Debug for dyn HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashAlgorithm")
            .field("name", &self.name())
            .field("hash_length", &self.hash_length())
            .finish()
    }
}

/// 64 bit xxHash with a zero seed, digest stored little endian.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh64;

impl Xxh64 {
    pub const NAME: &'static str = "XXH64";
}

impl HashAlgorithm for Xxh64 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn hash_length(&self) -> usize {
        8
    }

    fn compute_reader(&self, reader: &mut dyn Read) -> std::io::Result<Vec<u8>> {
        let mut hash = XxHash64::with_seed(0);
        let mut buf = vec![0u8; HASH_BUF_SIZE];

        loop {
            let (eof, len) = fill_buf(reader, &mut buf)?;
            hash.write(&buf[..len]);
            if eof {
                break;
            }
        }
        Ok(hash.finish().to_le_bytes().to_vec())
    }

    fn compute(&self, data: &[u8]) -> Vec<u8> {
        let mut hash = XxHash64::with_seed(0);
        hash.write(data);
        hash.finish().to_le_bytes().to_vec()
    }
}

/// Unkeyed BLAKE3 with the default 32 byte output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3;

impl Blake3 {
    pub const NAME: &'static str = "BLAKE3";
}

impl HashAlgorithm for Blake3 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn hash_length(&self) -> usize {
        blake3::OUT_LEN
    }

    fn compute_reader(&self, reader: &mut dyn Read) -> std::io::Result<Vec<u8>> {
        let mut hash = blake3::Hasher::new();
        copy(reader, &mut hash)?;
        Ok(hash.finalize().as_bytes().to_vec())
    }

    fn compute(&self, data: &[u8]) -> Vec<u8> {
        blake3::hash(data).as_bytes().to_vec()
    }
}
