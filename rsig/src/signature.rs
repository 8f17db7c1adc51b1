use rcore::checksum::RollingChecksum;
use rcore::hash::HashAlgorithm;

/// One slice of the basis file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSignature {
    /// Not stored on disk, running sum of the lengths before this chunk
    pub start_offset: u64,
    pub length: u16,
    pub rolling_checksum: u32,
    pub hash: Vec<u8>,
}

/// Chunk table of a basis file plus the algorithms that produced it.
///
/// Only the reader and builder in this crate put chunks in, once handed out
/// a signature is read only.
#[derive(Debug)]
pub struct Signature {
    hash_algorithm: Box<dyn HashAlgorithm>,
    rolling_checksum: Box<dyn RollingChecksum>,
    chunks: Vec<ChunkSignature>,
}

impl Signature {
    pub(crate) fn new(hash_algorithm: Box<dyn HashAlgorithm>, rolling_checksum: Box<dyn RollingChecksum>) -> Self {
        Signature {
            hash_algorithm,
            rolling_checksum,
            chunks: Vec::new(),
        }
    }

    // Chunks must arrive in file order
    pub(crate) fn push(&mut self, length: u16, rolling_checksum: u32, hash: Vec<u8>) {
        let start_offset = self.basis_length();

        self.chunks.push(ChunkSignature {
            start_offset,
            length,
            rolling_checksum,
            hash,
        });
    }

    pub fn hash_algorithm(&self) -> &dyn HashAlgorithm {
        self.hash_algorithm.as_ref()
    }

    pub fn rolling_checksum(&self) -> &dyn RollingChecksum {
        self.rolling_checksum.as_ref()
    }

    pub fn chunks(&self) -> &[ChunkSignature] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Size of the basis file this signature describes
    pub fn basis_length(&self) -> u64 {
        self.chunks
            .last()
            .map_or(0, |c| c.start_offset + c.length as u64)
    }
}
