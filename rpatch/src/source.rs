use rcore::hash::HashAlgorithm;

use crate::PatchError;

/// One delta instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOp {
    /// Append these bytes to the output as is
    WriteData(Vec<u8>),
    /// Append `length` bytes of the basis starting at absolute offset `start`
    Copy { start: u64, length: u64 },
}

/// Anything that can feed instructions to the applier.
///
/// Instructions come out in the order they must be applied, the first error
/// ends the delta.
pub trait DeltaSource: Iterator<Item = Result<DeltaOp, PatchError>> {
    /// Algorithm that produced [`DeltaSource::expected_hash`]
    fn hash_algorithm(&self) -> &dyn HashAlgorithm;

    /// Hash of the file the delta rebuilds
    fn expected_hash(&self) -> &[u8];
}

/// Delta held in memory
pub struct DeltaOps {
    hash: Box<dyn HashAlgorithm>,
    expected_hash: Vec<u8>,
    ops: std::vec::IntoIter<DeltaOp>,
}

impl DeltaOps {
    pub fn new(hash: Box<dyn HashAlgorithm>, expected_hash: Vec<u8>, ops: Vec<DeltaOp>) -> Self {
        DeltaOps {
            hash,
            expected_hash,
            ops: ops.into_iter(),
        }
    }
}

impl Iterator for DeltaOps {
    type Item = Result<DeltaOp, PatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ops.next().map(Ok)
    }
}

impl DeltaSource for DeltaOps {
    fn hash_algorithm(&self) -> &dyn HashAlgorithm {
        self.hash.as_ref()
    }

    fn expected_hash(&self) -> &[u8] {
        &self.expected_hash
    }
}
