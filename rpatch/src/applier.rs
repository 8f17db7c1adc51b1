use std::io::{Read, Seek, SeekFrom, Write};

use log::{debug, warn};

use rcore::buf::copy_exact;

use crate::source::{DeltaOp, DeltaSource};
use crate::PatchError;

/// Size of the staging buffer basis copies go through. Copies of any length
/// reuse this one buffer.
pub const COPY_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Rebuilds a file from a basis plus a delta and verifies the result.
///
/// The applier owns neither stream, the caller opens them, positions the
/// output where it wants the result and closes both afterwards.
#[derive(Debug, Clone)]
pub struct DeltaApplier {
    skip_verification: bool,
    buffer_size: usize,
}

impl DeltaApplier {
    pub fn new() -> Self {
        DeltaApplier {
            skip_verification: false,
            buffer_size: COPY_BUFFER_SIZE,
        }
    }

    /// Skip the whole file hash check after the delta has been applied
    pub fn skip_verification(mut self, skip: bool) -> Self {
        self.skip_verification = skip;
        self
    }

    #[cfg(test)]
    fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Replay `delta` against `basis` into `output`.
    ///
    /// Every instruction is written out as soon as it is read. Any I/O error
    /// aborts the whole operation and leaves whatever was written so far in
    /// `output`. With verification on, `output` is left positioned at its end
    /// by the hash check.
    pub fn apply<B, D, O>(&self, basis: &mut B, delta: &mut D, output: &mut O) -> Result<(), PatchError>
    where
        B: Read + Seek,
        D: DeltaSource + ?Sized,
        O: Read + Write + Seek,
    {
        let mut buf: Vec<u8> = Vec::new();
        let mut ops = 0u64;
        let mut copied = 0u64;
        let mut written = 0u64;

        while let Some(op) = delta.next() {
            match op? {
                DeltaOp::WriteData(data) => {
                    output.write_all(&data)?;
                    written += data.len() as u64;
                }
                DeltaOp::Copy { start, length } => {
                    if buf.is_empty() {
                        buf = vec![0u8; self.buffer_size];
                    }

                    basis.seek(SeekFrom::Start(start))?;
                    copy_exact(basis, output, length, &mut buf)?;
                    copied += length;
                }
            }
            ops += 1;
        }
        output.flush()?;

        debug!(
            "Applied delta: {} instructions, {} bytes copied from basis, {} bytes of new data",
            ops, copied, written
        );

        if !self.skip_verification && !self.hash_check(delta, output)? {
            let algorithm = delta.hash_algorithm().name().to_string();
            warn!("Patched output does not match the expected {} hash", algorithm);
            return Err(PatchError::VerificationFailed { algorithm });
        }
        Ok(())
    }

    /// Hash all of `output` from its start and compare it with the hash the
    /// delta expects.
    pub fn hash_check<D, O>(&self, delta: &D, output: &mut O) -> Result<bool, PatchError>
    where
        D: DeltaSource + ?Sized,
        O: Read + Seek,
    {
        output.seek(SeekFrom::Start(0))?;

        let actual = delta.hash_algorithm().compute_reader(output)?;
        Ok(actual.as_slice() == delta.expected_hash())
    }
}

impl Default for DeltaApplier {
    fn default() -> Self {
        Self::new()
    }
}
