//! Delta application
//!
//! A delta is a list of instructions that rebuilds a target file out of a
//! basis file: copy a span of the basis, or write literal bytes. The
//! [`applier::DeltaApplier`] replays any [`source::DeltaSource`] against a
//! basis and then checks the result against the whole file hash the delta
//! carries.
//!
//! [`binary`] holds the on disk delta format, which is one such source.

pub mod applier;
pub mod binary;
pub mod source;

use thiserror::Error;

use rcore::registry::AlgorithmError;
use rcore::wire::WireError;

use crate::binary::DELTA_VERSION;

pub use crate::applier::DeltaApplier;
pub use crate::binary::{BinaryDeltaReader, BinaryDeltaWriter};
pub use crate::source::{DeltaOp, DeltaOps, DeltaSource};

#[derive(Error, Debug)]
pub enum PatchError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("the delta file appears to be corrupt: {0}")]
    CorruptFormat(&'static str),
    #[error("the delta file uses format version {0}, this build only reads versions 1 to {max}", max = DELTA_VERSION)]
    UnsupportedVersion(u8),
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] AlgorithmError),
    #[error(
        "verification of the patched file failed: the {algorithm} hash of the patch result does not \
         match the file that was used as input for the delta, the basis file most likely changed \
         since the signature was calculated"
    )]
    VerificationFailed { algorithm: String },
}

impl From<WireError> for PatchError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::IO(e) => PatchError::IO(e),
            WireError::Corrupt(what) => PatchError::CorruptFormat(what),
        }
    }
}
