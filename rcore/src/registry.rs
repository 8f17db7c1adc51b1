//! Name to algorithm lookup
//!
//! Signature and delta files carry the names of the algorithms that produced
//! them, these functions turn those names back into live implementations.
//! Names match exactly, a name that is published here is never reassigned.

use thiserror::Error;

use crate::checksum::{Adler32, Adler32V2, RollingChecksum};
use crate::hash::{Blake3, HashAlgorithm, Xxh64};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(String),
}

/// Every hash name [`create_hash`] understands
pub const HASH_ALGORITHMS: &[&str] = &[Xxh64::NAME, Blake3::NAME];

/// Every rolling checksum name [`create_checksum`] understands
pub const CHECKSUM_ALGORITHMS: &[&str] = &[Adler32::NAME, Adler32V2::NAME];

pub fn create_hash(name: &str) -> Result<Box<dyn HashAlgorithm>, AlgorithmError> {
    match name {
        Xxh64::NAME => Ok(Box::new(Xxh64)),
        Blake3::NAME => Ok(Box::new(Blake3)),
        _ => Err(AlgorithmError::UnsupportedAlgorithm(name.to_string())),
    }
}

pub fn create_checksum(name: &str) -> Result<Box<dyn RollingChecksum>, AlgorithmError> {
    match name {
        Adler32::NAME => Ok(Box::new(Adler32)),
        Adler32V2::NAME => Ok(Box::new(Adler32V2)),
        _ => Err(AlgorithmError::UnsupportedAlgorithm(name.to_string())),
    }
}

pub fn default_hash() -> Box<dyn HashAlgorithm> {
    Box::new(Xxh64)
}

pub fn default_checksum() -> Box<dyn RollingChecksum> {
    Box::new(Adler32)
}
