use std::mem::size_of;

pub const SIGNATURE_MAGIC: &[u8; 7] = b"FRSNCSG";

/// Highest format version this build reads and the one it writes
pub const SIGNATURE_VERSION: u8 = 0x01;

pub const MIN_CHUNK_SIZE: usize = 128;
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Chunk lengths have to fit a signed 16 bit integer
pub const MAX_CHUNK_SIZE: usize = i16::MAX as usize;

/// Size of one chunk record for a hash of `hash_length` bytes
pub fn record_size(hash_length: usize) -> usize {
    size_of::<u16>() + size_of::<u32>() + hash_length
}
