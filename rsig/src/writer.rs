use std::io::{Error, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use rcore::checksum::RollingChecksum;
use rcore::hash::HashAlgorithm;
use rcore::wire::{write_name, END_OF_METADATA};

use crate::format::{SIGNATURE_MAGIC, SIGNATURE_VERSION};
use crate::signature::{ChunkSignature, Signature};

/// Low level encoder for the signature format
pub struct SignatureWriter<W: Write> {
    inner: W,
}

impl<W: Write> SignatureWriter<W> {
    pub fn new(writer: W) -> Self {
        SignatureWriter { inner: writer }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_metadata(&mut self, hash: &dyn HashAlgorithm, checksum: &dyn RollingChecksum) -> Result<(), Error> {
        self.inner.write_all(SIGNATURE_MAGIC)?;
        self.inner.write_u8(SIGNATURE_VERSION)?;
        write_name(&mut self.inner, hash.name())?;
        write_name(&mut self.inner, checksum.name())?;
        self.inner.write_all(END_OF_METADATA)
    }

    // start_offset is implied by the record order and is not written
    pub fn write_chunk(&mut self, chunk: &ChunkSignature) -> Result<(), Error> {
        self.inner.write_u16::<LittleEndian>(chunk.length)?;
        self.inner.write_u32::<LittleEndian>(chunk.rolling_checksum)?;
        self.inner.write_all(&chunk.hash)
    }

    pub fn write_signature(&mut self, signature: &Signature) -> Result<(), Error> {
        self.write_metadata(signature.hash_algorithm(), signature.rolling_checksum())?;
        for chunk in signature.chunks() {
            self.write_chunk(chunk)?;
        }
        Ok(())
    }
}
