//! Primitive encodings shared by the signature and delta file formats

use std::io::{ErrorKind, Read, Write};

use thiserror::Error;

/// Terminates the metadata block of both file formats
pub const END_OF_METADATA: &[u8; 3] = b">>>";

/// Longest algorithm name accepted when reading
pub const MAX_NAME_LENGTH: usize = 255;

#[derive(Error, Debug)]
pub enum WireError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("{0}")]
    Corrupt(&'static str),
}

/// Read `expected.len()` bytes and require them to equal `expected`.
///
/// Running out of input here is a format problem, not an I/O one.
pub fn expect_bytes<R: Read + ?Sized>(reader: &mut R, expected: &[u8], what: &'static str) -> Result<(), WireError> {
    let mut found = vec![0u8; expected.len()];

    match reader.read_exact(&mut found) {
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(WireError::Corrupt(what)),
        Err(e) => return Err(e.into()),
        Ok(()) => (),
    }

    if found != expected {
        return Err(WireError::Corrupt(what));
    }
    Ok(())
}

// 7 bits per byte, low group first, high bit set on every byte but the last
fn read_varint<R: Read + ?Sized>(reader: &mut R) -> Result<u32, WireError> {
    let mut value: u32 = 0;

    for shift in (0..35).step_by(7) {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;

        let group = (byte[0] & 0x7f) as u32;
        if shift == 28 && group > 0x0f {
            return Err(WireError::Corrupt("length prefix overflows 32 bits"));
        }
        value |= group << shift;

        if byte[0] & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(WireError::Corrupt("length prefix is too long"))
}

fn write_varint<W: Write + ?Sized>(writer: &mut W, mut value: u32) -> std::io::Result<()> {
    while value >= 0x80 {
        writer.write_all(&[(value as u8) | 0x80])?;
        value >>= 7;
    }
    writer.write_all(&[value as u8])
}

/// Read a length prefixed UTF-8 algorithm name
pub fn read_name<R: Read + ?Sized>(reader: &mut R) -> Result<String, WireError> {
    let len = read_varint(reader)? as usize;
    if len > MAX_NAME_LENGTH {
        return Err(WireError::Corrupt("algorithm name is too long"));
    }

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;

    String::from_utf8(data).map_err(|_| WireError::Corrupt("algorithm name is not UTF-8"))
}

pub fn write_name<W: Write + ?Sized>(writer: &mut W, name: &str) -> std::io::Result<()> {
    write_varint(writer, name.len() as u32)?;
    writer.write_all(name.as_bytes())
}

#[cfg(test)]
mod test_wire {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn name_layout() {
        let mut out = Vec::new();
        write_name(&mut out, "XXH64").unwrap();
        assert_eq!(&out[..], b"\x05XXH64");
    }

    #[test]
    fn long_prefix_layout() {
        let mut out = Vec::new();
        write_varint(&mut out, 300).unwrap();
        assert_eq!(&out[..], &[0xac, 0x02]);

        assert_eq!(read_varint(&mut Cursor::new(out)).unwrap(), 300);
    }

    #[test]
    fn name_round_trip() {
        let mut out = Vec::new();
        write_name(&mut out, "Adler32V2").unwrap();
        write_name(&mut out, "").unwrap();

        let mut reader = Cursor::new(out);
        assert_eq!(read_name(&mut reader).unwrap(), "Adler32V2");
        assert_eq!(read_name(&mut reader).unwrap(), "");
    }

    #[test]
    fn overlong_name() {
        let mut out = Vec::new();
        write_varint(&mut out, 4096).unwrap();

        let err = read_name(&mut Cursor::new(out)).unwrap_err();
        assert!(matches!(err, WireError::Corrupt(_)));
    }

    #[test]
    fn runaway_prefix() {
        let err = read_varint(&mut Cursor::new(vec![0xff; 8])).unwrap_err();
        assert!(matches!(err, WireError::Corrupt(_)));
    }

    #[test]
    fn invalid_utf8() {
        let err = read_name(&mut Cursor::new(vec![2, 0xc3, 0x28])).unwrap_err();
        assert!(matches!(err, WireError::Corrupt(_)));
    }

    #[test]
    fn truncated_name_is_io() {
        let err = read_name(&mut Cursor::new(vec![5, b'X'])).unwrap_err();
        assert!(matches!(err, WireError::IO(ref e) if e.kind() == ErrorKind::UnexpectedEof));
    }

    #[test]
    fn expect_bytes_mismatch_and_short() {
        assert!(expect_bytes(&mut Cursor::new(b">>>".to_vec()), END_OF_METADATA, "eom").is_ok());
        assert!(matches!(
            expect_bytes(&mut Cursor::new(b">><".to_vec()), END_OF_METADATA, "eom"),
            Err(WireError::Corrupt("eom"))
        ));
        assert!(matches!(
            expect_bytes(&mut Cursor::new(b">".to_vec()), END_OF_METADATA, "eom"),
            Err(WireError::Corrupt("eom"))
        ));
    }
}
