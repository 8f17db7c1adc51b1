use std::cmp;
use std::io::{Error, ErrorKind, Read, Write};

/// Fill `buf` from `data`, looping over short reads.
///
/// Returns `(eof, len)` where `eof` is set when the reader ran dry before the
/// buffer was full, and `len` is how much of `buf` was filled.
pub fn fill_buf<R: Read + ?Sized>(data: &mut R, buf: &mut [u8]) -> std::io::Result<(bool, usize)> {
    let mut buf_read = 0;

    while buf_read < buf.len() {
        match data.read(&mut buf[buf_read..]) {
            Ok(0) => return Ok((true, buf_read)),
            Ok(x) => buf_read += x,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
    }
    Ok((false, buf_read))
}

/// Copy exactly `len` bytes from `reader` to `writer`, staging them through
/// `buf`.
///
/// Memory use is bounded by `buf` no matter how large `len` is. A reader that
/// ends early is an `UnexpectedEof` error, the bytes staged before that point
/// have already been written.
pub fn copy_exact<R, W>(reader: &mut R, writer: &mut W, len: u64, buf: &mut [u8]) -> std::io::Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if buf.is_empty() && len > 0 {
        return Err(Error::new(ErrorKind::InvalidInput, "copy buffer is empty"));
    }

    let mut remaining = len;
    while remaining > 0 {
        let want = cmp::min(remaining, buf.len() as u64) as usize;

        let (eof, got) = fill_buf(reader, &mut buf[..want])?;
        writer.write_all(&buf[..got])?;
        remaining -= got as u64;

        if eof && remaining > 0 {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!("stream ended with {} of {} bytes left to copy", remaining, len),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::io::{Read, Result, Seek, SeekFrom};

    // Hands out at most one byte per read to exercise short read handling
    pub struct Trickle<R>(pub R);

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    impl<R: Seek> Seek for Trickle<R> {
        fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
            self.0.seek(pos)
        }
    }
}
