use std::fmt;

/// A cheap weak checksum over a sliding window.
///
/// The signature reader only persists these values, the rolling part is for
/// whoever scans a file against a signature.
pub trait RollingChecksum: Send + Sync {
    /// Canonical name, this is what gets written to disk
    fn name(&self) -> &'static str;

    fn calculate(&self, block: &[u8]) -> u32;

    /// Slide a window of `chunk_size` bytes forward by one byte.
    ///
    /// Must equal [`RollingChecksum::calculate`] over the shifted window.
    fn rotate(&self, checksum: u32, remove: u8, add: u8, chunk_size: usize) -> u32;
}

impl fmt::Debug for dyn RollingChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollingChecksum").field("name", &self.name()).finish()
    }
}

/// Adler-32 style checksum with 16 bit wrapping sums.
///
/// This is the original on-disk checksum, it is not true Adler-32 since the
/// sums are never reduced modulo 65521.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adler32;

impl Adler32 {
    pub const NAME: &'static str = "Adler32";
}

impl RollingChecksum for Adler32 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&self, block: &[u8]) -> u32 {
        let mut a: u16 = 1;
        let mut b: u16 = 0;

        for &byte in block {
            a = a.wrapping_add(byte as u16);
            b = b.wrapping_add(a);
        }

        ((b as u32) << 16) | a as u32
    }

    fn rotate(&self, checksum: u32, remove: u8, add: u8, chunk_size: usize) -> u32 {
        let mut b = (checksum >> 16) as u16;
        let mut a = checksum as u16;

        a = a.wrapping_sub(remove as u16).wrapping_add(add as u16);
        b = b
            .wrapping_sub((chunk_size as u16).wrapping_mul(remove as u16))
            .wrapping_add(a)
            .wrapping_sub(1);

        ((b as u32) << 16) | a as u32
    }
}

const MOD_ADLER: u32 = 65521;

/// True Adler-32, both sums reduced modulo 65521.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adler32V2;

impl Adler32V2 {
    pub const NAME: &'static str = "Adler32V2";
}

impl RollingChecksum for Adler32V2 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&self, block: &[u8]) -> u32 {
        let mut a: u32 = 1;
        let mut b: u32 = 0;

        for &byte in block {
            a = (a + byte as u32) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }

        (b << 16) | a
    }

    fn rotate(&self, checksum: u32, remove: u8, add: u8, chunk_size: usize) -> u32 {
        let b = checksum >> 16;
        let a = checksum & 0xffff;
        let remove = remove as u32;

        let a = (a + MOD_ADLER - remove + add as u32) % MOD_ADLER;

        // b_new = b_old - n * remove + a_new - 1, kept non-negative mod 65521
        let weighted = ((chunk_size as u64 % MOD_ADLER as u64) * remove as u64 % MOD_ADLER as u64) as u32;
        let b = (b + a + 2 * MOD_ADLER - 1 - weighted) % MOD_ADLER;

        (b << 16) | a
    }
}
