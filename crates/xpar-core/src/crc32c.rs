//! CRC32C (Castagnoli, polynomial 0x1EDC6F41), table-driven.
//!
//! Uses the same lazily-initialized static table idiom as [`crate::gf256`].

use once_cell::sync::Lazy;

/// Bit-reflected form of the Castagnoli polynomial 0x1EDC6F41, as required
/// by the standard reflected table-driven CRC algorithm.
const POLY: u32 = 0x82F6_3B78;

fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0usize;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

static TABLE: Lazy<[u32; 256]> = Lazy::new(build_table);

/// Compute the CRC32C of `data`.
pub fn crc32c(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in data {
        let idx = ((crc ^ b as u32) & 0xFF) as usize;
        crc = TABLE[idx] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(crc32c(b""), 0);
    }

    #[test]
    fn known_vector() {
        // Canonical CRC32C check value for the ASCII string "123456789".
        assert_eq!(crc32c(b"123456789"), 0xE306_9283);
    }

    #[test]
    fn stable_across_calls() {
        let data = b"Hello, world!";
        assert_eq!(crc32c(data), crc32c(data));
    }

    #[test]
    fn sensitive_to_single_bit_flip() {
        let mut data = b"Hello, world!".to_vec();
        let base = crc32c(&data);
        data[3] ^= 0x01;
        assert_ne!(crc32c(&data), base);
    }
}
