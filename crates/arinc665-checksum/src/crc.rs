//! CRC-8/16/32/64 digests with the non-reflected, ARINC 665 parameter sets.
//!
//! None of these match a common off-the-shelf CRC profile (no reflection,
//! custom polynomials for the wider widths), so they are table-driven by
//! hand rather than built on a generic `crc` crate.

use std::sync::LazyLock;

macro_rules! crc_impl {
    ($name:ident, $doc:literal, $word:ty, $width:expr, $poly:expr, $init:expr, $xorout:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            state: $word,
        }

        impl $name {
            const WIDTH: u32 = $width;
            const POLY: $word = $poly;
            const INIT: $word = $init;
            const XOROUT: $word = $xorout;
            const TOP_BIT: $word = 1 << (Self::WIDTH - 1);

            fn table() -> &'static [$word; 256] {
                static TABLE: LazyLock<[$word; 256]> = LazyLock::new(|| {
                    let mut table = [0 as $word; 256];
                    let shift = $name::WIDTH.saturating_sub(8);
                    let mut i = 0usize;
                    while i < 256 {
                        let mut c: $word = ((i as $word) << shift) as $word;
                        let mut bit = 0;
                        while bit < 8 {
                            c = if c & $name::TOP_BIT != 0 {
                                (c << 1) ^ $name::POLY
                            } else {
                                c << 1
                            };
                            bit += 1;
                        }
                        table[i] = c;
                        i += 1;
                    }
                    table
                });
                &TABLE
            }

            /// Starts a new streaming digest.
            pub fn new() -> Self {
                Self { state: Self::INIT }
            }

            /// Feeds additional bytes into the digest.
            pub fn update(&mut self, bytes: &[u8]) {
                let table = Self::table();
                let shift = Self::WIDTH.saturating_sub(8);
                for &b in bytes {
                    let idx = (((self.state >> shift) as u64 as u8) ^ b) as usize;
                    self.state = (self.state << 8) ^ table[idx];
                }
            }

            /// Finalizes the digest, consuming it.
            pub fn finalize(self) -> $word {
                self.state ^ Self::XOROUT
            }

            /// Computes the digest over a single byte slice.
            pub fn one_shot(bytes: &[u8]) -> $word {
                let mut crc = Self::new();
                crc.update(bytes);
                crc.finalize()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

crc_impl!(
    Crc8,
    "CRC-8 digest (poly 0x80, init 0x00, xor-out 0x00, no reflection).",
    u8,
    8,
    0x80,
    0x00,
    0x00
);

crc_impl!(
    Crc16,
    "CRC-16 digest (poly 0x1021, init 0xFFFF, xor-out 0x0000, no reflection).\n\nThis is the checksum used for every ARINC 665 file trailer.",
    u16,
    16,
    0x1021,
    0xFFFF,
    0x0000
);

crc_impl!(
    Crc32,
    "CRC-32 digest (poly 0x04C11DB7, init 0xFFFFFFFF, xor-out 0xFFFFFFFF, no reflection).\n\nUsed for the per-file CRC-32 embedded in Load Headers (Load CRC).",
    u32,
    32,
    0x04C1_1DB7,
    0xFFFF_FFFF,
    0xFFFF_FFFF
);

crc_impl!(
    Crc64,
    "CRC-64 digest (poly 0x42F0E1EBA9EA3693, init all-ones, xor-out all-ones, no reflection).\n\nARINC 665-4 appears to call for reflection, but existing media test\nvectors require none; this matches the existing-media behavior. See\nthe crate-level docs for the open question this leaves.",
    u64,
    64,
    0x42F0_E1EB_A9EA_3693,
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFF
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc16_self_check_closure() {
        // P3: crc16(B || be16(crc16(B))) == 0
        let data: Vec<u8> = (0..=0x0Fu8).collect();
        let crc = Crc16::one_shot(&data);
        let mut with_trailer = data.clone();
        with_trailer.extend_from_slice(&crc.to_be_bytes());
        assert_eq!(Crc16::one_shot(&with_trailer), 0x0000);
    }

    #[test]
    fn crc16_known_vector() {
        // S2: CRC-16 over bytes 00..0F is 0x3B37.
        let data: Vec<u8> = (0..=0x0Fu8).collect();
        assert_eq!(Crc16::one_shot(&data), 0x3B37);
    }

    #[test]
    fn crc16_empty_input_is_init_xor_xorout() {
        assert_eq!(Crc16::one_shot(&[]), 0xFFFF);
    }

    #[test]
    fn crc32_deterministic() {
        let data = [0xDEu8, 0xAD, 0xBE, 0xEF];
        let a = Crc32::one_shot(&data);
        let b = Crc32::one_shot(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn crc_streaming_matches_one_shot() {
        let data = b"arbitrary load data for streaming comparison";
        let mut streaming = Crc32::new();
        streaming.update(&data[..10]);
        streaming.update(&data[10..]);
        assert_eq!(streaming.finalize(), Crc32::one_shot(data));
    }

    #[test]
    fn crc8_self_consistent() {
        let data = b"THW-1";
        assert_eq!(Crc8::one_shot(data), Crc8::one_shot(data));
    }

    #[test]
    fn crc64_self_consistent() {
        let data = b"LPN-1";
        assert_eq!(Crc64::one_shot(data), Crc64::one_shot(data));
    }
}
