//! The framed header and trailer shared by all five binary file types
//! (§4.3): a `file length in words` / `format version` / `spare` prefix,
//! and a trailing CRC-16 over everything that precedes it.
//!
//! Top-level section pointers (to the PN area, list area, user-defined
//! data, ...) are *absolute* word offsets from byte 0 of the file — unlike
//! [`crate::pointer_chain::PointerChain`]'s next-pointers, which are
//! relative to each entry's own start. Grounded on
//! `LoadListFile::decodeBody`/`encode` in the reference implementation,
//! which resolves `rawFile.subspan(pointer * 2)` directly from the file
//! start.

use arinc665_checksum::Crc16;

use crate::error::FileError;

/// Which family of format-version values a file belongs to (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Load,
    Batch,
    MediaList,
}

/// `SupportedArinc665Version` re-exported at the file layer so callers don't
/// need to depend on `arinc665-codec` directly for this one type.
pub use arinc665_codec::SupportedArinc665Version;

impl FileClass {
    pub fn wire_version(self, version: SupportedArinc665Version) -> u16 {
        use SupportedArinc665Version::*;
        match (self, version) {
            (FileClass::Load, Supplement2) => 0x8003,
            (FileClass::Load, Supplement345) => 0x8004,
            (FileClass::Batch, Supplement2) => 0x9003,
            (FileClass::Batch, Supplement345) => 0x9004,
            (FileClass::MediaList, Supplement2) => 0xA003,
            (FileClass::MediaList, Supplement345) => 0xA004,
        }
    }

    fn from_wire(self, wire: u16) -> Option<SupportedArinc665Version> {
        use SupportedArinc665Version::*;
        Some(match (self, wire) {
            (FileClass::Load, 0x8003) => Supplement2,
            (FileClass::Load, 0x8004) => Supplement345,
            (FileClass::Batch, 0x9003) => Supplement2,
            (FileClass::Batch, 0x9004) => Supplement345,
            (FileClass::MediaList, 0xA003) => Supplement2,
            (FileClass::MediaList, 0xA004) => Supplement345,
            _ => return None,
        })
    }

    fn expected_wire_values(self) -> &'static [u16] {
        match self {
            FileClass::Load => &[0x8003, 0x8004],
            FileClass::Batch => &[0x9003, 0x9004],
            FileClass::MediaList => &[0xA003, 0xA004],
        }
    }
}

pub const LENGTH_FIELD_OFFSET: usize = 0;
pub const VERSION_FIELD_OFFSET: usize = 4;
pub const SPARE_FIELD_OFFSET: usize = 6;

pub fn write_u16_at(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

pub fn write_u32_at(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

pub fn read_u16_at(buf: &[u8], offset: usize) -> Result<u16, FileError> {
    buf.get(offset..offset + 2)
        .map(|s| u16::from_be_bytes([s[0], s[1]]))
        .ok_or_else(|| FileError::Malformed(format!("truncated file: need 2 bytes at offset {offset}")))
}

pub fn read_u32_at(buf: &[u8], offset: usize) -> Result<u32, FileError> {
    buf.get(offset..offset + 4)
        .map(|s| u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or_else(|| FileError::Malformed(format!("truncated file: need 4 bytes at offset {offset}")))
}

/// Stamps the format-version field. Callers that compute a whole-file
/// check value over the body (e.g. `FILES.LUM`'s optional file check
/// value) must call this immediately after allocating the header buffer,
/// before building out the body, so that check value covers the real
/// version bytes rather than the zeroed placeholder.
pub fn stamp_version(buf: &mut [u8], class: FileClass, version: SupportedArinc665Version) {
    write_u16_at(buf, VERSION_FIELD_OFFSET, class.wire_version(version));
}

/// Appends the trailing CRC-16, sets the length-in-words and version
/// fields, and returns the finished buffer. `buf` must already contain the
/// complete body with a 2-byte placeholder region for the trailer at its
/// tail removed — callers pass the body *without* the trailer and this
/// function appends it.
pub fn finalize(mut buf: Vec<u8>, class: FileClass, version: SupportedArinc665Version) -> Vec<u8> {
    debug_assert_eq!(buf.len() % 2, 0, "file body must be word-aligned before finalize");
    write_u16_at(&mut buf, VERSION_FIELD_OFFSET, class.wire_version(version));

    let total_len_words = ((buf.len() + 2) / 2) as u32;
    write_u32_at(&mut buf, LENGTH_FIELD_OFFSET, total_len_words);

    let crc = Crc16::one_shot(&buf);
    buf.extend_from_slice(&crc.to_be_bytes());
    buf
}

/// Validates the common framed header and trailer, returning the
/// file's declared [`SupportedArinc665Version`].
pub fn verify(buf: &[u8], class: FileClass) -> Result<SupportedArinc665Version, FileError> {
    if buf.len() % 2 != 0 {
        return Err(FileError::OddLength(buf.len()));
    }
    if buf.len() < 10 {
        return Err(FileError::Malformed(format!(
            "file of {} bytes is too short for the common header and trailer",
            buf.len()
        )));
    }

    let declared_words = read_u32_at(buf, LENGTH_FIELD_OFFSET)?;
    if declared_words as usize * 2 != buf.len() {
        return Err(FileError::LengthMismatch {
            declared: declared_words,
            actual: buf.len(),
        });
    }

    let version_wire = read_u16_at(buf, VERSION_FIELD_OFFSET)?;
    let version = class.from_wire(version_wire).ok_or(FileError::UnexpectedVersion {
        actual: version_wire,
        expected: class.expected_wire_values(),
    })?;

    let body = &buf[..buf.len() - 2];
    let stored = read_u16_at(buf, buf.len() - 2)?;
    let computed = Crc16::one_shot(body);
    if computed != stored {
        return Err(FileError::ChecksumMismatch { computed, stored });
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_then_verify_round_trips() {
        let body = vec![0u8; 16];
        let encoded = finalize(body, FileClass::Batch, SupportedArinc665Version::Supplement2);
        assert_eq!(encoded.len(), 18);
        let version = verify(&encoded, FileClass::Batch).unwrap();
        assert_eq!(version, SupportedArinc665Version::Supplement2);
    }

    #[test]
    fn verify_rejects_bad_crc() {
        let body = vec![0u8; 16];
        let mut encoded = finalize(body, FileClass::Batch, SupportedArinc665Version::Supplement2);
        *encoded.last_mut().unwrap() ^= 0xFF;
        assert!(matches!(
            verify(&encoded, FileClass::Batch),
            Err(FileError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn verify_rejects_wrong_class_version() {
        let body = vec![0u8; 16];
        let encoded = finalize(body, FileClass::Load, SupportedArinc665Version::Supplement2);
        assert!(matches!(
            verify(&encoded, FileClass::Batch),
            Err(FileError::UnexpectedVersion { .. })
        ));
    }

    #[test]
    fn verify_rejects_odd_length() {
        let mut encoded = finalize(vec![0u8; 16], FileClass::Batch, SupportedArinc665Version::Supplement2);
        encoded.push(0);
        assert!(matches!(verify(&encoded, FileClass::Batch), Err(FileError::OddLength(_))));
    }
}
