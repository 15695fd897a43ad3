//! Shared body pieces of the three media list files (`LOADS.LUM`,
//! `BATCHES.LUM`, `FILES.LUM`, §4.3.2-4.3.3): the Media Set information
//! area and the opaque user-defined-data tail.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use arinc665_codec::CountedString;

use crate::error::FileError;

/// The `MediaSetPN` area present at the start of every media list file's
/// body: the Media Set part number and this medium's position within it.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct MediaSetInformation {
    pub media_set_part_number: CountedString,
    pub media_sequence_number: u8,
    pub number_of_media_set_members: u8,
}

pub fn decode_media_set_information(area: &[u8]) -> Result<MediaSetInformation, FileError> {
    let mut cursor = Cursor::new(area);
    Ok(cursor.read_be()?)
}

pub fn encode_media_set_information(info: &MediaSetInformation) -> Result<Vec<u8>, FileError> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);
    cursor.write_be(info)?;
    Ok(buf)
}

/// Decodes an opaque, 2-byte-aligned byte run addressed by `pointer_words`
/// (word offset from file start). `None` if `pointer_words` is `0`.
///
/// Such regions carry no length prefix of their own, so their end must be
/// inferred: either the start of whichever other pointer-addressed region
/// comes right after them, or (if none do) `fixed_tail_bytes` back from the
/// end of the file — the fixed-size fields (Load CRC-32, the common
/// CRC-16, ...) that always sit at the very end. Grounded on
/// `FileListFile::decodeBody`'s `endOfUserDefinedData` computation, which
/// clamps the region to the File Check Value pointer when one follows it.
pub fn decode_variable_region(
    buf: &[u8],
    pointer_words: u32,
    fixed_tail_bytes: usize,
    later_pointers_words: &[u32],
) -> Option<Vec<u8>> {
    if pointer_words == 0 {
        return None;
    }
    let start = pointer_words as usize * 2;
    let end = later_pointers_words
        .iter()
        .copied()
        .filter(|&p| p != 0 && p > pointer_words)
        .map(|p| p as usize * 2)
        .min()
        .unwrap_or_else(|| buf.len().saturating_sub(fixed_tail_bytes));
    Some(buf[start..end].to_vec())
}

/// User-defined data for the list files with no section past it but the
/// common CRC-16 trailer (`LOADS.LUM`, `BATCHES.LUM`, and `FILES.LUM`
/// Supplement 2).
pub fn decode_user_defined_data(buf: &[u8], pointer_words: u32) -> Option<Vec<u8>> {
    decode_variable_region(buf, pointer_words, 2, &[])
}

/// Pads an odd-length user-defined-data blob to an even length (I6): the
/// wire format has no length field of its own for these regions, so an odd
/// length can only be represented by appending a trailing zero byte that a
/// later decode cannot tell apart from genuine data.
pub fn pad_to_even(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.len() % 2 == 1 {
        log::warn!("padding {}-byte user-defined data to an even length; the trailing zero byte is not recoverable as distinct from real data on decode", bytes.len());
        bytes.push(0);
    }
    bytes
}
