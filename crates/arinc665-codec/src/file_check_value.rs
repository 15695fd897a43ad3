//! The variable-length "File Check Value" wire shape used both for
//! per-file check values in `FILES.LUM` and for the whole-file check values
//! attached to load headers and data/support file entries (§4.3.3).
//!
//! Wire shape: `u16` length-in-words (counting everything after the length
//! field itself, i.e. the type field plus the possibly-padded payload),
//! then `u16` type, then the payload. When the type is `NotUsed` only the
//! length (`1`) and type (`0`) fields are emitted — this is the detail that
//! pins down the length field's exact meaning; see `DESIGN.md` for the
//! resolution chosen between two slightly different ways of phrasing the
//! word-count formula.

use std::io::{Read, Seek, Write};

use arinc665_checksum::{CheckValue, CheckValueType};
use binrw::{BinRead, BinResult, BinWrite, Endian};

/// Wraps a [`CheckValue`] for wire (de)serialization in the File Check
/// Value shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCheckValueField(pub CheckValue);

impl BinRead for FileCheckValueField {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let length_words = u16::read_options(reader, endian, ())? as usize;
        let check_value_type_raw = u16::read_options(reader, endian, ())?;
        let check_value_type = CheckValueType::from_u16(check_value_type_raw).ok_or_else(|| {
            binrw::Error::AssertFail {
                pos: reader.stream_position().unwrap_or(0),
                message: format!("unknown check value type {check_value_type_raw:#06x}"),
            }
        })?;

        // Bytes remaining after the type field, per the length-in-words count.
        let remaining_bytes = length_words.saturating_sub(1) * 2;
        let mut payload = vec![0u8; remaining_bytes];
        reader.read_exact(&mut payload)?;

        let expected = check_value_type.payload_len();
        let padded_expected = expected + (expected % 2);
        if remaining_bytes != padded_expected {
            return Err(binrw::Error::AssertFail {
                pos: reader.stream_position().unwrap_or(0),
                message: format!(
                    "check value payload length {remaining_bytes} does not match type {check_value_type:?} (expected {padded_expected})"
                ),
            });
        }
        payload.truncate(expected);

        let check_value = CheckValue::from_parts(check_value_type, payload).map_err(|e| {
            binrw::Error::Custom {
                pos: reader.stream_position().unwrap_or(0),
                err: Box::new(e),
            }
        })?;
        Ok(Self(check_value))
    }
}

impl BinWrite for FileCheckValueField {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let payload = self.0.bytes();
        let mut padded = payload.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let length_words = 1 + (padded.len() / 2);
        (length_words as u16).write_options(writer, endian, ())?;
        self.0.check_value_type().as_u16().write_options(writer, endian, ())?;
        writer.write_all(&padded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(cv: CheckValue) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        FileCheckValueField(cv)
            .write_options(&mut cursor, Endian::Big, ())
            .unwrap();
        buf
    }

    #[test]
    fn not_used_is_two_words() {
        let bytes = round_trip(CheckValue::none());
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn crc16_payload_round_trips() {
        let cv = CheckValue::compute(CheckValueType::Crc16, b"hello");
        let bytes = round_trip(cv.clone());
        let mut cursor = Cursor::new(bytes);
        let decoded = FileCheckValueField::read_options(&mut cursor, Endian::Big, ())
            .unwrap()
            .0;
        assert_eq!(decoded, cv);
    }

    #[test]
    fn odd_payload_is_padded_to_even_length() {
        // CRC-8's 1-byte payload must be padded so the field stays word-aligned.
        let cv = CheckValue::compute(CheckValueType::Crc8, b"payload");
        let bytes = round_trip(cv.clone());
        assert_eq!(bytes.len() % 2, 0);
        assert_eq!(bytes.len(), 4 /* length + type */ + 2 /* padded payload */);

        let mut cursor = Cursor::new(bytes);
        let decoded = FileCheckValueField::read_options(&mut cursor, Endian::Big, ())
            .unwrap()
            .0;
        assert_eq!(decoded, cv);
    }
}
