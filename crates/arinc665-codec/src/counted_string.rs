//! 16-bit counted, 16-bit-aligned ASCII strings and lists thereof.
//!
//! Written as a manual [`BinRead`]/[`BinWrite`] pair, the way a wire shape
//! a plain `#[binrw]` struct can't express cleanly (here: the conditional
//! padding byte) usually ends up implemented.

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};

use crate::error::{into_binrw_write_error, CodecError};

/// A counted, optionally-padded ASCII string: `u16` length, `length` bytes,
/// then a single `0x00` pad byte if `length` is odd.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CountedString(String);

impl CountedString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for CountedString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<CountedString> for String {
    fn from(value: CountedString) -> Self {
        value.0
    }
}

impl From<&str> for CountedString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Display for CountedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl BinRead for CountedString {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let len = u16::read_options(reader, endian, ())? as usize;
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
        if len % 2 == 1 {
            let mut pad = [0u8; 1];
            reader.read_exact(&mut pad)?;
        }
        let s = String::from_utf8(buf).map_err(|e| binrw::Error::Custom {
            pos: reader.stream_position().unwrap_or(0),
            err: Box::new(CodecError::InvalidString(e)),
        })?;
        Ok(Self(s))
    }
}

impl BinWrite for CountedString {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let bytes = self.0.as_bytes();
        if bytes.len() > u16::MAX as usize {
            return Err(into_binrw_write_error(CodecError::EncodingOverflow {
                field: "counted string",
                len: bytes.len(),
            }));
        }
        (bytes.len() as u16).write_options(writer, endian, ())?;
        writer.write_all(bytes)?;
        if bytes.len() % 2 == 1 {
            writer.write_all(&[0u8])?;
        }
        Ok(())
    }
}

/// A `u16`-counted list of [`CountedString`]s, with no extra padding between
/// or after entries (each entry is already 16-bit aligned on its own).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountedStringList(Vec<CountedString>);

impl CountedStringList {
    pub fn new(values: Vec<CountedString>) -> Self {
        Self(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountedString> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<CountedString> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for CountedStringList {
    fn from(values: Vec<String>) -> Self {
        Self(values.into_iter().map(CountedString::from).collect())
    }
}

impl From<CountedStringList> for Vec<String> {
    fn from(value: CountedStringList) -> Self {
        value.0.into_iter().map(String::from).collect()
    }
}

impl BinRead for CountedStringList {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let count = u16::read_options(reader, endian, ())? as usize;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(CountedString::read_options(reader, endian, ())?);
        }
        Ok(Self(values))
    }
}

impl BinWrite for CountedStringList {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        if self.0.len() > u16::MAX as usize {
            return Err(into_binrw_write_error(CodecError::EncodingOverflow {
                field: "counted string list",
                len: self.0.len(),
            }));
        }
        (self.0.len() as u16).write_options(writer, endian, ())?;
        for value in &self.0 {
            value.write_options(writer, endian, ())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(s: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        CountedString::from(s).write_options(&mut cursor, Endian::Big, ()).unwrap();
        buf
    }

    #[test]
    fn even_length_has_no_padding() {
        let bytes = round_trip("AB");
        assert_eq!(bytes, vec![0x00, 0x02, b'A', b'B']);
    }

    #[test]
    fn odd_length_gets_padded() {
        let bytes = round_trip("ABC");
        assert_eq!(bytes, vec![0x00, 0x03, b'A', b'B', b'C', 0x00]);
    }

    #[test]
    fn decode_is_inverse_of_encode() {
        let bytes = round_trip("LPN-1");
        let mut cursor = Cursor::new(bytes);
        let decoded = CountedString::read_options(&mut cursor, Endian::Big, ()).unwrap();
        assert_eq!(decoded.as_str(), "LPN-1");
    }

    #[test]
    fn string_list_round_trips() {
        let list = CountedStringList::from(vec!["THW-1".to_string(), "THW-22".to_string()]);
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        list.write_options(&mut cursor, Endian::Big, ()).unwrap();

        let mut read_cursor = Cursor::new(buf);
        let decoded = CountedStringList::read_options(&mut read_cursor, Endian::Big, ()).unwrap();
        assert_eq!(Vec::<String>::from(decoded), vec!["THW-1", "THW-22"]);
    }
}
