//! Pointer-linked record sequences (THW-ID chains, load/batch/file entries).
//!
//! Every chained list in the binary file layer shares one shape: a 16-bit
//! count, then that many entries, each prefixed with a "next" pointer
//! measured in 16-bit words from the entry's own first byte. The last
//! entry's pointer is `0`. ARINC 665 entries are already word-aligned by
//! construction, so no inter-entry padding is needed, and the count is
//! explicit rather than implied by stream length or an end-of-list marker.

use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};

use crate::error::FileError;

fn chain_error(err: FileError, pos: u64) -> binrw::Error {
    binrw::Error::Custom {
        pos,
        err: Box::new(err),
    }
}

/// A count-prefixed sequence of `T` with no inter-entry pointer, used for
/// the flat lists nested inside a chained entry (e.g. a Batch target's list
/// of (filename, part number) members).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountedVec<T>(pub Vec<T>);

impl<T> BinRead for CountedVec<T>
where
    T: for<'a> BinRead<Args<'a> = ()>,
{
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let count = u16::read_options(reader, endian, ())? as usize;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(T::read_options(reader, endian, ())?);
        }
        Ok(Self(values))
    }
}

impl<T> BinWrite for CountedVec<T>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let pos = writer.stream_position()?;
        let count: u16 = self.0.len().try_into().map_err(|_| {
            chain_error(
                FileError::Malformed(format!("list of {} entries exceeds u16::MAX", self.0.len())),
                pos,
            )
        })?;
        count.write_options(writer, endian, ())?;
        for value in &self.0 {
            value.write_options(writer, endian, ())?;
        }
        Ok(())
    }
}

/// A count-prefixed, next-pointer-linked sequence of `T` (§4.3's recurring
/// "linked record" shape).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointerChain<T>(pub Vec<T>);

impl<T> PointerChain<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self(values)
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> BinRead for PointerChain<T>
where
    T: for<'a> BinRead<Args<'a> = ()>,
{
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let count = u16::read_options(reader, endian, ())? as usize;
        let mut values = Vec::with_capacity(count);
        for index in 0..count {
            let entry_start = reader.stream_position()?;
            let next_pointer = u16::read_options(reader, endian, ())?;
            let value = T::read_options(reader, endian, ())?;
            values.push(value);

            let is_last = index + 1 == count;
            if is_last {
                if next_pointer != 0 {
                    return Err(chain_error(
                        FileError::PrematureChainEnd { index, count },
                        entry_start,
                    ));
                }
            } else {
                if next_pointer == 0 {
                    return Err(chain_error(
                        FileError::UnterminatedChain { index, count },
                        entry_start,
                    ));
                }
                reader.seek(SeekFrom::Start(entry_start + next_pointer as u64 * 2))?;
            }
        }
        Ok(Self(values))
    }
}

impl<T> BinWrite for PointerChain<T>
where
    T: for<'a> BinWrite<Args<'a> = ()>,
{
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let pos = writer.stream_position()?;
        let count: u16 = self.0.len().try_into().map_err(|_| {
            chain_error(
                FileError::Malformed(format!("chain of {} entries exceeds u16::MAX", self.0.len())),
                pos,
            )
        })?;
        count.write_options(writer, endian, ())?;

        let last = self.0.len().saturating_sub(1);
        for (index, value) in self.0.iter().enumerate() {
            let entry_start = writer.stream_position()?;
            0u16.write_options(writer, endian, ())?; // next-pointer placeholder
            value.write_options(writer, endian, ())?;

            if index != last {
                let entry_end = writer.stream_position()?;
                let distance = entry_end - entry_start;
                debug_assert_eq!(distance % 2, 0, "chain entries must be word-aligned");
                let next_pointer: u16 = (distance / 2).try_into().map_err(|_| {
                    chain_error(
                        FileError::Malformed(format!("chain entry spans {distance} bytes, too large to address in words")),
                        entry_start,
                    )
                })?;
                writer.seek(SeekFrom::Start(entry_start))?;
                next_pointer.write_options(writer, endian, ())?;
                writer.seek(SeekFrom::Start(entry_end))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip_chain(values: Vec<u16>) -> Vec<u8> {
        let chain = PointerChain::new(values);
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        chain.write_options(&mut cursor, Endian::Big, ()).unwrap();
        buf
    }

    #[test]
    fn single_entry_chain_has_zero_pointer() {
        let bytes = round_trip_chain(vec![0xABCD]);
        // count(2) + pointer(2, ==0) + u16 value(2)
        assert_eq!(bytes, vec![0x00, 0x01, 0x00, 0x00, 0xAB, 0xCD]);
    }

    #[test]
    fn multi_entry_chain_round_trips() {
        let bytes = round_trip_chain(vec![1, 2, 3]);
        let mut cursor = Cursor::new(bytes);
        let decoded: PointerChain<u16> =
            PointerChain::read_options(&mut cursor, Endian::Big, ()).unwrap();
        assert_eq!(decoded.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn decode_rejects_premature_zero_pointer() {
        // count=2, first entry's pointer is 0 (claims to be last, but isn't).
        let bytes = vec![0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let mut cursor = Cursor::new(bytes);
        let result: BinResult<PointerChain<u16>> =
            PointerChain::read_options(&mut cursor, Endian::Big, ());
        assert!(result.is_err());
    }

    #[test]
    fn empty_chain_round_trips() {
        let bytes = round_trip_chain(vec![]);
        assert_eq!(bytes, vec![0x00, 0x00]);
        let mut cursor = Cursor::new(bytes);
        let decoded: PointerChain<u16> =
            PointerChain::read_options(&mut cursor, Endian::Big, ()).unwrap();
        assert!(decoded.into_inner().is_empty());
    }

    #[test]
    fn counted_vec_has_no_pointer_field() {
        let vec = CountedVec(vec![1u16, 2, 3]);
        let mut buf = Vec::new();
        let mut cursor = Cursor::new(&mut buf);
        vec.write_options(&mut cursor, Endian::Big, ()).unwrap();
        assert_eq!(buf, vec![0x00, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03]);
    }
}
