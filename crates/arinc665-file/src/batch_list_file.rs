//! Batch List file (`BATCHES.LUM`, §4.3.2): the Media Set's part number
//! plus one entry per Batch describing where its batch file lives.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use arinc665_codec::CountedString;

use crate::error::FileError;
use crate::header::{self, FileClass, SupportedArinc665Version, read_u32_at, write_u32_at};
use crate::media_list_common::{
    MediaSetInformation, decode_media_set_information, decode_user_defined_data, encode_media_set_information,
    pad_to_even,
};
use crate::pointer_chain::PointerChain;

const HEADER_SIZE: usize = 20;
const MEDIA_SET_INFO_POINTER_OFFSET: usize = 8;
const BATCHES_POINTER_OFFSET: usize = 12;
const USER_DEFINED_DATA_POINTER_OFFSET: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct BatchListEntry {
    pub part_number: CountedString,
    pub filename: CountedString,
    pub member_sequence_number: u16,
}

impl BatchListEntry {
    fn validate(&self) -> Result<(), FileError> {
        if !(1..=255).contains(&self.member_sequence_number) {
            return Err(FileError::InvalidMemberSequenceNumber(self.member_sequence_number));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchesListFile {
    pub version: SupportedArinc665Version,
    pub media_set_part_number: String,
    pub media_sequence_number: u8,
    pub number_of_media_set_members: u8,
    pub batches: Vec<BatchListEntry>,
    pub user_defined_data: Option<Vec<u8>>,
}

impl BatchesListFile {
    pub fn decode(buf: &[u8]) -> Result<Self, FileError> {
        let version = header::verify(buf, FileClass::MediaList)?;

        let media_ptr = read_u32_at(buf, MEDIA_SET_INFO_POINTER_OFFSET)?;
        let batches_ptr = read_u32_at(buf, BATCHES_POINTER_OFFSET)? as usize;
        let udd_ptr = read_u32_at(buf, USER_DEFINED_DATA_POINTER_OFFSET)?;

        let media_info = decode_media_set_information(&buf[media_ptr as usize * 2..])?;

        let mut batches_area = Cursor::new(&buf[batches_ptr * 2..]);
        let batches: PointerChain<BatchListEntry> = batches_area.read_be()?;
        for entry in batches.0.iter() {
            entry.validate()?;
        }

        Ok(Self {
            version,
            media_set_part_number: media_info.media_set_part_number.into(),
            media_sequence_number: media_info.media_sequence_number,
            number_of_media_set_members: media_info.number_of_media_set_members,
            batches: batches.into_inner(),
            user_defined_data: decode_user_defined_data(buf, udd_ptr),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, FileError> {
        for entry in &self.batches {
            entry.validate()?;
        }

        let mut buf = vec![0u8; HEADER_SIZE];
        header::stamp_version(&mut buf, FileClass::MediaList, self.version);

        let media_info = MediaSetInformation {
            media_set_part_number: self.media_set_part_number.clone().into(),
            media_sequence_number: self.media_sequence_number,
            number_of_media_set_members: self.number_of_media_set_members,
        };
        let media_area = pad_to_even(encode_media_set_information(&media_info)?);
        let media_offset_words = (buf.len() / 2) as u32;
        buf.extend_from_slice(&media_area);
        write_u32_at(&mut buf, MEDIA_SET_INFO_POINTER_OFFSET, media_offset_words);

        let batches_offset_words = (buf.len() / 2) as u32;
        let mut batches_area = Vec::new();
        {
            let mut cursor = Cursor::new(&mut batches_area);
            cursor.write_be(&PointerChain::new(self.batches.clone()))?;
        }
        let batches_area = pad_to_even(batches_area);
        buf.extend_from_slice(&batches_area);
        write_u32_at(&mut buf, BATCHES_POINTER_OFFSET, batches_offset_words);

        if let Some(udd) = &self.user_defined_data {
            let udd_offset_words = (buf.len() / 2) as u32;
            buf.extend_from_slice(&pad_to_even(udd.clone()));
            write_u32_at(&mut buf, USER_DEFINED_DATA_POINTER_OFFSET, udd_offset_words);
        }

        Ok(header::finalize(buf, FileClass::MediaList, self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchesListFile {
        BatchesListFile {
            version: SupportedArinc665Version::Supplement2,
            media_set_part_number: "MS-PN-01".to_string(),
            media_sequence_number: 1,
            number_of_media_set_members: 1,
            batches: vec![
                BatchListEntry {
                    part_number: "BATCH-PN-1".into(),
                    filename: "BATCH1.LUB".into(),
                    member_sequence_number: 1,
                },
                BatchListEntry {
                    part_number: "BATCH-PN-2".into(),
                    filename: "BATCH2.LUB".into(),
                    member_sequence_number: 1,
                },
            ],
            user_defined_data: None,
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        let file = sample();
        let encoded = file.encode().unwrap();
        let decoded = BatchesListFile::decode(&encoded).unwrap();
        assert_eq!(decoded, file);
    }

    #[test]
    fn rejects_out_of_range_member_sequence_number() {
        let mut file = sample();
        file.batches[1].member_sequence_number = 256;
        assert!(file.encode().is_err());
    }
}
