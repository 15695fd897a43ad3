//! Load List file (`LOADS.LUM`, §4.3.2): the Media Set's part number plus
//! one entry per Load describing where its header file lives and which
//! target hardware it is built for.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use arinc665_codec::{CountedString, CountedStringList};

use crate::error::FileError;
use crate::header::{self, FileClass, SupportedArinc665Version, read_u32_at, write_u32_at};
use crate::media_list_common::{
    MediaSetInformation, decode_media_set_information, decode_user_defined_data, encode_media_set_information,
    pad_to_even,
};
use crate::pointer_chain::PointerChain;

const HEADER_SIZE: usize = 20;
const MEDIA_SET_INFO_POINTER_OFFSET: usize = 8;
const LOADS_POINTER_OFFSET: usize = 12;
const USER_DEFINED_DATA_POINTER_OFFSET: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct LoadListEntry {
    pub part_number: CountedString,
    pub header_filename: CountedString,
    pub member_sequence_number: u16,
    pub target_hardware_ids: CountedStringList,
}

impl LoadListEntry {
    fn validate(&self) -> Result<(), FileError> {
        if !(1..=255).contains(&self.member_sequence_number) {
            return Err(FileError::InvalidMemberSequenceNumber(self.member_sequence_number));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadsListFile {
    pub version: SupportedArinc665Version,
    pub media_set_part_number: String,
    pub media_sequence_number: u8,
    pub number_of_media_set_members: u8,
    pub loads: Vec<LoadListEntry>,
    pub user_defined_data: Option<Vec<u8>>,
}

impl LoadsListFile {
    pub fn decode(buf: &[u8]) -> Result<Self, FileError> {
        let version = header::verify(buf, FileClass::MediaList)?;

        let media_ptr = read_u32_at(buf, MEDIA_SET_INFO_POINTER_OFFSET)?;
        let loads_ptr = read_u32_at(buf, LOADS_POINTER_OFFSET)? as usize;
        let udd_ptr = read_u32_at(buf, USER_DEFINED_DATA_POINTER_OFFSET)?;

        let media_info = decode_media_set_information(&buf[media_ptr as usize * 2..])?;

        let mut loads_area = Cursor::new(&buf[loads_ptr * 2..]);
        let loads: PointerChain<LoadListEntry> = loads_area.read_be()?;
        for entry in loads.0.iter() {
            entry.validate()?;
        }

        Ok(Self {
            version,
            media_set_part_number: media_info.media_set_part_number.into(),
            media_sequence_number: media_info.media_sequence_number,
            number_of_media_set_members: media_info.number_of_media_set_members,
            loads: loads.into_inner(),
            user_defined_data: decode_user_defined_data(buf, udd_ptr),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, FileError> {
        for entry in &self.loads {
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

        let loads_offset_words = (buf.len() / 2) as u32;
        let mut loads_area = Vec::new();
        {
            let mut cursor = Cursor::new(&mut loads_area);
            cursor.write_be(&PointerChain::new(self.loads.clone()))?;
        }
        let loads_area = pad_to_even(loads_area);
        buf.extend_from_slice(&loads_area);
        write_u32_at(&mut buf, LOADS_POINTER_OFFSET, loads_offset_words);

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

    fn sample() -> LoadsListFile {
        LoadsListFile {
            version: SupportedArinc665Version::Supplement345,
            media_set_part_number: "MS-PN-01".to_string(),
            media_sequence_number: 1,
            number_of_media_set_members: 2,
            loads: vec![
                LoadListEntry {
                    part_number: "LOAD-PN-1".into(),
                    header_filename: "LOAD1.LUH".into(),
                    member_sequence_number: 1,
                    target_hardware_ids: vec!["THW-1".to_string()].into(),
                },
                LoadListEntry {
                    part_number: "LOAD-PN-2".into(),
                    header_filename: "LOAD2.LUH".into(),
                    member_sequence_number: 1,
                    target_hardware_ids: vec!["THW-1".to_string(), "THW-2".to_string()].into(),
                },
            ],
            user_defined_data: None,
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        let file = sample();
        let encoded = file.encode().unwrap();
        let decoded = LoadsListFile::decode(&encoded).unwrap();
        assert_eq!(decoded, file);
    }

    #[test]
    fn user_defined_data_round_trips() {
        let mut file = sample();
        file.user_defined_data = Some(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let encoded = file.encode().unwrap();
        let decoded = LoadsListFile::decode(&encoded).unwrap();
        assert_eq!(decoded.user_defined_data, file.user_defined_data);
    }

    #[test]
    fn rejects_out_of_range_member_sequence_number() {
        let mut file = sample();
        file.loads[0].member_sequence_number = 0;
        assert!(file.encode().is_err());
    }

    #[test]
    fn single_load_is_valid_degenerate_chain() {
        let mut file = sample();
        file.loads.truncate(1);
        let encoded = file.encode().unwrap();
        let decoded = LoadsListFile::decode(&encoded).unwrap();
        assert_eq!(decoded.loads.len(), 1);
    }
}
