//! File List file (`FILES.LUM`, §4.3.3): the Media Set's part number plus
//! one entry per regular file, with its path, CRC-16, and (Supplement
//! 3/4/5 only) a per-file ARINC 645 check value. Supplement 3/4/5 can also
//! attach a check value to the list file itself.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use arinc665_checksum::{CheckValue, CheckValueType};
use arinc665_codec::{CountedString, FileCheckValueField};

use crate::error::FileError;
use crate::header::{self, FileClass, SupportedArinc665Version, read_u32_at, write_u32_at};
use crate::media_list_common::{
    MediaSetInformation, decode_media_set_information, decode_variable_region, encode_media_set_information,
    pad_to_even,
};
use crate::pointer_chain::PointerChain;

const HEADER_SIZE_V2: usize = 20;
const HEADER_SIZE_V345: usize = 24;
const MEDIA_SET_INFO_POINTER_OFFSET: usize = 8;
const FILES_POINTER_OFFSET: usize = 12;
const USER_DEFINED_DATA_POINTER_OFFSET: usize = 16;
const FILE_CHECK_VALUE_POINTER_OFFSET: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
struct WireFileEntryV2 {
    filename: CountedString,
    path_name: CountedString,
    member_sequence_number: u16,
    crc16: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
struct WireFileEntryV345 {
    filename: CountedString,
    path_name: CountedString,
    member_sequence_number: u16,
    crc16: u16,
    check_value: FileCheckValueField,
}

/// A decoded `FILES.LUM` entry. `check_value` is always `None` for
/// Supplement-2 files and always `Some` (possibly [`CheckValueType::NotUsed`])
/// for Supplement-3/4/5 files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListEntry {
    pub filename: String,
    pub path_name: String,
    pub member_sequence_number: u16,
    pub crc16: u16,
    pub check_value: Option<CheckValue>,
}

impl FileListEntry {
    fn validate(&self) -> Result<(), FileError> {
        if !(1..=255).contains(&self.member_sequence_number) {
            return Err(FileError::InvalidMemberSequenceNumber(self.member_sequence_number));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesListFile {
    pub version: SupportedArinc665Version,
    pub media_set_part_number: String,
    pub media_sequence_number: u8,
    pub number_of_media_set_members: u8,
    pub files: Vec<FileListEntry>,
    pub user_defined_data: Option<Vec<u8>>,
    /// Whole-file check value, covering every byte preceding it. Only
    /// meaningful (and only ever `Some`) in Supplement 3/4/5.
    pub file_check_value: Option<CheckValue>,
}

impl FilesListFile {
    pub fn decode(buf: &[u8]) -> Result<Self, FileError> {
        let version = header::verify(buf, FileClass::MediaList)?;

        let media_ptr = read_u32_at(buf, MEDIA_SET_INFO_POINTER_OFFSET)?;
        let files_ptr = read_u32_at(buf, FILES_POINTER_OFFSET)? as usize;
        let udd_ptr = read_u32_at(buf, USER_DEFINED_DATA_POINTER_OFFSET)?;

        let media_info = decode_media_set_information(&buf[media_ptr as usize * 2..])?;

        let fcv_ptr = if version == SupportedArinc665Version::Supplement345 {
            read_u32_at(buf, FILE_CHECK_VALUE_POINTER_OFFSET)?
        } else {
            0
        };

        let (files, file_check_value) = match version {
            SupportedArinc665Version::Supplement2 => {
                let mut files_area = Cursor::new(&buf[files_ptr * 2..]);
                let chain: PointerChain<WireFileEntryV2> = files_area.read_be()?;
                let files = chain
                    .into_inner()
                    .into_iter()
                    .map(|e| FileListEntry {
                        filename: e.filename.into(),
                        path_name: e.path_name.into(),
                        member_sequence_number: e.member_sequence_number,
                        crc16: e.crc16,
                        check_value: None,
                    })
                    .collect();
                (files, None)
            }
            SupportedArinc665Version::Supplement345 => {
                let mut files_area = Cursor::new(&buf[files_ptr * 2..]);
                let chain: PointerChain<WireFileEntryV345> = files_area.read_be()?;
                let files = chain
                    .into_inner()
                    .into_iter()
                    .map(|e| FileListEntry {
                        filename: e.filename.into(),
                        path_name: e.path_name.into(),
                        member_sequence_number: e.member_sequence_number,
                        crc16: e.crc16,
                        check_value: Some(e.check_value.0),
                    })
                    .collect();

                let file_check_value = if fcv_ptr == 0 {
                    None
                } else {
                    let mut area = Cursor::new(&buf[fcv_ptr as usize * 2..]);
                    let field: FileCheckValueField = area.read_be()?;
                    let check_value = field.0;
                    if check_value.check_value_type() != CheckValueType::NotUsed {
                        let covered = &buf[..fcv_ptr as usize * 2];
                        let computed = CheckValue::compute(check_value.check_value_type(), covered);
                        if computed != check_value {
                            return Err(FileError::FileCheckValueMismatch {
                                context: "FILES.LUM",
                            });
                        }
                    }
                    Some(check_value)
                };
                (files, file_check_value)
            }
        };

        for entry in &files {
            entry.validate()?;
        }

        Ok(Self {
            version,
            media_set_part_number: media_info.media_set_part_number.into(),
            media_sequence_number: media_info.media_sequence_number,
            number_of_media_set_members: media_info.number_of_media_set_members,
            files,
            user_defined_data: decode_variable_region(buf, udd_ptr, 2, &[fcv_ptr]),
            file_check_value,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, FileError> {
        for entry in &self.files {
            entry.validate()?;
        }

        let header_size = match self.version {
            SupportedArinc665Version::Supplement2 => HEADER_SIZE_V2,
            SupportedArinc665Version::Supplement345 => HEADER_SIZE_V345,
        };
        let mut buf = vec![0u8; header_size];
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

        let files_offset_words = (buf.len() / 2) as u32;
        let mut files_area = Vec::new();
        match self.version {
            SupportedArinc665Version::Supplement2 => {
                let wire: Vec<WireFileEntryV2> = self
                    .files
                    .iter()
                    .map(|e| {
                        if e.check_value.is_some() {
                            return Err(FileError::Malformed(
                                "Supplement 2 file entries cannot carry a check value".to_string(),
                            ));
                        }
                        Ok(WireFileEntryV2 {
                            filename: e.filename.clone().into(),
                            path_name: e.path_name.clone().into(),
                            member_sequence_number: e.member_sequence_number,
                            crc16: e.crc16,
                        })
                    })
                    .collect::<Result<_, FileError>>()?;
                let mut cursor = Cursor::new(&mut files_area);
                cursor.write_be(&PointerChain::new(wire))?;
            }
            SupportedArinc665Version::Supplement345 => {
                let wire: Vec<WireFileEntryV345> = self
                    .files
                    .iter()
                    .map(|e| {
                        let check_value = e.check_value.clone().unwrap_or_else(CheckValue::none);
                        WireFileEntryV345 {
                            filename: e.filename.clone().into(),
                            path_name: e.path_name.clone().into(),
                            member_sequence_number: e.member_sequence_number,
                            crc16: e.crc16,
                            check_value: FileCheckValueField(check_value),
                        }
                    })
                    .collect();
                let mut cursor = Cursor::new(&mut files_area);
                cursor.write_be(&PointerChain::new(wire))?;
            }
        }
        let files_area = pad_to_even(files_area);
        buf.extend_from_slice(&files_area);
        write_u32_at(&mut buf, FILES_POINTER_OFFSET, files_offset_words);

        if let Some(udd) = &self.user_defined_data {
            let udd_offset_words = (buf.len() / 2) as u32;
            buf.extend_from_slice(&pad_to_even(udd.clone()));
            write_u32_at(&mut buf, USER_DEFINED_DATA_POINTER_OFFSET, udd_offset_words);
        }

        if self.version == SupportedArinc665Version::Supplement345 {
            if let Some(check_value) = &self.file_check_value {
                // The file check value covers everything preceding it, so it
                // is computed over `buf` as built so far, then appended.
                let computed = CheckValue::compute(check_value.check_value_type(), &buf);
                let fcv_offset_words = (buf.len() / 2) as u32;
                let mut area = Vec::new();
                {
                    let mut cursor = Cursor::new(&mut area);
                    cursor.write_be(&FileCheckValueField(computed))?;
                }
                buf.extend_from_slice(&area);
                write_u32_at(&mut buf, FILE_CHECK_VALUE_POINTER_OFFSET, fcv_offset_words);
            }
        }

        Ok(header::finalize(buf, FileClass::MediaList, self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_v2() -> FilesListFile {
        FilesListFile {
            version: SupportedArinc665Version::Supplement2,
            media_set_part_number: "MS-PN-01".to_string(),
            media_sequence_number: 1,
            number_of_media_set_members: 1,
            files: vec![FileListEntry {
                filename: "README.TXT".to_string(),
                path_name: "\\DOCS\\".to_string(),
                member_sequence_number: 1,
                crc16: 0x1234,
                check_value: None,
            }],
            user_defined_data: None,
            file_check_value: None,
        }
    }

    fn sample_v345() -> FilesListFile {
        FilesListFile {
            version: SupportedArinc665Version::Supplement345,
            media_set_part_number: "MS-PN-01".to_string(),
            media_sequence_number: 1,
            number_of_media_set_members: 1,
            files: vec![FileListEntry {
                filename: "README.TXT".to_string(),
                path_name: "\\DOCS\\".to_string(),
                member_sequence_number: 1,
                crc16: 0x1234,
                check_value: Some(CheckValue::compute(CheckValueType::Sha256, b"dummy")),
            }],
            user_defined_data: None,
            file_check_value: Some(CheckValue::none()),
        }
    }

    #[test]
    fn v2_round_trips() {
        let file = sample_v2();
        let encoded = file.encode().unwrap();
        let decoded = FilesListFile::decode(&encoded).unwrap();
        assert_eq!(decoded, file);
    }

    #[test]
    fn v345_round_trips_with_per_file_check_values() {
        let file = sample_v345();
        let encoded = file.encode().unwrap();
        let decoded = FilesListFile::decode(&encoded).unwrap();
        assert_eq!(decoded, file);
    }

    #[test]
    fn v345_whole_file_check_value_round_trips() {
        let mut file = sample_v345();
        file.file_check_value = Some(CheckValue::compute(CheckValueType::Crc32, b"placeholder"));
        let encoded = file.encode().unwrap();
        let decoded = FilesListFile::decode(&encoded).unwrap();
        assert!(decoded.file_check_value.is_some());
        assert_eq!(decoded.file_check_value.unwrap().check_value_type(), CheckValueType::Crc32);
    }

    #[test]
    fn v2_rejects_per_file_check_value() {
        let mut file = sample_v2();
        file.files[0].check_value = Some(CheckValue::none());
        assert!(file.encode().is_err());
    }
}
