//! Load Header file (`*.LUH`, §4.3.4): the Load's part number, the target
//! hardware it installs to, its data and support file members, and the
//! whole-load CRC-32 that ties the header to the file contents it
//! describes.
//!
//! The header layout past the common 8-byte prefix and the additional
//! pointers Supplement 3/4/5 introduces are the one corner of this crate
//! without a surviving reference implementation in the source pack (see
//! `DESIGN.md`); the offsets below follow §4.3.4 literally and place the
//! Load CRC-32 immediately before the common CRC-16 trailer, consistent
//! with every other file type's "trailer is always the last fixed field"
//! convention.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use arinc665_checksum::{CheckValue, Crc32};
use arinc665_codec::{CountedString, CountedStringList, FileCheckValueField};

use crate::error::FileError;
use crate::header::{self, FileClass, SupportedArinc665Version, read_u32_at, write_u32_at};
use crate::media_list_common::{decode_variable_region, pad_to_even};
use crate::pointer_chain::{CountedVec, PointerChain};

const HEADER_SIZE_V2: usize = 30;
const HEADER_SIZE_V345: usize = 38;

const PART_FLAGS_OFFSET: usize = 8;
const LOAD_PN_POINTER_OFFSET: usize = 10;
const THW_ID_POINTER_OFFSET: usize = 14;
const DATA_FILES_POINTER_OFFSET: usize = 18;
const SUPPORT_FILES_POINTER_OFFSET: usize = 22;
const USER_DEFINED_DATA_POINTER_OFFSET: usize = 26;
const LOAD_TYPE_POINTER_OFFSET: usize = 30;
const LOAD_CHECK_VALUE_POINTER_OFFSET: usize = 34;

#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
struct WireLoadFileEntryV2 {
    filename: CountedString,
    part_number: CountedString,
    length_bytes: u32,
    crc16: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
struct WireLoadFileEntryV345 {
    filename: CountedString,
    part_number: CountedString,
    length_bytes: u32,
    crc16: u16,
    check_value: FileCheckValueField,
}

/// A Data File or Support File list entry. `check_value` is `None` for
/// Supplement-2 loads and always `Some` for Supplement-3/4/5 loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFileEntry {
    pub filename: String,
    pub part_number: String,
    pub length_bytes: u32,
    pub crc16: u16,
    pub check_value: Option<CheckValue>,
}

/// One THW-ID and the positions on it this load applies to
/// (Supplement 3/4/5 only).
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct ThwIdPositions {
    pub thw_id: CountedString,
    pub positions: CountedStringList,
}

/// Target hardware the load is built for, in either generation's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetHardware {
    Supplement2(Vec<String>),
    Supplement345(Vec<ThwIdPositions>),
}

/// An optional classification of the load (Supplement 3/4/5 only).
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct LoadType {
    pub description: CountedString,
    pub id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadHeaderFile {
    pub version: SupportedArinc665Version,
    pub part_flags: u16,
    pub load_part_number: String,
    pub target_hardware: TargetHardware,
    pub data_files: Vec<LoadFileEntry>,
    pub support_files: Vec<LoadFileEntry>,
    pub user_defined_data: Option<Vec<u8>>,
    pub load_type: Option<LoadType>,
    pub load_check_value: Option<CheckValue>,
    pub load_crc: u32,
}

fn encode_file_entries(
    version: SupportedArinc665Version,
    entries: &[LoadFileEntry],
    context: &'static str,
) -> Result<Vec<u8>, FileError> {
    let mut area = Vec::new();
    let mut cursor = Cursor::new(&mut area);
    match version {
        SupportedArinc665Version::Supplement2 => {
            let wire: Vec<WireLoadFileEntryV2> = entries
                .iter()
                .map(|e| {
                    if e.check_value.is_some() {
                        return Err(FileError::Malformed(format!(
                            "Supplement 2 {context} entries cannot carry a check value"
                        )));
                    }
                    Ok(WireLoadFileEntryV2 {
                        filename: e.filename.clone().into(),
                        part_number: e.part_number.clone().into(),
                        length_bytes: e.length_bytes,
                        crc16: e.crc16,
                    })
                })
                .collect::<Result<_, FileError>>()?;
            cursor.write_be(&PointerChain::new(wire))?;
        }
        SupportedArinc665Version::Supplement345 => {
            let wire: Vec<WireLoadFileEntryV345> = entries
                .iter()
                .map(|e| WireLoadFileEntryV345 {
                    filename: e.filename.clone().into(),
                    part_number: e.part_number.clone().into(),
                    length_bytes: e.length_bytes,
                    crc16: e.crc16,
                    check_value: FileCheckValueField(e.check_value.clone().unwrap_or_else(CheckValue::none)),
                })
                .collect();
            cursor.write_be(&PointerChain::new(wire))?;
        }
    }
    Ok(area)
}

fn decode_file_entries(
    version: SupportedArinc665Version,
    area: &[u8],
) -> Result<Vec<LoadFileEntry>, FileError> {
    let mut cursor = Cursor::new(area);
    Ok(match version {
        SupportedArinc665Version::Supplement2 => {
            let chain: PointerChain<WireLoadFileEntryV2> = cursor.read_be()?;
            chain
                .into_inner()
                .into_iter()
                .map(|e| LoadFileEntry {
                    filename: e.filename.into(),
                    part_number: e.part_number.into(),
                    length_bytes: e.length_bytes,
                    crc16: e.crc16,
                    check_value: None,
                })
                .collect()
        }
        SupportedArinc665Version::Supplement345 => {
            let chain: PointerChain<WireLoadFileEntryV345> = cursor.read_be()?;
            chain
                .into_inner()
                .into_iter()
                .map(|e| LoadFileEntry {
                    filename: e.filename.into(),
                    part_number: e.part_number.into(),
                    length_bytes: e.length_bytes,
                    crc16: e.crc16,
                    check_value: Some(e.check_value.0),
                })
                .collect()
        }
    })
}

impl LoadHeaderFile {
    pub fn decode(buf: &[u8]) -> Result<Self, FileError> {
        let version = header::verify(buf, FileClass::Load)?;

        let part_flags = header::read_u16_at(buf, PART_FLAGS_OFFSET)?;
        let load_pn_ptr = read_u32_at(buf, LOAD_PN_POINTER_OFFSET)? as usize;
        let thw_ptr = read_u32_at(buf, THW_ID_POINTER_OFFSET)? as usize;
        let data_ptr = read_u32_at(buf, DATA_FILES_POINTER_OFFSET)? as usize;
        let support_ptr = read_u32_at(buf, SUPPORT_FILES_POINTER_OFFSET)? as usize;
        let udd_ptr = read_u32_at(buf, USER_DEFINED_DATA_POINTER_OFFSET)?;

        let mut pn_area = Cursor::new(&buf[load_pn_ptr * 2..]);
        let load_part_number: CountedString = pn_area.read_be()?;

        let target_hardware = match version {
            SupportedArinc665Version::Supplement2 => {
                let mut area = Cursor::new(&buf[thw_ptr * 2..]);
                let ids: CountedStringList = area.read_be()?;
                TargetHardware::Supplement2(ids.into_vec().into_iter().map(String::from).collect())
            }
            SupportedArinc665Version::Supplement345 => {
                let mut area = Cursor::new(&buf[thw_ptr * 2..]);
                let entries: CountedVec<ThwIdPositions> = area.read_be()?;
                TargetHardware::Supplement345(entries.0)
            }
        };

        let data_files = decode_file_entries(version, &buf[data_ptr * 2..])?;
        let support_files = decode_file_entries(version, &buf[support_ptr * 2..])?;

        let (load_type_ptr, lcv_ptr) = if version == SupportedArinc665Version::Supplement345 {
            (
                read_u32_at(buf, LOAD_TYPE_POINTER_OFFSET)?,
                read_u32_at(buf, LOAD_CHECK_VALUE_POINTER_OFFSET)?,
            )
        } else {
            (0, 0)
        };

        let load_type = if load_type_ptr == 0 {
            None
        } else {
            let mut area = Cursor::new(&buf[load_type_ptr as usize * 2..]);
            Some(area.read_be()?)
        };

        let load_check_value = if lcv_ptr == 0 {
            None
        } else {
            let mut area = Cursor::new(&buf[lcv_ptr as usize * 2..]);
            let field: FileCheckValueField = area.read_be()?;
            Some(field.0)
        };

        let load_crc = read_u32_at(buf, buf.len() - 6)?;

        Ok(Self {
            version,
            part_flags,
            load_part_number: load_part_number.into(),
            target_hardware,
            data_files,
            support_files,
            user_defined_data: decode_variable_region(buf, udd_ptr, 6, &[load_type_ptr, lcv_ptr]),
            load_type,
            load_check_value,
            load_crc,
        })
    }

    /// Encodes the header. `load_crc` must already have been computed (see
    /// [`compute_load_crc`]) over this header's own bytes plus the
    /// referenced data/support file contents — the file layer has no
    /// access to those external bytes, so it cannot compute the value
    /// itself.
    pub fn encode(&self) -> Result<Vec<u8>, FileError> {
        let header_size = match self.version {
            SupportedArinc665Version::Supplement2 => HEADER_SIZE_V2,
            SupportedArinc665Version::Supplement345 => HEADER_SIZE_V345,
        };
        let mut buf = vec![0u8; header_size];
        header::stamp_version(&mut buf, FileClass::Load, self.version);
        header::write_u16_at(&mut buf, PART_FLAGS_OFFSET, self.part_flags);

        let pn_offset_words = (buf.len() / 2) as u32;
        let mut pn_area = Vec::new();
        {
            let mut cursor = Cursor::new(&mut pn_area);
            cursor.write_be(&CountedString::from(self.load_part_number.clone()))?;
        }
        let pn_area = pad_to_even(pn_area);
        buf.extend_from_slice(&pn_area);
        write_u32_at(&mut buf, LOAD_PN_POINTER_OFFSET, pn_offset_words);

        let thw_offset_words = (buf.len() / 2) as u32;
        let mut thw_area = Vec::new();
        match (&self.version, &self.target_hardware) {
            (SupportedArinc665Version::Supplement2, TargetHardware::Supplement2(ids)) => {
                let mut cursor = Cursor::new(&mut thw_area);
                cursor.write_be(&CountedStringList::from(ids.clone()))?;
            }
            (SupportedArinc665Version::Supplement345, TargetHardware::Supplement345(entries)) => {
                let mut cursor = Cursor::new(&mut thw_area);
                cursor.write_be(&CountedVec(entries.clone()))?;
            }
            _ => {
                return Err(FileError::Malformed(
                    "target hardware shape does not match the file's declared version".to_string(),
                ));
            }
        }
        let thw_area = pad_to_even(thw_area);
        buf.extend_from_slice(&thw_area);
        write_u32_at(&mut buf, THW_ID_POINTER_OFFSET, thw_offset_words);

        let data_offset_words = (buf.len() / 2) as u32;
        let data_area = pad_to_even(encode_file_entries(self.version, &self.data_files, "data file")?);
        buf.extend_from_slice(&data_area);
        write_u32_at(&mut buf, DATA_FILES_POINTER_OFFSET, data_offset_words);

        let support_offset_words = (buf.len() / 2) as u32;
        let support_area = pad_to_even(encode_file_entries(self.version, &self.support_files, "support file")?);
        buf.extend_from_slice(&support_area);
        write_u32_at(&mut buf, SUPPORT_FILES_POINTER_OFFSET, support_offset_words);

        if let Some(udd) = &self.user_defined_data {
            let udd_offset_words = (buf.len() / 2) as u32;
            buf.extend_from_slice(&pad_to_even(udd.clone()));
            write_u32_at(&mut buf, USER_DEFINED_DATA_POINTER_OFFSET, udd_offset_words);
        }

        if self.version == SupportedArinc665Version::Supplement345 {
            if let Some(load_type) = &self.load_type {
                let offset_words = (buf.len() / 2) as u32;
                let mut area = Vec::new();
                {
                    let mut cursor = Cursor::new(&mut area);
                    cursor.write_be(load_type)?;
                }
                buf.extend_from_slice(&pad_to_even(area));
                write_u32_at(&mut buf, LOAD_TYPE_POINTER_OFFSET, offset_words);
            }

            if let Some(check_value) = &self.load_check_value {
                let offset_words = (buf.len() / 2) as u32;
                let mut area = Vec::new();
                {
                    let mut cursor = Cursor::new(&mut area);
                    cursor.write_be(&FileCheckValueField(check_value.clone()))?;
                }
                buf.extend_from_slice(&area);
                write_u32_at(&mut buf, LOAD_CHECK_VALUE_POINTER_OFFSET, offset_words);
            }
        } else if self.load_type.is_some() || self.load_check_value.is_some() {
            return Err(FileError::Malformed(
                "Load Type and Load Check Value are Supplement 3/4/5 additions".to_string(),
            ));
        }

        if buf.len() % 2 != 0 {
            return Err(FileError::OddLength(buf.len()));
        }
        buf.extend_from_slice(&self.load_crc.to_be_bytes());

        Ok(header::finalize(buf, FileClass::Load, self.version))
    }
}

/// Computes the Load CRC-32 (§4.3.4). `header_prefix` is this header's own
/// encoded bytes up to (but not including) the Load CRC-32 field; for
/// Supplement 2 it is ignored (the CRC there covers only the referenced
/// file contents), for Supplement 3/4/5 it is included.
pub fn compute_load_crc(
    version: SupportedArinc665Version,
    header_prefix: &[u8],
    data_file_contents: &[&[u8]],
    support_file_contents: &[&[u8]],
) -> u32 {
    let mut crc = Crc32::new();
    if version == SupportedArinc665Version::Supplement345 {
        crc.update(header_prefix);
    }
    for bytes in data_file_contents {
        crc.update(bytes);
    }
    for bytes in support_file_contents {
        crc.update(bytes);
    }
    crc.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arinc665_checksum::CheckValueType;

    fn sample_v2() -> LoadHeaderFile {
        LoadHeaderFile {
            version: SupportedArinc665Version::Supplement2,
            part_flags: 0,
            load_part_number: "LOAD-PN-01".to_string(),
            target_hardware: TargetHardware::Supplement2(vec!["THW-1".to_string()]),
            data_files: vec![LoadFileEntry {
                filename: "APP.BIN".to_string(),
                part_number: "APP-PN-1".to_string(),
                length_bytes: 1024,
                crc16: 0xBEEF,
                check_value: None,
            }],
            support_files: vec![],
            user_defined_data: None,
            load_type: None,
            load_check_value: None,
            load_crc: 0xCAFEBABE,
        }
    }

    fn sample_v345() -> LoadHeaderFile {
        LoadHeaderFile {
            version: SupportedArinc665Version::Supplement345,
            part_flags: 0x0001,
            load_part_number: "LOAD-PN-02".to_string(),
            target_hardware: TargetHardware::Supplement345(vec![ThwIdPositions {
                thw_id: "THW-1".into(),
                positions: vec!["POS-A".to_string(), "POS-B".to_string()].into(),
            }]),
            data_files: vec![LoadFileEntry {
                filename: "APP.BIN".to_string(),
                part_number: "APP-PN-1".to_string(),
                length_bytes: 1024,
                crc16: 0xBEEF,
                check_value: Some(CheckValue::compute(CheckValueType::Sha256, b"app contents")),
            }],
            support_files: vec![LoadFileEntry {
                filename: "README.TXT".to_string(),
                part_number: "DOC-PN-1".to_string(),
                length_bytes: 128,
                crc16: 0x0101,
                check_value: Some(CheckValue::none()),
            }],
            user_defined_data: Some(vec![1, 2, 3, 4]),
            load_type: Some(LoadType {
                description: "operational".into(),
                id: 7,
            }),
            load_check_value: Some(CheckValue::compute(CheckValueType::Crc32, b"whole load")),
            load_crc: 0,
        }
    }

    #[test]
    fn v2_round_trips() {
        let file = sample_v2();
        let encoded = file.encode().unwrap();
        let decoded = LoadHeaderFile::decode(&encoded).unwrap();
        assert_eq!(decoded, file);
    }

    #[test]
    fn v345_round_trips() {
        let file = sample_v345();
        let encoded = file.encode().unwrap();
        let decoded = LoadHeaderFile::decode(&encoded).unwrap();
        assert_eq!(decoded, file);
    }

    #[test]
    fn v2_rejects_load_type() {
        let mut file = sample_v2();
        file.load_type = Some(LoadType {
            description: "x".into(),
            id: 0,
        });
        assert!(file.encode().is_err());
    }

    #[test]
    fn load_crc_supplement2_excludes_header_bytes() {
        let only_data = compute_load_crc(SupportedArinc665Version::Supplement2, b"ignored header", &[b"data"], &[]);
        let without_header_arg = compute_load_crc(SupportedArinc665Version::Supplement2, b"", &[b"data"], &[]);
        assert_eq!(only_data, without_header_arg);
    }

    #[test]
    fn load_crc_supplement345_includes_header_bytes() {
        let with_header = compute_load_crc(SupportedArinc665Version::Supplement345, b"header bytes", &[b"data"], &[]);
        let without_header = compute_load_crc(SupportedArinc665Version::Supplement345, b"", &[b"data"], &[]);
        assert_ne!(with_header, without_header);
    }
}
