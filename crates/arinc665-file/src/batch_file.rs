//! Batch File (`*.LUB`, §4.3.1): a Batch Part Number, comment, and the
//! chain of Target Hardware blocks that list which loads to install where.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use arinc665_codec::CountedString;

use crate::error::FileError;
use crate::header::{self, FileClass, SupportedArinc665Version, read_u32_at, write_u32_at};
use crate::pointer_chain::{CountedVec, PointerChain};

const HEADER_SIZE: usize = 16;
const BATCH_PN_POINTER_OFFSET: usize = 8;
const THW_ID_LIST_POINTER_OFFSET: usize = 12;

/// One (filename, part number) member of a Target Hardware block's load
/// list.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct BatchTargetMember {
    pub filename: CountedString,
    pub part_number: CountedString,
}

/// One Target Hardware block: a THW-ID-position and the loads to install
/// there.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct BatchTarget {
    pub thw_id_position: CountedString,
    pub loads: CountedVec<BatchTargetMember>,
}

/// A fully decoded Batch File.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    pub version: SupportedArinc665Version,
    pub batch_part_number: String,
    pub comment: String,
    pub targets: Vec<BatchTarget>,
}

impl BatchFile {
    pub fn decode(buf: &[u8]) -> Result<Self, FileError> {
        let version = header::verify(buf, FileClass::Batch)?;

        let batch_pn_ptr = read_u32_at(buf, BATCH_PN_POINTER_OFFSET)? as usize;
        let thw_ptr = read_u32_at(buf, THW_ID_LIST_POINTER_OFFSET)? as usize;

        let mut pn_area = Cursor::new(&buf[batch_pn_ptr * 2..]);
        let batch_part_number: CountedString = pn_area.read_be()?;
        let comment: CountedString = pn_area.read_be()?;

        let mut thw_area = Cursor::new(&buf[thw_ptr * 2..]);
        let targets: PointerChain<BatchTarget> = thw_area.read_be()?;

        Ok(Self {
            version,
            batch_part_number: batch_part_number.into(),
            comment: comment.into(),
            targets: targets.into_inner(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, FileError> {
        let mut buf = vec![0u8; HEADER_SIZE];
        header::stamp_version(&mut buf, FileClass::Batch, self.version);

        let pn_offset_words = (buf.len() / 2) as u32;
        let mut pn_area = Vec::new();
        {
            let mut cursor = Cursor::new(&mut pn_area);
            cursor.write_be(&CountedString::from(self.batch_part_number.clone()))?;
            cursor.write_be(&CountedString::from(self.comment.clone()))?;
        }
        buf.extend_from_slice(&pn_area);
        write_u32_at(&mut buf, BATCH_PN_POINTER_OFFSET, pn_offset_words);

        let thw_offset_words = (buf.len() / 2) as u32;
        let mut thw_area = Vec::new();
        {
            let mut cursor = Cursor::new(&mut thw_area);
            cursor.write_be(&PointerChain::new(self.targets.clone()))?;
        }
        buf.extend_from_slice(&thw_area);
        write_u32_at(&mut buf, THW_ID_LIST_POINTER_OFFSET, thw_offset_words);

        if buf.len() % 2 != 0 {
            return Err(FileError::OddLength(buf.len()));
        }

        Ok(header::finalize(buf, FileClass::Batch, self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchFile {
        BatchFile {
            version: SupportedArinc665Version::Supplement345,
            batch_part_number: "BATCH-PN-001".to_string(),
            comment: "acceptance batch".to_string(),
            targets: vec![
                BatchTarget {
                    thw_id_position: "THW1-POSA".into(),
                    loads: CountedVec(vec![BatchTargetMember {
                        filename: "LOAD1.LUH".into(),
                        part_number: "LOAD-PN-1".into(),
                    }]),
                },
                BatchTarget {
                    thw_id_position: "THW2-POSB".into(),
                    loads: CountedVec(vec![
                        BatchTargetMember {
                            filename: "LOAD2.LUH".into(),
                            part_number: "LOAD-PN-2".into(),
                        },
                        BatchTargetMember {
                            filename: "LOAD3.LUH".into(),
                            part_number: "LOAD-PN-3".into(),
                        },
                    ]),
                },
            ],
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        let batch = sample();
        let encoded = batch.encode().unwrap();
        let decoded = BatchFile::decode(&encoded).unwrap();
        assert_eq!(decoded, batch);
    }

    #[test]
    fn decode_rejects_truncated_target_chain() {
        let mut encoded = sample().encode().unwrap();
        encoded.truncate(encoded.len() - 10);
        assert!(BatchFile::decode(&encoded).is_err());
    }

    #[test]
    fn single_target_chain_has_terminating_zero_pointer() {
        let mut batch = sample();
        batch.targets.truncate(1);
        let encoded = batch.encode().unwrap();
        let decoded = BatchFile::decode(&encoded).unwrap();
        assert_eq!(decoded.targets.len(), 1);
    }
}
