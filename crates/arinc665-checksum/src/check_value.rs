//! ARINC 645 check values: a (type, digest-bytes) pair attached to files and
//! loads in addition to the basic CRC-16 framing.

use md5::{Digest as _, Md5};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::crc::{Crc8, Crc16, Crc32, Crc64};

/// The kind of check value stored alongside a file, load, or list file.
///
/// Discriminants match the ARINC 645 wire encoding used throughout §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CheckValueType {
    NotUsed = 0,
    Crc8 = 1,
    Crc16 = 2,
    Crc32 = 3,
    Md5 = 4,
    Sha1 = 5,
    Sha256 = 6,
    Sha512 = 7,
    Crc64 = 8,
}

impl CheckValueType {
    /// Decodes a wire value, rejecting anything outside the enum.
    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            0 => Self::NotUsed,
            1 => Self::Crc8,
            2 => Self::Crc16,
            3 => Self::Crc32,
            4 => Self::Md5,
            5 => Self::Sha1,
            6 => Self::Sha256,
            7 => Self::Sha512,
            8 => Self::Crc64,
            _ => return None,
        })
    }

    /// The wire value for this check value type.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Byte length of the payload for this check value type.
    pub fn payload_len(self) -> usize {
        match self {
            Self::NotUsed => 0,
            Self::Crc8 => 1,
            Self::Crc16 => 2,
            Self::Crc32 => 4,
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
            Self::Crc64 => 8,
        }
    }
}

/// A computed ARINC 645 check value: the algorithm used, and its raw digest
/// bytes (empty for [`CheckValueType::NotUsed`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckValue {
    check_value_type: CheckValueType,
    bytes: Vec<u8>,
}

impl CheckValue {
    /// The sentinel "no check value present" instance.
    pub fn none() -> Self {
        Self {
            check_value_type: CheckValueType::NotUsed,
            bytes: Vec::new(),
        }
    }

    /// Computes a check value of the given type over `data`.
    ///
    /// Returns [`Self::none`] unchanged for [`CheckValueType::NotUsed`].
    pub fn compute(check_value_type: CheckValueType, data: &[u8]) -> Self {
        let bytes = match check_value_type {
            CheckValueType::NotUsed => Vec::new(),
            CheckValueType::Crc8 => vec![Crc8::one_shot(data)],
            CheckValueType::Crc16 => Crc16::one_shot(data).to_be_bytes().to_vec(),
            CheckValueType::Crc32 => Crc32::one_shot(data).to_be_bytes().to_vec(),
            CheckValueType::Crc64 => Crc64::one_shot(data).to_be_bytes().to_vec(),
            CheckValueType::Md5 => Md5::digest(data).to_vec(),
            CheckValueType::Sha1 => Sha1::digest(data).to_vec(),
            CheckValueType::Sha256 => Sha256::digest(data).to_vec(),
            CheckValueType::Sha512 => Sha512::digest(data).to_vec(),
        };
        Self {
            check_value_type,
            bytes,
        }
    }

    /// Reconstructs a check value from wire parts, validating the payload
    /// length matches the type.
    pub fn from_parts(check_value_type: CheckValueType, bytes: Vec<u8>) -> Result<Self, crate::ChecksumError> {
        if bytes.len() != check_value_type.payload_len() {
            return Err(crate::ChecksumError::PayloadLengthMismatch {
                check_value_type,
                expected: check_value_type.payload_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self {
            check_value_type,
            bytes,
        })
    }

    pub fn check_value_type(&self) -> CheckValueType {
        self.check_value_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_used(&self) -> bool {
        self.check_value_type != CheckValueType::NotUsed
    }
}

impl Default for CheckValue {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_used_values_are_equal() {
        assert_eq!(CheckValue::none(), CheckValue::none());
        assert_eq!(
            CheckValue::compute(CheckValueType::NotUsed, b"anything"),
            CheckValue::none()
        );
    }

    #[test]
    fn mismatched_type_is_never_equal_to_not_used() {
        let crc = CheckValue::compute(CheckValueType::Crc16, b"data");
        assert_ne!(crc, CheckValue::none());
    }

    #[test]
    fn payload_lengths_match_algorithm() {
        for (t, len) in [
            (CheckValueType::Crc8, 1),
            (CheckValueType::Crc16, 2),
            (CheckValueType::Crc32, 4),
            (CheckValueType::Md5, 16),
            (CheckValueType::Sha1, 20),
            (CheckValueType::Sha256, 32),
            (CheckValueType::Sha512, 64),
            (CheckValueType::Crc64, 8),
        ] {
            let cv = CheckValue::compute(t, b"some payload");
            assert_eq!(cv.bytes().len(), len);
        }
    }

    #[test]
    fn from_parts_rejects_wrong_length() {
        let err = CheckValue::from_parts(CheckValueType::Sha256, vec![0u8; 4]);
        assert!(err.is_err());
    }

    #[test]
    fn round_trip_from_parts() {
        let cv = CheckValue::compute(CheckValueType::Md5, b"round trip");
        let rebuilt = CheckValue::from_parts(cv.check_value_type(), cv.bytes().to_vec()).unwrap();
        assert_eq!(cv, rebuilt);
    }
}
