//! CRC and ARINC 645 check-value primitives shared by the ARINC 665 codec,
//! file layer, and media-set compiler/decompiler.

mod check_value;
mod crc;
mod error;

pub use check_value::{CheckValue, CheckValueType};
pub use crc::{Crc8, Crc16, Crc32, Crc64};
pub use error::ChecksumError;
