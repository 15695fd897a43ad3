//! Low-level ARINC 665 wire codec: big-endian primitives, 16-bit-aligned
//! counted strings, and directory-path conventions (§4.2).
//!
//! Higher layers compose these into `#[binrw]` structs (see `arinc665-file`)
//! rather than hand-rolling byte offsets.

mod counted_string;
mod error;
mod file_check_value;
pub mod path;
mod scalar;

pub use counted_string::{CountedString, CountedStringList};
pub use error::CodecError;
pub use file_check_value::FileCheckValueField;
pub use scalar::{MediumNumber, SupportedArinc665Version};
