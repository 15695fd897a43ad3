use arinc665_codec::CodecError;

/// Failures decoding or encoding one of the five ARINC 665 binary file
/// types (§4.3).
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file length field ({declared} words) does not match actual length ({actual} bytes)")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("file length {0} is odd; ARINC 665 files are always an even number of bytes")]
    OddLength(usize),

    #[error("unexpected format version {actual:#06x}, expected one of {expected:?}")]
    UnexpectedVersion {
        actual: u16,
        expected: &'static [u16],
    },

    #[error("trailing CRC-16 mismatch: computed {computed:#06x}, stored {stored:#06x}")]
    ChecksumMismatch { computed: u16, stored: u16 },

    #[error("whole-file check value mismatch for {context}")]
    FileCheckValueMismatch { context: &'static str },

    #[error("member sequence number {0} is out of range (must be 1..=255)")]
    InvalidMemberSequenceNumber(u16),

    #[error("pointer-chain entry {index} carries a next-pointer of 0 but is not the last of {count}")]
    PrematureChainEnd { index: usize, count: usize },

    #[error("pointer-chain entry {index} of {count} is not last but carries next-pointer 0")]
    UnterminatedChain { index: usize, count: usize },

    #[error("malformed ARINC 665 file: {0}")]
    Malformed(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Checksum(#[from] arinc665_checksum::ChecksumError),

    #[error("binary (de)serialization failed: {0}")]
    BinRw(#[from] binrw::Error),
}
