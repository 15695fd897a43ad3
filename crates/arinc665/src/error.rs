use arinc665_checksum::CheckValueType;
use arinc665_codec::CodecError;
use arinc665_file::FileError;
use arinc665_media::MediaError;

/// An error surfaced by a caller-supplied I/O callback (§6.3). Boxed so
/// hosts can report whatever failure their filesystem or transport layer
/// produced without this crate committing to a concrete I/O error type.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The single error type returned by every public decompiler, compiler,
/// and model-mutation entry point (§7).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid file: {reason}")]
    InvalidFile { reason: String },

    #[error("checksum mismatch at {location}: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch { expected: u32, actual: u32, location: String },

    #[error("{check_value_type:?} check value mismatch at {location}")]
    CheckValueMismatch { check_value_type: CheckValueType, location: String },

    #[error("cross-reference to {name:?} could not be resolved")]
    CrossReferenceMissing { name: String },

    #[error("media set inconsistent across media: {reason}")]
    MediaSetInconsistent { reason: String },

    #[error("name collision on {name:?}")]
    NameCollision { name: String },

    #[error("invalid model: {reason}")]
    InvalidModel { reason: String },

    #[error("{field} would overflow its encoded width")]
    EncodingOverflow { field: &'static str },

    #[error("a referenced source file is missing: {0}")]
    MissingSource(String),

    #[error("I/O callback failed: {0}")]
    CallbackFailed(#[source] CallbackError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Media(#[from] MediaError),
}
