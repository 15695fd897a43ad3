use crate::CheckValueType;

/// Errors raised while constructing or validating check values.
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error(
        "check value of type {check_value_type:?} must be {expected} bytes, got {actual}"
    )]
    PayloadLengthMismatch {
        check_value_type: CheckValueType,
        expected: usize,
        actual: usize,
    },
}
