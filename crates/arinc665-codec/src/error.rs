/// Errors raised by the low-level wire codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("{field} is {len} bytes, exceeding the 16-bit counted-string limit of 65535")]
    EncodingOverflow { field: &'static str, len: usize },

    #[error("counted string is not valid ASCII/UTF-8: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("medium number {0} is out of range 1..=255")]
    InvalidMediumNumber(u16),
}

pub(crate) fn into_binrw_write_error(err: CodecError) -> binrw::Error {
    binrw::Error::Custom {
        pos: 0,
        err: Box::new(err),
    }
}
