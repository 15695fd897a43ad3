/// Failures building or mutating a [`crate::MediaSet`](crate::MediaSet).
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("a directory or file named {name:?} already exists in this container")]
    NameExists { name: String },

    #[error("reference is not a direct child of the expected container")]
    NotFound,

    #[error("medium number {0} is out of range (must be 1..=255)")]
    InvalidMediumNumber(u8),

    #[error("medium number {0} is already present in this Media Set")]
    MediumExists(u8),

    #[error("load member does not reference a regular file owned by this Media Set")]
    DanglingMember,

    #[error("batch target does not reference a load owned by this Media Set")]
    DanglingTarget,
}
