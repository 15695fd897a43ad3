use arinc665_file::SupportedArinc665Version;

/// How the compiler obtains a synthesisable artifact (load header or
/// batch file) for a given medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCreationPolicy {
    /// Never synthesise; always fetch bytes from the source via
    /// `create_file`.
    None,
    /// Synthesise only when `check_file_exists` reports the artifact is
    /// absent at the source.
    NoneExisting,
    /// Always synthesise, overriding any artifact present at the source.
    All,
}

/// Options for [`crate::decompile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecompileConfig {
    /// Recompute and compare every CRC-16/CRC-32/check-value while
    /// building the model. Disabling this trades integrity verification
    /// for speed when the caller already trusts the media.
    pub check_file_integrity: bool,
}

/// Options for [`crate::compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileConfig {
    pub version: SupportedArinc665Version,
    pub batch_file_policy: FileCreationPolicy,
    pub load_header_file_policy: FileCreationPolicy,
}

impl CompileConfig {
    pub fn new(version: SupportedArinc665Version) -> Self {
        Self {
            version,
            batch_file_policy: FileCreationPolicy::All,
            load_header_file_policy: FileCreationPolicy::All,
        }
    }
}
