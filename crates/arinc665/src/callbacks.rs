//! The core's only external contract (§6.3): media and file I/O is always
//! performed through caller-supplied callbacks, never touched directly.
//! Paths here are POSIX-style (`/`-separated, leading `/`, no trailing
//! one) even though the wire format stores backslash-delimited paths —
//! that conversion happens in [`arinc665_codec::path`].

use crate::error::CallbackError;

/// What the decompiler needs: read a file's exact byte contents from a
/// given medium.
pub trait ReadFile {
    fn read_file(&mut self, medium: u8, path: &str) -> Result<Vec<u8>, CallbackError>;
}

/// What the compiler needs to materialise a Media Set at a destination
/// while reading source bytes from wherever the model's regular files
/// currently live.
pub trait CompilerCallbacks {
    /// Creates the medium's root (e.g. a `MEDIUM_00N` directory).
    fn create_medium(&mut self, medium: u8) -> Result<(), CallbackError>;

    /// Creates a directory at `path` within `medium`.
    fn create_directory(&mut self, medium: u8, path: &str) -> Result<(), CallbackError>;

    /// Whether a regular file already exists at the source side (not the
    /// destination) for `path` on `medium`.
    fn check_file_exists(&mut self, medium: u8, path: &str) -> Result<bool, CallbackError>;

    /// Materialises a regular file's bytes at the destination, typically
    /// by copying them from the source.
    fn create_file(&mut self, medium: u8, path: &str) -> Result<(), CallbackError>;

    /// Writes `bytes` to `path` on `medium`. Must create parent
    /// directories and must fail if `path` already exists.
    fn write_file(&mut self, medium: u8, path: &str, bytes: &[u8]) -> Result<(), CallbackError>;

    /// Reads a file's exact byte contents, from either side: sources for
    /// CRC/check-value computation, or freshly written destination bytes
    /// when composing `FILES.LUM`.
    fn read_file(&mut self, medium: u8, path: &str) -> Result<Vec<u8>, CallbackError>;
}
