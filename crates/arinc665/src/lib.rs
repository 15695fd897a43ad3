//! Decompiler and compiler for ARINC 665 Loadable Software Parts media sets
//! (§4.5, §4.6): the only crate in this workspace that turns the wire
//! formats of `arinc665-file` and the object model of `arinc665-media` into
//! a working tool, entirely through the caller-supplied I/O callbacks of
//! §6.3. Neither direction ever touches a filesystem or network directly.

mod callbacks;
mod compiler;
mod config;
mod decompiler;
mod error;
mod paths;

pub use arinc665_checksum::{CheckValue, CheckValueType};
pub use arinc665_file::SupportedArinc665Version;
pub use arinc665_media::{BatchRef, DirectoryRef, FileRef, LoadRef, MediaError, MediaSet, RegularFileRef};

pub use callbacks::{CompilerCallbacks, ReadFile};
pub use compiler::compile;
pub use config::{CompileConfig, DecompileConfig, FileCreationPolicy};
pub use decompiler::{decompile, CheckValueCollection};
pub use error::{CallbackError, Error};
