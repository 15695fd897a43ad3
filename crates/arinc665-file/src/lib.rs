//! The ARINC 665 binary file layer (§4.3): framed headers, pointer-linked
//! record chains, and the five concrete file types that make up a Media
//! Set — `*.LUH` Load Header files, `*.LUB` Batch files, and the three
//! `LOADS.LUM`/`BATCHES.LUM`/`FILES.LUM` media list files.
//!
//! Each file type exposes a plain data struct with `decode(&[u8])` and
//! `encode(&self)` methods; the wire shapes are composed from
//! `arinc665-codec`'s primitives plus this crate's [`pointer_chain`]
//! helpers: small `binrw` leaf types, wired up by hand wherever the derive
//! macro's declarative shape runs out.

pub mod batch_file;
pub mod batch_list_file;
pub mod error;
pub mod file_list_file;
pub mod header;
pub mod load_header_file;
pub mod load_list_file;
pub mod media_list_common;
pub mod pointer_chain;

pub use batch_file::{BatchFile, BatchTarget, BatchTargetMember};
pub use batch_list_file::{BatchListEntry, BatchesListFile};
pub use error::FileError;
pub use file_list_file::{FileListEntry, FilesListFile};
pub use header::{FileClass, SupportedArinc665Version};
pub use load_header_file::{LoadFileEntry, LoadHeaderFile, LoadType, TargetHardware, ThwIdPositions};
pub use load_list_file::{LoadListEntry, LoadsListFile};
pub use pointer_chain::{CountedVec, PointerChain};
