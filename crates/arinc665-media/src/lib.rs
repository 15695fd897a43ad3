//! The in-memory ARINC 665 Media Set object model (§3.3, §4.4): an
//! ownership tree of Media, Directories, and Files (regular files, Loads,
//! and Batches), plus the cross-references a Load keeps to its data and
//! support members and a Batch keeps to its target Loads.
//!
//! The tree is represented as a `Vec`-backed arena per entity kind, with
//! `DirectoryRef`/`RegularFileRef`/`LoadRef`/`BatchRef` newtype indices
//! standing in for the owned-pointer tree the source builds with
//! `shared_from_this`. Mutating methods live on the ref types themselves
//! and take `&mut MediaSet` (or `&MediaSet` for reads), since an index
//! alone cannot dereference itself.

mod batch;
mod directory;
mod error;
mod file;
mod load;
mod media_set;

pub use arinc665_checksum::CheckValueType;
pub use batch::BatchRef;
pub use directory::{DirectoryRef, FileRef};
pub use error::MediaError;
pub use file::RegularFileRef;
pub use load::{LoadMember, LoadRef, LoadType};
pub use media_set::MediaSet;
