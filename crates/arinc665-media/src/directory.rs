//! Directories: containers that own subdirectories and files, keyed by name
//! within their own namespace (I1).

use crate::batch::BatchRef;
use crate::error::MediaError;
use crate::file::RegularFileRef;
use crate::load::LoadRef;
use crate::media_set::MediaSet;

/// A tagged reference to whatever kind of file lives under a directory
/// entry. Mirrors the source's `File -> {RegularFile, Load, Batch}`
/// inheritance as a plain enum over arena indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRef {
    Regular(RegularFileRef),
    Load(LoadRef),
    Batch(BatchRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Entry {
    Directory(DirectoryRef),
    File(FileRef),
}

impl Entry {
    fn name<'a>(&self, media_set: &'a MediaSet) -> &'a str {
        match *self {
            Entry::Directory(dir) => &media_set.directory_node(dir).name,
            Entry::File(FileRef::Regular(f)) => &media_set.regular_file_node(f).name,
            Entry::File(FileRef::Load(l)) => &media_set.load_node(l).name,
            Entry::File(FileRef::Batch(b)) => &media_set.batch_node(b).name,
        }
    }
}

pub(crate) struct DirectoryNode {
    pub(crate) name: String,
    pub(crate) parent: Option<DirectoryRef>,
    pub(crate) medium: u8,
    pub(crate) children: Vec<Entry>,
}

/// Arena index naming a directory, or a medium's invisible root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectoryRef(pub(crate) usize);

impl DirectoryRef {
    /// The directory's own name; empty for a medium's root.
    pub fn name(self, media_set: &MediaSet) -> &str {
        &media_set.directory_node(self).name
    }

    /// The medium this directory (and everything under it) belongs to.
    pub fn medium_number(self, media_set: &MediaSet) -> u8 {
        media_set.directory_node(self).medium
    }

    pub fn parent(self, media_set: &MediaSet) -> Option<DirectoryRef> {
        media_set.directory_node(self).parent
    }

    fn check_name_free(self, media_set: &MediaSet, name: &str) -> Result<(), MediaError> {
        let exists = media_set
            .directory_node(self)
            .children
            .iter()
            .any(|e| e.name(media_set) == name);
        if exists {
            Err(MediaError::NameExists { name: name.to_string() })
        } else {
            Ok(())
        }
    }

    pub fn add_directory(self, media_set: &mut MediaSet, name: impl Into<String>) -> Result<DirectoryRef, MediaError> {
        let name = name.into();
        self.check_name_free(media_set, &name)?;
        let medium = self.medium_number(media_set);
        let child = media_set.push_directory(DirectoryNode {
            name,
            parent: Some(self),
            medium,
            children: Vec::new(),
        });
        media_set.directory_node_mut(self).children.push(Entry::Directory(child));
        Ok(child)
    }

    pub fn add_file(
        self,
        media_set: &mut MediaSet,
        name: impl Into<String>,
        crc16: u16,
        check_value_type: Option<arinc665_checksum::CheckValueType>,
    ) -> Result<RegularFileRef, MediaError> {
        let name = name.into();
        self.check_name_free(media_set, &name)?;
        let medium = self.medium_number(media_set);
        let file_ref = media_set.push_regular_file(crate::file::RegularFileNode {
            name,
            parent: self,
            medium,
            crc16,
            check_value_type,
        });
        media_set
            .directory_node_mut(self)
            .children
            .push(Entry::File(FileRef::Regular(file_ref)));
        Ok(file_ref)
    }

    pub fn add_load(
        self,
        media_set: &mut MediaSet,
        name: impl Into<String>,
        part_number: impl Into<String>,
    ) -> Result<LoadRef, MediaError> {
        let name = name.into();
        self.check_name_free(media_set, &name)?;
        let medium = self.medium_number(media_set);
        let load_ref = media_set.push_load(crate::load::LoadNode::new(name.clone(), self, medium, part_number.into()));
        media_set.directory_node_mut(self).children.push(Entry::File(FileRef::Load(load_ref)));
        Ok(load_ref)
    }

    pub fn add_batch(
        self,
        media_set: &mut MediaSet,
        name: impl Into<String>,
        part_number: impl Into<String>,
        comment: impl Into<String>,
    ) -> Result<BatchRef, MediaError> {
        let name = name.into();
        self.check_name_free(media_set, &name)?;
        let medium = self.medium_number(media_set);
        let batch_ref =
            media_set.push_batch(crate::batch::BatchNode::new(name.clone(), self, medium, part_number.into(), comment.into()));
        media_set
            .directory_node_mut(self)
            .children
            .push(Entry::File(FileRef::Batch(batch_ref)));
        Ok(batch_ref)
    }

    /// Directory child with this name, if present.
    pub fn directory(self, media_set: &MediaSet, name: &str) -> Option<DirectoryRef> {
        media_set.directory_node(self).children.iter().find_map(|e| match e {
            Entry::Directory(d) if d.name(media_set) == name => Some(*d),
            _ => None,
        })
    }

    /// Any file-kind child with this name, if present.
    pub fn file(self, media_set: &MediaSet, name: &str) -> Option<FileRef> {
        media_set.directory_node(self).children.iter().find_map(|e| match e {
            Entry::File(f) if e.name(media_set) == name => Some(*f),
            _ => None,
        })
    }

    pub fn regular_file(self, media_set: &MediaSet, name: &str) -> Option<RegularFileRef> {
        match self.file(media_set, name) {
            Some(FileRef::Regular(f)) => Some(f),
            _ => None,
        }
    }

    pub fn load(self, media_set: &MediaSet, name: &str) -> Option<LoadRef> {
        match self.file(media_set, name) {
            Some(FileRef::Load(l)) => Some(l),
            _ => None,
        }
    }

    pub fn batch(self, media_set: &MediaSet, name: &str) -> Option<BatchRef> {
        match self.file(media_set, name) {
            Some(FileRef::Batch(b)) => Some(b),
            _ => None,
        }
    }

    pub(crate) fn children(self, media_set: &MediaSet) -> &[Entry] {
        &media_set.directory_node(self).children
    }

    /// Direct subdirectory children, in insertion order.
    pub fn subdirectories(self, media_set: &MediaSet) -> Vec<DirectoryRef> {
        media_set
            .directory_node(self)
            .children
            .iter()
            .filter_map(|e| match e {
                Entry::Directory(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Direct file-kind children (regular files, Loads, Batches), in
    /// insertion order.
    pub fn files_here(self, media_set: &MediaSet) -> Vec<FileRef> {
        media_set
            .directory_node(self)
            .children
            .iter()
            .filter_map(|e| match e {
                Entry::File(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    /// Removes `target` from this directory's children. Fails with
    /// [`MediaError::NotFound`] if `target` is not a direct child of
    /// `self`. The removed subtree's own back-references are left
    /// dangling (see §3.3 lifecycle note); the caller is responsible for
    /// also un-referencing it from any Load/Batch.
    pub fn remove_directory(self, media_set: &mut MediaSet, target: DirectoryRef) -> Result<(), MediaError> {
        let children = &mut media_set.directory_node_mut(self).children;
        let before = children.len();
        children.retain(|e| !matches!(e, Entry::Directory(d) if *d == target));
        if children.len() == before { Err(MediaError::NotFound) } else { Ok(()) }
    }

    /// Removes `target` from this directory's children, regardless of
    /// which file variant it is. Fails with [`MediaError::NotFound`] if
    /// `target` is not a direct child of `self`.
    pub fn remove_file(self, media_set: &mut MediaSet, target: FileRef) -> Result<(), MediaError> {
        let children = &mut media_set.directory_node_mut(self).children;
        let before = children.len();
        children.retain(|e| !matches!(e, Entry::File(f) if *f == target));
        if children.len() == before { Err(MediaError::NotFound) } else { Ok(()) }
    }
}
