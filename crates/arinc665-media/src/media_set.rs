//! The Media Set: the root of the ownership tree (§3.3), its arenas, and
//! the whole-set operations (medium management, recursive search, reverse
//! lookup, check-value-type inheritance roots).

use arinc665_checksum::CheckValueType;

use crate::batch::{BatchNode, BatchRef};
use crate::directory::{DirectoryNode, DirectoryRef, Entry, FileRef};
use crate::error::MediaError;
use crate::file::{RegularFileNode, RegularFileRef};
use crate::load::{LoadNode, LoadRef};

/// A Media Set: its part number, its media (keyed 1..N, §3.3 I4), and the
/// arenas backing every [`DirectoryRef`]/[`RegularFileRef`]/[`LoadRef`]/
/// [`BatchRef`] handle it hands out.
///
/// Represented as a `Vec`-backed arena per entity kind rather than the
/// source's reference-counted, parent-mutable tree: this sidesteps the
/// cyclic-owner bookkeeping `shared_from_this` requires, at the cost of
/// indices instead of smart pointers.
pub struct MediaSet {
    part_number: String,
    media: Vec<(u8, DirectoryRef)>,
    media_set_check_value_type: Option<CheckValueType>,
    list_of_files_check_value_type: Option<CheckValueType>,
    files_check_value_type: Option<CheckValueType>,
    list_of_loads_check_value_type: Option<CheckValueType>,
    list_of_batches_check_value_type: Option<CheckValueType>,
    files_user_defined_data: Option<Vec<u8>>,
    loads_user_defined_data: Option<Vec<u8>>,
    batches_user_defined_data: Option<Vec<u8>>,
    directories: Vec<DirectoryNode>,
    regular_files: Vec<RegularFileNode>,
    loads: Vec<LoadNode>,
    batches: Vec<BatchNode>,
}

impl MediaSet {
    /// Creates an empty Media Set with no media yet.
    pub fn new(part_number: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            media: Vec::new(),
            media_set_check_value_type: None,
            list_of_files_check_value_type: None,
            files_check_value_type: None,
            list_of_loads_check_value_type: None,
            list_of_batches_check_value_type: None,
            files_user_defined_data: None,
            loads_user_defined_data: None,
            batches_user_defined_data: None,
            directories: Vec::new(),
            regular_files: Vec::new(),
            loads: Vec::new(),
            batches: Vec::new(),
        }
    }

    pub fn part_number(&self) -> &str {
        &self.part_number
    }

    pub fn set_part_number(&mut self, part_number: impl Into<String>) {
        self.part_number = part_number.into();
    }

    /// Number of media currently in the set (I4's `N`).
    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    pub fn medium_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.media.iter().map(|(n, _)| *n)
    }

    /// Adds a new, empty medium, returning its invisible root directory.
    /// Fails if `number` is `0`, already present, or would break I4's
    /// contiguous-numbering invariant (media must be added in order
    /// `1, 2, 3, ...`).
    pub fn add_medium(&mut self, number: u8) -> Result<DirectoryRef, MediaError> {
        if number == 0 {
            return Err(MediaError::InvalidMediumNumber(number));
        }
        if self.media.iter().any(|(n, _)| *n == number) {
            return Err(MediaError::MediumExists(number));
        }
        let expected_next = self.media.len() as u8 + 1;
        if number != expected_next {
            return Err(MediaError::InvalidMediumNumber(number));
        }
        let root = self.push_directory(DirectoryNode {
            name: String::new(),
            parent: None,
            medium: number,
            children: Vec::new(),
        });
        self.media.push((number, root));
        Ok(root)
    }

    /// Root directory of a medium, if it has been added.
    pub fn medium_root(&self, number: u8) -> Option<DirectoryRef> {
        self.media.iter().find(|(n, _)| *n == number).map(|(_, r)| *r)
    }

    // -- check-value-type settings (I7) --------------------------------

    pub fn media_set_check_value_type(&self) -> Option<CheckValueType> {
        self.media_set_check_value_type
    }

    pub fn set_media_set_check_value_type(&mut self, check_value_type: Option<CheckValueType>) {
        self.media_set_check_value_type = check_value_type;
    }

    pub fn list_of_files_check_value_type(&self) -> Option<CheckValueType> {
        self.list_of_files_check_value_type
    }

    pub fn set_list_of_files_check_value_type(&mut self, check_value_type: Option<CheckValueType>) {
        self.list_of_files_check_value_type = check_value_type;
    }

    pub fn files_check_value_type(&self) -> Option<CheckValueType> {
        self.files_check_value_type
    }

    pub fn set_files_check_value_type(&mut self, check_value_type: Option<CheckValueType>) {
        self.files_check_value_type = check_value_type;
    }

    pub fn list_of_loads_check_value_type(&self) -> Option<CheckValueType> {
        self.list_of_loads_check_value_type
    }

    pub fn set_list_of_loads_check_value_type(&mut self, check_value_type: Option<CheckValueType>) {
        self.list_of_loads_check_value_type = check_value_type;
    }

    pub fn list_of_batches_check_value_type(&self) -> Option<CheckValueType> {
        self.list_of_batches_check_value_type
    }

    pub fn set_list_of_batches_check_value_type(&mut self, check_value_type: Option<CheckValueType>) {
        self.list_of_batches_check_value_type = check_value_type;
    }

    /// I7: `FILES.LUM`'s own whole-file check value, falling back to the
    /// Media Set default.
    pub fn effective_list_of_files_check_value_type(&self) -> CheckValueType {
        self.list_of_files_check_value_type
            .unwrap_or(self.media_set_check_value_type.unwrap_or(CheckValueType::NotUsed))
    }

    /// I7: the default check-value type for regular files, falling back
    /// to the Media Set default. Also the parent for per-file overrides
    /// (see [`crate::RegularFileRef::effective_check_value_type`]).
    pub fn effective_files_check_value_type(&self) -> CheckValueType {
        self.files_check_value_type
            .unwrap_or(self.media_set_check_value_type.unwrap_or(CheckValueType::NotUsed))
    }

    /// I7: `LOADS.LUM`'s own whole-file check value, falling back to the
    /// "Files" default.
    pub fn effective_list_of_loads_check_value_type(&self) -> CheckValueType {
        self.list_of_loads_check_value_type.unwrap_or_else(|| self.effective_files_check_value_type())
    }

    /// I7: `BATCHES.LUM`'s own whole-file check value, falling back to
    /// the "Files" default.
    pub fn effective_list_of_batches_check_value_type(&self) -> CheckValueType {
        self.list_of_batches_check_value_type.unwrap_or_else(|| self.effective_files_check_value_type())
    }

    // -- user-defined data (I6) ------------------------------------------

    /// Opaque bytes carried in `FILES.LUM`'s own user-defined-data area.
    pub fn files_user_defined_data(&self) -> Option<&[u8]> {
        self.files_user_defined_data.as_deref()
    }

    pub fn set_files_user_defined_data(&mut self, data: Option<Vec<u8>>) {
        self.files_user_defined_data = data;
    }

    /// Opaque bytes carried in `LOADS.LUM`'s own user-defined-data area.
    pub fn loads_user_defined_data(&self) -> Option<&[u8]> {
        self.loads_user_defined_data.as_deref()
    }

    pub fn set_loads_user_defined_data(&mut self, data: Option<Vec<u8>>) {
        self.loads_user_defined_data = data;
    }

    /// Opaque bytes carried in `BATCHES.LUM`'s own user-defined-data area.
    pub fn batches_user_defined_data(&self) -> Option<&[u8]> {
        self.batches_user_defined_data.as_deref()
    }

    pub fn set_batches_user_defined_data(&mut self, data: Option<Vec<u8>>) {
        self.batches_user_defined_data = data;
    }

    // -- search / traversal ---------------------------------------------

    /// All regular files in the Media Set, pre-order: media in ascending
    /// numeric order, subdirectories before a container's own files,
    /// subdirectories visited in insertion order.
    pub fn recursive_files(&self) -> Vec<RegularFileRef> {
        let mut out = Vec::new();
        for (_, root) in &self.media {
            self.collect_files(*root, &mut out);
        }
        out
    }

    pub fn recursive_loads(&self) -> Vec<LoadRef> {
        let mut out = Vec::new();
        for (_, root) in &self.media {
            self.collect_loads(*root, &mut out);
        }
        out
    }

    pub fn recursive_batches(&self) -> Vec<BatchRef> {
        let mut out = Vec::new();
        for (_, root) in &self.media {
            self.collect_batches(*root, &mut out);
        }
        out
    }

    fn collect_files(&self, dir: DirectoryRef, out: &mut Vec<RegularFileRef>) {
        for entry in self.directory_node(dir).children.iter() {
            if let Entry::Directory(child) = entry {
                self.collect_files(*child, out);
            }
        }
        for entry in self.directory_node(dir).children.iter() {
            if let Entry::File(FileRef::Regular(f)) = entry {
                out.push(*f);
            }
        }
    }

    fn collect_loads(&self, dir: DirectoryRef, out: &mut Vec<LoadRef>) {
        for entry in self.directory_node(dir).children.iter() {
            if let Entry::Directory(child) = entry {
                self.collect_loads(*child, out);
            }
        }
        for entry in self.directory_node(dir).children.iter() {
            if let Entry::File(FileRef::Load(l)) = entry {
                out.push(*l);
            }
        }
    }

    fn collect_batches(&self, dir: DirectoryRef, out: &mut Vec<BatchRef>) {
        for entry in self.directory_node(dir).children.iter() {
            if let Entry::Directory(child) = entry {
                self.collect_batches(*child, out);
            }
        }
        for entry in self.directory_node(dir).children.iter() {
            if let Entry::File(FileRef::Batch(b)) = entry {
                out.push(*b);
            }
        }
    }

    // -- reverse lookup ---------------------------------------------------

    /// Every Load referencing `file` as a data or support member. O(N) in
    /// the number of loads; no index is maintained.
    pub fn loads_with_file(&self, file: RegularFileRef) -> Vec<LoadRef> {
        (0..self.loads.len())
            .map(LoadRef)
            .filter(|load| {
                let node = self.load_node(*load);
                node.data_files.iter().any(|m| m.file == file) || node.support_files.iter().any(|m| m.file == file)
            })
            .collect()
    }

    /// Every Batch referencing `load` from any of its targets.
    pub fn batches_with_load(&self, load: LoadRef) -> Vec<BatchRef> {
        (0..self.batches.len())
            .map(BatchRef)
            .filter(|batch| self.batch_node(*batch).targets.values().any(|loads| loads.contains(&load)))
            .collect()
    }

    // -- arena plumbing ---------------------------------------------------

    pub(crate) fn push_directory(&mut self, node: DirectoryNode) -> DirectoryRef {
        self.directories.push(node);
        DirectoryRef(self.directories.len() - 1)
    }

    pub(crate) fn push_regular_file(&mut self, node: RegularFileNode) -> RegularFileRef {
        self.regular_files.push(node);
        RegularFileRef(self.regular_files.len() - 1)
    }

    pub(crate) fn push_load(&mut self, node: LoadNode) -> LoadRef {
        self.loads.push(node);
        LoadRef(self.loads.len() - 1)
    }

    pub(crate) fn push_batch(&mut self, node: BatchNode) -> BatchRef {
        self.batches.push(node);
        BatchRef(self.batches.len() - 1)
    }

    pub(crate) fn directory_node(&self, r: DirectoryRef) -> &DirectoryNode {
        &self.directories[r.0]
    }

    pub(crate) fn directory_node_mut(&mut self, r: DirectoryRef) -> &mut DirectoryNode {
        &mut self.directories[r.0]
    }

    pub(crate) fn regular_file_node(&self, r: RegularFileRef) -> &RegularFileNode {
        &self.regular_files[r.0]
    }

    pub(crate) fn regular_file_node_mut(&mut self, r: RegularFileRef) -> &mut RegularFileNode {
        &mut self.regular_files[r.0]
    }

    pub(crate) fn load_node(&self, r: LoadRef) -> &LoadNode {
        &self.loads[r.0]
    }

    pub(crate) fn load_node_mut(&mut self, r: LoadRef) -> &mut LoadNode {
        &mut self.loads[r.0]
    }

    pub(crate) fn batch_node(&self, r: BatchRef) -> &BatchNode {
        &self.batches[r.0]
    }

    pub(crate) fn batch_node_mut(&mut self, r: BatchRef) -> &mut BatchNode {
        &mut self.batches[r.0]
    }

    pub(crate) fn regular_file_count(&self) -> usize {
        self.regular_files.len()
    }

    pub(crate) fn load_count(&self) -> usize {
        self.loads.len()
    }

    #[allow(dead_code)]
    pub(crate) fn batch_count(&self) -> usize {
        self.batches.len()
    }
}
