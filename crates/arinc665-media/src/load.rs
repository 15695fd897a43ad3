//! Loads: a part number, the target hardware a load installs to, its data
//! and support file members, and the check-value-type settings governing
//! how its header file is built during compilation.

use std::collections::BTreeMap;

use arinc665_checksum::CheckValueType;

use crate::directory::DirectoryRef;
use crate::error::MediaError;
use crate::file::RegularFileRef;
use crate::media_set::MediaSet;

/// One data-file or support-file member of a Load: the regular file it
/// references, the part number it carries within this load, and an
/// optional per-member check-value-type override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMember {
    pub file: RegularFileRef,
    pub part_number: String,
    pub check_value_type: Option<CheckValueType>,
}

/// A Load's optional classification (Supplement 3/4/5 only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadType {
    pub description: String,
    pub id: u16,
}

pub(crate) struct LoadNode {
    pub(crate) name: String,
    pub(crate) parent: DirectoryRef,
    pub(crate) medium: u8,
    pub(crate) part_number: String,
    pub(crate) part_flags: u16,
    pub(crate) target_hardware: BTreeMap<String, Vec<String>>,
    pub(crate) data_files: Vec<LoadMember>,
    pub(crate) support_files: Vec<LoadMember>,
    pub(crate) load_type: Option<LoadType>,
    pub(crate) load_check_value_type: Option<CheckValueType>,
    pub(crate) data_files_check_value_type: Option<CheckValueType>,
    pub(crate) support_files_check_value_type: Option<CheckValueType>,
    pub(crate) user_defined_data: Option<Vec<u8>>,
}

impl LoadNode {
    pub(crate) fn new(name: String, parent: DirectoryRef, medium: u8, part_number: String) -> Self {
        Self {
            name,
            parent,
            medium,
            part_number,
            part_flags: 0,
            target_hardware: BTreeMap::new(),
            data_files: Vec::new(),
            support_files: Vec::new(),
            load_type: None,
            load_check_value_type: None,
            data_files_check_value_type: None,
            support_files_check_value_type: None,
            user_defined_data: None,
        }
    }
}

/// Arena index naming a Load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadRef(pub(crate) usize);

impl LoadRef {
    pub fn name(self, media_set: &MediaSet) -> &str {
        &media_set.load_node(self).name
    }

    pub fn parent(self, media_set: &MediaSet) -> DirectoryRef {
        media_set.load_node(self).parent
    }

    pub fn medium_number(self, media_set: &MediaSet) -> u8 {
        media_set.load_node(self).medium
    }

    pub fn part_number(self, media_set: &MediaSet) -> &str {
        &media_set.load_node(self).part_number
    }

    pub fn set_part_number(self, media_set: &mut MediaSet, part_number: impl Into<String>) {
        media_set.load_node_mut(self).part_number = part_number.into();
    }

    pub fn part_flags(self, media_set: &MediaSet) -> u16 {
        media_set.load_node(self).part_flags
    }

    pub fn set_part_flags(self, media_set: &mut MediaSet, part_flags: u16) {
        media_set.load_node_mut(self).part_flags = part_flags;
    }

    pub fn load_type(self, media_set: &MediaSet) -> Option<&LoadType> {
        media_set.load_node(self).load_type.as_ref()
    }

    pub fn set_load_type(self, media_set: &mut MediaSet, load_type: Option<LoadType>) {
        media_set.load_node_mut(self).load_type = load_type;
    }

    /// Adds, or appends positions to, a target-hardware-id entry.
    pub fn add_target_hardware(self, media_set: &mut MediaSet, thw_id: impl Into<String>, positions: Vec<String>) {
        let entry = media_set.load_node_mut(self).target_hardware.entry(thw_id.into()).or_default();
        for position in positions {
            if !entry.contains(&position) {
                entry.push(position);
            }
        }
    }

    pub fn target_hardware(self, media_set: &MediaSet) -> &BTreeMap<String, Vec<String>> {
        &media_set.load_node(self).target_hardware
    }

    fn add_member(
        self,
        media_set: &mut MediaSet,
        which: Which,
        file: RegularFileRef,
        part_number: impl Into<String>,
        check_value_type: Option<CheckValueType>,
    ) -> Result<(), MediaError> {
        if file.0 >= media_set.regular_file_count() {
            return Err(MediaError::DanglingMember);
        }
        let member = LoadMember {
            file,
            part_number: part_number.into(),
            check_value_type,
        };
        let node = media_set.load_node_mut(self);
        match which {
            Which::Data => node.data_files.push(member),
            Which::Support => node.support_files.push(member),
        }
        Ok(())
    }

    pub fn add_data_member(
        self,
        media_set: &mut MediaSet,
        file: RegularFileRef,
        part_number: impl Into<String>,
        check_value_type: Option<CheckValueType>,
    ) -> Result<(), MediaError> {
        self.add_member(media_set, Which::Data, file, part_number, check_value_type)
    }

    pub fn add_support_member(
        self,
        media_set: &mut MediaSet,
        file: RegularFileRef,
        part_number: impl Into<String>,
        check_value_type: Option<CheckValueType>,
    ) -> Result<(), MediaError> {
        self.add_member(media_set, Which::Support, file, part_number, check_value_type)
    }

    pub fn data_members(self, media_set: &MediaSet) -> Vec<(RegularFileRef, String, Option<CheckValueType>)> {
        media_set
            .load_node(self)
            .data_files
            .iter()
            .map(|m| (m.file, m.part_number.clone(), m.check_value_type))
            .collect()
    }

    pub fn support_members(self, media_set: &MediaSet) -> Vec<(RegularFileRef, String, Option<CheckValueType>)> {
        media_set
            .load_node(self)
            .support_files
            .iter()
            .map(|m| (m.file, m.part_number.clone(), m.check_value_type))
            .collect()
    }

    /// Like [`Self::data_members`], substituting each member's effective
    /// (inherited) check-value-type for its raw override.
    pub fn effective_data_members(self, media_set: &MediaSet) -> Vec<(RegularFileRef, String, CheckValueType)> {
        let default = self.effective_data_files_check_value_type(media_set);
        media_set
            .load_node(self)
            .data_files
            .iter()
            .map(|m| (m.file, m.part_number.clone(), m.check_value_type.unwrap_or(default)))
            .collect()
    }

    pub fn effective_support_members(self, media_set: &MediaSet) -> Vec<(RegularFileRef, String, CheckValueType)> {
        let default = self.effective_support_files_check_value_type(media_set);
        media_set
            .load_node(self)
            .support_files
            .iter()
            .map(|m| (m.file, m.part_number.clone(), m.check_value_type.unwrap_or(default)))
            .collect()
    }

    pub fn load_check_value_type(self, media_set: &MediaSet) -> Option<CheckValueType> {
        media_set.load_node(self).load_check_value_type
    }

    pub fn set_load_check_value_type(self, media_set: &mut MediaSet, check_value_type: Option<CheckValueType>) {
        media_set.load_node_mut(self).load_check_value_type = check_value_type;
    }

    pub fn data_files_check_value_type(self, media_set: &MediaSet) -> Option<CheckValueType> {
        media_set.load_node(self).data_files_check_value_type
    }

    pub fn set_data_files_check_value_type(self, media_set: &mut MediaSet, check_value_type: Option<CheckValueType>) {
        media_set.load_node_mut(self).data_files_check_value_type = check_value_type;
    }

    pub fn support_files_check_value_type(self, media_set: &MediaSet) -> Option<CheckValueType> {
        media_set.load_node(self).support_files_check_value_type
    }

    pub fn set_support_files_check_value_type(self, media_set: &mut MediaSet, check_value_type: Option<CheckValueType>) {
        media_set.load_node_mut(self).support_files_check_value_type = check_value_type;
    }

    /// I7: this load's own override, else the Media Set default.
    pub fn effective_load_check_value_type(self, media_set: &MediaSet) -> CheckValueType {
        self.load_check_value_type(media_set)
            .unwrap_or(media_set.media_set_check_value_type().unwrap_or(CheckValueType::NotUsed))
    }

    pub fn effective_data_files_check_value_type(self, media_set: &MediaSet) -> CheckValueType {
        self.data_files_check_value_type(media_set)
            .unwrap_or_else(|| self.effective_load_check_value_type(media_set))
    }

    pub fn effective_support_files_check_value_type(self, media_set: &MediaSet) -> CheckValueType {
        self.support_files_check_value_type(media_set)
            .unwrap_or_else(|| self.effective_load_check_value_type(media_set))
    }

    /// Opaque bytes carried in this Load's header's user-defined-data area
    /// (I6).
    pub fn user_defined_data(self, media_set: &MediaSet) -> Option<&[u8]> {
        media_set.load_node(self).user_defined_data.as_deref()
    }

    pub fn set_user_defined_data(self, media_set: &mut MediaSet, data: Option<Vec<u8>>) {
        media_set.load_node_mut(self).user_defined_data = data;
    }
}

enum Which {
    Data,
    Support,
}
