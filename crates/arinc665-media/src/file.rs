//! Regular (non-Load, non-Batch) files: a name, owning directory, CRC-16,
//! and optional per-file ARINC 645 check value type override.

use arinc665_checksum::CheckValueType;

use crate::directory::DirectoryRef;
use crate::media_set::MediaSet;

pub(crate) struct RegularFileNode {
    pub(crate) name: String,
    pub(crate) parent: DirectoryRef,
    pub(crate) medium: u8,
    pub(crate) crc16: u16,
    pub(crate) check_value_type: Option<CheckValueType>,
}

/// Arena index naming a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegularFileRef(pub(crate) usize);

impl RegularFileRef {
    pub fn name(self, media_set: &MediaSet) -> &str {
        &media_set.regular_file_node(self).name
    }

    pub fn parent(self, media_set: &MediaSet) -> DirectoryRef {
        media_set.regular_file_node(self).parent
    }

    pub fn medium_number(self, media_set: &MediaSet) -> u8 {
        media_set.regular_file_node(self).medium
    }

    pub fn crc16(self, media_set: &MediaSet) -> u16 {
        media_set.regular_file_node(self).crc16
    }

    pub fn set_crc16(self, media_set: &mut MediaSet, crc16: u16) {
        media_set.regular_file_node_mut(self).crc16 = crc16;
    }

    /// The explicit per-file check-value-type override, if any.
    pub fn check_value_type(self, media_set: &MediaSet) -> Option<CheckValueType> {
        media_set.regular_file_node(self).check_value_type
    }

    pub fn set_check_value_type(self, media_set: &mut MediaSet, check_value_type: Option<CheckValueType>) {
        media_set.regular_file_node_mut(self).check_value_type = check_value_type;
    }

    /// Resolves I7: this file's own override, else the Media Set's
    /// "Files" default, else [`CheckValueType::NotUsed`].
    pub fn effective_check_value_type(self, media_set: &MediaSet) -> CheckValueType {
        self.check_value_type(media_set)
            .unwrap_or_else(|| media_set.effective_files_check_value_type())
    }
}
