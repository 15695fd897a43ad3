//! Batches: a part number, a free-form comment, and an ordered mapping
//! from THW-ID-position string to the Loads that target is built from.

use std::collections::BTreeMap;

use crate::directory::DirectoryRef;
use crate::error::MediaError;
use crate::load::LoadRef;
use crate::media_set::MediaSet;

pub(crate) struct BatchNode {
    pub(crate) name: String,
    pub(crate) parent: DirectoryRef,
    pub(crate) medium: u8,
    pub(crate) part_number: String,
    pub(crate) comment: String,
    pub(crate) targets: BTreeMap<String, Vec<LoadRef>>,
    pub(crate) target_order: Vec<String>,
}

impl BatchNode {
    pub(crate) fn new(name: String, parent: DirectoryRef, medium: u8, part_number: String, comment: String) -> Self {
        Self {
            name,
            parent,
            medium,
            part_number,
            comment,
            targets: BTreeMap::new(),
            target_order: Vec::new(),
        }
    }
}

/// Arena index naming a Batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchRef(pub(crate) usize);

impl BatchRef {
    pub fn name(self, media_set: &MediaSet) -> &str {
        &media_set.batch_node(self).name
    }

    pub fn parent(self, media_set: &MediaSet) -> DirectoryRef {
        media_set.batch_node(self).parent
    }

    pub fn medium_number(self, media_set: &MediaSet) -> u8 {
        media_set.batch_node(self).medium
    }

    pub fn part_number(self, media_set: &MediaSet) -> &str {
        &media_set.batch_node(self).part_number
    }

    pub fn set_part_number(self, media_set: &mut MediaSet, part_number: impl Into<String>) {
        media_set.batch_node_mut(self).part_number = part_number.into();
    }

    pub fn comment(self, media_set: &MediaSet) -> &str {
        &media_set.batch_node(self).comment
    }

    pub fn set_comment(self, media_set: &mut MediaSet, comment: impl Into<String>) {
        media_set.batch_node_mut(self).comment = comment.into();
    }

    /// Declares a target (THW-ID-position), if not already present.
    pub fn add_target(self, media_set: &mut MediaSet, thw_id_position: impl Into<String>) {
        let thw_id_position = thw_id_position.into();
        let node = media_set.batch_node_mut(self);
        node.targets.entry(thw_id_position.clone()).or_default();
        if !node.target_order.contains(&thw_id_position) {
            node.target_order.push(thw_id_position);
        }
    }

    /// Appends a Load to a target's list, declaring the target first if
    /// it does not already exist.
    pub fn append_load(self, media_set: &mut MediaSet, thw_id_position: impl Into<String>, load: LoadRef) -> Result<(), MediaError> {
        if load.0 >= media_set.load_count() {
            return Err(MediaError::DanglingTarget);
        }
        let thw_id_position = thw_id_position.into();
        self.add_target(media_set, thw_id_position.clone());
        media_set
            .batch_node_mut(self)
            .targets
            .get_mut(&thw_id_position)
            .expect("target just declared")
            .push(load);
        Ok(())
    }

    /// Targets in declaration order, each with its ordered list of Loads.
    pub fn targets(self, media_set: &MediaSet) -> Vec<(String, Vec<LoadRef>)> {
        let node = media_set.batch_node(self);
        node.target_order
            .iter()
            .map(|thw_id_position| (thw_id_position.clone(), node.targets[thw_id_position].clone()))
            .collect()
    }
}
