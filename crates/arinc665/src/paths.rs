//! Converting a [`arinc665_media`] directory reference into the two path
//! representations the rest of the crate needs: the POSIX-style relative
//! path the callback surface (§6.3) uses, and the ARINC 665 wire path
//! `FILES.LUM` entries carry.

use arinc665_codec::path::{components_to_posix_path, components_to_wire_path};
use arinc665_media::{DirectoryRef, MediaSet};

fn components(media_set: &MediaSet, mut dir: DirectoryRef) -> Vec<String> {
    let mut parts = Vec::new();
    loop {
        let name = dir.name(media_set);
        if name.is_empty() {
            break;
        }
        parts.push(name.to_string());
        match dir.parent(media_set) {
            Some(parent) => dir = parent,
            None => break,
        }
    }
    parts.reverse();
    parts
}

pub fn directory_posix_path(media_set: &MediaSet, dir: DirectoryRef) -> String {
    components_to_posix_path(&components(media_set, dir))
}

pub fn directory_wire_path(media_set: &MediaSet, dir: DirectoryRef) -> String {
    components_to_wire_path(&components(media_set, dir))
}

pub fn posix_file_path(directory: &str, filename: &str) -> String {
    if directory == "/" {
        format!("/{filename}")
    } else {
        format!("{directory}/{filename}")
    }
}
