//! The Decompiler (§4.5): reads a Media Set's `FILES.LUM`/`LOADS.LUM`/
//! `BATCHES.LUM` and the individual Load Header/Batch files they
//! reference, folding everything into a [`MediaSet`].

use std::collections::HashMap;

use arinc665_checksum::{CheckValue, Crc16};
use arinc665_codec::path::split_components;
use arinc665_file::{BatchFile, BatchesListFile, FileListEntry, FilesListFile, LoadHeaderFile, LoadsListFile, TargetHardware};
use arinc665_media::{DirectoryRef, FileRef, MediaSet, RegularFileRef};

use crate::callbacks::ReadFile;
use crate::config::DecompileConfig;
use crate::error::Error;
use crate::paths::{directory_posix_path, posix_file_path};

/// Every check value observed for a regular file while decompiling, in
/// the order they were encountered.
#[derive(Debug, Clone, Default)]
pub struct CheckValueCollection {
    per_file: HashMap<RegularFileRef, Vec<CheckValue>>,
}

impl CheckValueCollection {
    fn record(&mut self, file: RegularFileRef, check_value: CheckValue) {
        if check_value.is_used() {
            self.per_file.entry(file).or_default().push(check_value);
        }
    }

    /// Check values observed for `file` across every list/header/load
    /// layer that carried one.
    pub fn observed(&self, file: RegularFileRef) -> &[CheckValue] {
        self.per_file.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn ensure_directory_path(media_set: &mut MediaSet, root: DirectoryRef, wire_path: &str) -> DirectoryRef {
    let mut current = root;
    for component in split_components(wire_path) {
        current = match current.directory(media_set, &component) {
            Some(existing) => existing,
            None => current.add_directory(media_set, component).expect("name checked free above"),
        };
    }
    current
}

fn read_list_file(read_file: &mut dyn ReadFile, medium: u8, name: &str) -> Result<Vec<u8>, Error> {
    read_file.read_file(medium, &format!("/{name}")).map_err(Error::CallbackFailed)
}

fn try_read_list_file(read_file: &mut dyn ReadFile, medium: u8, name: &str) -> Result<Option<Vec<u8>>, Error> {
    Ok(read_file.read_file(medium, &format!("/{name}")).ok())
}

/// Checks the cross-medium consistency the source calls
/// `belongsToSameMediaSet`: same part number, same member count, and the
/// same set of (filename, path, member sequence number) triples for
/// everything other than the three list files themselves (each medium's
/// own listing entry necessarily differs in CRC from the others').
fn belongs_to_same_media_set(first: &FilesListFile, other: &FilesListFile) -> Result<(), Error> {
    if first.media_set_part_number != other.media_set_part_number || first.number_of_media_set_members != other.number_of_media_set_members {
        return Err(Error::MediaSetInconsistent {
            reason: "media set part number or member count differs between media".to_string(),
        });
    }
    let is_list_file = |name: &str| matches!(name, "FILES.LUM" | "LOADS.LUM" | "BATCHES.LUM");
    let key = |e: &FileListEntry| (e.filename.clone(), e.path_name.clone(), e.member_sequence_number);
    let mut a: Vec<_> = first.files.iter().filter(|e| !is_list_file(&e.filename)).map(key).collect();
    let mut b: Vec<_> = other.files.iter().filter(|e| !is_list_file(&e.filename)).map(key).collect();
    a.sort();
    b.sort();
    if a != b {
        return Err(Error::MediaSetInconsistent {
            reason: "file listings disagree between media".to_string(),
        });
    }
    Ok(())
}

/// The wire format carries no explicit length field for a user-defined-data
/// region (I6): its end is inferred from the next pointer or a fixed tail,
/// so a trailing `0x00` added at compile time to pad an odd-length blob to
/// an even one is indistinguishable from a genuine final byte of `0x00`.
/// Callers that round-trip odd-length UDD should expect an extra byte back.
fn warn_udd_recovered(where_: &str, data: &Option<Vec<u8>>) {
    if let Some(bytes) = data {
        if !bytes.is_empty() {
            log::warn!(
                "{where_}: recovered {} byte(s) of user-defined data; an odd-length value recorded at compile time is padded with a trailing zero byte that cannot be distinguished from genuine data on decode",
                bytes.len()
            );
        }
    }
}

fn verify_regular_file_bytes(
    read_file: &mut dyn ReadFile,
    medium: u8,
    full_path: &str,
    expected_crc: u16,
    expected_check_value: Option<&CheckValue>,
) -> Result<Vec<u8>, Error> {
    let bytes = read_file.read_file(medium, full_path).map_err(Error::CallbackFailed)?;

    let actual_crc = Crc16::one_shot(&bytes);
    if actual_crc != expected_crc {
        return Err(Error::ChecksumMismatch {
            expected: expected_crc as u32,
            actual: actual_crc as u32,
            location: full_path.to_string(),
        });
    }
    if let Some(expected) = expected_check_value {
        if expected.is_used() {
            let actual = CheckValue::compute(expected.check_value_type(), &bytes);
            if &actual != expected {
                return Err(Error::CheckValueMismatch {
                    check_value_type: expected.check_value_type(),
                    location: full_path.to_string(),
                });
            }
        }
    }
    Ok(bytes)
}

/// Runs the decompiler algorithm (§4.5) against the media reachable
/// through `read_file`, starting from medium 1's `FILES.LUM`. The number
/// of media is discovered from that file rather than supplied by the
/// caller; resolving a medium number to wherever its bytes actually live
/// is `read_file`'s own concern.
pub fn decompile(read_file: &mut dyn ReadFile, config: DecompileConfig) -> Result<(MediaSet, CheckValueCollection), Error> {
    let files1_bytes = read_list_file(read_file, 1, "FILES.LUM")?;
    let files1 = FilesListFile::decode(&files1_bytes)?;
    let member_count = files1.number_of_media_set_members;
    if member_count == 0 {
        return Err(Error::InvalidModel {
            reason: "media set declares zero members".to_string(),
        });
    }

    log::debug!("decompiling media set {:?} ({member_count} member(s))", files1.media_set_part_number);

    let loads1_bytes = read_list_file(read_file, 1, "LOADS.LUM")?;
    let loads1 = LoadsListFile::decode(&loads1_bytes)?;
    let batches1 = try_read_list_file(read_file, 1, "BATCHES.LUM")?
        .map(|bytes| BatchesListFile::decode(&bytes))
        .transpose()?;

    for i in 2..=member_count {
        log::trace!("cross-checking medium {i} listings against medium 1");
        let files_i_bytes = read_list_file(read_file, i, "FILES.LUM")?;
        let files_i = FilesListFile::decode(&files_i_bytes)?;
        belongs_to_same_media_set(&files1, &files_i)?;

        let loads_i_bytes = read_list_file(read_file, i, "LOADS.LUM")?;
        LoadsListFile::decode(&loads_i_bytes)?;

        if batches1.is_some() {
            read_list_file(read_file, i, "BATCHES.LUM")?;
        }
    }

    let mut media_set = MediaSet::new(files1.media_set_part_number.clone());
    for i in 1..=member_count {
        media_set.add_medium(i)?;
    }

    warn_udd_recovered("FILES.LUM", &files1.user_defined_data);
    media_set.set_files_user_defined_data(files1.user_defined_data.clone());
    warn_udd_recovered("LOADS.LUM", &loads1.user_defined_data);
    media_set.set_loads_user_defined_data(loads1.user_defined_data.clone());
    if let Some(batches) = &batches1 {
        warn_udd_recovered("BATCHES.LUM", &batches.user_defined_data);
        media_set.set_batches_user_defined_data(batches.user_defined_data.clone());
    }

    let mut check_values = CheckValueCollection::default();

    // Fold FILES.LUM entries into the tree, keyed by member sequence
    // number (the medium the bytes physically live on).
    for entry in &files1.files {
        log::trace!("folding {:?} (medium {})", entry.filename, entry.member_sequence_number);
        let medium = entry.member_sequence_number as u8;
        let root = media_set.medium_root(medium).ok_or_else(|| Error::InvalidModel {
            reason: format!("file {:?} names out-of-range medium {medium}", entry.filename),
        })?;
        let dir = ensure_directory_path(&mut media_set, root, &entry.path_name);
        let file_ref = dir
            .add_file(&mut media_set, entry.filename.clone(), entry.crc16, entry.check_value.as_ref().map(CheckValue::check_value_type))
            .map_err(|_| Error::NameCollision {
                name: entry.filename.clone(),
            })?;
        if let Some(cv) = &entry.check_value {
            check_values.record(file_ref, cv.clone());
        }

        if config.check_file_integrity {
            let full_path = posix_file_path(&directory_posix_path(&media_set, dir), &entry.filename);
            verify_regular_file_bytes(read_file, medium, &full_path, entry.crc16, entry.check_value.as_ref())?;
        }
    }

    // Promote Load Header files. `LoadListEntry` carries no directory of
    // its own, so the header is looked up by filename alone across the
    // whole tree.
    for load_entry in &loads1.loads {
        let header_filename = load_entry.header_filename.as_str();
        let file_ref = media_set
            .recursive_files()
            .into_iter()
            .find(|f| f.name(&media_set) == header_filename)
            .ok_or_else(|| Error::CrossReferenceMissing {
                name: header_filename.to_string(),
            })?;

        let medium = file_ref.medium_number(&media_set);
        let parent = file_ref.parent(&media_set);
        let full_path = posix_file_path(&directory_posix_path(&media_set, parent), header_filename);
        log::debug!("promoting load {header_filename} ({})", load_entry.part_number);
        let header_bytes = read_file.read_file(medium, &full_path).map_err(Error::CallbackFailed)?;
        let header = LoadHeaderFile::decode(&header_bytes)?;

        parent
            .remove_file(&mut media_set, FileRef::Regular(file_ref))
            .expect("file_ref was just looked up as a child of parent");
        let load_ref = parent
            .add_load(&mut media_set, header_filename.to_string(), load_entry.part_number.as_str().to_string())
            .map_err(|_| Error::NameCollision {
                name: header_filename.to_string(),
            })?;
        load_ref.set_part_flags(&mut media_set, header.part_flags);
        load_ref.set_load_type(
            &mut media_set,
            header.load_type.clone().map(|lt| arinc665_media::LoadType {
                description: lt.description.into_string(),
                id: lt.id,
            }),
        );
        if let Some(cv) = &header.load_check_value {
            load_ref.set_load_check_value_type(&mut media_set, Some(cv.check_value_type()));
        }
        warn_udd_recovered(header_filename, &header.user_defined_data);
        load_ref.set_user_defined_data(&mut media_set, header.user_defined_data.clone());

        match &header.target_hardware {
            TargetHardware::Supplement2(ids) => {
                for id in ids {
                    load_ref.add_target_hardware(&mut media_set, id.clone(), Vec::new());
                }
            }
            TargetHardware::Supplement345(entries) => {
                for entry in entries {
                    let positions: Vec<String> = entry.positions.iter().map(|p| p.as_str().to_string()).collect();
                    load_ref.add_target_hardware(&mut media_set, entry.thw_id.as_str().to_string(), positions);
                }
            }
        }

        for member in &header.data_files {
            let member_ref = media_set
                .recursive_files()
                .into_iter()
                .find(|f| f.name(&media_set) == member.filename)
                .ok_or_else(|| Error::CrossReferenceMissing {
                    name: member.filename.clone(),
                })?;
            load_ref.add_data_member(
                &mut media_set,
                member_ref,
                member.part_number.clone(),
                member.check_value.as_ref().map(CheckValue::check_value_type),
            )?;
        }
        for member in &header.support_files {
            let member_ref = media_set
                .recursive_files()
                .into_iter()
                .find(|f| f.name(&media_set) == member.filename)
                .ok_or_else(|| Error::CrossReferenceMissing {
                    name: member.filename.clone(),
                })?;
            load_ref.add_support_member(
                &mut media_set,
                member_ref,
                member.part_number.clone(),
                member.check_value.as_ref().map(CheckValue::check_value_type),
            )?;
        }
    }

    // Promote Batch files the same way, via BATCHES.LUM.
    if let Some(batches) = &batches1 {
        for batch_entry in &batches.batches {
            let filename = batch_entry.filename.as_str();
            let file_ref = media_set
                .recursive_files()
                .into_iter()
                .find(|f| f.name(&media_set) == filename)
                .ok_or_else(|| Error::CrossReferenceMissing {
                    name: filename.to_string(),
                })?;
            let medium = file_ref.medium_number(&media_set);
            let parent = file_ref.parent(&media_set);
            let full_path = posix_file_path(&directory_posix_path(&media_set, parent), filename);
            log::debug!("promoting batch {filename} ({})", batch_entry.part_number);
            let batch_bytes = read_file.read_file(medium, &full_path).map_err(Error::CallbackFailed)?;
            let batch_file = BatchFile::decode(&batch_bytes)?;

            parent
                .remove_file(&mut media_set, FileRef::Regular(file_ref))
                .expect("file_ref was just looked up as a child of parent");
            let batch_ref = parent
                .add_batch(
                    &mut media_set,
                    filename.to_string(),
                    batch_entry.part_number.as_str().to_string(),
                    batch_file.comment.clone(),
                )
                .map_err(|_| Error::NameCollision { name: filename.to_string() })?;

            for target in &batch_file.targets {
                for member in &target.loads.0 {
                    let member_filename = member.filename.as_str();
                    let load_ref = media_set
                        .recursive_loads()
                        .into_iter()
                        .find(|l| l.name(&media_set) == member_filename)
                        .ok_or_else(|| Error::CrossReferenceMissing {
                            name: member_filename.to_string(),
                        })?;
                    batch_ref.append_load(&mut media_set, target.thw_id_position.as_str().to_string(), load_ref)?;
                }
            }
        }
    }

    Ok((media_set, check_values))
}
