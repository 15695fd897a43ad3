//! The Compiler (§4.6): walks a [`MediaSet`] and materialises it as a
//! physical media set through [`CompilerCallbacks`] — directories, regular
//! files, and synthesised (or copied) Load Header and Batch files, topped
//! off with `LOADS.LUM`, `BATCHES.LUM`, and `FILES.LUM`.

use arinc665_checksum::{CheckValue, CheckValueType, Crc16};
use arinc665_file::load_header_file::compute_load_crc;
use arinc665_file::{
    BatchFile, BatchListEntry, BatchTarget, BatchTargetMember, BatchesListFile, FileListEntry, FilesListFile,
    LoadFileEntry, LoadHeaderFile, LoadListEntry, LoadType as FileLoadType, LoadsListFile, SupportedArinc665Version,
    TargetHardware, ThwIdPositions,
};
use arinc665_media::{BatchRef, DirectoryRef, FileRef, LoadRef, MediaSet, RegularFileRef};

use crate::callbacks::CompilerCallbacks;
use crate::config::{CompileConfig, FileCreationPolicy};
use crate::error::Error;
use crate::paths::{directory_posix_path, directory_wire_path, posix_file_path};

fn push_file_entry(
    media_set: &MediaSet,
    file_entries: &mut Vec<FileListEntry>,
    dir: DirectoryRef,
    filename: &str,
    medium: u8,
    bytes: &[u8],
    check_value_type: CheckValueType,
    version: SupportedArinc665Version,
) {
    let check_value = match version {
        SupportedArinc665Version::Supplement2 => None,
        SupportedArinc665Version::Supplement345 => Some(CheckValue::compute(check_value_type, bytes)),
    };
    file_entries.push(FileListEntry {
        filename: filename.to_string(),
        path_name: directory_wire_path(media_set, dir),
        member_sequence_number: medium as u16,
        crc16: Crc16::one_shot(bytes),
        check_value,
    });
}

fn load_file_entries_and_bytes(
    media_set: &MediaSet,
    callbacks: &mut dyn CompilerCallbacks,
    members: &[(RegularFileRef, String, CheckValueType)],
    version: SupportedArinc665Version,
) -> Result<(Vec<LoadFileEntry>, Vec<Vec<u8>>), Error> {
    let mut entries = Vec::with_capacity(members.len());
    let mut contents = Vec::with_capacity(members.len());
    for (file_ref, part_number, check_value_type) in members {
        let medium = file_ref.medium_number(media_set);
        let path = posix_file_path(&directory_posix_path(media_set, file_ref.parent(media_set)), file_ref.name(media_set));
        let bytes = callbacks.read_file(medium, &path).map_err(Error::CallbackFailed)?;
        let crc16 = Crc16::one_shot(&bytes);
        let check_value = match version {
            SupportedArinc665Version::Supplement2 => None,
            SupportedArinc665Version::Supplement345 => Some(CheckValue::compute(*check_value_type, &bytes)),
        };
        entries.push(LoadFileEntry {
            filename: file_ref.name(media_set).to_string(),
            part_number: part_number.clone(),
            length_bytes: bytes.len() as u32,
            crc16,
            check_value,
        });
        contents.push(bytes);
    }
    Ok((entries, contents))
}

/// Builds the Load Header file for `load_ref`, reading its data/support
/// member bytes through `callbacks` to size them and compute the Load
/// CRC-32 (two-pass: encode once with a zero placeholder to obtain the
/// header's own prefix bytes, then encode again with the real value).
fn synthesize_load_header(
    media_set: &MediaSet,
    load_ref: LoadRef,
    version: SupportedArinc665Version,
    callbacks: &mut dyn CompilerCallbacks,
) -> Result<Vec<u8>, Error> {
    let target_hardware = match version {
        SupportedArinc665Version::Supplement2 => {
            TargetHardware::Supplement2(load_ref.target_hardware(media_set).keys().cloned().collect())
        }
        SupportedArinc665Version::Supplement345 => TargetHardware::Supplement345(
            load_ref
                .target_hardware(media_set)
                .iter()
                .map(|(thw_id, positions)| ThwIdPositions {
                    thw_id: thw_id.clone().into(),
                    positions: positions.clone().into(),
                })
                .collect(),
        ),
    };

    let (data_files, data_bytes) = load_file_entries_and_bytes(media_set, callbacks, &load_ref.effective_data_members(media_set), version)?;
    let (support_files, support_bytes) =
        load_file_entries_and_bytes(media_set, callbacks, &load_ref.effective_support_members(media_set), version)?;

    let (load_type, load_check_value) = if version == SupportedArinc665Version::Supplement345 {
        let load_type = load_ref.load_type(media_set).map(|lt| FileLoadType {
            description: lt.description.clone().into(),
            id: lt.id,
        });
        let mut covered = Vec::new();
        for bytes in data_bytes.iter().chain(support_bytes.iter()) {
            covered.extend_from_slice(bytes);
        }
        let check_value_type = load_ref.effective_load_check_value_type(media_set);
        (load_type, Some(CheckValue::compute(check_value_type, &covered)))
    } else {
        (None, None)
    };

    let mut header = LoadHeaderFile {
        version,
        part_flags: load_ref.part_flags(media_set),
        load_part_number: load_ref.part_number(media_set).to_string(),
        target_hardware,
        data_files,
        support_files,
        user_defined_data: load_ref.user_defined_data(media_set).map(<[u8]>::to_vec),
        load_type,
        load_check_value,
        load_crc: 0,
    };

    let draft = header.encode()?;
    let header_prefix = &draft[..draft.len() - 6];
    let data_refs: Vec<&[u8]> = data_bytes.iter().map(Vec::as_slice).collect();
    let support_refs: Vec<&[u8]> = support_bytes.iter().map(Vec::as_slice).collect();
    header.load_crc = compute_load_crc(version, header_prefix, &data_refs, &support_refs);

    Ok(header.encode()?)
}

fn synthesize_batch_file(media_set: &MediaSet, batch_ref: BatchRef, version: SupportedArinc665Version) -> Result<Vec<u8>, Error> {
    let targets = batch_ref
        .targets(media_set)
        .into_iter()
        .map(|(thw_id_position, loads)| BatchTarget {
            thw_id_position: thw_id_position.into(),
            loads: arinc665_file::CountedVec(
                loads
                    .into_iter()
                    .map(|load_ref| BatchTargetMember {
                        filename: load_ref.name(media_set).into(),
                        part_number: load_ref.part_number(media_set).into(),
                    })
                    .collect(),
            ),
        })
        .collect();

    let batch = BatchFile {
        version,
        batch_part_number: batch_ref.part_number(media_set).to_string(),
        comment: batch_ref.comment(media_set).to_string(),
        targets,
    };
    Ok(batch.encode()?)
}

fn should_synthesize(policy: FileCreationPolicy, medium: u8, path: &str, callbacks: &mut dyn CompilerCallbacks) -> Result<bool, Error> {
    Ok(match policy {
        FileCreationPolicy::All => true,
        FileCreationPolicy::None => false,
        FileCreationPolicy::NoneExisting => !callbacks.check_file_exists(medium, path).map_err(Error::CallbackFailed)?,
    })
}

#[allow(clippy::too_many_arguments)]
fn compile_directory(
    media_set: &MediaSet,
    dir: DirectoryRef,
    medium: u8,
    config: &CompileConfig,
    callbacks: &mut dyn CompilerCallbacks,
    file_entries: &mut Vec<FileListEntry>,
    load_entries: &mut Vec<LoadListEntry>,
    batch_entries: &mut Vec<BatchListEntry>,
) -> Result<(), Error> {
    for entry in dir.files_here(media_set) {
        match entry {
            FileRef::Regular(file_ref) => {
                let path = posix_file_path(&directory_posix_path(media_set, dir), file_ref.name(media_set));
                log::trace!("medium {medium}: regular file {path}");
                if !callbacks.check_file_exists(medium, &path).map_err(Error::CallbackFailed)? {
                    return Err(Error::MissingSource(path));
                }
                callbacks.create_file(medium, &path).map_err(Error::CallbackFailed)?;
                let bytes = callbacks.read_file(medium, &path).map_err(Error::CallbackFailed)?;
                push_file_entry(
                    media_set,
                    file_entries,
                    dir,
                    file_ref.name(media_set),
                    medium,
                    &bytes,
                    file_ref.effective_check_value_type(media_set),
                    config.version,
                );
            }
            FileRef::Load(load_ref) => {
                let name = load_ref.name(media_set).to_string();
                let path = posix_file_path(&directory_posix_path(media_set, dir), &name);
                log::debug!("medium {medium}: load {path} ({})", load_ref.part_number(media_set));
                let bytes = if should_synthesize(config.load_header_file_policy, medium, &path, callbacks)? {
                    let bytes = synthesize_load_header(media_set, load_ref, config.version, callbacks)?;
                    callbacks.write_file(medium, &path, &bytes).map_err(Error::CallbackFailed)?;
                    bytes
                } else {
                    callbacks.create_file(medium, &path).map_err(Error::CallbackFailed)?;
                    callbacks.read_file(medium, &path).map_err(Error::CallbackFailed)?
                };
                push_file_entry(media_set, file_entries, dir, &name, medium, &bytes, media_set.effective_files_check_value_type(), config.version);

                let target_hardware_ids: Vec<String> = load_ref.target_hardware(media_set).keys().cloned().collect();
                load_entries.push(LoadListEntry {
                    part_number: load_ref.part_number(media_set).into(),
                    header_filename: name.into(),
                    member_sequence_number: medium as u16,
                    target_hardware_ids: target_hardware_ids.into(),
                });
            }
            FileRef::Batch(batch_ref) => {
                let name = batch_ref.name(media_set).to_string();
                let path = posix_file_path(&directory_posix_path(media_set, dir), &name);
                log::debug!("medium {medium}: batch {path} ({})", batch_ref.part_number(media_set));
                let bytes = if should_synthesize(config.batch_file_policy, medium, &path, callbacks)? {
                    let bytes = synthesize_batch_file(media_set, batch_ref, config.version)?;
                    callbacks.write_file(medium, &path, &bytes).map_err(Error::CallbackFailed)?;
                    bytes
                } else {
                    callbacks.create_file(medium, &path).map_err(Error::CallbackFailed)?;
                    callbacks.read_file(medium, &path).map_err(Error::CallbackFailed)?
                };
                push_file_entry(media_set, file_entries, dir, &name, medium, &bytes, media_set.effective_files_check_value_type(), config.version);

                batch_entries.push(BatchListEntry {
                    part_number: batch_ref.part_number(media_set).into(),
                    filename: name.into(),
                    member_sequence_number: medium as u16,
                });
            }
        }
    }

    for sub in dir.subdirectories(media_set) {
        let path = directory_posix_path(media_set, sub);
        callbacks.create_directory(medium, &path).map_err(Error::CallbackFailed)?;
        compile_directory(media_set, sub, medium, config, callbacks, file_entries, load_entries, batch_entries)?;
    }

    Ok(())
}

/// Runs the compiler algorithm (§4.6) against `media_set`, materialising
/// every medium through `callbacks`. `LOADS.LUM` (and `BATCHES.LUM`, if any
/// Batch is present) carry identical content on every medium bar their own
/// `media_sequence_number`/CRC; `FILES.LUM` is written last so it can list
/// every other file, including those two, but never itself.
pub fn compile(media_set: &MediaSet, config: &CompileConfig, callbacks: &mut dyn CompilerCallbacks) -> Result<(), Error> {
    let member_count = media_set.media_count();
    if member_count == 0 {
        return Err(Error::InvalidModel {
            reason: "media set has no media".to_string(),
        });
    }
    if member_count > u8::MAX as usize {
        return Err(Error::EncodingOverflow {
            field: "number_of_media_set_members",
        });
    }
    let number_of_media_set_members = member_count as u8;

    let mut file_entries = Vec::new();
    let mut load_entries = Vec::new();
    let mut batch_entries = Vec::new();

    for medium in media_set.medium_numbers() {
        log::debug!("compiling medium {medium} of {number_of_media_set_members}");
        callbacks.create_medium(medium).map_err(Error::CallbackFailed)?;
        let root = media_set.medium_root(medium).expect("medium_numbers() only yields media that were added");
        compile_directory(media_set, root, medium, config, callbacks, &mut file_entries, &mut load_entries, &mut batch_entries)?;
    }

    for medium in media_set.medium_numbers() {
        let loads_list = LoadsListFile {
            version: config.version,
            media_set_part_number: media_set.part_number().to_string(),
            media_sequence_number: medium,
            number_of_media_set_members,
            loads: load_entries.clone(),
            user_defined_data: media_set.loads_user_defined_data().map(<[u8]>::to_vec),
        };
        let bytes = loads_list.encode()?;
        callbacks.write_file(medium, "/LOADS.LUM", &bytes).map_err(Error::CallbackFailed)?;
        push_file_entry(
            media_set,
            &mut file_entries,
            media_set.medium_root(medium).expect("medium just iterated"),
            "LOADS.LUM",
            medium,
            &bytes,
            media_set.effective_list_of_loads_check_value_type(),
            config.version,
        );
    }

    if !batch_entries.is_empty() {
        for medium in media_set.medium_numbers() {
            let batches_list = BatchesListFile {
                version: config.version,
                media_set_part_number: media_set.part_number().to_string(),
                media_sequence_number: medium,
                number_of_media_set_members,
                batches: batch_entries.clone(),
                user_defined_data: media_set.batches_user_defined_data().map(<[u8]>::to_vec),
            };
            let bytes = batches_list.encode()?;
            callbacks.write_file(medium, "/BATCHES.LUM", &bytes).map_err(Error::CallbackFailed)?;
            push_file_entry(
                media_set,
                &mut file_entries,
                media_set.medium_root(medium).expect("medium just iterated"),
                "BATCHES.LUM",
                medium,
                &bytes,
                media_set.effective_list_of_batches_check_value_type(),
                config.version,
            );
        }
    }

    for medium in media_set.medium_numbers() {
        let file_check_value = match config.version {
            SupportedArinc665Version::Supplement2 => None,
            SupportedArinc665Version::Supplement345 => {
                Some(CheckValue::compute(media_set.effective_list_of_files_check_value_type(), &[]))
            }
        };
        let files_list = FilesListFile {
            version: config.version,
            media_set_part_number: media_set.part_number().to_string(),
            media_sequence_number: medium,
            number_of_media_set_members,
            files: file_entries.clone(),
            user_defined_data: media_set.files_user_defined_data().map(<[u8]>::to_vec),
            file_check_value,
        };
        let bytes = files_list.encode()?;
        callbacks.write_file(medium, "/FILES.LUM", &bytes).map_err(Error::CallbackFailed)?;
    }

    Ok(())
}
