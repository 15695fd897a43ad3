//! Exercises the compiler and decompiler against an in-memory virtual
//! medium set rather than a real filesystem, standing in for the kind of
//! `ReadFile`/`CompilerCallbacks` a caller would otherwise back with disk
//! or network I/O.

use std::collections::HashMap;

use arinc665::{
    compile, decompile, CheckValueType, CompileConfig, CompilerCallbacks, DecompileConfig, Error, FileCreationPolicy, MediaSet,
    ReadFile, SupportedArinc665Version,
};

/// A medium's worth of files, keyed by POSIX path, plus which directories
/// have been explicitly created (so `create_directory` can be asserted
/// idempotent-free, matching a real filesystem).
#[derive(Default)]
struct VirtualMedium {
    files: HashMap<String, Vec<u8>>,
    directories: Vec<String>,
}

/// A source-and-destination pair of virtual media trees. The compiler
/// reads regular-file bytes from `source` and writes everything to
/// `dest`; the decompiler reads back from `dest`. A real deployment would
/// split these across two physically different roots; keeping them
/// separate here catches any code path that accidentally reads from the
/// wrong side.
#[derive(Default)]
struct VirtualFs {
    source: HashMap<u8, VirtualMedium>,
    dest: HashMap<u8, VirtualMedium>,
}

impl VirtualFs {
    fn put_source(&mut self, medium: u8, path: &str, bytes: Vec<u8>) {
        self.source.entry(medium).or_default().files.insert(path.to_string(), bytes);
    }
}

impl CompilerCallbacks for VirtualFs {
    fn create_medium(&mut self, medium: u8) -> Result<(), arinc665::CallbackError> {
        self.dest.entry(medium).or_default();
        Ok(())
    }

    fn create_directory(&mut self, medium: u8, path: &str) -> Result<(), arinc665::CallbackError> {
        self.dest.entry(medium).or_default().directories.push(path.to_string());
        Ok(())
    }

    fn check_file_exists(&mut self, medium: u8, path: &str) -> Result<bool, arinc665::CallbackError> {
        Ok(self.source.get(&medium).is_some_and(|m| m.files.contains_key(path)))
    }

    fn create_file(&mut self, medium: u8, path: &str) -> Result<(), arinc665::CallbackError> {
        let bytes = self
            .source
            .get(&medium)
            .and_then(|m| m.files.get(path))
            .cloned()
            .ok_or_else(|| format!("no source bytes for {path} on medium {medium}"))?;
        self.dest.entry(medium).or_default().files.insert(path.to_string(), bytes);
        Ok(())
    }

    fn write_file(&mut self, medium: u8, path: &str, bytes: &[u8]) -> Result<(), arinc665::CallbackError> {
        let medium_entry = self.dest.entry(medium).or_default();
        if medium_entry.files.contains_key(path) {
            return Err(format!("{path} already exists on medium {medium}").into());
        }
        medium_entry.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read_file(&mut self, medium: u8, path: &str) -> Result<Vec<u8>, arinc665::CallbackError> {
        self.dest
            .get(&medium)
            .and_then(|m| m.files.get(path))
            .cloned()
            .ok_or_else(|| format!("no dest bytes for {path} on medium {medium}").into())
    }
}

impl ReadFile for VirtualFs {
    fn read_file(&mut self, medium: u8, path: &str) -> Result<Vec<u8>, arinc665::CallbackError> {
        self.dest
            .get(&medium)
            .and_then(|m| m.files.get(path))
            .cloned()
            .ok_or_else(|| format!("no dest bytes for {path} on medium {medium}").into())
    }
}

/// Builds a two-medium Media Set: a regular file and a Load on medium 1,
/// a Batch referencing that Load on medium 2.
fn build_media_set() -> (MediaSet, VirtualFs) {
    let mut media_set = MediaSet::new("MS-0001");
    media_set.set_media_set_check_value_type(Some(CheckValueType::Sha256));

    let mut fs = VirtualFs::default();

    let root1 = media_set.add_medium(1).unwrap();
    let software = root1.add_directory(&mut media_set, "SOFTWARE").unwrap();
    software.add_file(&mut media_set, "APP.BIN", 0, None).unwrap();
    fs.put_source(1, "/SOFTWARE/APP.BIN", b"application payload bytes".to_vec());

    let load = root1.add_load(&mut media_set, "LOAD1.LUH", "LOAD-PN-0001").unwrap();
    load.add_target_hardware(&mut media_set, "THW-ID-1", vec!["POS-A".to_string()]);
    let app_ref = software.regular_file(&media_set, "APP.BIN").unwrap();
    load.add_data_member(&mut media_set, app_ref, "APP-PN-0001", None).unwrap();

    let root2 = media_set.add_medium(2).unwrap();
    let batch = root2.add_batch(&mut media_set, "BATCH1.LUB", "BATCH-PN-0001", "initial batch").unwrap();
    batch.append_load(&mut media_set, "THW-ID-1-POS-A", load).unwrap();

    (media_set, fs)
}

#[test]
fn compiles_and_decompiles_a_two_medium_media_set() {
    let (media_set, mut fs) = build_media_set();

    let config = CompileConfig::new(SupportedArinc665Version::Supplement345);
    compile(&media_set, &config, &mut fs).unwrap();

    // Every medium gets its own FILES.LUM and LOADS.LUM; only medium 2
    // needed a BATCHES.LUM, but the compiler mirrors it onto both media.
    for medium in [1u8, 2] {
        let dest = &fs.dest[&medium];
        assert!(dest.files.contains_key("/FILES.LUM"));
        assert!(dest.files.contains_key("/LOADS.LUM"));
        assert!(dest.files.contains_key("/BATCHES.LUM"));
    }
    assert!(fs.dest[&1].files.contains_key("/SOFTWARE/APP.BIN"));
    assert!(fs.dest[&1].files.contains_key("/LOAD1.LUH"));
    assert!(fs.dest[&2].files.contains_key("/BATCH1.LUB"));

    let (decompiled, check_values) = decompile(&mut fs, DecompileConfig { check_file_integrity: true }).unwrap();

    assert_eq!(decompiled.part_number(), "MS-0001");
    assert_eq!(decompiled.media_count(), 2);

    let files = decompiled.recursive_files();
    let app = files
        .iter()
        .copied()
        .find(|f| f.name(&decompiled) == "APP.BIN")
        .expect("APP.BIN round-tripped");
    assert!(!check_values.observed(app).is_empty());

    let loads = decompiled.recursive_loads();
    let load = loads.iter().copied().find(|l| l.name(&decompiled) == "LOAD1.LUH").expect("load round-tripped");
    assert_eq!(load.part_number(&decompiled), "LOAD-PN-0001");
    assert_eq!(load.target_hardware(&decompiled).get("THW-ID-1"), Some(&vec!["POS-A".to_string()]));
    assert_eq!(decompiled.loads_with_file(app), vec![load]);

    let batches = decompiled.recursive_batches();
    let batch = batches.iter().copied().find(|b| b.name(&decompiled) == "BATCH1.LUB").expect("batch round-tripped");
    assert_eq!(batch.part_number(&decompiled), "BATCH-PN-0001");
    assert_eq!(decompiled.batches_with_load(load), vec![batch]);
    assert_eq!(batch.targets(&decompiled), vec![("THW-ID-1-POS-A".to_string(), vec![load])]);
}

#[test]
fn compiles_an_empty_single_medium_media_set() {
    let mut media_set = MediaSet::new("MS-EMPTY");
    media_set.add_medium(1).unwrap();
    let mut fs = VirtualFs::default();

    let config = CompileConfig::new(SupportedArinc665Version::Supplement2);
    compile(&media_set, &config, &mut fs).unwrap();

    assert!(fs.dest[&1].files.contains_key("/FILES.LUM"));
    assert!(fs.dest[&1].files.contains_key("/LOADS.LUM"));
    assert!(!fs.dest[&1].files.contains_key("/BATCHES.LUM"));

    let (decompiled, _) = decompile(&mut fs, DecompileConfig::default()).unwrap();
    assert_eq!(decompiled.media_count(), 1);
    assert!(decompiled.recursive_files().is_empty());
    assert!(decompiled.recursive_loads().is_empty());
}

#[test]
fn compile_rejects_an_empty_media_set() {
    let media_set = MediaSet::new("MS-NOMEDIA");
    let mut fs = VirtualFs::default();
    let config = CompileConfig::new(SupportedArinc665Version::Supplement345);

    let err = compile(&media_set, &config, &mut fs).unwrap_err();
    assert!(matches!(err, Error::InvalidModel { .. }));
}

#[test]
fn compile_reports_a_missing_source_file() {
    let mut media_set = MediaSet::new("MS-0002");
    let root = media_set.add_medium(1).unwrap();
    root.add_file(&mut media_set, "GHOST.BIN", 0, None).unwrap();
    let mut fs = VirtualFs::default();

    let config = CompileConfig::new(SupportedArinc665Version::Supplement345);
    let err = compile(&media_set, &config, &mut fs).unwrap_err();
    assert!(matches!(err, Error::MissingSource(path) if path == "/GHOST.BIN"));
}

#[test]
fn load_header_file_can_be_copied_instead_of_synthesised() {
    let mut media_set = MediaSet::new("MS-0003");
    let root = media_set.add_medium(1).unwrap();
    let load = root.add_load(&mut media_set, "LOAD1.LUH", "LOAD-PN-0003").unwrap();
    load.add_target_hardware(&mut media_set, "THW-ID-9", Vec::new());

    let mut fs = VirtualFs::default();
    // A pre-existing header on the source side, deliberately not a valid
    // encoded LoadHeaderFile: with `FileCreationPolicy::None` the compiler
    // must copy it byte-for-byte rather than attempt to parse or rebuild it.
    fs.put_source(1, "/LOAD1.LUH", b"pre-existing opaque header bytes".to_vec());

    let config = CompileConfig {
        version: SupportedArinc665Version::Supplement345,
        batch_file_policy: FileCreationPolicy::All,
        load_header_file_policy: FileCreationPolicy::None,
    };
    compile(&media_set, &config, &mut fs).unwrap();

    assert_eq!(fs.dest[&1].files["/LOAD1.LUH"], b"pre-existing opaque header bytes");
}

#[test]
fn detects_a_corrupted_regular_file_when_integrity_checking_is_enabled() {
    let (media_set, mut fs) = build_media_set();
    let config = CompileConfig::new(SupportedArinc665Version::Supplement345);
    compile(&media_set, &config, &mut fs).unwrap();

    fs.dest.get_mut(&1).unwrap().files.insert("/SOFTWARE/APP.BIN".to_string(), b"tampered bytes, different length".to_vec());

    let err = decompile(&mut fs, DecompileConfig { check_file_integrity: true }).unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }));
}

#[test]
fn integrity_checking_can_be_disabled() {
    let (media_set, mut fs) = build_media_set();
    let config = CompileConfig::new(SupportedArinc665Version::Supplement345);
    compile(&media_set, &config, &mut fs).unwrap();

    fs.dest.get_mut(&1).unwrap().files.insert("/SOFTWARE/APP.BIN".to_string(), b"tampered bytes, different length".to_vec());

    let (decompiled, _) = decompile(&mut fs, DecompileConfig { check_file_integrity: false }).unwrap();
    assert_eq!(decompiled.media_count(), 2);
}

#[test]
fn odd_length_user_defined_data_round_trips_with_a_padded_byte() {
    let (mut media_set, mut fs) = build_media_set();
    media_set.set_files_user_defined_data(Some(b"files-udd".to_vec())); // 9 bytes, odd
    media_set.set_loads_user_defined_data(Some(b"loads-udd!".to_vec())); // 10 bytes, even
    media_set.set_batches_user_defined_data(Some(b"batch-udd".to_vec())); // 9 bytes, odd

    let load = media_set.recursive_loads()[0];
    load.set_user_defined_data(&mut media_set, Some(b"load-udd".to_vec())); // 8 bytes, even

    let config = CompileConfig::new(SupportedArinc665Version::Supplement345);
    compile(&media_set, &config, &mut fs).unwrap();

    let (decompiled, _) = decompile(&mut fs, DecompileConfig::default()).unwrap();

    // Odd-length blobs come back with one extra, zero-valued byte: the wire
    // format has no length field of its own to recover the original length.
    let mut expected_files = b"files-udd".to_vec();
    expected_files.push(0);
    assert_eq!(decompiled.files_user_defined_data(), Some(expected_files.as_slice()));
    assert_eq!(decompiled.loads_user_defined_data(), Some(b"loads-udd!".as_slice()));
    let mut expected_batches = b"batch-udd".to_vec();
    expected_batches.push(0);
    assert_eq!(decompiled.batches_user_defined_data(), Some(expected_batches.as_slice()));

    let decompiled_load = decompiled
        .recursive_loads()
        .into_iter()
        .find(|l| l.name(&decompiled) == "LOAD1.LUH")
        .expect("load round-tripped");
    assert_eq!(decompiled_load.user_defined_data(&decompiled), Some(b"load-udd".as_slice()));
}

#[test]
fn supplement2_media_set_has_no_check_values_anywhere() {
    let (media_set, mut fs) = build_media_set();
    let config = CompileConfig::new(SupportedArinc665Version::Supplement2);
    compile(&media_set, &config, &mut fs).unwrap();

    let (decompiled, check_values) = decompile(&mut fs, DecompileConfig::default()).unwrap();
    // Supplement 2 never carries a check value field at all, so nothing
    // should have been recorded regardless of which file it came from.
    for file in decompiled.recursive_files() {
        assert!(check_values.observed(file).is_empty());
    }
}
