use dupecat::duplicates::{DetectError, DetectorConfig, DetectorState, DuplicateDetector, IndexSource};
use dupecat::scanner::{FileRecord, WalkerConfig};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn names(files: &[FileRecord]) -> Vec<&str> {
    files.iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn test_scenario_identical_pair_and_odd_one_out() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), &[b'X'; 100]);
    write(&dir.path().join("b"), &[b'X'; 100]);
    write(&dir.path().join("c"), &[b'Y'; 100]);

    let mut detector = DuplicateDetector::new(dir.path(), true);
    let duplicates = detector.detect(true).unwrap();
    assert_eq!(names(duplicates), vec!["a", "b"]);

    assert_eq!(names(detector.junk()), vec!["b"]);
    let groups = detector.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].keep().unwrap().name, "a");

    let analysis = detector.analyse().unwrap();
    assert_eq!(analysis.total_count, 2);
    assert_eq!(analysis.reclaimable_bytes, 100);
    assert_eq!(analysis.largest_group, 2);
}

#[test]
fn test_scenario_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("p"), b"0123456789");
    write(&dir.path().join("q"), b"abcdefghij");
    write(&dir.path().join("r"), b"twenty bytes of text");

    let mut detector = DuplicateDetector::new(dir.path(), true);
    assert!(matches!(
        detector.detect(true),
        Err(DetectError::NoDuplicatesFound)
    ));
    assert!(detector.junk().is_empty());
    assert!(detector.analyse().is_none());
    // Size index still saw the 10-byte pair
    assert_eq!(detector.size_index().unwrap().len(), 1);
    assert_eq!(detector.state(), DetectorState::HashIndexed);
}

#[test]
fn test_scenario_empty_directory() {
    let dir = tempdir().unwrap();

    let mut detector = DuplicateDetector::new(dir.path(), true);
    match detector.detect(true) {
        Err(DetectError::NoFilesFound(path)) => assert_eq!(path, dir.path()),
        other => panic!("Expected NoFilesFound, got {:?}", other),
    }
    assert_eq!(detector.state(), DetectorState::Idle);
}

#[test]
fn test_scenario_non_recursive_ignores_subdirectories() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("top.txt"), b"unique top-level file");
    write(&dir.path().join("sub/one.txt"), b"same");
    write(&dir.path().join("sub/two.txt"), b"same");

    let mut flat = DuplicateDetector::new(dir.path(), false);
    assert!(matches!(flat.detect(true), Err(DetectError::NoDuplicatesFound)));
    assert_eq!(flat.files().unwrap().len(), 1);

    let mut deep = DuplicateDetector::new(dir.path(), true);
    assert_eq!(names(deep.detect(true).unwrap()), vec!["one.txt", "two.txt"]);
}

#[test]
fn test_detect_twice_is_identical_and_does_not_rescan() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"duplicate");
    write(&dir.path().join("b.txt"), b"duplicate");
    write(&dir.path().join("nested/c.txt"), b"duplicate");

    let mut detector = DuplicateDetector::new(dir.path(), true);
    let first: Vec<_> = detector.detect(true).unwrap().to_vec();
    let first_junk: Vec<_> = detector.junk().to_vec();

    // Removing files must not change a cached result
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let second = detector.detect(true).unwrap();
    assert_eq!(names(&first), names(second));
    assert_eq!(names(&first_junk), names(detector.junk()));
    assert_eq!(names(&first_junk), vec!["b.txt", "c.txt"]);
}

#[test]
fn test_unique_size_never_in_hash_result() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"pair");
    write(&dir.path().join("b"), b"pair");
    write(&dir.path().join("lonely"), b"a size nobody else has");

    let mut detector = DuplicateDetector::new(dir.path(), true);
    let duplicates = detector.detect(true).unwrap();
    assert!(duplicates.iter().all(|f| f.name != "lonely"));
    assert_eq!(detector.hash_stats().unwrap().input_files, 2);
}

#[test]
fn test_zero_byte_files_never_appear() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("empty1"), b"");
    write(&dir.path().join("empty2"), b"");
    write(&dir.path().join("full1"), b"data");
    write(&dir.path().join("full2"), b"data");

    let mut detector = DuplicateDetector::new(dir.path(), true);
    let duplicates = detector.detect(true).unwrap();
    assert_eq!(names(duplicates), vec!["full1", "full2"]);
    assert!(detector.files().unwrap().iter().all(|f| f.size > 0));
}

#[test]
fn test_only_empty_files_is_no_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("empty1"), b"");
    write(&dir.path().join("empty2"), b"");

    let mut detector = DuplicateDetector::new(dir.path(), true);
    assert!(matches!(detector.detect(true), Err(DetectError::NoFilesFound(_))));
}

#[test]
fn test_hidden_entries_skipped_when_recursive() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("visible.txt"), b"shared");
    write(&dir.path().join(".hidden.txt"), b"shared");
    write(&dir.path().join(".git/objects/blob"), b"shared");

    let mut recursive = DuplicateDetector::new(dir.path(), true);
    assert!(matches!(
        recursive.detect(true),
        Err(DetectError::NoDuplicatesFound)
    ));
    assert_eq!(names(recursive.files().unwrap()), vec!["visible.txt"]);

    let config = DetectorConfig::new(true)
        .with_walker_config(WalkerConfig::new(true).with_skip_hidden(false));
    let mut everything = DuplicateDetector::with_config(dir.path(), config);
    assert_eq!(everything.detect(true).unwrap().len(), 3);
}

#[test]
fn test_size_only_reports_same_size_as_duplicates() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"aaaa");
    write(&dir.path().join("b"), b"bbbb");

    let mut detector = DuplicateDetector::new(dir.path(), true);
    let duplicates = detector.detect(false).unwrap();
    assert_eq!(names(duplicates), vec!["a", "b"]);
    assert_eq!(detector.source(), Some(IndexSource::Size));
    assert!(detector.hash_stats().is_none());
    assert!(detector.junk().iter().all(|f| f.fingerprint().is_none()));
}

#[test]
fn test_hash_result_records_carry_fingerprints() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"same bytes");
    write(&dir.path().join("b"), b"same bytes");

    let mut detector = DuplicateDetector::new(dir.path(), true);
    let duplicates = detector.detect(true).unwrap();
    assert!(duplicates[0].same_fingerprint_as(&duplicates[1]));
    assert!(duplicates[0].same_size_as(&duplicates[1]));
    assert_eq!(duplicates[0].fingerprint_hex().len(), 64);
}

#[test]
fn test_prefix_collision_is_reported_as_duplicate() {
    let dir = tempdir().unwrap();
    let mut a = vec![b'z'; 2048];
    let mut b = a.clone();
    a[1500] = b'1';
    b[1500] = b'2';
    write(&dir.path().join("a.bin"), &a);
    write(&dir.path().join("b.bin"), &b);

    let mut detector = DuplicateDetector::new(dir.path(), true);
    assert_eq!(detector.detect(true).unwrap().len(), 2);
}

#[test]
fn test_junk_partition_per_group() {
    let dir = tempdir().unwrap();
    for name in ["a1", "a2", "a3"] {
        write(&dir.path().join(name), b"group a content");
    }
    for name in ["b1", "b2"] {
        write(&dir.path().join(name), b"group b");
    }

    let mut detector = DuplicateDetector::new(dir.path(), true);
    detector.detect(true).unwrap();

    let groups = detector.groups();
    assert_eq!(groups.len(), 2);
    let mut expected_junk = Vec::new();
    for group in &groups {
        let keep = group.keep().unwrap();
        assert_eq!(group.junk().len(), group.len() - 1);
        assert!(group.junk().iter().all(|j| j.full_path != keep.full_path));
        expected_junk.extend(group.junk().iter().map(|f| f.name.clone()));
    }
    let junk: Vec<String> = detector.junk().iter().map(|f| f.name.clone()).collect();
    assert_eq!(junk, expected_junk);
    assert_eq!(detector.analyse().unwrap().largest_group, 3);
}

#[test]
fn test_shutdown_flag_interrupts_detection() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"x");
    write(&dir.path().join("b"), b"x");

    let config = DetectorConfig::new(true).with_shutdown_flag(Arc::new(AtomicBool::new(true)));
    let mut detector = DuplicateDetector::with_config(dir.path(), config);
    assert!(matches!(detector.detect(true), Err(DetectError::Interrupted)));
}

#[test]
fn test_worker_count_does_not_change_result() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(
            &dir.path().join(format!("f{i:02}")),
            format!("content {}", i % 3).as_bytes(),
        );
    }

    let mut results = Vec::new();
    for workers in [1, 2, 10, 64] {
        let config = DetectorConfig::new(true).with_workers(workers);
        let mut detector = DuplicateDetector::with_config(dir.path(), config);
        detector.detect(true).unwrap();
        let junk: Vec<String> = detector.junk().iter().map(|f| f.name.clone()).collect();
        results.push(junk);
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0].len(), 27);
}

#[test]
fn test_invalid_roots() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    write(&file, b"data");

    let mut missing = DuplicateDetector::new(dir.path().join("nope"), true);
    assert!(matches!(missing.detect(true), Err(DetectError::PathNotFound(_))));

    let mut not_dir = DuplicateDetector::new(&file, true);
    assert!(matches!(not_dir.detect(true), Err(DetectError::NotADirectory(_))));
}
