use dupecat::actions::{delete_batch, DeleteConfig, DeleteError};
use dupecat::duplicates::{DetectError, DuplicateDetector};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_delete_junk_keeps_first_of_each_group() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"copy").unwrap();
    fs::write(dir.path().join("b.txt"), b"copy").unwrap();
    fs::write(dir.path().join("c.txt"), b"copy").unwrap();
    fs::write(dir.path().join("d.txt"), b"different!").unwrap();

    let mut detector = DuplicateDetector::new(dir.path(), true);
    detector.detect(true).unwrap();

    let result = delete_batch(detector.junk(), &DeleteConfig::default(), None);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.bytes_freed, 8);
    assert!(result.all_succeeded());

    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("c.txt").exists());
    assert!(dir.path().join("d.txt").exists());

    // A fresh scan finds nothing left to clean
    let mut again = DuplicateDetector::new(dir.path(), true);
    assert!(matches!(again.detect(true), Err(DetectError::NoDuplicatesFound)));
}

#[test]
fn test_scenario_already_removed_junk_is_absent_not_failed() {
    let dir = tempdir().unwrap();
    // Sorted walk order makes a_keep.bin the kept copy
    for name in ["a_keep.bin", "b_junk.bin", "c_junk.bin"] {
        fs::write(dir.path().join(name), b"identical payload").unwrap();
    }

    let mut detector = DuplicateDetector::new(dir.path(), true);
    detector.detect(true).unwrap();
    assert_eq!(detector.groups()[0].keep().unwrap().name, "a_keep.bin");
    let junk = detector.junk();
    assert_eq!(junk.len(), 2);
    assert_eq!(junk[0].name, "b_junk.bin");

    // Someone else removes one junk file between detection and deletion
    fs::remove_file(&junk[0].full_path).unwrap();

    let result = delete_batch(junk, &DeleteConfig::default(), None);
    assert_eq!(result.already_absent, vec![junk[0].full_path.clone()]);
    assert_eq!(result.successes.len(), 1);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.attempted_count(), 2);
    assert!(result.summary().starts_with("deleted 2 of 2 files"));
    assert!(dir.path().join("a_keep.bin").exists());
    assert!(!dir.path().join("c_junk.bin").exists());
}

#[test]
fn test_record_delete_fails_when_gone() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"dup").unwrap();
    fs::write(dir.path().join("y"), b"dup").unwrap();

    let mut detector = DuplicateDetector::new(dir.path(), false);
    detector.detect(true).unwrap();
    let junk = &detector.junk()[0];

    junk.delete().unwrap();
    assert!(matches!(junk.delete(), Err(DeleteError::NotFound(_))));
}
