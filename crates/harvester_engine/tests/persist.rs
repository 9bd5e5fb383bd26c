use std::fs;

use harvester_engine::{ensure_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("data").join("nested");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("sought.ron", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "sought.ron");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("sought.ron", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("sought.ron", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("sought.ron").exists());
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "x");
}

#[test]
fn for_path_splits_directory_and_name() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("data").join("sought.ron");
    let (writer, name) = AtomicFileWriter::for_path(&target).unwrap();
    assert_eq!(name, "sought.ron");
    writer.write(&name, "()").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "()");

    assert!(AtomicFileWriter::for_path(std::path::Path::new("/")).is_err());
}
