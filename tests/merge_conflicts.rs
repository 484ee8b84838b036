use std::fs;
use std::path::Path;

use dirshard::ops::{merge, MergeOptions};
use dirshard::vfs::OsFs;
use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write file");
}

/// Two sources share a filename: the first arrival keeps the name, the
/// second is renamed with a numeric suffix before the extension.
#[test]
fn merge_renames_on_collision_keeping_first_arrival() {
    let td = tempdir().unwrap();
    let src_a = td.path().join("a");
    let src_b = td.path().join("b");
    let dest = td.path().join("merged");
    fs::create_dir_all(&src_a).unwrap();
    fs::create_dir_all(&src_b).unwrap();
    write_file(&src_a.join("x.png"), "from-a");
    write_file(&src_a.join("y.png"), "why");
    write_file(&src_b.join("x.png"), "from-b");

    let report = merge(
        &OsFs,
        &[src_a.clone(), src_b.clone()],
        &dest,
        &MergeOptions::default(),
    )
    .expect("merge should succeed");

    assert_eq!(report.copied, 3);
    assert_eq!(fs::read_to_string(dest.join("x.png")).unwrap(), "from-a");
    assert_eq!(fs::read_to_string(dest.join("x_1.png")).unwrap(), "from-b");
    assert_eq!(fs::read_to_string(dest.join("y.png")).unwrap(), "why");

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].original, "x.png");
    assert_eq!(report.conflicts[0].resolved, "x_1.png");

    // Merge copies; the sources are left untouched.
    assert!(src_a.join("x.png").exists(), "source a should keep its file");
    assert!(src_b.join("x.png").exists(), "source b should keep its file");
}

/// Files already present in the destination count as occupants: incoming
/// files with the same name are renamed, never overwritten.
#[test]
fn merge_never_overwrites_existing_destination_files() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dest = td.path().join("dest");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dest).unwrap();
    write_file(&src.join("keep.txt"), "incoming");
    write_file(&dest.join("keep.txt"), "already here");

    let report = merge(&OsFs, &[src], &dest, &MergeOptions::default()).unwrap();

    assert_eq!(report.copied, 1);
    assert_eq!(
        fs::read_to_string(dest.join("keep.txt")).unwrap(),
        "already here"
    );
    assert_eq!(
        fs::read_to_string(dest.join("keep_1.txt")).unwrap(),
        "incoming"
    );
}

/// Three sources with the same filename produce name, name_1, name_2 in
/// source order.
#[test]
fn merge_suffixes_count_up_across_sources() {
    let td = tempdir().unwrap();
    let dest = td.path().join("all");
    let mut sources = Vec::new();
    for (i, payload) in ["one", "two", "three"].iter().enumerate() {
        let src = td.path().join(format!("s{i}"));
        fs::create_dir_all(&src).unwrap();
        write_file(&src.join("cat.jpg"), payload);
        sources.push(src);
    }

    let report = merge(&OsFs, &sources, &dest, &MergeOptions::default()).unwrap();

    assert_eq!(report.copied, 3);
    assert_eq!(fs::read_to_string(dest.join("cat.jpg")).unwrap(), "one");
    assert_eq!(fs::read_to_string(dest.join("cat_1.jpg")).unwrap(), "two");
    assert_eq!(fs::read_to_string(dest.join("cat_2.jpg")).unwrap(), "three");
    assert_eq!(report.conflicts.len(), 2);
}

/// Subdirectories inside a source are not part of a flat collection and are
/// left alone.
#[test]
fn merge_ignores_subdirectories() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dest = td.path().join("dest");
    fs::create_dir_all(src.join("nested")).unwrap();
    write_file(&src.join("top.txt"), "top");
    write_file(&src.join("nested").join("deep.txt"), "deep");

    let report = merge(&OsFs, &[src], &dest, &MergeOptions::default()).unwrap();

    assert_eq!(report.copied, 1);
    assert!(dest.join("top.txt").exists());
    assert!(!dest.join("nested").exists(), "nested dir should not be copied");
    assert!(!dest.join("deep.txt").exists());
}
