use std::fs;
use std::path::Path;

use dirshard::collect::FileFilter;
use dirshard::ops::{split_parts, PartsOptions};
use dirshard::place::{OnError, TransferMode};
use dirshard::vfs::OsFs;
use tempfile::tempdir;

fn seed_named(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), *name).unwrap();
    }
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut v: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    v.sort();
    v
}

fn copy_opts(parts: usize) -> PartsOptions {
    PartsOptions {
        parts,
        filter: FileFilter::pass_all(),
        mode: TransferMode::Copy,
        on_error: OnError::Continue,
    }
}

/// Without shuffling, files are dealt round-robin in name order: part_1 gets
/// positions 0, 2, 4 and part_2 positions 1, 3.
#[test]
fn parts_deals_in_name_order_without_shuffle() {
    let td = tempdir().unwrap();
    let input = td.path().join("input");
    let out = td.path().join("out");
    seed_named(&input, &["a.png", "b.png", "c.png", "d.png", "e.png"]);

    let report = split_parts(&OsFs, &input, &out, &copy_opts(2), None)
        .expect("parts split should succeed");

    assert_eq!(report.counts, vec![3, 2]);
    assert_eq!(names_in(&out.join("part_1")), vec!["a.png", "c.png", "e.png"]);
    assert_eq!(names_in(&out.join("part_2")), vec!["b.png", "d.png"]);
}

/// 10 files over 3 parts: sizes 4, 3, 3 and no file lost or duplicated.
#[test]
fn parts_sizes_differ_by_at_most_one() {
    let td = tempdir().unwrap();
    let input = td.path().join("input");
    let out = td.path().join("out");
    let names: Vec<String> = (0..10).map(|i| format!("f{i:02}.jpg")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    seed_named(&input, &name_refs);

    let report = split_parts(&OsFs, &input, &out, &copy_opts(3), None).unwrap();

    assert_eq!(report.counts, vec![4, 3, 3]);

    let mut all = Vec::new();
    for i in 1..=3 {
        all.extend(names_in(&out.join(format!("part_{i}"))));
    }
    all.sort();
    assert_eq!(all, names_in(&input));
}

/// More parts than files: trailing part directories are created but stay
/// empty.
#[test]
fn parts_creates_empty_trailing_directories() {
    let td = tempdir().unwrap();
    let input = td.path().join("input");
    let out = td.path().join("out");
    seed_named(&input, &["x.txt", "y.txt"]);

    let report = split_parts(&OsFs, &input, &out, &copy_opts(5), None).unwrap();

    assert_eq!(report.counts, vec![1, 1, 0, 0, 0]);
    for i in 1..=5 {
        assert!(
            out.join(format!("part_{i}")).is_dir(),
            "part_{i} should exist"
        );
    }
    assert!(names_in(&out.join("part_3")).is_empty());
}

/// A single part receives the whole collection.
#[test]
fn single_part_takes_everything() {
    let td = tempdir().unwrap();
    let input = td.path().join("input");
    let out = td.path().join("out");
    seed_named(&input, &["one", "two", "three"]);

    let report = split_parts(&OsFs, &input, &out, &copy_opts(1), None).unwrap();

    assert_eq!(report.counts, vec![3]);
    assert_eq!(names_in(&out.join("part_1")).len(), 3);
}
