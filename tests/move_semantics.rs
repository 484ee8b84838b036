use std::fs;
use std::path::{Path, PathBuf};

use dirshard::collect::FileFilter;
use dirshard::ops::{split_parts, split_ratio, PartsOptions, RatioOptions};
use dirshard::place::{OnError, TransferMode};
use dirshard::report::FailureKind;
use dirshard::vfs::{MemFs, OsFs};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

fn names_in(dir: &Path) -> Vec<String> {
    let mut v: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    v.sort();
    v
}

/// Move mode drains the input: every file ends up in exactly one part and the
/// input directory is left empty.
#[test]
fn parts_move_empties_the_input() {
    let td = tempdir().unwrap();
    let input = td.path().join("input");
    let out = td.path().join("out");
    fs::create_dir_all(&input).unwrap();
    for i in 0..6 {
        fs::write(input.join(format!("f{i}.dat")), format!("data {i}")).unwrap();
    }

    let opts = PartsOptions {
        parts: 2,
        filter: FileFilter::pass_all(),
        mode: TransferMode::Move,
        on_error: OnError::Continue,
    };
    let report = split_parts(&OsFs, &input, &out, &opts, None).expect("move split should succeed");

    assert_eq!(report.counts.iter().sum::<usize>(), 6);
    assert!(report.failures.is_empty());
    assert!(names_in(&input).is_empty(), "input should be drained");
    assert_eq!(fs::read_to_string(out.join("part_1").join("f0.dat")).unwrap(), "data 0");
}

/// When rename is not available (as across filesystems), the move falls back
/// to copy plus remove and still drains the input.
#[test]
fn ratio_move_falls_back_to_copy_when_rename_fails() {
    let fs = MemFs::new();
    fs.seed_dir(
        Path::new("/in"),
        &[("a.png", b"aa".as_slice()), ("b.png", b"bb"), ("c.png", b"cc"), ("d.png", b"dd")],
    );
    fs.set_rename_unsupported();

    let opts = RatioOptions {
        ratio: 0.5,
        filter: FileFilter::pass_all(),
        mode: TransferMode::Move,
        on_error: OnError::Continue,
    };
    let mut rng = StdRng::seed_from_u64(42);
    let report = split_ratio(
        &fs,
        Path::new("/in"),
        Path::new("/out/a"),
        Path::new("/out/b"),
        &opts,
        &mut rng,
    )
    .unwrap();

    assert_eq!(report.count_a, 2);
    assert_eq!(report.count_b, 2);
    assert!(report.failures.is_empty());
    assert!(fs.file_names(Path::new("/in")).is_empty(), "input should be drained");

    let moved = fs.file_names(Path::new("/out/a")).len() + fs.file_names(Path::new("/out/b")).len();
    assert_eq!(moved, 4);
}

/// A copy that lands but whose source cannot be removed is reported as a
/// partial move; the copy is kept.
#[test]
fn stuck_source_is_reported_as_partial_move() {
    let fs = MemFs::new();
    fs.seed_dir(Path::new("/in"), &[("ok.txt", b"ok".as_slice()), ("stuck.txt", b"stuck")]);
    fs.set_rename_unsupported();
    fs.deny_remove(Path::new("/in/stuck.txt"));

    let opts = PartsOptions {
        parts: 1,
        filter: FileFilter::pass_all(),
        mode: TransferMode::Move,
        on_error: OnError::Continue,
    };
    let report = split_parts(&fs, Path::new("/in"), Path::new("/out"), &opts, None).unwrap();

    assert_eq!(
        report.counts,
        vec![1],
        "a partial move is a failure, not a completed placement"
    );
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.kind, FailureKind::PartialMove);
    assert_eq!(failure.source, PathBuf::from("/in/stuck.txt"));

    // The destination copy is kept; only the stuck source remains behind.
    assert_eq!(
        fs.file_names(Path::new("/out/part_1")),
        vec!["ok.txt", "stuck.txt"]
    );
    assert_eq!(fs.file_names(Path::new("/in")), vec!["stuck.txt"]);
}

/// Abort policy: the first unreadable file stops the batch and surfaces as an
/// error instead of a report entry.
#[test]
fn abort_policy_stops_on_first_failure() {
    let fs = MemFs::new();
    fs.seed_dir(
        Path::new("/in"),
        &[("a.txt", b"a".as_slice()), ("bad.txt", b"x"), ("c.txt", b"c")],
    );
    fs.deny_copy_from(Path::new("/in/bad.txt"));

    let opts = PartsOptions {
        parts: 1,
        filter: FileFilter::pass_all(),
        mode: TransferMode::Copy,
        on_error: OnError::Abort,
    };
    let err = split_parts(&fs, Path::new("/in"), Path::new("/out"), &opts, None).unwrap_err();
    assert!(err.to_string().contains("bad.txt"), "error names the file: {err}");

    // a.txt was placed before the failure; c.txt never was.
    let placed = fs.file_names(Path::new("/out/part_1"));
    assert!(placed.contains(&"a.txt".to_string()));
    assert!(!placed.contains(&"c.txt".to_string()));
}
