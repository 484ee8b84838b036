use std::fs;

use dirshard::ops::{merge, MergeOptions};
use dirshard::vfs::OsFs;
use filetime::{set_file_mtime, FileTime};
use tempfile::tempdir;

/// Copies carry the source's mtime so a reorganized collection keeps its
/// original timestamps.
#[test]
fn merge_copy_preserves_mtime() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dest = td.path().join("dest");
    fs::create_dir_all(&src).unwrap();
    let file = src.join("old.png");
    fs::write(&file, "pixels").unwrap();

    let ts = FileTime::from_unix_time(1_700_000_000, 0);
    set_file_mtime(&file, ts).expect("set mtime");

    merge(&OsFs, &[src], &dest, &MergeOptions::default()).expect("merge should succeed");

    let meta = fs::metadata(dest.join("old.png")).unwrap();
    let mtime = FileTime::from_last_modification_time(&meta);
    assert_eq!(mtime.unix_seconds(), ts.unix_seconds());
}

#[cfg(unix)]
#[test]
fn merge_copy_preserves_mode_bits() {
    use std::os::unix::fs::PermissionsExt;

    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dest = td.path().join("dest");
    fs::create_dir_all(&src).unwrap();
    let file = src.join("locked.dat");
    fs::write(&file, "contents").unwrap();
    fs::set_permissions(&file, fs::Permissions::from_mode(0o640)).unwrap();

    merge(&OsFs, &[src], &dest, &MergeOptions::default()).unwrap();

    let mode = fs::metadata(dest.join("locked.dat"))
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(mode, 0o640);
}

/// The byte payload survives the staged copy exactly.
#[test]
fn merge_copy_is_byte_exact() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dest = td.path().join("dest");
    fs::create_dir_all(&src).unwrap();

    let payload: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
    fs::write(src.join("blob.bin"), &payload).unwrap();

    merge(&OsFs, &[src], &dest, &MergeOptions::default()).unwrap();

    assert_eq!(fs::read(dest.join("blob.bin")).unwrap(), payload);
}
