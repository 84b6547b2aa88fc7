use super::*;
use crate::test_utils::ZipBuilder;
use std::fs;
use tempfile::TempDir;

fn installer(dir: &Path) -> Installer {
    Installer::new(
        dir,
        VersionStore::new(dir, "version.txt"),
        CancellationToken::new(),
    )
}

#[test]
fn test_strip_top_level() {
    assert_eq!(strip_top_level("bang-sdl-1.2/bin/app.exe"), Some("bin/app.exe"));
    assert_eq!(strip_top_level("bang-sdl-1.2/bangclient"), Some("bangclient"));
    assert_eq!(strip_top_level("bang-sdl-1.2/resources/"), Some("resources/"));
    assert_eq!(strip_top_level("bang-sdl-1.2/"), None);
    assert_eq!(strip_top_level("README.txt"), None);
}

#[test]
fn test_unsafe_paths_rejected() {
    assert_eq!(install_relative_path("bin/app.exe"), Some(PathBuf::from("bin").join("app.exe")));
    assert_eq!(install_relative_path("./bin"), Some(PathBuf::from("bin")));
    assert_eq!(install_relative_path("../outside"), None);
    assert_eq!(install_relative_path("bin/../../outside"), None);
    assert_eq!(install_relative_path("/etc/passwd"), None);
    assert_eq!(install_relative_path("."), None);
}

#[test]
fn test_extracts_with_top_level_stripped() {
    let temp = TempDir::new().unwrap();
    let archive = ZipBuilder::new()
        .dir("bang-sdl-1.2/")
        .dir("bang-sdl-1.2/bin/")
        .file("bang-sdl-1.2/bin/app.exe", b"exe")
        .file("bang-sdl-1.2/resources/cards/a.png", b"png-bytes")
        .file("loose.txt", b"ignored")
        .build();

    let report = install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap();

    assert_eq!(fs::read(temp.path().join("bin/app.exe")).unwrap(), b"exe");
    assert_eq!(fs::read(temp.path().join("resources/cards/a.png")).unwrap(), b"png-bytes");
    assert!(!temp.path().join("bang-sdl-1.2").exists());
    assert!(!temp.path().join("loose.txt").exists());
    assert_eq!(report.written.len(), 2);
    assert_eq!(report.directories, 1);
    assert_eq!(report.skipped, 0);
}

#[test]
fn test_skip_on_size_match_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let sentinel = temp.path().join("bangclient");
    fs::write(&sentinel, b"AAAA").unwrap();

    let archive = ZipBuilder::new()
        .file("bang-sdl-2.0/bangclient", b"BBBB")
        .file("bang-sdl-2.0/other", b"new")
        .build();
    let report = install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap();

    assert_eq!(fs::read(&sentinel).unwrap(), b"AAAA");
    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, vec![temp.path().join("other")]);
}

#[test]
fn test_size_mismatch_overwrites() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("bangclient");
    fs::write(&target, b"a much longer old binary").unwrap();

    let archive = ZipBuilder::new().file("bang/bangclient", b"new").build();
    install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap();

    assert_eq!(fs::read(&target).unwrap(), b"new");
}

#[test]
fn test_last_entry_wins() {
    let temp = TempDir::new().unwrap();
    let archive = ZipBuilder::new()
        .file("first/config.ini", b"one")
        .file("second/config.ini", b"three")
        .build();

    install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap();
    assert_eq!(fs::read(temp.path().join("config.ini")).unwrap(), b"three");
}

#[test]
fn test_second_install_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let archive = ZipBuilder::new()
        .file("bang/bangclient", b"client")
        .file("bang/data/cards.txt", b"cards")
        .build();

    let first = install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap();
    assert_eq!(first.written.len(), 2);

    let second = install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap();
    assert!(second.is_noop());
    assert_eq!(second.skipped, 2);
}

#[test]
fn test_creates_missing_install_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("nested").join("game");
    let archive = ZipBuilder::new().file("bang/bangclient", b"client").build();

    install_archive(&archive, &dir, &CancellationToken::new()).unwrap();
    assert!(dir.join("bangclient").is_file());
}

#[test]
fn test_garbage_is_archive_open_failure() {
    let temp = TempDir::new().unwrap();
    let error = install_archive(b"not a zip file", temp.path(), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(error, InstallError::ArchiveOpenFailed { .. }));
}

#[test]
fn test_unwritable_path_aborts_install() {
    let temp = TempDir::new().unwrap();
    // A directory where the archive wants a file cannot be opened for writing
    fs::create_dir_all(temp.path().join("blocked")).unwrap();

    let archive = ZipBuilder::new()
        .file("bang/before", b"1")
        .file("bang/blocked", b"22")
        .file("bang/after", b"333")
        .build();
    let error = install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap_err();

    match error {
        InstallError::PathUnwritable { path, .. } => assert_eq!(path, temp.path().join("blocked")),
        other => panic!("expected PathUnwritable, got {other:?}"),
    }
    assert!(temp.path().join("before").exists());
    assert!(!temp.path().join("after").exists());
}

#[test]
fn test_cancelled_before_first_entry() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let archive = ZipBuilder::new().file("bang/bangclient", b"client").build();
    let error = install_archive(&archive, temp.path(), &cancel).unwrap_err();

    assert!(matches!(error, InstallError::Cancelled));
    assert!(!temp.path().join("bangclient").exists());
}

#[test]
fn test_short_entry_is_truncated() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("short");
    let mut reader = std::io::Cursor::new(vec![7u8; 100]);

    let error =
        copy_entry(&mut reader, "bang/short", &destination, 200, &CancellationToken::new())
            .unwrap_err();
    match error {
        InstallError::Truncated {
            expected, actual, ..
        } => {
            assert_eq!(expected, 200);
            assert_eq!(actual, 100);
        }
        other => panic!("expected Truncated, got {other:?}"),
    }
}

#[test]
fn test_copy_spans_multiple_chunks() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("big");
    let content: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
    let mut reader = std::io::Cursor::new(content.clone());

    copy_entry(
        &mut reader,
        "bang/big",
        &destination,
        content.len() as u64,
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(fs::read(&destination).unwrap(), content);
}

#[cfg(unix)]
#[test]
fn test_applies_unix_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let archive = ZipBuilder::new()
        .file_with_mode("bang/bangclient", b"#!/bin/sh\n", 0o755)
        .file_with_mode("bang/readme.txt", b"hello", 0o644)
        .build();

    install_archive(&archive, temp.path(), &CancellationToken::new()).unwrap();

    let mode = |name: &str| fs::metadata(temp.path().join(name)).unwrap().permissions().mode();
    assert_eq!(mode("bangclient") & 0o777, 0o755);
    assert_eq!(mode("readme.txt") & 0o777, 0o644);
}

#[test]
fn test_install_main_writes_marker_after_extraction() {
    let temp = TempDir::new().unwrap();
    let installer = installer(temp.path());
    let archive = ZipBuilder::new().file("bang-sdl-1.2/bangclient", b"client").build();

    installer.install_main(&archive, "v1.2").unwrap();

    assert_eq!(fs::read_to_string(temp.path().join("version.txt")).unwrap(), "v1.2\n");
    assert!(temp.path().join("bangclient").is_file());
}

#[test]
fn test_failed_install_keeps_old_marker() {
    let temp = TempDir::new().unwrap();
    let installer = installer(temp.path());
    VersionStore::new(temp.path(), "version.txt").write("v1.0").unwrap();

    let error = installer.install_main(b"truncated download", "v2.0").unwrap_err();
    assert!(matches!(error, InstallError::ArchiveOpenFailed { .. }));
    assert_eq!(fs::read_to_string(temp.path().join("version.txt")).unwrap(), "v1.0\n");
}

#[test]
fn test_cancelled_install_writes_no_marker() {
    let temp = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let installer = Installer::new(
        temp.path(),
        VersionStore::new(temp.path(), "version.txt"),
        cancel.clone(),
    );
    cancel.cancel();

    let archive = ZipBuilder::new().file("bang/bangclient", b"client").build();
    let error = installer.install_main(&archive, "v2.0").unwrap_err();

    assert!(matches!(error, InstallError::Cancelled));
    assert!(!temp.path().join("version.txt").exists());
}

#[test]
fn test_install_data_pack() {
    let temp = TempDir::new().unwrap();
    let installer = installer(temp.path());
    fs::write(temp.path().join("cards.pak"), b"old pack").unwrap();

    let path = installer.install_data_pack(b"new pack contents", "cards.pak").unwrap();

    assert_eq!(path, temp.path().join("cards.pak"));
    assert_eq!(fs::read(&path).unwrap(), b"new pack contents");
    assert!(!temp.path().join("version.txt").exists());
}
