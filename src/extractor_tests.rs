//! Unit tests for package extraction.

use super::*;
use crate::package::{PackageFormat, detect_and_validate};
use crate::test_support::XpkBuilder;
use crate::unzip::{MockUnzipper, ZipUnzipper};
use rstest::{fixture, rstest};

/// A temp root plus a valid XPK package living outside it.
struct Fixture {
    _package_dir: TempDir,
    temp_root: TempDir,
    handle: PackageHandle,
}

#[fixture]
fn fixture() -> Fixture {
    let package_dir = tempfile::tempdir().expect("package dir");
    let path = package_dir.path().join("hello.xpk");
    XpkBuilder::new()
        .with_manifest_json(r#"{"name":"Hello"}"#)
        .with_entry("index.html", b"<html></html>")
        .write_to(&path)
        .expect("write xpk");
    let handle = detect_and_validate(&path).expect("valid xpk");
    Fixture {
        _package_dir: package_dir,
        temp_root: tempfile::tempdir().expect("temp root"),
        handle,
    }
}

fn entries_under(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read dir").count()
}

#[rstest]
fn extracts_into_fresh_directory_under_temp_root(fixture: Fixture) {
    let extractor = Extractor::with_temp_root(&ZipUnzipper, fixture.temp_root.path());

    let root = extractor.extract(&fixture.handle).expect("extract");

    assert!(root.path().starts_with(fixture.temp_root.path()));
    assert!(root.path().join("manifest.json").is_file());
    assert!(root.path().join("index.html").is_file());
    let name = root
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .expect("utf-8 name");
    assert!(name.starts_with(EXTRACTION_PREFIX));
}

#[rstest]
fn repeated_extraction_yields_distinct_identical_roots(fixture: Fixture) {
    let extractor = Extractor::with_temp_root(&ZipUnzipper, fixture.temp_root.path());

    let first = extractor.extract(&fixture.handle).expect("first extract");
    let second = extractor.extract(&fixture.handle).expect("second extract");

    assert_ne!(first.path(), second.path());
    for file in ["manifest.json", "index.html"] {
        let a = fs::read(first.path().join(file)).expect("read first");
        let b = fs::read(second.path().join(file)).expect("read second");
        assert_eq!(a, b, "{file} differs between extractions");
    }
}

#[rstest]
fn dropping_root_removes_directory(fixture: Fixture) {
    let extractor = Extractor::with_temp_root(&ZipUnzipper, fixture.temp_root.path());
    let root = extractor.extract(&fixture.handle).expect("extract");
    let path = root.path().to_path_buf();

    drop(root);

    assert!(!path.exists());
    assert_eq!(entries_under(fixture.temp_root.path()), 0);
}

#[rstest]
fn failed_unzip_leaves_nothing_behind(fixture: Fixture) {
    let mut unzipper = MockUnzipper::new();
    unzipper.expect_unzip().times(1).returning(|_source, dest| {
        // Simulate an archive that fails half way through.
        fs::write(dest.join("partial.bin"), b"half").expect("write partial");
        Err(UnzipError::PathTraversal {
            path: "../evil".to_owned(),
        })
    });
    let extractor = Extractor::with_temp_root(&unzipper, fixture.temp_root.path());

    let err = extractor.extract(&fixture.handle).expect_err("expected failure");

    assert!(matches!(err, ExtractError::UnzipFailed { .. }), "got {err:?}");
    assert_eq!(entries_under(fixture.temp_root.path()), 0);
}

#[rstest]
fn unvalidated_handle_is_refused_without_touching_disk(fixture: Fixture) {
    let mut unzipper = MockUnzipper::new();
    unzipper.expect_unzip().never();
    let extractor = Extractor::with_temp_root(&unzipper, fixture.temp_root.path());
    let handle = PackageHandle::unvalidated(fixture.handle.path(), PackageFormat::Wgt);

    let err = extractor.extract(&handle).expect_err("expected failure");

    assert!(matches!(err, ExtractError::InvalidPackage { .. }));
    assert_eq!(entries_under(fixture.temp_root.path()), 0);
}

#[rstest]
#[case::missing("does-not-exist")]
#[case::empty("")]
fn unusable_temp_root_is_reported(fixture: Fixture, #[case] suffix: &str) {
    let root = if suffix.is_empty() {
        PathBuf::new()
    } else {
        fixture.temp_root.path().join(suffix)
    };
    let extractor = Extractor::with_temp_root(&ZipUnzipper, root);

    let err = extractor.extract(&fixture.handle).expect_err("expected failure");
    assert!(matches!(err, ExtractError::NoTempRoot { .. }), "got {err:?}");
}

#[rstest]
fn file_as_temp_root_is_reported(fixture: Fixture) {
    let file = fixture.temp_root.path().join("plain-file");
    fs::write(&file, b"").expect("write file");
    let extractor = Extractor::with_temp_root(&ZipUnzipper, file);

    let err = extractor.extract(&fixture.handle).expect_err("expected failure");
    assert!(matches!(err, ExtractError::NoTempRoot { .. }), "got {err:?}");
}

#[cfg(unix)]
#[rstest]
fn read_only_temp_root_fails_directory_creation(fixture: Fixture) {
    use std::os::unix::fs::PermissionsExt;

    let locked = fixture.temp_root.path().join("locked");
    fs::create_dir(&locked).expect("create locked dir");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).expect("chmod");

    // Root ignores directory permissions; skip when this write succeeds.
    if fs::create_dir(locked.join("writable")).is_ok() {
        return;
    }

    let extractor = Extractor::with_temp_root(&ZipUnzipper, &locked);
    let err = extractor.extract(&fixture.handle).expect_err("expected failure");
    assert!(
        matches!(err, ExtractError::DirCreateFailed { .. }),
        "got {err:?}"
    );

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore");
}

#[rstest]
fn persist_moves_tree_and_disarms_cleanup(fixture: Fixture) {
    let extractor = Extractor::with_temp_root(&ZipUnzipper, fixture.temp_root.path());
    let root = extractor.extract(&fixture.handle).expect("extract");
    let dest = fixture.temp_root.path().join("installed");

    let moved_from = root.path().to_path_buf();

    let persisted = root.persist(&dest).expect("persist");

    assert_eq!(persisted, dest);
    assert!(dest.join("manifest.json").is_file());
    assert!(!moved_from.exists());
    let remaining: Vec<_> = fs::read_dir(fixture.temp_root.path())
        .expect("read temp root")
        .map(|entry| entry.expect("dir entry").file_name())
        .collect();
    assert_eq!(remaining, vec![std::ffi::OsString::from("installed")]);
}

#[rstest]
fn persist_refuses_existing_destination(fixture: Fixture) {
    let extractor = Extractor::with_temp_root(&ZipUnzipper, fixture.temp_root.path());
    let root = extractor.extract(&fixture.handle).expect("extract");
    let original = root.path().to_path_buf();
    let dest = fixture.temp_root.path().join("taken");
    fs::create_dir(&dest).expect("create dest");

    let err = root.persist(&dest).expect_err("expected failure");

    assert_eq!(err.source.kind(), io::ErrorKind::AlreadyExists);
    assert!(original.exists(), "root must survive a failed persist");
    drop(err);
    assert!(!original.exists());
}

#[rstest]
fn close_removes_directory(fixture: Fixture) {
    let extractor = Extractor::with_temp_root(&ZipUnzipper, fixture.temp_root.path());
    let root = extractor.extract(&fixture.handle).expect("extract");
    let path = root.path().to_path_buf();

    root.close().expect("close");

    assert!(!path.exists());
}
