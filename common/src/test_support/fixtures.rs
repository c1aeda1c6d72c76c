//! Fixture management utilities for working-area tests.
//!
//! These helpers copy fixture files into a temporary working area under a
//! chosen name and list what remains there afterwards, so tests can assert
//! which artefacts survive an acquisition attempt.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Copies `fixture_root/name` into `destination_root/as_name`.
///
/// Returns the path of the copy.
///
/// # Examples
///
/// ```
/// use wizcli_common::test_support::fixtures::copy_fixture_as;
/// use std::fs;
/// use tempfile::tempdir;
///
/// # fn demo() -> std::io::Result<()> {
/// let fixtures = tempdir()?;
/// fs::write(fixtures.path().join("key.asc"), "armored")?;
/// let work = tempdir()?;
/// let copied = copy_fixture_as(fixtures.path(), "key.asc", work.path(), "public_key.asc")?;
/// assert_eq!(fs::read_to_string(copied)?, "armored");
/// # Ok(())
/// # }
/// # demo().expect("fixture copy");
/// ```
pub fn copy_fixture_as(
    fixture_root: &Path,
    name: &str,
    destination_root: &Path,
    as_name: &str,
) -> io::Result<PathBuf> {
    let source = fixture_root.join(name);
    let metadata = source.symlink_metadata()?;
    if metadata.file_type().is_symlink() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "refusing to follow symlink `{}` while copying fixtures",
                source.display()
            ),
        ));
    }
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("`{}` is not a file", source.display()),
        ));
    }

    fs::create_dir_all(destination_root)?;
    let destination = destination_root.join(as_name);
    fs::copy(&source, &destination)?;
    Ok(destination)
}

/// Lists the file names directly inside `dir`, sorted.
///
/// Directories are reported with a trailing `/`.
pub fn list_entries(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copy_fixture_as_renames_the_copy() {
        let root = tempdir().expect("fixture root");
        fs::write(root.path().join("source.sig"), b"sig").expect("fixture file");
        let destination = tempdir().expect("destination root");

        let copied = copy_fixture_as(
            root.path(),
            "source.sig",
            destination.path(),
            "wizcli-sha256.sig",
        )
        .expect("copy succeeds");

        assert_eq!(copied, destination.path().join("wizcli-sha256.sig"));
        assert_eq!(fs::read(copied).expect("read copy"), b"sig");
    }

    #[test]
    fn copy_fixture_as_creates_missing_destination() {
        let root = tempdir().expect("fixture root");
        fs::write(root.path().join("a"), b"a").expect("fixture file");
        let destination = tempdir().expect("destination root");
        let nested = destination.path().join("nested").join("work");

        copy_fixture_as(root.path(), "a", &nested, "b").expect("copy succeeds");

        assert!(nested.join("b").exists());
    }

    #[test]
    fn copy_fixture_as_rejects_directories() {
        let root = tempdir().expect("fixture root");
        fs::create_dir(root.path().join("dir")).expect("fixture dir");
        let destination = tempdir().expect("destination root");

        let err = copy_fixture_as(root.path(), "dir", destination.path(), "dir")
            .expect_err("directories are rejected");

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn copy_fixture_as_rejects_symlinks() {
        let root = tempdir().expect("fixture root");
        let target = root.path().join("target");
        fs::write(&target, b"data").expect("target file");
        std::os::unix::fs::symlink(&target, root.path().join("link")).expect("symlink");
        let destination = tempdir().expect("destination root");

        let err = copy_fixture_as(root.path(), "link", destination.path(), "copy")
            .expect_err("symlinks are rejected");

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn list_entries_is_sorted_and_marks_directories() {
        let root = tempdir().expect("root");
        fs::write(root.path().join("b"), b"").expect("file b");
        fs::write(root.path().join("a"), b"").expect("file a");
        fs::create_dir(root.path().join("c")).expect("dir c");

        let names = list_entries(root.path()).expect("list succeeds");

        assert_eq!(names, vec!["a", "b", "c/"]);
    }
}
