//! Atomic file writer used by every integrator.
//!
//! ## Protocol
//!
//! 1. Compare the new bytes with the current file; skip if identical.
//! 2. Create parent directories.
//! 3. Write to `<path>.gitspork.tmp`.
//! 4. Rename to the final path (atomic on POSIX).

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Atomic write
// ---------------------------------------------------------------------------

/// Whether a write touched the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

/// Write `content` to `path` unless the file already holds exactly those bytes.
pub(crate) fn write_if_changed(path: &Path, content: &[u8]) -> Result<WriteStatus, SyncError> {
    let tmp = PathBuf::from(format!("{}.gitspork.tmp", path.display()));
    write_if_changed_with_tmp(path, content, &tmp)
}

fn write_if_changed_with_tmp(
    path: &Path,
    content: &[u8],
    tmp: &Path,
) -> Result<WriteStatus, SyncError> {
    if path.is_file() {
        let current = std::fs::read(path).map_err(|e| io_err(path, e))?;
        if current == content {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteStatus::Unchanged);
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteStatus::Written)
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// Copy `src` over `dst`, creating parents and carrying `src`'s permissions.
pub(crate) fn copy_file(src: &Path, dst: &Path) -> Result<WriteStatus, SyncError> {
    let content = std::fs::read(src).map_err(|e| io_err(src, e))?;
    let status = write_if_changed(dst, &content)?;
    let permissions = std::fs::metadata(src).map_err(|e| io_err(src, e))?.permissions();
    let current = std::fs::metadata(dst).map_err(|e| io_err(dst, e))?.permissions();
    if current != permissions {
        std::fs::set_permissions(dst, permissions).map_err(|e| io_err(dst, e))?;
        return Ok(WriteStatus::Written);
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_new_file_and_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.txt");
        assert_eq!(write_if_changed(&path, b"hi").unwrap(), WriteStatus::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hi");
    }

    #[test]
    fn identical_content_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.txt");
        write_if_changed(&path, b"same").unwrap();
        assert_eq!(write_if_changed(&path, b"same").unwrap(), WriteStatus::Unchanged);
        assert_eq!(write_if_changed(&path, b"other").unwrap(), WriteStatus::Written);
    }

    #[test]
    fn rename_failure_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        // A directory at the destination makes the rename fail.
        let path = tmp.path().join("dest");
        std::fs::create_dir_all(path.join("inner")).unwrap();
        let tmp_file = tmp.path().join("dest.tmp");
        let err = write_if_changed_with_tmp(&path, b"x", &tmp_file).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
        assert!(!tmp_file.exists());
    }

    #[test]
    fn no_tmp_left_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.txt");
        write_if_changed(&path, b"1").unwrap();
        assert!(!tmp.path().join("f.txt.gitspork.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("run.sh");
        std::fs::write(&src, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o755)).unwrap();
        let dst = tmp.path().join("out/run.sh");
        assert_eq!(copy_file(&src, &dst).unwrap(), WriteStatus::Written);
        let mode = std::fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(copy_file(&src, &dst).unwrap(), WriteStatus::Unchanged);
    }
}
