//! Downstream-owned files: seeded once, never touched again.

use std::path::Path;

use crate::error::SyncError;
use crate::integrators::{FileOutcome, FileTreeIntegrator, TreeRoots};
use crate::reporter::Reporter;
use crate::writer;

#[derive(Debug, Default, Clone, Copy)]
pub struct DownstreamOwned;

impl FileTreeIntegrator for DownstreamOwned {
    fn integrate_file(
        &self,
        relative: &Path,
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<FileOutcome, SyncError> {
        let dst = roots.downstream.join(relative);
        if dst.symlink_metadata().is_ok() {
            tracing::debug!("downstream-owned file exists, skipping: {}", dst.display());
            return Ok(FileOutcome::Skipped { path: relative.to_path_buf() });
        }
        let status = writer::copy_file(&roots.upstream.join(relative), &dst)?;
        reporter.progress(&format!("seeded downstream-owned {}", relative.display()));
        Ok(FileOutcome::from_status(status, relative))
    }
}
