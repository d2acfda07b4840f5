//! Upstream-owned files: downstream always receives an exact copy.

use std::path::Path;

use crate::error::SyncError;
use crate::integrators::{FileOutcome, FileTreeIntegrator, TreeRoots};
use crate::reporter::Reporter;
use crate::writer::{self, WriteStatus};

#[derive(Debug, Default, Clone, Copy)]
pub struct UpstreamOwned;

impl FileTreeIntegrator for UpstreamOwned {
    fn integrate_file(
        &self,
        relative: &Path,
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<FileOutcome, SyncError> {
        let src = roots.upstream.join(relative);
        let dst = roots.downstream.join(relative);
        let status = writer::copy_file(&src, &dst)?;
        if status == WriteStatus::Written {
            reporter.progress(&format!("copied {} to downstream", relative.display()));
        }
        Ok(FileOutcome::from_status(status, relative))
    }
}
