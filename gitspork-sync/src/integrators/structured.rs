//! Shared structured files: YAML/JSON deep-merged with a precedence side.

use std::path::Path;

use gitspork_core::Precedence;

use crate::error::SyncError;
use crate::integrators::{FileOutcome, FileTreeIntegrator, TreeRoots};
use crate::reporter::Reporter;
use crate::structured;
use crate::writer::WriteStatus;

#[derive(Debug, Clone, Copy)]
pub struct SharedStructured {
    precedence: Precedence,
}

impl SharedStructured {
    pub fn new(precedence: Precedence) -> Self {
        Self { precedence }
    }
}

impl FileTreeIntegrator for SharedStructured {
    fn integrate_file(
        &self,
        relative: &Path,
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<FileOutcome, SyncError> {
        let status = structured::merge_files(
            &roots.upstream.join(relative),
            &roots.downstream.join(relative),
            self.precedence,
        )?;
        if status == WriteStatus::Written {
            reporter.progress(&format!("merged {} ({})", relative.display(), self.precedence));
        }
        Ok(FileOutcome::from_status(status, relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::TracingReporter;
    use serde_json::json;
    use tempfile::TempDir;

    fn run(precedence: Precedence) -> serde_json::Value {
        let up = TempDir::new().unwrap();
        let down = TempDir::new().unwrap();
        std::fs::write(up.path().join("s.json"), r#"{"a": 1, "b": 2}"#).unwrap();
        std::fs::write(down.path().join("s.json"), r#"{"b": 9, "c": 3}"#).unwrap();
        let roots = TreeRoots { upstream: up.path(), downstream: down.path() };
        SharedStructured::new(precedence)
            .integrate_file(Path::new("s.json"), roots, &TracingReporter)
            .unwrap();
        serde_json::from_str(&std::fs::read_to_string(down.path().join("s.json")).unwrap()).unwrap()
    }

    #[test]
    fn prefer_upstream() {
        assert_eq!(run(Precedence::PreferUpstream), json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn prefer_downstream() {
        assert_eq!(run(Precedence::PreferDownstream), json!({"a": 1, "b": 9, "c": 3}));
    }

    #[test]
    fn unsupported_extension_fails() {
        let up = TempDir::new().unwrap();
        let down = TempDir::new().unwrap();
        std::fs::write(up.path().join("x.toml"), "a = 1").unwrap();
        let roots = TreeRoots { upstream: up.path(), downstream: down.path() };
        let err = SharedStructured::new(Precedence::PreferUpstream)
            .integrate_file(Path::new("x.toml"), roots, &TracingReporter)
            .unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedFormat { .. }));
    }
}
