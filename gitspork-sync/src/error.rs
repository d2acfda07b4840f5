//! Error types for gitspork-sync.

use std::path::PathBuf;

use thiserror::Error;

use gitspork_core::{ConfigError, MigrationId, StateError};
use gitspork_renderer::RenderError;

use crate::integrators::OwnershipClass;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// All errors that can arise from an integration run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("error walking {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{path} is not a supported structured data file (supported: .yaml, .yml, .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("error parsing structured data file {path}: {source}")]
    StructuredParse {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("error serializing merged structured data for {path}: {source}")]
    StructuredWrite {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// A begin marker without a matching end marker.
    #[error("unterminated upstream-owned block in {path} starting at line {line}")]
    UnterminatedBlock { path: PathBuf, line: usize },

    /// One upstream file matched by two ownership classes.
    #[error(
        "{path} is matched by both {first} and {second}; \
         a file may belong to only one ownership class"
    )]
    AmbiguousOwnership {
        path: PathBuf,
        first: OwnershipClass,
        second: OwnershipClass,
    },

    #[error("migration {id} failed: `{command}` exited with {status}")]
    MigrationFailed {
        id: MigrationId,
        command: String,
        status: String,
    },

    #[error("migration {id}: failed to start `{command}`: {source}")]
    MigrationSpawn {
        id: MigrationId,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Names the integration step an error happened in.
    #[error("error integrating {step}: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<SyncError>,
    },
}

impl SyncError {
    pub(crate) fn in_step(self, step: impl Into<String>) -> SyncError {
        SyncError::Step { step: step.into(), source: Box::new(self) }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
