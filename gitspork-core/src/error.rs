//! Error types for gitspork-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{InputSpecProblem, MigrationPhase};

/// Errors from loading and validating upstream configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (init / schema rendering).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("error parsing gitspork config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Neither `.gitspork.yml` nor `.gitspork.yaml` exists in the upstream root.
    #[error("{dir} does not include a .gitspork.yml or .gitspork.yaml config file")]
    ConfigNotFound { dir: PathBuf },

    /// A templated input declares zero or several sources, or lacks a name.
    #[error("templated instruction {template}: input '{input}' {problem}")]
    InvalidInput {
        template: PathBuf,
        input: String,
        problem: InputSpecProblem,
    },

    /// A migration phase declares an empty `exec`.
    #[error("migration config {path}: {phase} has an empty 'exec' command")]
    EmptyCommand { path: PathBuf, phase: MigrationPhase },
}

/// Errors from the downstream state store.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file exists but is not valid state JSON.
    #[error("failed to parse downstream state at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Something other than a directory occupies the `.gitspork` path.
    #[error("{path} exists but is not a directory")]
    MetaDirNotADirectory { path: PathBuf },
}

pub(crate) fn config_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io { path: path.into(), source }
}

pub(crate) fn state_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StateError {
    StateError::Io { path: path.into(), source }
}

