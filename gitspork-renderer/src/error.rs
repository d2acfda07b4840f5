//! Error types for gitspork-renderer.

use std::path::PathBuf;

use thiserror::Error;

use gitspork_core::{InputSpecProblem, TemplateId};

/// All errors that can arise while resolving inputs and rendering templates.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera failed to parse or render a template.
    #[error("error rendering template {template}: {source}")]
    Tera {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// JSON serialization error (building the tera context or writing a cache).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error reading a template, data file or cache.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cached input file for a destination is not valid JSON.
    #[error("error parsing cached template data file at {path}: {source}")]
    CacheParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `json_data_path` file is not valid JSON.
    #[error("error parsing json_data_path file {path}: {source}")]
    JsonData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `json_data_path` file parsed, but its top level is not an object.
    #[error("json_data_path file {path} must contain a JSON object")]
    JsonDataNotObject { path: PathBuf },

    /// `previous_input` names a template not processed earlier in this run.
    #[error("previous template not found: {template} (it must appear earlier in 'templated')")]
    PreviousTemplateNotFound { template: TemplateId },

    /// `previous_input` names an input the referenced template never resolved.
    #[error("previous input '{name}' not found in resolved inputs of template {template}")]
    PreviousInputNotFound { template: TemplateId, name: String },

    /// The input declaration itself is unusable.
    #[error("templated instruction {template}: input '{input}' {problem}")]
    InvalidInput {
        template: TemplateId,
        input: String,
        problem: InputSpecProblem,
    },

    /// The interactive collaborator failed to produce a value.
    #[error("error requesting input '{input}': {source}")]
    Prompt {
        input: String,
        #[source]
        source: PromptError,
    },
}

/// Errors a [`crate::Prompter`] may report.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user cancelled the prompt.
    #[error("input was cancelled")]
    Cancelled,

    /// No terminal is available to ask the question.
    #[error("cannot prompt for '{prompt}' without an interactive terminal")]
    NotInteractive { prompt: String },

    #[error("prompt I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}
