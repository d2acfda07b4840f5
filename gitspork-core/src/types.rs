//! Domain types for gitspork configuration, migrations and downstream state.
//!
//! All path fields use `PathBuf`; glob patterns stay `String` because they are
//! matched against `/`-separated relative paths, not opened.
//! Every type is (de)serializable via serde + serde_yaml / serde_json.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identity of a templated instruction: its upstream `template` path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().replace('\\', "/"))
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identity of a single migration phase, e.g. `migrations/0001.yml:pre_integrate`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationId(pub String);

impl MigrationId {
    /// Derive the id from the migration config path as declared upstream.
    pub fn new(config_path: &Path, phase: MigrationPhase) -> Self {
        Self(format!(
            "{}:{}",
            config_path.to_string_lossy().replace('\\', "/"),
            phase.as_str()
        ))
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MigrationId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for MigrationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side wins on conflicting keys during a structured merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    PreferUpstream,
    PreferDownstream,
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precedence::PreferUpstream => write!(f, "prefer-upstream"),
            Precedence::PreferDownstream => write!(f, "prefer-downstream"),
        }
    }
}

/// When a migration runs relative to the ownership integrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationPhase {
    PreIntegrate,
    PostIntegrate,
}

impl MigrationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationPhase::PreIntegrate => "pre_integrate",
            MigrationPhase::PostIntegrate => "post_integrate",
        }
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Upstream configuration (.gitspork.yml)
// ---------------------------------------------------------------------------

/// The config an upstream tree defines in `.gitspork.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitSporkConfig {
    /// Version of gitspork the config was written for. Informational only.
    #[serde(default)]
    pub version: String,
    /// Patterns fully owned by the upstream; always overwritten downstream.
    #[serde(default)]
    pub upstream_owned: Vec<String>,
    /// Patterns copied once, then owned by the downstream.
    #[serde(default)]
    pub downstream_owned: Vec<String>,
    #[serde(default)]
    pub shared_ownership: SharedOwnership,
    #[serde(default)]
    pub templated: Vec<TemplatedInstruction>,
    /// Migration config files, relative to the upstream root.
    #[serde(default)]
    pub migrations: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedOwnership {
    /// Text files where the upstream owns marker-delimited blocks.
    #[serde(default)]
    pub merged: Vec<String>,
    #[serde(default)]
    pub structured: StructuredOwnership,
}

/// YAML/JSON files deep-merged between upstream and downstream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredOwnership {
    #[serde(default)]
    pub prefer_upstream: Vec<String>,
    #[serde(default)]
    pub prefer_downstream: Vec<String>,
}

/// Render one upstream template to one downstream destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatedInstruction {
    /// Template path relative to the upstream root. Doubles as the
    /// instruction's identity for `previous_input` references.
    pub template: PathBuf,
    /// Output path relative to the downstream root.
    pub destination: PathBuf,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<TemplatedMerge>,
}

impl TemplatedInstruction {
    pub fn id(&self) -> TemplateId {
        TemplateId::from_path(&self.template)
    }

    /// Post-render structured merge precedence, if configured.
    pub fn structured_merge(&self) -> Option<Precedence> {
        self.merged.as_ref().and_then(|m| m.structured)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatedMerge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<Precedence>,
}

/// One named template input. Exactly one source must be set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// JSON object file, relative to the upstream root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_data_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_input: Option<PreviousInputRef>,
}

/// Copy a value resolved by an earlier templated instruction in the same run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviousInputRef {
    pub template: PathBuf,
    pub name: String,
}

/// The single source an [`InputSpec`] resolves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource<'a> {
    Prompt(&'a str),
    JsonDataPath(&'a Path),
    PreviousInput(&'a PreviousInputRef),
}

/// Why an [`InputSpec`] is not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpecProblem {
    NoSource,
    MultipleSources(Vec<&'static str>),
    MissingName,
}

impl fmt::Display for InputSpecProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSpecProblem::NoSource => {
                write!(f, "requires one of 'prompt', 'json_data_path' or 'previous_input'")
            }
            InputSpecProblem::MultipleSources(set) => {
                write!(f, "sets more than one input source ({})", set.join(", "))
            }
            InputSpecProblem::MissingName => write!(f, "requires a 'name'"),
        }
    }
}

impl InputSpec {
    /// Classify the input by its source, rejecting zero or several sources.
    pub fn source(&self) -> Result<InputSource<'_>, InputSpecProblem> {
        let mut set = Vec::new();
        if self.prompt.is_some() {
            set.push("prompt");
        }
        if self.json_data_path.is_some() {
            set.push("json_data_path");
        }
        if self.previous_input.is_some() {
            set.push("previous_input");
        }
        if set.len() > 1 {
            return Err(InputSpecProblem::MultipleSources(set));
        }

        let source = if let Some(prompt) = &self.prompt {
            InputSource::Prompt(prompt)
        } else if let Some(path) = &self.json_data_path {
            InputSource::JsonDataPath(path)
        } else if let Some(reference) = &self.previous_input {
            InputSource::PreviousInput(reference)
        } else {
            return Err(InputSpecProblem::NoSource);
        };

        // json_data_path contributes all of the file's keys; a name is optional there.
        if self.name.is_empty() && !matches!(source, InputSource::JsonDataPath(_)) {
            return Err(InputSpecProblem::MissingName);
        }
        Ok(source)
    }

    /// Label used in error messages.
    pub fn label(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        match &self.json_data_path {
            Some(path) => path.display().to_string(),
            None => "<unnamed>".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Migration configuration
// ---------------------------------------------------------------------------

/// One migration config file: commands to run before and/or after integration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_integrate: Option<MigrationInstructions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_integrate: Option<MigrationInstructions>,
}

impl MigrationConfig {
    pub fn phase(&self, phase: MigrationPhase) -> Option<&MigrationInstructions> {
        match phase {
            MigrationPhase::PreIntegrate => self.pre_integrate.as_ref(),
            MigrationPhase::PostIntegrate => self.post_integrate.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationInstructions {
    /// Command, or script path relative to the upstream root, run in the downstream root.
    pub exec: String,
}

// ---------------------------------------------------------------------------
// Downstream state
// ---------------------------------------------------------------------------

/// State stored in the downstream tree to track completed migrations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownstreamState {
    #[serde(default)]
    pub migrations_complete: BTreeSet<MigrationId>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
