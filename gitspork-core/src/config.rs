//! Upstream configuration discovery, parsing and validation.
//!
//! # Layout
//!
//! ```text
//! <upstream>/
//!   .gitspork.yml            (or .gitspork.yaml; .yml wins when both exist)
//!   <migration>.yml          (one per entry of `migrations`)
//! ```
//!
//! Every function takes explicit paths; nothing here reads the working
//! directory or any other ambient state.

use std::path::{Path, PathBuf};

use crate::error::{config_io_err, ConfigError};
use crate::types::{
    GitSporkConfig, InputSpec, MigrationConfig, MigrationInstructions, MigrationPhase,
    PreviousInputRef, Precedence, SharedOwnership, StructuredOwnership, TemplatedInstruction,
    TemplatedMerge,
};

pub const CONFIG_FILE_NAME: &str = ".gitspork.yml";
pub const CONFIG_FILE_NAME_ALT: &str = ".gitspork.yaml";

/// Header prepended to configs written by [`init_at`].
pub const CONFIG_HEADER: &str =
    "# gitspork upstream config. Run `gitspork schema` for a fully populated example.\n";

// ---------------------------------------------------------------------------
// 1. Discovery
// ---------------------------------------------------------------------------

/// Locate the config file in `upstream_root`.
///
/// Returns `ConfigError::ConfigNotFound` if neither file name exists.
pub fn config_path_at(upstream_root: &Path) -> Result<PathBuf, ConfigError> {
    [CONFIG_FILE_NAME, CONFIG_FILE_NAME_ALT]
        .iter()
        .map(|name| upstream_root.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| ConfigError::ConfigNotFound {
            dir: upstream_root.to_path_buf(),
        })
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Find, parse and validate the config in `upstream_root`.
pub fn load_config_at(upstream_root: &Path) -> Result<GitSporkConfig, ConfigError> {
    let path = config_path_at(upstream_root)?;
    let config = parse_config(&path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse a `.gitspork.yml` file. Does not validate.
pub fn parse_config(path: &Path) -> Result<GitSporkConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| config_io_err(path, e))?;
    // An empty file is a valid, empty config.
    if contents.trim().is_empty() {
        return Ok(GitSporkConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a migration config file and reject empty `exec` commands.
pub fn parse_migration_config(path: &Path) -> Result<MigrationConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| config_io_err(path, e))?;
    let migration: MigrationConfig = if contents.trim().is_empty() {
        MigrationConfig::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    for phase in [MigrationPhase::PreIntegrate, MigrationPhase::PostIntegrate] {
        if let Some(instructions) = migration.phase(phase) {
            if instructions.exec.trim().is_empty() {
                return Err(ConfigError::EmptyCommand {
                    path: path.to_path_buf(),
                    phase,
                });
            }
        }
    }
    Ok(migration)
}

/// Check every templated input declares exactly one source.
pub fn validate(config: &GitSporkConfig) -> Result<(), ConfigError> {
    for instruction in &config.templated {
        for input in &instruction.inputs {
            input.source().map_err(|problem| ConfigError::InvalidInput {
                template: instruction.template.clone(),
                input: input.label(),
                problem,
            })?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Init
// ---------------------------------------------------------------------------

/// Write a starter `.gitspork.yml` into `dir` and return its path.
///
/// Overwrites an existing config at that path.
pub fn init_at(dir: &Path, version: &str) -> Result<PathBuf, ConfigError> {
    let config = GitSporkConfig {
        version: version.to_string(),
        ..Default::default()
    };
    let yaml = serde_yaml::to_string(&config)?;
    let path = dir.join(CONFIG_FILE_NAME);
    std::fs::write(&path, format!("{CONFIG_HEADER}{yaml}")).map_err(|e| config_io_err(&path, e))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// 4. Schema examples
// ---------------------------------------------------------------------------

/// A fully populated `.gitspork.yml`, used as schema documentation.
pub fn example_config() -> GitSporkConfig {
    GitSporkConfig {
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream_owned: vec!["upstream-owned/**".into(), "LICENSE".into()],
        downstream_owned: vec!["README.md".into()],
        shared_ownership: SharedOwnership {
            merged: vec![".gitignore".into()],
            structured: StructuredOwnership {
                prefer_upstream: vec!["config/defaults.json".into()],
                prefer_downstream: vec!["config/settings.yml".into()],
            },
        },
        templated: vec![
            TemplatedInstruction {
                template: PathBuf::from("templates/project.md.tera"),
                destination: PathBuf::from("docs/project.md"),
                inputs: vec![
                    InputSpec {
                        name: "project_name".into(),
                        prompt: Some("What is the project name?".into()),
                        ..Default::default()
                    },
                    InputSpec {
                        json_data_path: Some(PathBuf::from("templates/defaults.json")),
                        ..Default::default()
                    },
                ],
                merged: None,
            },
            TemplatedInstruction {
                template: PathBuf::from("templates/package.json.tera"),
                destination: PathBuf::from("package.json"),
                inputs: vec![InputSpec {
                    name: "project_name".into(),
                    previous_input: Some(PreviousInputRef {
                        template: PathBuf::from("templates/project.md.tera"),
                        name: "project_name".into(),
                    }),
                    ..Default::default()
                }],
                merged: Some(TemplatedMerge {
                    structured: Some(Precedence::PreferDownstream),
                }),
            },
        ],
        migrations: vec![PathBuf::from(".gitspork/migrations/0001/migration.yml")],
    }
}

/// A fully populated migration config, used as schema documentation.
pub fn example_migration() -> MigrationConfig {
    MigrationConfig {
        pre_integrate: Some(MigrationInstructions {
            exec: "./.gitspork/migrations/0001/pre-integrate.sh".into(),
        }),
        post_integrate: Some(MigrationInstructions {
            exec: "./.gitspork/migrations/0001/post-integrate.sh".into(),
        }),
    }
}

pub fn example_config_yaml() -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(&example_config())?)
}

pub fn example_migration_yaml() -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(&example_migration())?)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
