//! Migration planning and execution.
//!
//! Each migration config file may declare a `pre_integrate` and a
//! `post_integrate` command. A phase runs at most once per downstream tree:
//! completion is recorded in the downstream state store right after the
//! command exits successfully, and never when it fails.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use gitspork_core::{config, state, GitSporkConfig, MigrationId, MigrationPhase};

use crate::error::SyncError;

// ---------------------------------------------------------------------------
// Command runner contract
// ---------------------------------------------------------------------------

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// Non-zero exit; `None` when killed by a signal.
    Failed(Option<i32>),
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStatus::Success => f.write_str("exit code 0"),
            CommandStatus::Failed(Some(code)) => write!(f, "exit code {code}"),
            CommandStatus::Failed(None) => f.write_str("a signal"),
        }
    }
}

/// Runs external commands with inherited stdio.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> std::io::Result<CommandStatus>;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &CommandSpec) -> std::io::Result<CommandStatus> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .status()?;
        Ok(if status.success() {
            CommandStatus::Success
        } else {
            CommandStatus::Failed(status.code())
        })
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// One not-yet-completed migration phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMigration {
    pub id: MigrationId,
    pub phase: MigrationPhase,
    pub exec: String,
}

/// Pending migrations split by phase, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    pub pre_integrate: Vec<PendingMigration>,
    pub post_integrate: Vec<PendingMigration>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.pre_integrate.is_empty() && self.post_integrate.is_empty()
    }
}

/// Parse every declared migration config and drop phases already completed.
pub fn plan_migrations(
    config: &GitSporkConfig,
    upstream_root: &Path,
    downstream_root: &Path,
) -> Result<MigrationPlan, SyncError> {
    let done = state::load_at(downstream_root)?;
    let mut plan = MigrationPlan::default();
    for declared in &config.migrations {
        let migration = config::parse_migration_config(&upstream_root.join(declared))?;
        for phase in [MigrationPhase::PreIntegrate, MigrationPhase::PostIntegrate] {
            let Some(instructions) = migration.phase(phase) else {
                continue;
            };
            let id = MigrationId::new(declared, phase);
            if done.migrations_complete.contains(&id) {
                tracing::debug!(%id, "migration already complete");
                continue;
            }
            let pending = PendingMigration { id, phase, exec: instructions.exec.clone() };
            match phase {
                MigrationPhase::PreIntegrate => plan.pre_integrate.push(pending),
                MigrationPhase::PostIntegrate => plan.post_integrate.push(pending),
            }
        }
    }
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Split `exec` on whitespace and resolve the program.
///
/// A program naming a file that exists in the upstream tree is rewritten to
/// that file's path under `upstream_root`; anything else is looked up on
/// `PATH`. The command runs with `downstream_root` as working directory.
pub fn build_command(
    exec: &str,
    upstream_root: &Path,
    downstream_root: &Path,
) -> Option<CommandSpec> {
    let mut parts = exec.split_whitespace();
    let first = parts.next()?;
    let relative: PathBuf = Path::new(first)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    let in_upstream = upstream_root.join(&relative);
    let program = if !relative.as_os_str().is_empty() && in_upstream.is_file() {
        in_upstream
    } else {
        PathBuf::from(first)
    };
    Some(CommandSpec {
        program,
        args: parts.map(str::to_string).collect(),
        working_dir: downstream_root.to_path_buf(),
    })
}

/// Run one migration and record it as complete on success.
pub fn run_migration(
    migration: &PendingMigration,
    upstream_root: &Path,
    downstream_root: &Path,
    runner: &dyn CommandRunner,
) -> Result<(), SyncError> {
    let command = build_command(&migration.exec, upstream_root, downstream_root).ok_or_else(|| {
        SyncError::MigrationSpawn {
            id: migration.id.clone(),
            command: migration.exec.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        }
    })?;
    tracing::info!(id = %migration.id, command = %command, "running migration");

    let status = runner.run(&command).map_err(|source| SyncError::MigrationSpawn {
        id: migration.id.clone(),
        command: command.to_string(),
        source,
    })?;
    if status != CommandStatus::Success {
        return Err(SyncError::MigrationFailed {
            id: migration.id.clone(),
            command: command.to_string(),
            status: status.to_string(),
        });
    }
    state::record_complete_migration_at(downstream_root, &migration.id)?;
    Ok(())
}
