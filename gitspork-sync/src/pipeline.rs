//! Integration pipeline entrypoint shared by the CLI and tests.
//!
//! ## Order of a run
//!
//! 1. Load the upstream config.
//! 2. Plan migrations and match ownership patterns. Nothing is written
//!    if either fails.
//! 3. Run pending `pre_integrate` migrations.
//! 4. Integrate upstream-owned, downstream-owned, shared merged, shared
//!    structured (prefer upstream, then prefer downstream) files.
//! 5. Render templated files.
//! 6. Run pending `post_integrate` migrations.

use std::path::{Path, PathBuf};

use gitspork_core::{config, GitSporkConfig, MigrationId};
use gitspork_renderer::{NonInteractivePrompter, Prompter};

use crate::error::{io_err, SyncError};
use crate::integrators::{BlockMarkers, FileOutcome, OwnershipPlan, TemplatedIntegrator, TreeRoots};
use crate::migration::{self, CommandRunner, PendingMigration, SystemCommandRunner};
use crate::reporter::{Reporter, TracingReporter};

/// Inputs of an `integrate-local` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrateOptions {
    pub upstream_root: PathBuf,
    pub downstream_root: PathBuf,
    /// Ask templated prompts again even when answers are cached.
    pub force_reprompt: bool,
}

/// Everything a run talks to besides the two trees.
pub struct Collaborators<'a> {
    pub reporter: &'a dyn Reporter,
    pub prompter: &'a dyn Prompter,
    pub runner: &'a dyn CommandRunner,
    pub markers: BlockMarkers,
}

impl Default for Collaborators<'static> {
    /// Unattended defaults: tracing output, no prompting, real processes.
    fn default() -> Self {
        Collaborators {
            reporter: &TracingReporter,
            prompter: &NonInteractivePrompter,
            runner: &SystemCommandRunner,
            markers: BlockMarkers::default(),
        }
    }
}

/// Outcomes of one integration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub outcomes: Vec<FileOutcome>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationReport {
    pub steps: Vec<StepReport>,
    pub migrations_run: Vec<MigrationId>,
}

impl IntegrationReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &FileOutcome> {
        self.steps.iter().flat_map(|s| s.outcomes.iter())
    }

    pub fn written(&self) -> usize {
        self.outcomes().filter(|o| matches!(o, FileOutcome::Written { .. })).count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes().filter(|o| matches!(o, FileOutcome::Unchanged { .. })).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes().filter(|o| matches!(o, FileOutcome::Skipped { .. })).count()
    }
}

/// Integrate the upstream tree at `options.upstream_root` into the
/// downstream tree at `options.downstream_root`. Both must exist.
pub fn integrate_local(
    options: &IntegrateOptions,
    collaborators: &Collaborators<'_>,
) -> Result<IntegrationReport, SyncError> {
    let upstream = canonical(&options.upstream_root)?;
    let downstream = canonical(&options.downstream_root)?;
    let config = config::load_config_at(&upstream)?;
    let roots = TreeRoots { upstream: &upstream, downstream: &downstream };
    integrate(&config, roots, options.force_reprompt, collaborators)
}

/// Run every integration step of `config` against `roots`.
pub fn integrate(
    config: &GitSporkConfig,
    roots: TreeRoots<'_>,
    force_reprompt: bool,
    collaborators: &Collaborators<'_>,
) -> Result<IntegrationReport, SyncError> {
    let reporter = collaborators.reporter;
    let mut report = IntegrationReport::default();

    let migrations = migration::plan_migrations(config, roots.upstream, roots.downstream)?;
    let ownership = OwnershipPlan::resolve(config, roots.upstream)?;

    run_migrations(
        "pre-integrate migrations",
        &migrations.pre_integrate,
        roots,
        collaborators,
        &mut report,
    )?;

    for (class, files) in &ownership.entries {
        if files.is_empty() {
            continue;
        }
        reporter.section(class.config_key());
        let outcomes = class
            .integrator(&collaborators.markers)
            .integrate(files, roots, reporter)
            .map_err(|e| e.in_step(class.config_key()))?;
        report.steps.push(StepReport { step: class.config_key().to_string(), outcomes });
    }

    if !config.templated.is_empty() {
        reporter.section("templated");
        let outcomes = TemplatedIntegrator::new(collaborators.prompter, force_reprompt)
            .integrate(&config.templated, roots, reporter)
            .map_err(|e| e.in_step("templated"))?;
        report.steps.push(StepReport { step: "templated".to_string(), outcomes });
    }

    run_migrations(
        "post-integrate migrations",
        &migrations.post_integrate,
        roots,
        collaborators,
        &mut report,
    )?;

    tracing::debug!(
        written = report.written(),
        unchanged = report.unchanged(),
        skipped = report.skipped(),
        migrations = report.migrations_run.len(),
        "integration finished"
    );
    Ok(report)
}

fn run_migrations(
    title: &str,
    pending: &[PendingMigration],
    roots: TreeRoots<'_>,
    collaborators: &Collaborators<'_>,
    report: &mut IntegrationReport,
) -> Result<(), SyncError> {
    if pending.is_empty() {
        return Ok(());
    }
    collaborators.reporter.section(title);
    for m in pending {
        collaborators.reporter.progress(&format!("running migration {}", m.id));
        migration::run_migration(m, roots.upstream, roots.downstream, collaborators.runner)?;
        report.migrations_run.push(m.id.clone());
    }
    Ok(())
}

fn canonical(path: &Path) -> Result<PathBuf, SyncError> {
    std::fs::canonicalize(path).map_err(|e| io_err(path, e))
}
