//! `gitspork integrate-local`: integrate a local upstream tree into a downstream tree.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use gitspork_renderer::{NonInteractivePrompter, Prompter};
use gitspork_sync::{
    integrate_local, BlockMarkers, Collaborators, FileOutcome, IntegrateOptions,
    IntegrationReport, SystemCommandRunner,
};

use crate::console::{ConsoleReporter, DialoguerPrompter};

/// Arguments for `gitspork integrate-local`.
#[derive(Args, Debug)]
pub struct IntegrateLocalArgs {
    /// Root of the upstream checkout (must contain .gitspork.yml).
    #[arg(short = 'u', long = "upstream-path")]
    pub upstream: PathBuf,

    /// Root of the downstream tree; created if missing.
    #[arg(short = 'd', long = "downstream-path", default_value = ".")]
    pub downstream: PathBuf,

    /// Ask templated prompts again even when answers are cached.
    #[arg(short = 'f', long = "force-re-prompt")]
    pub force_reprompt: bool,
}

impl IntegrateLocalArgs {
    pub fn run(self) -> Result<()> {
        std::fs::create_dir_all(&self.downstream).with_context(|| {
            format!("could not create downstream directory {}", self.downstream.display())
        })?;

        let interactive = DialoguerPrompter::default();
        let prompter: &dyn Prompter = if std::io::stdin().is_terminal() {
            &interactive
        } else {
            &NonInteractivePrompter
        };
        let collaborators = Collaborators {
            reporter: &ConsoleReporter,
            prompter,
            runner: &SystemCommandRunner,
            markers: BlockMarkers::default(),
        };
        let options = IntegrateOptions {
            upstream_root: self.upstream.clone(),
            downstream_root: self.downstream.clone(),
            force_reprompt: self.force_reprompt,
        };

        let report = integrate_local(&options, &collaborators).with_context(|| {
            format!(
                "integration of {} into {} failed",
                self.upstream.display(),
                self.downstream.display()
            )
        })?;
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &IntegrationReport) {
    for outcome in report.outcomes() {
        if let FileOutcome::Written { path } = outcome {
            println!("  {} {}", "✎".yellow(), path.display());
        }
    }
    println!(
        "{} integration complete ({} written, {} unchanged, {} skipped, {} migrations run)",
        "✓".green(),
        report.written(),
        report.unchanged(),
        report.skipped(),
        report.migrations_run.len()
    );
}
