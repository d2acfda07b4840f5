//! `gitspork init`: write a starter config into an upstream repository.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use gitspork_core::config;

/// Arguments for `gitspork init`.
///
/// An existing `.gitspork.yml` at the path is replaced.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Upstream repository root.
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,
}

/// Long help for `gitspork init`: the schema examples.
pub fn long_help() -> String {
    match super::schema::render(false) {
        Ok(examples) => format!("Example configs:\n\n{examples}"),
        Err(_) => "Run `gitspork schema` for example configs.".to_string(),
    }
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        if !self.path.is_dir() {
            bail!("{} is not a directory", self.path.display());
        }
        let path = config::init_at(&self.path, env!("CARGO_PKG_VERSION"))
            .with_context(|| format!("could not initialize {}", self.path.display()))?;
        println!("{} wrote {}", "✓".green(), path.display());
        Ok(())
    }
}
