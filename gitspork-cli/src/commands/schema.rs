//! `gitspork schema`: print fully populated example configs.

use anyhow::Result;
use clap::Args;
use gitspork_core::config;

/// Arguments for `gitspork schema`.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Print only the migration config example.
    #[arg(long)]
    pub migration: bool,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        print!("{}", render(self.migration)?);
        Ok(())
    }
}

/// The example configs as printed by `gitspork schema`.
pub fn render(migration_only: bool) -> Result<String> {
    let mut out = String::new();
    if !migration_only {
        out.push_str(&format!("# {}\n", config::CONFIG_FILE_NAME));
        out.push_str(&config::example_config_yaml()?);
        out.push('\n');
    }
    out.push_str("# migration config (one file per entry of `migrations`)\n");
    out.push_str(&config::example_migration_yaml()?);
    Ok(out)
}
