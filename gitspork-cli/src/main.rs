//! gitspork: keep downstream repositories integrated with an upstream template.
//!
//! # Usage
//!
//! ```text
//! gitspork integrate-local -u <upstream> [-d <downstream>] [-f]
//! gitspork init [-p <dir>]
//! gitspork schema [--migration]
//! ```

mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, integrate::IntegrateLocalArgs, schema::SchemaArgs};

#[derive(Parser, Debug)]
#[command(
    name = "gitspork",
    version,
    about = "Integrate an upstream template repository into downstream repositories",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Integrate a local upstream checkout into a local downstream tree.
    IntegrateLocal(IntegrateLocalArgs),

    /// Write a starter .gitspork.yml into an upstream repository.
    #[command(after_long_help = commands::init::long_help())]
    Init(InitArgs),

    /// Print fully populated example configs.
    Schema(SchemaArgs),
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::IntegrateLocal(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Schema(args) => args.run(),
    }
}
