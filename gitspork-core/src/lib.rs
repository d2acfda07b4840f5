//! gitspork core library: configuration model, loading, downstream state.
//!
//! - [`types`]: configuration, migration and state structs
//! - [`config`]: discover / parse / validate `.gitspork.yml`, init, schema examples
//! - [`state`]: completed-migration store inside the downstream tree
//! - [`error`]: [`ConfigError`], [`StateError`]

pub mod config;
pub mod error;
pub mod state;
pub mod types;

pub use error::{ConfigError, StateError};
pub use types::{
    DownstreamState, GitSporkConfig, InputSource, InputSpec, InputSpecProblem, MigrationConfig,
    MigrationId, MigrationInstructions, MigrationPhase, Precedence, PreviousInputRef,
    SharedOwnership, StructuredOwnership, TemplateId, TemplatedInstruction, TemplatedMerge,
};
