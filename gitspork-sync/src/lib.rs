//! # gitspork-sync
//!
//! Integrates an upstream template tree into a downstream tree.
//!
//! Call [`integrate_local`] with the two roots and a set of
//! [`Collaborators`] (progress reporter, prompter, command runner).
//! Files are assigned to ownership classes by glob patterns; each class has
//! a [`FileTreeIntegrator`]. Templated files and migrations are handled by
//! [`TemplatedIntegrator`] and [`migration`].

pub mod error;
pub mod integrators;
pub mod matcher;
pub mod migration;
pub mod pipeline;
pub mod reporter;
pub mod structured;
pub mod writer;

pub use error::SyncError;
pub use integrators::{
    BlockMarkers, FileOutcome, FileTreeIntegrator, OwnershipClass, OwnershipPlan,
    TemplatedIntegrator, TreeRoots,
};
pub use migration::{CommandRunner, CommandSpec, CommandStatus, SystemCommandRunner};
pub use pipeline::{
    integrate, integrate_local, Collaborators, IntegrateOptions, IntegrationReport, StepReport,
};
pub use reporter::{Reporter, TracingReporter};
pub use writer::WriteStatus;
