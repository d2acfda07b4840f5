//! Human-facing progress channel for an integration run.

/// Receives progress messages while integration runs.
///
/// Library code never prints; front ends decide how messages are shown.
pub trait Reporter {
    /// A new integration step begins.
    fn section(&self, title: &str);
    /// Something happened to a single file or migration.
    fn progress(&self, message: &str);
}

/// Forwards everything to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn section(&self, title: &str) {
        tracing::info!(step = title, "integration step");
    }

    fn progress(&self, message: &str) {
        tracing::info!("{message}");
    }
}
