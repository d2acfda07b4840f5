//! Ownership-class integrators.
//!
//! Every file in the upstream tree belongs to at most one ownership class.
//! Each class has a [`FileTreeIntegrator`] that knows how to bring the
//! downstream copy of a file up to date.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use gitspork_core::{GitSporkConfig, Precedence};

use crate::error::SyncError;
use crate::matcher;
use crate::reporter::Reporter;
use crate::writer::WriteStatus;

pub mod downstream_owned;
pub mod merged;
pub mod structured;
pub mod templated;
pub mod upstream_owned;

pub use downstream_owned::DownstreamOwned;
pub use merged::{BlockMarkers, SharedMerged};
pub use structured::SharedStructured;
pub use templated::TemplatedIntegrator;
pub use upstream_owned::UpstreamOwned;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to one file. Paths are relative to the downstream root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Downstream content changed or the file was created.
    Written { path: PathBuf },
    /// Downstream already held the integrated content.
    Unchanged { path: PathBuf },
    /// Left alone on purpose (downstream-owned file that already exists).
    Skipped { path: PathBuf },
}

impl FileOutcome {
    pub fn from_status(status: WriteStatus, path: &Path) -> Self {
        let path = path.to_path_buf();
        match status {
            WriteStatus::Written => FileOutcome::Written { path },
            WriteStatus::Unchanged => FileOutcome::Unchanged { path },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Written { path }
            | FileOutcome::Unchanged { path }
            | FileOutcome::Skipped { path } => path,
        }
    }
}

/// The two trees an integration works on.
#[derive(Debug, Clone, Copy)]
pub struct TreeRoots<'a> {
    pub upstream: &'a Path,
    pub downstream: &'a Path,
}

// ---------------------------------------------------------------------------
// Integrator contract
// ---------------------------------------------------------------------------

/// Brings downstream copies of upstream files up to date for one ownership class.
pub trait FileTreeIntegrator {
    /// Integrate a single file given by its path relative to both roots.
    fn integrate_file(
        &self,
        relative: &Path,
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<FileOutcome, SyncError>;

    /// Integrate already-matched files, in order.
    fn integrate(
        &self,
        files: &[PathBuf],
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<Vec<FileOutcome>, SyncError> {
        files
            .iter()
            .map(|f| self.integrate_file(f, roots, reporter))
            .collect()
    }

    /// Match `patterns` against the upstream tree and integrate every hit.
    fn integrate_patterns(
        &self,
        patterns: &[String],
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<Vec<FileOutcome>, SyncError> {
        let files = matcher::match_files(roots.upstream, patterns)?;
        self.integrate(&files, roots, reporter)
    }
}

// ---------------------------------------------------------------------------
// Ownership classes
// ---------------------------------------------------------------------------

/// Pattern-driven ownership classes, in the order they are integrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipClass {
    UpstreamOwned,
    DownstreamOwned,
    SharedMerged,
    SharedStructured(Precedence),
}

impl OwnershipClass {
    pub const ORDER: [OwnershipClass; 5] = [
        OwnershipClass::UpstreamOwned,
        OwnershipClass::DownstreamOwned,
        OwnershipClass::SharedMerged,
        OwnershipClass::SharedStructured(Precedence::PreferUpstream),
        OwnershipClass::SharedStructured(Precedence::PreferDownstream),
    ];

    /// The config key the class is declared under.
    pub fn config_key(self) -> &'static str {
        match self {
            OwnershipClass::UpstreamOwned => "upstream_owned",
            OwnershipClass::DownstreamOwned => "downstream_owned",
            OwnershipClass::SharedMerged => "shared_ownership.merged",
            OwnershipClass::SharedStructured(Precedence::PreferUpstream) => {
                "shared_ownership.structured.prefer_upstream"
            }
            OwnershipClass::SharedStructured(Precedence::PreferDownstream) => {
                "shared_ownership.structured.prefer_downstream"
            }
        }
    }

    pub fn patterns(self, config: &GitSporkConfig) -> &[String] {
        let shared = &config.shared_ownership;
        match self {
            OwnershipClass::UpstreamOwned => &config.upstream_owned,
            OwnershipClass::DownstreamOwned => &config.downstream_owned,
            OwnershipClass::SharedMerged => &shared.merged,
            OwnershipClass::SharedStructured(Precedence::PreferUpstream) => {
                &shared.structured.prefer_upstream
            }
            OwnershipClass::SharedStructured(Precedence::PreferDownstream) => {
                &shared.structured.prefer_downstream
            }
        }
    }

    pub fn integrator(self, markers: &BlockMarkers) -> Box<dyn FileTreeIntegrator> {
        match self {
            OwnershipClass::UpstreamOwned => Box::new(UpstreamOwned),
            OwnershipClass::DownstreamOwned => Box::new(DownstreamOwned),
            OwnershipClass::SharedMerged => Box::new(SharedMerged::new(markers.clone())),
            OwnershipClass::SharedStructured(precedence) => {
                Box::new(SharedStructured::new(precedence))
            }
        }
    }
}

impl fmt::Display for OwnershipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Upstream files matched per ownership class, checked for overlaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipPlan {
    pub entries: Vec<(OwnershipClass, Vec<PathBuf>)>,
}

impl OwnershipPlan {
    /// Match every class's patterns against `upstream_root`.
    ///
    /// Fails with [`SyncError::AmbiguousOwnership`] if a file is claimed by
    /// two classes, before anything is written.
    pub fn resolve(config: &GitSporkConfig, upstream_root: &Path) -> Result<Self, SyncError> {
        let mut owners: BTreeMap<PathBuf, OwnershipClass> = BTreeMap::new();
        let mut entries = Vec::new();
        for class in OwnershipClass::ORDER {
            let files = matcher::match_files(upstream_root, class.patterns(config))
                .map_err(|e| e.in_step(class.config_key()))?;
            for file in &files {
                if let Some(first) = owners.insert(file.clone(), class) {
                    return Err(SyncError::AmbiguousOwnership {
                        path: file.clone(),
                        first,
                        second: class,
                    });
                }
            }
            entries.push((class, files));
        }
        Ok(OwnershipPlan { entries })
    }
}
