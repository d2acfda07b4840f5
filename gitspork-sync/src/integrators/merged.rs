//! Shared merged files: upstream-owned blocks spliced into downstream text.
//!
//! A block runs from a line containing the begin marker through the next
//! line containing the end marker, both inclusive. Everything outside
//! blocks belongs to downstream.
//!
//! Blocks are assigned by position: the i-th upstream block replaces the
//! i-th downstream block. Extra upstream blocks are appended at the end of
//! the downstream file. Extra downstream blocks are dropped.

use std::path::Path;

use crate::error::{io_err, SyncError};
use crate::integrators::{FileOutcome, FileTreeIntegrator, TreeRoots};
use crate::reporter::Reporter;
use crate::writer::{self, WriteStatus};

pub const DEFAULT_MARKER_SEPARATOR: &str = "::";
pub const DEFAULT_MARKER_KEYWORD: &str = "gitspork";

/// Begin/end marker strings, matched as substrings of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMarkers {
    begin: String,
    end: String,
}

impl Default for BlockMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_SEPARATOR, DEFAULT_MARKER_KEYWORD)
    }
}

impl BlockMarkers {
    /// Markers of the form `<sep><keyword><sep>begin-upstream-owned-block`.
    pub fn new(separator: &str, keyword: &str) -> Self {
        Self {
            begin: format!("{separator}{keyword}{separator}begin-upstream-owned-block"),
            end: format!("{separator}{keyword}{separator}end-upstream-owned-block"),
        }
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    fn is_begin(&self, line: &str) -> bool {
        line.contains(&self.begin)
    }

    fn is_end(&self, line: &str) -> bool {
        line.contains(&self.end)
    }
}

/// One upstream-owned block, marker lines included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedBlock {
    pub lines: Vec<String>,
}

/// Collect the upstream-owned blocks of `text` in order.
pub fn extract_blocks(
    text: &str,
    markers: &BlockMarkers,
    path: &Path,
) -> Result<Vec<OwnedBlock>, SyncError> {
    let mut blocks = Vec::new();
    let mut current: Option<(usize, Vec<String>)> = None;
    for (idx, line) in text.lines().enumerate() {
        match current.take() {
            None => {
                if markers.is_begin(line) {
                    current = Some((idx + 1, vec![line.to_string()]));
                }
            }
            Some((start, mut lines)) => {
                lines.push(line.to_string());
                if markers.is_end(line) {
                    blocks.push(OwnedBlock { lines });
                } else {
                    current = Some((start, lines));
                }
            }
        }
    }
    match current {
        Some((line, _)) => Err(SyncError::UnterminatedBlock { path: path.to_path_buf(), line }),
        None => Ok(blocks),
    }
}

/// Result of splicing upstream blocks into downstream text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spliced {
    pub text: String,
    /// Downstream blocks replaced in place.
    pub replaced: usize,
    /// Upstream blocks with no downstream counterpart, appended at the end.
    pub appended: usize,
    /// Downstream blocks with no upstream counterpart, removed.
    pub dropped: usize,
}

/// Replace the blocks of `downstream` with `blocks`, positionally.
///
/// Text with no blocks on either side is returned untouched.
pub fn splice_blocks(
    downstream: &str,
    blocks: &[OwnedBlock],
    markers: &BlockMarkers,
    path: &Path,
) -> Result<Spliced, SyncError> {
    let mut out: Vec<&str> = Vec::new();
    let mut upstream = blocks.iter();
    let mut open: Option<usize> = None;
    let (mut replaced, mut dropped) = (0, 0);

    for (idx, line) in downstream.lines().enumerate() {
        if open.is_some() {
            if markers.is_end(line) {
                open = None;
            }
            continue;
        }
        if markers.is_begin(line) {
            open = Some(idx + 1);
            match upstream.next() {
                Some(block) => {
                    out.extend(block.lines.iter().map(String::as_str));
                    replaced += 1;
                }
                None => dropped += 1,
            }
            continue;
        }
        out.push(line);
    }
    if let Some(line) = open {
        return Err(SyncError::UnterminatedBlock { path: path.to_path_buf(), line });
    }

    let mut appended = 0;
    for block in upstream {
        out.extend(block.lines.iter().map(String::as_str));
        appended += 1;
    }

    if replaced == 0 && appended == 0 && dropped == 0 {
        return Ok(Spliced { text: downstream.to_string(), replaced, appended, dropped });
    }
    let mut text = out.join("\n");
    text.push('\n');
    Ok(Spliced { text, replaced, appended, dropped })
}

/// Integrator for `shared_ownership.merged`.
#[derive(Debug, Clone, Default)]
pub struct SharedMerged {
    markers: BlockMarkers,
}

impl SharedMerged {
    pub fn new(markers: BlockMarkers) -> Self {
        Self { markers }
    }
}

impl FileTreeIntegrator for SharedMerged {
    fn integrate_file(
        &self,
        relative: &Path,
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<FileOutcome, SyncError> {
        let src = roots.upstream.join(relative);
        let dst = roots.downstream.join(relative);

        let upstream_text = std::fs::read_to_string(&src).map_err(|e| io_err(&src, e))?;
        let blocks = extract_blocks(&upstream_text, &self.markers, &src)?;

        let seeded = !dst.exists();
        if seeded {
            writer::copy_file(&src, &dst)?;
        }
        let downstream_text = std::fs::read_to_string(&dst).map_err(|e| io_err(&dst, e))?;
        let spliced = splice_blocks(&downstream_text, &blocks, &self.markers, &dst)?;
        if spliced.dropped > 0 {
            tracing::warn!(
                path = %dst.display(),
                dropped = spliced.dropped,
                "downstream blocks without an upstream counterpart were removed"
            );
            reporter.progress(&format!(
                "removed {} upstream-owned block(s) from {} that upstream no longer has",
                spliced.dropped,
                relative.display()
            ));
        }

        let status = writer::write_if_changed(&dst, spliced.text.as_bytes())?;
        let status = if seeded { WriteStatus::Written } else { status };
        if status == WriteStatus::Written {
            reporter.progress(&format!("merged upstream-owned blocks into {}", relative.display()));
        }
        Ok(FileOutcome::from_status(status, relative))
    }
}
