//! Downstream state store: which migrations already ran in a downstream tree.
//!
//! Persists a [`DownstreamState`] JSON document at
//! `<downstream>/.gitspork/downstream-state.json`.
//! Writes go to a `.tmp` sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use crate::error::{state_io_err, StateError};
use crate::types::{DownstreamState, MigrationId};

pub const META_DIR_NAME: &str = ".gitspork";
pub const STATE_FILE_NAME: &str = "downstream-state.json";

/// `<downstream>/.gitspork/downstream-state.json`. Pure, no I/O.
pub fn state_path_at(downstream_root: &Path) -> PathBuf {
    downstream_root.join(META_DIR_NAME).join(STATE_FILE_NAME)
}

/// Load the state for `downstream_root`.
///
/// Returns an empty state if the file does not yet exist.
pub fn load_at(downstream_root: &Path) -> Result<DownstreamState, StateError> {
    let path = state_path_at(downstream_root);
    if !path.exists() {
        return Ok(DownstreamState::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| state_io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|source| StateError::Json { path, source })
}

/// Save the state atomically, creating `.gitspork/` if needed.
pub fn save_at(downstream_root: &Path, state: &DownstreamState) -> Result<(), StateError> {
    let meta_dir = ensure_meta_dir(downstream_root)?;
    let path = meta_dir.join(STATE_FILE_NAME);

    let mut json = serde_json::to_string_pretty(state).map_err(|source| StateError::Json {
        path: path.clone(),
        source,
    })?;
    json.push('\n');
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| state_io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(state_io_err(&path, e));
    }
    Ok(())
}

/// Whether `id` is recorded as completed in `downstream_root`.
pub fn migration_completed_at(
    downstream_root: &Path,
    id: &MigrationId,
) -> Result<bool, StateError> {
    Ok(load_at(downstream_root)?.migrations_complete.contains(id))
}

/// Record `id` as completed. Recording an id twice is a no-op.
pub fn record_complete_migration_at(
    downstream_root: &Path,
    id: &MigrationId,
) -> Result<(), StateError> {
    let mut state = load_at(downstream_root)?;
    if !state.migrations_complete.insert(id.clone()) && state_path_at(downstream_root).exists() {
        return Ok(());
    }
    save_at(downstream_root, &state)
}

fn ensure_meta_dir(downstream_root: &Path) -> Result<PathBuf, StateError> {
    let dir = downstream_root.join(META_DIR_NAME);
    if dir.exists() && !dir.is_dir() {
        return Err(StateError::MetaDirNotADirectory { path: dir });
    }
    std::fs::create_dir_all(&dir).map_err(|e| state_io_err(&dir, e))?;
    Ok(dir)
}
