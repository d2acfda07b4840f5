//! Template context and the per-destination input cache.
//!
//! # Cache layout
//!
//! ```text
//! <downstream>/<dirname(destination)>/.gitspork/<basename(destination)>.json
//! ```
//!
//! The cache holds the last resolved [`TemplateData`] so later runs reuse
//! prompt answers instead of asking again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use gitspork_core::state::META_DIR_NAME;

use crate::error::{io_err, RenderError};

/// Resolved named inputs of one templated instruction.
pub type InputMap = BTreeMap<String, Value>;

/// Rendering payload; templates reference `{{ inputs.<name> }}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateData {
    #[serde(default)]
    pub inputs: InputMap,
}

impl TemplateData {
    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self, template: &str) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(|source| RenderError::Tera {
            template: template.to_string(),
            source,
        })
    }

    /// Whether `name` holds a usable (non-null, non-empty) value.
    pub fn has_value(&self, name: &str) -> bool {
        match self.inputs.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// Cache file for `destination` (relative to `downstream_root`). Pure, no I/O.
pub fn cache_path_at(downstream_root: &Path, destination: &Path) -> PathBuf {
    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = destination.parent().unwrap_or_else(|| Path::new(""));
    downstream_root
        .join(parent)
        .join(META_DIR_NAME)
        .join(format!("{file_name}.json"))
}

/// Load cached inputs for `destination`; empty data if no cache exists.
pub fn load_cached_at(
    downstream_root: &Path,
    destination: &Path,
) -> Result<TemplateData, RenderError> {
    let path = cache_path_at(downstream_root, destination);
    if !path.exists() {
        return Ok(TemplateData::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|source| RenderError::CacheParse { path, source })
}

/// Persist `data` as the cache for `destination`, atomically.
pub fn save_cached_at(
    downstream_root: &Path,
    destination: &Path,
    data: &TemplateData,
) -> Result<PathBuf, RenderError> {
    let path = cache_path_at(downstream_root, destination);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(path)
}
