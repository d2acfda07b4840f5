//! Deep merge of YAML and JSON documents.
//!
//! For each key of the overlay: when both sides hold a map, recurse;
//! otherwise the overlay value replaces the base value. Lists and scalars
//! are replaced wholesale. Key order of the base is kept; new keys are
//! appended in overlay order.

use std::path::Path;

use gitspork_core::Precedence;

use crate::error::{io_err, SyncError};
use crate::writer::{self, WriteStatus};

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// Serialization format of a structured data file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Yaml,
    Json,
}

impl StructuredFormat {
    pub fn detect(path: &Path) -> Result<Self, SyncError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(StructuredFormat::Yaml),
            "json" => Ok(StructuredFormat::Json),
            _ => Err(SyncError::UnsupportedFormat { path: path.to_path_buf() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Deep merge
// ---------------------------------------------------------------------------

/// Recursive map merge; the overlay wins on conflicting leaves.
///
/// A null overlay (an empty document) carries no keys and leaves the base
/// untouched.
pub trait DeepMerge {
    fn deep_merge(&mut self, overlay: Self);
}

impl DeepMerge for serde_json::Value {
    fn deep_merge(&mut self, overlay: Self) {
        match (self, overlay) {
            (serde_json::Value::Object(base), serde_json::Value::Object(over)) => {
                for (key, value) in over {
                    match base.get_mut(&key) {
                        Some(existing) if existing.is_object() && value.is_object() => {
                            existing.deep_merge(value)
                        }
                        _ => {
                            base.insert(key, value);
                        }
                    }
                }
            }
            (_, serde_json::Value::Null) => {}
            (base, over) => *base = over,
        }
    }
}

impl DeepMerge for serde_yaml::Value {
    fn deep_merge(&mut self, overlay: Self) {
        match (self, overlay) {
            (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(over)) => {
                for (key, value) in over {
                    match base.get_mut(&key) {
                        Some(existing) if existing.is_mapping() && value.is_mapping() => {
                            existing.deep_merge(value)
                        }
                        _ => {
                            base.insert(key, value);
                        }
                    }
                }
            }
            (_, serde_yaml::Value::Null) => {}
            (base, over) => *base = over,
        }
    }
}

/// Merge two documents of the same type according to `precedence`.
pub fn merge_with_precedence<T: DeepMerge>(
    upstream: T,
    downstream: T,
    precedence: Precedence,
) -> T {
    let (mut base, overlay) = match precedence {
        Precedence::PreferUpstream => (downstream, upstream),
        Precedence::PreferDownstream => (upstream, downstream),
    };
    base.deep_merge(overlay);
    base
}

// ---------------------------------------------------------------------------
// Text and file merge
// ---------------------------------------------------------------------------

/// One side of a text merge: the contents and the path errors are reported against.
#[derive(Debug, Clone, Copy)]
pub struct MergeSide<'a> {
    pub text: &'a str,
    pub path: &'a Path,
}

/// Parse both sides as `format`, merge them and serialize the result.
pub fn merge_text(
    format: StructuredFormat,
    upstream: MergeSide<'_>,
    downstream: MergeSide<'_>,
    precedence: Precedence,
) -> Result<String, SyncError> {
    let path = downstream.path;
    match format {
        StructuredFormat::Yaml => {
            let u = parse_yaml(upstream.text, upstream.path)?;
            let d = parse_yaml(downstream.text, downstream.path)?;
            let merged = merge_with_precedence(u, d, precedence);
            serde_yaml::to_string(&merged).map_err(|e| SyncError::StructuredWrite {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
        }
        StructuredFormat::Json => {
            let u = parse_json(upstream.text, upstream.path)?;
            let d = parse_json(downstream.text, downstream.path)?;
            let merged = merge_with_precedence(u, d, precedence);
            let mut out =
                serde_json::to_string_pretty(&merged).map_err(|e| SyncError::StructuredWrite {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn parse_yaml(text: &str, path: &Path) -> Result<serde_yaml::Value, SyncError> {
    let value = serde_yaml::from_str(text).map_err(|e| SyncError::StructuredParse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    // Empty and comment-only documents parse as null; merge them like `{}`.
    Ok(match value {
        serde_yaml::Value::Null => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        other => other,
    })
}

fn parse_json(text: &str, path: &Path) -> Result<serde_json::Value, SyncError> {
    // An empty JSON file merges like an empty object.
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text).map_err(|e| SyncError::StructuredParse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

/// Merge the upstream file into the downstream file in place.
///
/// A missing downstream file is seeded with a copy of the upstream file
/// before merging.
pub fn merge_files(
    upstream: &Path,
    downstream: &Path,
    precedence: Precedence,
) -> Result<WriteStatus, SyncError> {
    let format = StructuredFormat::detect(upstream)?;
    let seeded = if downstream.exists() {
        false
    } else {
        writer::copy_file(upstream, downstream)?;
        true
    };

    let upstream_text = std::fs::read_to_string(upstream).map_err(|e| io_err(upstream, e))?;
    let downstream_text = std::fs::read_to_string(downstream).map_err(|e| io_err(downstream, e))?;
    let merged = merge_text(
        format,
        MergeSide { text: &upstream_text, path: upstream },
        MergeSide { text: &downstream_text, path: downstream },
        precedence,
    )?;
    let status = writer::write_if_changed(downstream, merged.as_bytes())?;
    Ok(if seeded { WriteStatus::Written } else { status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    #[rstest]
    #[case("a.yaml", StructuredFormat::Yaml)]
    #[case("dir/a.yml", StructuredFormat::Yaml)]
    #[case("A.JSON", StructuredFormat::Json)]
    fn detects_format(#[case] path: &str, #[case] expected: StructuredFormat) {
        assert_eq!(StructuredFormat::detect(Path::new(path)).unwrap(), expected);
    }

    #[rstest]
    #[case("a.toml")]
    #[case("Makefile")]
    fn rejects_other_extensions(#[case] path: &str) {
        let err = StructuredFormat::detect(Path::new(path)).unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedFormat { .. }));
    }

    #[test]
    fn precedence_decides_conflicts() {
        let u = json!({"a": 1, "b": 2});
        let d = json!({"b": 9, "c": 3});
        assert_eq!(
            merge_with_precedence(u.clone(), d.clone(), Precedence::PreferUpstream),
            json!({"b": 2, "c": 3, "a": 1})
        );
        assert_eq!(
            merge_with_precedence(u, d, Precedence::PreferDownstream),
            json!({"a": 1, "b": 9, "c": 3})
        );
    }

    #[test]
    fn nested_maps_merge_and_lists_replace() {
        let mut base = json!({"svc": {"port": 1, "tags": ["a", "b"]}, "keep": true});
        base.deep_merge(json!({"svc": {"host": "x", "tags": ["c"]}}));
        assert_eq!(
            base,
            json!({"svc": {"port": 1, "tags": ["c"], "host": "x"}, "keep": true})
        );
    }

    #[test]
    fn scalar_overlay_replaces_map() {
        let mut base = json!({"a": {"b": 1}});
        base.deep_merge(json!({"a": 5}));
        assert_eq!(base, json!({"a": 5}));
    }

    #[test]
    fn yaml_keeps_base_key_order() {
        let path = Path::new("x.yml");
        let out = merge_text(
            StructuredFormat::Yaml,
            MergeSide { text: "b: 2\na: 1\n", path },
            MergeSide { text: "z: 0\nb: 9\n", path },
            Precedence::PreferUpstream,
        )
        .unwrap();
        assert_eq!(out, "z: 0\nb: 2\na: 1\n");
    }

    #[test]
    fn merge_files_seeds_missing_downstream() {
        let tmp = TempDir::new().unwrap();
        let up = tmp.path().join("up.json");
        let down = tmp.path().join("down/out.json");
        std::fs::write(&up, r#"{"a": 1}"#).unwrap();
        let merge = || merge_files(&up, &down, Precedence::PreferDownstream).unwrap();
        assert_eq!(merge(), WriteStatus::Written);
        assert_eq!(std::fs::read_to_string(&down).unwrap(), "{\n  \"a\": 1\n}\n");
        assert_eq!(merge(), WriteStatus::Unchanged);
    }

    #[rstest]
    #[case("", "keep: me\n", Precedence::PreferUpstream, "keep: me\n")]
    #[case("# nothing here\n", "keep: me\n", Precedence::PreferUpstream, "keep: me\n")]
    #[case("a: 1\nb: 2\n", "# only comments\n", Precedence::PreferDownstream, "a: 1\nb: 2\n")]
    #[case("a: 1\nb: 2\n", "", Precedence::PreferDownstream, "a: 1\nb: 2\n")]
    fn empty_yaml_side_keeps_other_side(
        #[case] upstream: &str,
        #[case] downstream: &str,
        #[case] precedence: Precedence,
        #[case] expected: &str,
    ) {
        let tmp = TempDir::new().unwrap();
        let up = tmp.path().join("up.yml");
        let down = tmp.path().join("down.yml");
        std::fs::write(&up, upstream).unwrap();
        std::fs::write(&down, downstream).unwrap();
        merge_files(&up, &down, precedence).unwrap();
        assert_eq!(std::fs::read_to_string(&down).unwrap(), expected);
    }

    #[test]
    fn null_overlay_is_a_no_op() {
        let mut base = json!({"a": 1});
        base.deep_merge(serde_json::Value::Null);
        assert_eq!(base, json!({"a": 1}));
        // Explicit nulls under a key still replace.
        base.deep_merge(json!({"a": null}));
        assert_eq!(base, json!({"a": null}));
    }

    #[test]
    fn parse_error_names_file() {
        let tmp = TempDir::new().unwrap();
        let up = tmp.path().join("u.json");
        let down = tmp.path().join("d.json");
        std::fs::write(&up, "{}").unwrap();
        std::fs::write(&down, "{oops").unwrap();
        let err = merge_files(&up, &down, Precedence::PreferUpstream).unwrap_err();
        assert!(matches!(err, SyncError::StructuredParse { .. }));
        assert!(err.to_string().contains("d.json"));
    }
}
