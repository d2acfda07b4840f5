//! Config loading error messages, validation and full-schema parsing.

use std::fs;
use std::path::PathBuf;

use assert_fs::prelude::*;
use gitspork_core::{
    config::{self, CONFIG_FILE_NAME},
    ConfigError, InputSource, Precedence,
};
use predicates::prelude::predicate;
use rstest::rstest;

const FULL_CONFIG: &str = r#"
version: v0.1.0
upstream_owned:
  - "upstream-owned/**"
downstream_owned:
  - README.md
shared_ownership:
  merged:
    - .gitignore
  structured:
    prefer_upstream:
      - config/defaults.json
    prefer_downstream:
      - config/settings.yml
templated:
  - template: templates/app.yml.tera
    destination: app.yml
    inputs:
      - name: app_name
        prompt: "Application name?"
      - json_data_path: templates/defaults.json
    merged:
      structured: prefer-upstream
  - template: templates/notes.md.tera
    destination: docs/notes.md
    inputs:
      - name: app_name
        previous_input:
          template: templates/app.yml.tera
          name: app_name
migrations:
  - migrations/0001.yml
"#;

// ---------------------------------------------------------------------------
// 1. Full schema
// ---------------------------------------------------------------------------

#[test]
fn full_config_parses_every_section() {
    let upstream = assert_fs::TempDir::new().expect("tempdir");
    upstream.child(CONFIG_FILE_NAME).write_str(FULL_CONFIG).expect("write");

    let config = config::load_config_at(upstream.path()).expect("load");
    assert_eq!(config.version, "v0.1.0");
    assert_eq!(config.upstream_owned, vec!["upstream-owned/**"]);
    assert_eq!(config.downstream_owned, vec!["README.md"]);
    assert_eq!(config.shared_ownership.merged, vec![".gitignore"]);
    assert_eq!(config.shared_ownership.structured.prefer_upstream, vec!["config/defaults.json"]);
    assert_eq!(config.shared_ownership.structured.prefer_downstream, vec!["config/settings.yml"]);
    assert_eq!(config.migrations, vec![PathBuf::from("migrations/0001.yml")]);

    assert_eq!(config.templated.len(), 2);
    let first = &config.templated[0];
    assert_eq!(first.structured_merge(), Some(Precedence::PreferUpstream));
    assert_eq!(first.inputs[0].source(), Ok(InputSource::Prompt("Application name?")));
    assert!(matches!(first.inputs[1].source(), Ok(InputSource::JsonDataPath(_))));

    let second = &config.templated[1];
    assert_eq!(second.structured_merge(), None);
    match second.inputs[0].source().expect("source") {
        InputSource::PreviousInput(r) => {
            assert_eq!(r.template, PathBuf::from("templates/app.yml.tera"));
            assert_eq!(r.name, "app_name");
        }
        other => panic!("expected previous_input, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// 2. Error messages
// ---------------------------------------------------------------------------

#[test]
fn corrupt_yaml_names_the_file() {
    let upstream = assert_fs::TempDir::new().expect("tempdir");
    upstream
        .child(CONFIG_FILE_NAME)
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_config_at(upstream.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(CONFIG_FILE_NAME), "got: {err}");
}

#[rstest]
#[case::unknown_top_level_key("upstream_ownd: [a]\n")]
#[case::bad_precedence(
    "templated:\n  - template: t\n    destination: d\n    merged:\n      structured: prefer-nobody\n"
)]
#[case::list_instead_of_map("- just a list\n")]
fn malformed_configs_are_parse_errors(#[case] yaml: &str) {
    let upstream = assert_fs::TempDir::new().expect("tempdir");
    upstream.child(CONFIG_FILE_NAME).write_str(yaml).expect("write");
    let err = config::load_config_at(upstream.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[rstest]
#[case::no_source("    inputs:\n      - name: x\n", "requires one of")]
#[case::two_sources(
    "    inputs:\n      - name: x\n        prompt: p\n        json_data_path: d.json\n",
    "more than one"
)]
#[case::unnamed_prompt("    inputs:\n      - prompt: p\n", "requires a 'name'")]
fn invalid_inputs_are_rejected(#[case] inputs: &str, #[case] expected: &str) {
    let upstream = assert_fs::TempDir::new().expect("tempdir");
    let yaml = format!("templated:\n  - template: tpl/a.tera\n    destination: a\n{inputs}");
    upstream.child(CONFIG_FILE_NAME).write_str(&yaml).expect("write");

    let err = config::load_config_at(upstream.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInput { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("tpl/a.tera"), "must name the template, got: {msg}");
    assert!(msg.contains(expected), "got: {msg}");
}

#[test]
fn migration_config_parse_error_names_file() {
    let upstream = assert_fs::TempDir::new().expect("tempdir");
    upstream.child("m.yml").write_str("pre_integrate: [oops]\n").expect("write");
    let err = config::parse_migration_config(&upstream.path().join("m.yml")).unwrap_err();
    assert!(err.to_string().contains("m.yml"));
}

// ---------------------------------------------------------------------------
// 3. Init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_loadable_config() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    config::init_at(dir.path(), "tests").expect("init");

    dir.child(CONFIG_FILE_NAME)
        .assert(predicate::str::starts_with(config::CONFIG_HEADER))
        .assert(predicate::str::contains("upstream_owned: []"));

    let loaded = config::load_config_at(dir.path()).expect("load");
    assert_eq!(loaded.version, "tests");
    assert!(loaded.templated.is_empty());
}

#[test]
fn init_overwrites_existing_config() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE_NAME), "version: old\n").expect("write");
    config::init_at(dir.path(), "new").expect("init");
    assert_eq!(config::load_config_at(dir.path()).unwrap().version, "new");
}
