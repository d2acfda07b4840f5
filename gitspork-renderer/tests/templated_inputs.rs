//! Input resolution across several instructions plus caching between runs.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use gitspork_core::{InputSpec, PreviousInputRef, TemplatedInstruction};
use gitspork_renderer::{
    context, resolve_inputs, InputRequest, InputResponse, PromptError, Prompter, RenderError,
    ResolveContext, ResolvedInputs, TemplateEngine,
};
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

/// Answers prompts from a fixed list and counts how often it was asked.
struct Answers {
    answers: Vec<&'static str>,
    asked: RefCell<usize>,
}

impl Answers {
    fn new(answers: &[&'static str]) -> Self {
        Self { answers: answers.to_vec(), asked: RefCell::new(0) }
    }
}

impl Prompter for Answers {
    fn request(&self, _request: &InputRequest) -> Result<InputResponse, PromptError> {
        let mut asked = self.asked.borrow_mut();
        let answer = self.answers.get(*asked).ok_or(PromptError::Cancelled)?;
        *asked += 1;
        Ok(InputResponse::Text(answer.to_string()))
    }
}

fn instruction(template: &str, destination: &str, inputs: Vec<InputSpec>) -> TemplatedInstruction {
    TemplatedInstruction {
        template: PathBuf::from(template),
        destination: PathBuf::from(destination),
        inputs,
        merged: None,
    }
}

fn previous(template: &str, name: &str) -> InputSpec {
    InputSpec {
        name: name.into(),
        previous_input: Some(PreviousInputRef {
            template: PathBuf::from(template),
            name: name.into(),
        }),
        ..Default::default()
    }
}

fn prompted(name: &str) -> InputSpec {
    InputSpec { name: name.into(), prompt: Some("Name?".into()), ..Default::default() }
}

/// Resolve, render and cache a list of instructions the way one run does.
fn run(
    upstream: &Path,
    downstream: &Path,
    instructions: &[TemplatedInstruction],
    prompter: &dyn Prompter,
    force_reprompt: bool,
) -> Result<Vec<String>, RenderError> {
    let mut resolved = ResolvedInputs::new();
    let mut engine = TemplateEngine::new();
    let mut outputs = Vec::new();
    for instruction in instructions {
        let cached = context::load_cached_at(downstream, &instruction.destination)?;
        let data = {
            let ctx = ResolveContext {
                upstream_root: upstream,
                previous: &resolved,
                prompter,
                force_reprompt,
            };
            resolve_inputs(instruction, cached, &ctx)?
        };
        let name = engine.load(upstream, &instruction.template)?;
        outputs.push(engine.render(&name, &data)?);
        context::save_cached_at(downstream, &instruction.destination, &data)?;
        resolved.record(instruction.id(), data.inputs);
    }
    Ok(outputs)
}

fn upstream_with_templates() -> TempDir {
    let upstream = TempDir::new().expect("upstream");
    fs::create_dir_all(upstream.path().join("tpl")).unwrap();
    fs::write(upstream.path().join("tpl/first.tera"), "name={{ inputs.name }}").unwrap();
    fs::write(upstream.path().join("tpl/second.tera"), "again={{ inputs.name }}").unwrap();
    upstream
}

#[test]
fn prompt_answered_once_is_reused_on_second_run() {
    let upstream = upstream_with_templates();
    let downstream = TempDir::new().expect("downstream");
    let instructions = vec![instruction("tpl/first.tera", "out/first.txt", vec![prompted("name")])];

    let first = Answers::new(&["alpha"]);
    let out = run(upstream.path(), downstream.path(), &instructions, &first, false).unwrap();
    assert_eq!(out, vec!["name=alpha"]);
    assert_eq!(*first.asked.borrow(), 1);

    let second = Answers::new(&["beta"]);
    let out = run(upstream.path(), downstream.path(), &instructions, &second, false).unwrap();
    assert_eq!(out, vec!["name=alpha"]);
    assert_eq!(*second.asked.borrow(), 0, "cached answer must not be re-prompted");

    let forced = Answers::new(&["gamma"]);
    let out = run(upstream.path(), downstream.path(), &instructions, &forced, true).unwrap();
    assert_eq!(out, vec!["name=gamma"]);

    let cached = context::load_cached_at(downstream.path(), Path::new("out/first.txt")).unwrap();
    assert_eq!(cached.inputs["name"], json!("gamma"));
}

#[test]
fn previous_input_propagates_within_a_run() {
    let upstream = upstream_with_templates();
    let downstream = TempDir::new().expect("downstream");
    let instructions = vec![
        instruction("tpl/first.tera", "first.txt", vec![prompted("name")]),
        instruction("tpl/second.tera", "second.txt", vec![previous("tpl/first.tera", "name")]),
    ];
    let prompter = Answers::new(&["shared"]);
    let out = run(upstream.path(), downstream.path(), &instructions, &prompter, false).unwrap();
    assert_eq!(out, vec!["name=shared", "again=shared"]);
}

#[rstest]
#[case::forward_reference(true)]
#[case::unknown_template(false)]
fn previous_template_must_come_earlier(#[case] declared_later: bool) {
    let upstream = upstream_with_templates();
    let downstream = TempDir::new().expect("downstream");
    let mut instructions = vec![instruction(
        "tpl/second.tera",
        "second.txt",
        vec![previous("tpl/first.tera", "name")],
    )];
    if declared_later {
        instructions.push(instruction("tpl/first.tera", "first.txt", vec![prompted("name")]));
    }
    let prompter = Answers::new(&["x"]);
    let err = run(upstream.path(), downstream.path(), &instructions, &prompter, false).unwrap_err();
    assert!(matches!(err, RenderError::PreviousTemplateNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("previous template not found"));
}

#[test]
fn previous_input_name_must_exist() {
    let upstream = upstream_with_templates();
    let downstream = TempDir::new().expect("downstream");
    let instructions = vec![
        instruction("tpl/first.tera", "first.txt", vec![prompted("name")]),
        instruction("tpl/second.tera", "second.txt", vec![previous("tpl/first.tera", "nope")]),
    ];
    let prompter = Answers::new(&["x"]);
    let err = run(upstream.path(), downstream.path(), &instructions, &prompter, false).unwrap_err();
    assert!(matches!(err, RenderError::PreviousInputNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("nope"));
}

#[test]
fn instruction_without_source_is_rejected() {
    let upstream = upstream_with_templates();
    let downstream = TempDir::new().expect("downstream");
    let instructions = vec![instruction(
        "tpl/first.tera",
        "first.txt",
        vec![InputSpec { name: "name".into(), ..Default::default() }],
    )];
    let prompter = Answers::new(&[]);
    let err = run(upstream.path(), downstream.path(), &instructions, &prompter, false).unwrap_err();
    assert!(matches!(err, RenderError::InvalidInput { .. }), "got: {err}");
}
