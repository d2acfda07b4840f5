//! Input resolution for templated instructions.
//!
//! Inputs come from three sources: an interactive [`Prompter`], a JSON data
//! file in the upstream tree, or a value another templated instruction
//! resolved earlier in the same run ([`ResolvedInputs`]).

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use gitspork_core::{InputSource, PreviousInputRef, TemplateId, TemplatedInstruction};

use crate::context::{InputMap, TemplateData};
use crate::error::{io_err, PromptError, RenderError};

// ---------------------------------------------------------------------------
// Prompter contract
// ---------------------------------------------------------------------------

/// What kind of answer a prompt expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    SingleValue,
    Selection(Vec<String>),
    YesNo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub kind: InputKind,
    pub prompt: String,
}

impl InputRequest {
    pub fn single_value(prompt: impl Into<String>) -> Self {
        Self { kind: InputKind::SingleValue, prompt: prompt.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResponse {
    Text(String),
    Bool(bool),
}

impl From<InputResponse> for Value {
    fn from(response: InputResponse) -> Self {
        match response {
            InputResponse::Text(s) => Value::String(s),
            InputResponse::Bool(b) => Value::Bool(b),
        }
    }
}

/// Synchronous request/response channel to whoever answers prompts.
pub trait Prompter {
    fn request(&self, request: &InputRequest) -> Result<InputResponse, PromptError>;
}

/// Prompter for unattended runs: every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn request(&self, request: &InputRequest) -> Result<InputResponse, PromptError> {
        Err(PromptError::NotInteractive { prompt: request.prompt.clone() })
    }
}

// ---------------------------------------------------------------------------
// Cross-instruction state
// ---------------------------------------------------------------------------

/// Inputs resolved so far in this run, keyed by template identity.
#[derive(Debug, Default, Clone)]
pub struct ResolvedInputs {
    by_template: HashMap<TemplateId, InputMap>,
}

impl ResolvedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, template: TemplateId, inputs: InputMap) {
        self.by_template.insert(template, inputs);
    }

    pub fn get(&self, template: &TemplateId) -> Option<&InputMap> {
        self.by_template.get(template)
    }

    /// Look up the value a `previous_input` reference points at.
    pub fn lookup(&self, reference: &PreviousInputRef) -> Result<&Value, RenderError> {
        let template = TemplateId::from_path(&reference.template);
        let inputs = self
            .by_template
            .get(&template)
            .ok_or_else(|| RenderError::PreviousTemplateNotFound { template: template.clone() })?;
        inputs.get(&reference.name).ok_or_else(|| RenderError::PreviousInputNotFound {
            template,
            name: reference.name.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Everything input resolution needs besides the instruction itself.
pub struct ResolveContext<'a> {
    /// Root that `json_data_path` is resolved against.
    pub upstream_root: &'a Path,
    pub previous: &'a ResolvedInputs,
    pub prompter: &'a dyn Prompter,
    /// Ask again even when a cached answer exists.
    pub force_reprompt: bool,
}

/// Resolve every declared input of `instruction`, starting from `cached`.
///
/// Returns the full data to render with and to persist as the new cache.
pub fn resolve_inputs(
    instruction: &TemplatedInstruction,
    cached: TemplateData,
    ctx: &ResolveContext<'_>,
) -> Result<TemplateData, RenderError> {
    let mut data = cached;
    for input in &instruction.inputs {
        let source = input.source().map_err(|problem| RenderError::InvalidInput {
            template: instruction.id(),
            input: input.label(),
            problem,
        })?;
        match source {
            InputSource::JsonDataPath(path) => {
                let values = read_json_data(&ctx.upstream_root.join(path))?;
                data.inputs.extend(values);
            }
            InputSource::Prompt(prompt) => {
                if data.has_value(&input.name) && !ctx.force_reprompt {
                    tracing::debug!(input = %input.name, "using cached input");
                    continue;
                }
                let response = ctx
                    .prompter
                    .request(&InputRequest::single_value(prompt))
                    .map_err(|source| RenderError::Prompt { input: input.name.clone(), source })?;
                data.inputs.insert(input.name.clone(), response.into());
            }
            InputSource::PreviousInput(reference) => {
                let value = ctx.previous.lookup(reference)?.clone();
                data.inputs.insert(input.name.clone(), value);
            }
        }
    }
    Ok(data)
}

fn read_json_data(path: &Path) -> Result<InputMap, RenderError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| RenderError::JsonData {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(RenderError::JsonDataNotObject { path: path.to_path_buf() }),
    }
}
