//! Terminal front end: colored progress output and interactive prompts.

use std::io;

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use gitspork_renderer::{InputKind, InputRequest, InputResponse, PromptError, Prompter};
use gitspork_sync::Reporter;

/// Prints integration progress to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        println!("{} {}", "==>".blue().bold(), title.bold());
    }

    fn progress(&self, message: &str) {
        println!("  {} {message}", "·".dimmed());
    }
}

/// Asks prompts on the terminal.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self { theme: ColorfulTheme::default() }
    }
}

fn prompt_err(e: dialoguer::Error) -> PromptError {
    PromptError::Io(io::Error::new(io::ErrorKind::Other, e))
}

impl Prompter for DialoguerPrompter {
    fn request(&self, request: &InputRequest) -> Result<InputResponse, PromptError> {
        match &request.kind {
            InputKind::SingleValue => {
                let value: String = Input::with_theme(&self.theme)
                    .with_prompt(&request.prompt)
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_err)?;
                Ok(InputResponse::Text(value))
            }
            InputKind::Selection(options) => {
                let idx = Select::with_theme(&self.theme)
                    .with_prompt(&request.prompt)
                    .items(options.as_slice())
                    .default(0)
                    .interact_opt()
                    .map_err(prompt_err)?
                    .ok_or(PromptError::Cancelled)?;
                options
                    .get(idx)
                    .cloned()
                    .map(InputResponse::Text)
                    .ok_or(PromptError::Cancelled)
            }
            InputKind::YesNo => {
                let yes = Confirm::with_theme(&self.theme)
                    .with_prompt(&request.prompt)
                    .interact_opt()
                    .map_err(prompt_err)?
                    .ok_or(PromptError::Cancelled)?;
                Ok(InputResponse::Bool(yes))
            }
        }
    }
}
