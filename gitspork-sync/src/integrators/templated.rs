//! Templated files: rendered from upstream templates into downstream.
//!
//! Instructions run in declaration order so later ones can read inputs
//! resolved by earlier ones through `previous_input`.

use std::path::Path;

use gitspork_core::TemplatedInstruction;
use gitspork_renderer::{
    context, resolve_inputs, Prompter, ResolveContext, ResolvedInputs, TemplateEngine,
};

use crate::error::{io_err, SyncError};
use crate::integrators::{FileOutcome, TreeRoots};
use crate::reporter::Reporter;
use crate::structured::{self, MergeSide, StructuredFormat};
use crate::writer::{self, WriteStatus};

/// Renders every templated instruction of a config.
pub struct TemplatedIntegrator<'a> {
    prompter: &'a dyn Prompter,
    force_reprompt: bool,
}

impl<'a> TemplatedIntegrator<'a> {
    pub fn new(prompter: &'a dyn Prompter, force_reprompt: bool) -> Self {
        Self { prompter, force_reprompt }
    }

    pub fn integrate(
        &self,
        instructions: &[TemplatedInstruction],
        roots: TreeRoots<'_>,
        reporter: &dyn Reporter,
    ) -> Result<Vec<FileOutcome>, SyncError> {
        let mut engine = TemplateEngine::new();
        let mut resolved = ResolvedInputs::new();
        let mut outcomes = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            let outcome =
                self.integrate_one(instruction, roots, &mut engine, &mut resolved, reporter)?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn integrate_one(
        &self,
        instruction: &TemplatedInstruction,
        roots: TreeRoots<'_>,
        engine: &mut TemplateEngine,
        resolved: &mut ResolvedInputs,
        reporter: &dyn Reporter,
    ) -> Result<FileOutcome, SyncError> {
        let destination = instruction.destination.as_path();
        reporter.progress(&format!(
            "rendering {} to {}",
            instruction.template.display(),
            destination.display()
        ));

        let cached = context::load_cached_at(roots.downstream, destination)?;
        let ctx = ResolveContext {
            upstream_root: roots.upstream,
            previous: &*resolved,
            prompter: self.prompter,
            force_reprompt: self.force_reprompt,
        };
        let data = resolve_inputs(instruction, cached, &ctx)?;

        let name = engine.load(roots.upstream, &instruction.template)?;
        let rendered = engine.render(&name, &data)?;

        let dest_path = roots.downstream.join(destination);
        let content = match instruction.structured_merge() {
            Some(precedence) => {
                merge_rendered(&rendered, &dest_path, precedence, &instruction.template)?
            }
            None => rendered,
        };
        let status = writer::write_if_changed(&dest_path, content.as_bytes())?;
        if status == WriteStatus::Written {
            reporter.progress(&format!("wrote {}", destination.display()));
        }

        context::save_cached_at(roots.downstream, destination, &data)?;
        resolved.record(instruction.id(), data.inputs);
        Ok(FileOutcome::from_status(status, destination))
    }
}

/// Merge freshly rendered text with the existing destination file.
///
/// The rendered text plays the upstream side of the precedence. A missing
/// destination merges the rendered text with itself, so the output is
/// serialized the same way on every run.
fn merge_rendered(
    rendered: &str,
    dest_path: &Path,
    precedence: gitspork_core::Precedence,
    template: &Path,
) -> Result<String, SyncError> {
    let format = StructuredFormat::detect(dest_path)?;
    let existing = if dest_path.exists() {
        std::fs::read_to_string(dest_path).map_err(|e| io_err(dest_path, e))?
    } else {
        rendered.to_string()
    };
    structured::merge_text(
        format,
        MergeSide { text: rendered, path: template },
        MergeSide { text: &existing, path: dest_path },
        precedence,
    )
}
