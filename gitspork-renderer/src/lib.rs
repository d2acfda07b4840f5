//! # gitspork-renderer
//!
//! Input resolution, input caching and Tera rendering for templated
//! instructions.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use gitspork_core::TemplatedInstruction;
//! use gitspork_renderer::{
//!     context, resolve_inputs, NonInteractivePrompter, ResolveContext, ResolvedInputs,
//!     TemplateEngine,
//! };
//!
//! fn render(instruction: &TemplatedInstruction, upstream: &Path, downstream: &Path) {
//!     let previous = ResolvedInputs::new();
//!     let ctx = ResolveContext {
//!         upstream_root: upstream,
//!         previous: &previous,
//!         prompter: &NonInteractivePrompter,
//!         force_reprompt: false,
//!     };
//!     if let Ok(cached) = context::load_cached_at(downstream, &instruction.destination) {
//!         if let Ok(data) = resolve_inputs(instruction, cached, &ctx) {
//!             let mut engine = TemplateEngine::new();
//!             if let Ok(name) = engine.load(upstream, &instruction.template) {
//!                 let _ = engine.render(&name, &data);
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod input;

pub use context::{InputMap, TemplateData};
pub use engine::TemplateEngine;
pub use error::{PromptError, RenderError};
pub use input::{
    resolve_inputs, InputKind, InputRequest, InputResponse, NonInteractivePrompter, Prompter,
    ResolveContext, ResolvedInputs,
};
