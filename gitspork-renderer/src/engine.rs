//! Tera rendering engine for upstream templates.
//!
//! Templates are read from the upstream tree and registered under their
//! `/`-separated relative path. Autoescaping is disabled: outputs are config
//! files and source code, not HTML.

use std::path::Path;

use tera::Tera;

use crate::context::TemplateData;
use crate::error::{io_err, RenderError};

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Tera-based engine holding the templates loaded during one run.
pub struct TemplateEngine {
    tera: Tera,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        TemplateEngine { tera }
    }

    /// Register `source` under `name`, replacing any earlier template of that name.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.tera
            .add_raw_template(name, source)
            .map_err(|source| RenderError::Tera { template: name.to_string(), source })
    }

    /// Read `template` (relative to `upstream_root`) and register it.
    ///
    /// Returns the name to pass to [`TemplateEngine::render`].
    pub fn load(&mut self, upstream_root: &Path, template: &Path) -> Result<String, RenderError> {
        let path = upstream_root.join(template);
        let source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let name = normalize_template_name(template);
        self.add_template(&name, &source)?;
        Ok(name)
    }

    /// Render a registered template against `data`.
    pub fn render(&self, name: &str, data: &TemplateData) -> Result<String, RenderError> {
        let ctx = data.to_tera_context(name)?;
        self.tera
            .render(name, &ctx)
            .map_err(|source| RenderError::Tera { template: name.to_string(), source })
    }
}
