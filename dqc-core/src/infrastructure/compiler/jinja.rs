// dqc-core/src/infrastructure/compiler/jinja.rs

// Renders the SQL macros (create_rule_binding_view.sql, ...) from a resolved configuration tree.

use minijinja::{Environment, path_loader};
use std::path::Path;

use crate::application::ports::TemplateEngine;
use crate::error::DqcError;
use crate::infrastructure::error::InfrastructureError;

pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        // 'it''s' : escapes a value for use inside a single-quoted SQL literal
        env.add_filter("sql_literal", |value: String| -> String {
            format!("'{}'", value.replace('\'', "''"))
        });

        Self { env }
    }

    /// Templates are looked up by file name under `templates_dir`.
    pub fn from_dir(templates_dir: &Path) -> Self {
        let mut renderer = Self::new();
        renderer.env.set_loader(path_loader(templates_dir.to_path_buf()));
        renderer
    }

    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), InfrastructureError> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(InfrastructureError::TemplateError)
    }
}

impl Default for JinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for JinjaRenderer {
    fn render(&self, template_id: &str, context: &serde_json::Value) -> Result<String, DqcError> {
        self.env
            .get_template(template_id)
            .and_then(|tmpl| tmpl.render(context))
            .map_err(|e| DqcError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}
