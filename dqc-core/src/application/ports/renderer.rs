// dqc-core/src/application/ports/renderer.rs

use crate::error::DqcError;

/// Turns a resolved configuration tree into SQL text. Pure: same inputs, same output.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_id: &str, context: &serde_json::Value) -> Result<String, DqcError>;
}
