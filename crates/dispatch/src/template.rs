//! Template renderer seam.
//!
//! Message body rendering belongs to the host application (template
//! authoring is explicitly out of scope), so channels that need rendered
//! text depend on the [`TemplateRenderer`] trait. A missing template is a
//! distinct error so handlers can degrade (e.g. the email channel falls
//! back to plain text when only the HTML template is missing).

use std::collections::HashMap;

/// Error type for template rendering failures.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template is registered under the requested identifier.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// The template exists but could not be rendered.
    #[error("Template render failed: {0}")]
    Render(String),
}

/// Renders a template identifier plus context into text.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value)
        -> Result<String, TemplateError>;
}

/// Trivial in-memory renderer mapping template ids to fixed texts.
///
/// Intended for tests and hosts that pre-render their messages; real
/// deployments plug in their own [`TemplateRenderer`].
#[derive(Debug, Default)]
pub struct StaticTemplates {
    templates: HashMap<String, String>,
}

impl StaticTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixed text under a template id.
    pub fn with_template(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(id.into(), text.into());
        self
    }

    /// Load every regular file in `dir` as a template, keyed by file stem
    /// (`welcome_email_body.txt` becomes `welcome_email_body`).
    pub fn from_dir(dir: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let mut templates = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path)?;
            templates.templates.insert(stem.to_string(), text);
        }
        Ok(templates)
    }
}

impl TemplateRenderer for StaticTemplates {
    fn render(
        &self,
        template: &str,
        _context: &serde_json::Value,
    ) -> Result<String, TemplateError> {
        self.templates
            .get(template)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(template.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn static_templates_render_registered_id() {
        let templates = StaticTemplates::new().with_template("welcome_email_subject", "Welcome!");
        let out = templates
            .render("welcome_email_subject", &serde_json::json!({}))
            .unwrap();
        assert_eq!(out, "Welcome!");
    }

    #[test]
    fn static_templates_missing_id_is_not_found() {
        let templates = StaticTemplates::new();
        let err = templates.render("nope", &serde_json::json!({})).unwrap_err();
        assert_matches!(err, TemplateError::NotFound(id) if id == "nope");
    }
}
