//! Template renderer for nextkit.
//! Placeholders use MiniJinja syntax (`{{ project_name }}`); a placeholder
//! without a value is an error, never an empty string.
use crate::error::{Error, Result};
use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Name reported in errors, usually the template path
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer with strict undefined handling and the case filters.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        // Generated sources are not HTML; values go in verbatim unless a
        // template asks for `tojson`.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("slugify", slugify);
        env.add_filter("kebab_case", |value: String| cruet::to_kebab_case(&value));
        env.add_filter("snake_case", |value: String| cruet::to_snake_case(&value));
        env.add_filter("pascal_case", |value: String| cruet::to_pascal_case(&value));
        env.add_filter("title_case", |value: String| cruet::to_title_case(&value));
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

/// Converts free text into a lowercase, dash separated identifier.
///
/// Characters outside `[a-z0-9._-]` are dropped after kebab casing, so the
/// result may be empty for names made only of punctuation.
pub fn slugify(value: String) -> String {
    cruet::to_kebab_case(&value)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        .collect()
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// # Errors
    /// * `Error::UnresolvedToken` if the template uses an undefined variable
    /// * `Error::Template` for syntax and other rendering failures
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env.render_named_str(name, template, context).map_err(|e| {
            let detail = match e.detail() {
                Some(detail) => format!("{detail} (line {})", e.line().unwrap_or_default()),
                None => e.to_string(),
            };
            if e.kind() == ErrorKind::UndefinedError {
                Error::UnresolvedToken { template: name.to_string(), detail }
            } else {
                Error::Template { template: name.to_string(), detail }
            }
        })
    }
}
