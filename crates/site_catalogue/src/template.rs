//! Content templates and ordered field resolution.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde::Deserialize;

type TemplateFn = dyn Fn(&str, &str) -> String + Send + Sync;

/// Text template for a synthesized field.
///
/// `Literal` text is used verbatim. `Computed` templates are invoked with `(name, category)`.
/// Source files spell a computed template as `{ pattern = "... {name} ... {category} ..." }`.
#[derive(Clone, Deserialize)]
#[serde(from = "RawTemplate")]
pub enum Template {
    /// Fixed text.
    Literal(String),
    /// Text derived from the entry name and category.
    Computed(Arc<TemplateFn>),
}

impl Template {
    /// Wrap a closure as a computed template.
    pub fn computed(render: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(render))
    }

    /// Computed template that substitutes `{name}` and `{category}` placeholders.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self::computed(move |name, category| {
            pattern
                .replace("{name}", name)
                .replace("{category}", category)
        })
    }

    /// Render the template for one entry.
    pub fn render(&self, name: &str, category: &str) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Computed(render) => render(name, category),
        }
    }
}

impl Debug for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTemplate {
    Literal(String),
    Pattern { pattern: String },
}

impl From<RawTemplate> for Template {
    fn from(raw: RawTemplate) -> Self {
        match raw {
            RawTemplate::Literal(text) => Self::Literal(text),
            RawTemplate::Pattern { pattern } => Self::pattern(pattern),
        }
    }
}

/// Resolve an optional template; `None` when no template was declared.
pub fn resolve_template(template: Option<&Template>, name: &str, category: &str) -> Option<String> {
    template.map(|template| template.render(name, category))
}

/// Ordered list of resolver steps for one field.
///
/// Steps run in insertion order and the first `Some` wins. Keeping the chain explicit makes the
/// precedence between per-item values, category defaults, templates, and static fallbacks
/// visible at the call site.
pub struct FieldChain<'a, T> {
    steps: Vec<Box<dyn Fn() -> Option<T> + 'a>>,
}

impl<'a, T> FieldChain<'a, T> {
    /// Empty chain.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a resolver step.
    pub fn or_else(mut self, step: impl Fn() -> Option<T> + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// First value produced by any step.
    pub fn resolve(&self) -> Option<T> {
        self.steps.iter().find_map(|step| step())
    }

    /// First value produced by any step, else `fallback`.
    pub fn resolve_or(&self, fallback: T) -> T {
        self.resolve().unwrap_or(fallback)
    }
}

impl<T> Default for FieldChain<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        headline: Template,
    }

    #[test]
    fn literal_and_computed_templates_render() {
        let literal = Template::Literal("Fixed copy".into());
        assert_eq!(literal.render("Foo", "CRM"), "Fixed copy");

        let computed = Template::computed(|name, category| format!("{name} / {category}"));
        assert_eq!(computed.render("Foo", "CRM"), "Foo / CRM");
    }

    #[test]
    fn pattern_template_substitutes_placeholders() {
        let template = Template::pattern("The {category} tool {name} ({name})");
        assert_eq!(
            template.render("Foo", "CRM"),
            "The CRM tool Foo (Foo)"
        );
    }

    #[test]
    fn templates_deserialize_from_string_or_pattern_table() {
        let literal: Holder = toml::from_str(r#"headline = "Plain""#).expect("literal");
        assert!(matches!(literal.headline, Template::Literal(ref text) if text == "Plain"));

        let pattern: Holder =
            toml::from_str(r#"headline = { pattern = "{name} for {category}" }"#).expect("pattern");
        assert_eq!(pattern.headline.render("Foo", "CRM"), "Foo for CRM");
    }

    #[test]
    fn resolve_template_is_none_without_template() {
        assert_eq!(resolve_template(None, "Foo", "CRM"), None);
        let template = Template::Literal("x".into());
        assert_eq!(resolve_template(Some(&template), "Foo", "CRM").as_deref(), Some("x"));
    }

    #[test]
    fn field_chain_returns_first_defined_step() {
        let explicit: Option<&str> = None;
        let default = Some("from default");
        let chain = FieldChain::new()
            .or_else(|| explicit.map(str::to_string))
            .or_else(|| default.map(str::to_string))
            .or_else(|| Some("from template".to_string()));
        assert_eq!(chain.resolve().as_deref(), Some("from default"));

        let empty: FieldChain<'_, String> = FieldChain::new().or_else(|| None);
        assert_eq!(empty.resolve_or("fallback".into()), "fallback");
    }
}
