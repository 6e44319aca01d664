//! HTML template system for page generation.
//!
//! A lightweight interpolation engine rather than a full template language:
//!
//! - `{{ page.title }}` looks a dotted path up in the JSON context and
//!   HTML-escapes it; a missing value is an error.
//! - `{{ page.summary? }}` renders nothing when the value is missing.
//! - `{{ content | safe }}` skips escaping. Other filters are `jsonify`
//!   (pretty JSON of the value), `comment` (wrap in an HTML comment) and
//!   `date:FORMAT` (reformat an RFC 3339 or `YYYY-MM-DD` date with a chrono
//!   format string).
//! - `{{ now }}` is the current local time, RFC 3339.
//! - `{{> partials/nav.html }}` renders another registered template with the
//!   same context.

use std::{
    collections::HashMap,
    fmt::Write as _,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, NaiveDate};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Maximum nesting of `{{> include }}`.
pub const MAX_INCLUDE_DEPTH: usize = 16;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax in {template}: {message}")]
    InvalidSyntax { template: String, message: String },

    /// A filter failed on its input.
    #[error("filter {filter} failed: {message}")]
    Filter { filter: String, message: String },

    /// Includes nested too deeply, most likely a cycle.
    #[error("include depth limit of {MAX_INCLUDE_DEPTH} exceeded at {0}")]
    IncludeDepth(String),

    /// Reading a template file failed.
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking a template directory failed.
    #[error("failed to walk template directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template context: a JSON object addressed by dotted paths.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: Map<String, Value>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a top-level variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Create context with initial variables.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a dotted path such as `page.tags.0`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.variables.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Check if a path resolves.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// The whole context as one JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.variables
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Safe,
    Jsonify,
    Comment,
    Date(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Variable {
        path: &'a str,
        optional: bool,
        filters: Vec<Filter>,
    },
    Include(&'a str),
}

/// A named template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check the template for syntax errors without rendering it.
    pub fn check(&self) -> Result<()> {
        self.segments().map(|_| ())
    }

    /// Render the template on its own. Includes fail with
    /// [`TemplateError::NotFound`]; use [`TemplateRegistry::render`] for
    /// templates that include others.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        render_template(self, context, None, 0)
    }

    fn syntax_error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::InvalidSyntax {
            template: self.name.clone(),
            message: message.into(),
        }
    }

    fn segments(&self) -> Result<Vec<Segment<'_>>> {
        let content = self.content.as_str();
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some(offset) = content[pos..].find("{{") {
            let start = pos + offset;
            if start > pos {
                segments.push(Segment::Text(&content[pos..start]));
            }

            let end = content[start + 2..]
                .find("}}")
                .map(|e| start + 2 + e)
                .ok_or_else(|| self.syntax_error("unclosed {{ delimiter"))?;
            let expr = content[start + 2..end].trim();

            segments.push(self.parse_expression(expr)?);
            pos = end + 2;
        }

        if pos < content.len() {
            segments.push(Segment::Text(&content[pos..]));
        }
        Ok(segments)
    }

    fn parse_expression<'a>(&self, expr: &'a str) -> Result<Segment<'a>> {
        if let Some(name) = expr.strip_prefix('>') {
            let name = name.trim();
            if name.is_empty() {
                return Err(self.syntax_error("include without a template name"));
            }
            return Ok(Segment::Include(name));
        }

        let mut parts = expr.split('|').map(str::trim);
        let head = parts.next().unwrap_or_default();
        let (path, optional) = match head.strip_suffix('?') {
            Some(stripped) => (stripped.trim_end(), true),
            None => (head, false),
        };
        if path.is_empty() {
            return Err(self.syntax_error("empty expression"));
        }

        let filters = parts
            .map(|filter| match filter.split_once(':') {
                Some(("date", format)) => Ok(Filter::Date(format.trim().to_string())),
                None if filter == "safe" => Ok(Filter::Safe),
                None if filter == "jsonify" => Ok(Filter::Jsonify),
                None if filter == "comment" => Ok(Filter::Comment),
                _ => Err(self.syntax_error(format!("unknown filter `{filter}`"))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Segment::Variable {
            path,
            optional,
            filters,
        })
    }
}

fn render_template(
    template: &Template,
    context: &TemplateContext,
    registry: Option<&TemplateRegistry>,
    depth: usize,
) -> Result<String> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(TemplateError::IncludeDepth(template.name.clone()));
    }

    let mut out = String::with_capacity(template.content.len());
    for segment in template.segments()? {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Include(name) => {
                let included = registry
                    .and_then(|registry| registry.get(name))
                    .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
                out.push_str(&render_template(included, context, registry, depth + 1)?);
            }
            Segment::Variable {
                path,
                optional,
                filters,
            } => {
                let now;
                let value = match context.get(path) {
                    Some(value) => value,
                    None if path == "now" => {
                        now = Value::String(Local::now().to_rfc3339());
                        &now
                    }
                    None if optional => continue,
                    None => return Err(TemplateError::MissingVariable(path.to_string())),
                };
                out.push_str(&apply_filters(value, &filters)?);
            }
        }
    }
    Ok(out)
}

fn apply_filters(value: &Value, filters: &[Filter]) -> Result<String> {
    let mut text = value_to_string(value);
    let mut safe = false;

    for filter in filters {
        match filter {
            Filter::Safe => safe = true,
            Filter::Jsonify => {
                text = serde_json::to_string_pretty(value).map_err(|e| TemplateError::Filter {
                    filter: "jsonify".to_string(),
                    message: e.to_string(),
                })?;
                safe = true;
            }
            Filter::Comment => {
                text = format!("<!--\n{text}\n-->");
                safe = true;
            }
            Filter::Date(format) => text = format_date(&text, format)?,
        }
    }

    Ok(if safe { text } else { html_escape(&text) })
}

fn format_date(input: &str, format: &str) -> Result<String> {
    let filter_error = |message: String| TemplateError::Filter {
        filter: format!("date:{format}"),
        message,
    };

    let mut out = String::new();
    let written = if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        write!(out, "{}", datetime.format(format))
    } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        write!(out, "{}", date.format(format))
    } else {
        return Err(filter_error(format!("`{input}` is not a date")));
    };

    written.map_err(|_| filter_error("invalid format string".to_string()))?;
    Ok(out)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any template with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Render a named template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        render_template(template, context, Some(self), 0)
    }
}

/// Loads a site's templates from disk.
///
/// Every `.html`, `.md` and `.tmpl` file under the templates directory is
/// registered by its forward-slash path relative to that directory. Text
/// files under the static directory are registered as `static/<path>` so
/// they can be inlined with `{{> static/style.css }}`; they are loaded first
/// so a real template wins a name clash.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    templates_dir: PathBuf,
    static_dir: PathBuf,
}

const TEMPLATE_EXTENSIONS: &[&str] = &["html", "md", "tmpl"];
const STATIC_INCLUDE_EXTENSIONS: &[&str] = &["html", "md", "css", "js", "txt"];

impl TemplateLoader {
    /// Create a loader for the given directories.
    pub fn new(templates_dir: impl Into<PathBuf>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            static_dir: static_dir.into(),
        }
    }

    /// Load every template. The static directory is optional; the templates
    /// directory is not.
    pub fn load(&self) -> Result<TemplateRegistry> {
        let mut registry = TemplateRegistry::new();

        if self.static_dir.is_dir() {
            load_dir(&mut registry, &self.static_dir, Some("static"), STATIC_INCLUDE_EXTENSIONS)?;
        }
        load_dir(&mut registry, &self.templates_dir, None, TEMPLATE_EXTENSIONS)?;

        debug!(count = registry.len(), "loaded templates");
        Ok(registry)
    }
}

fn load_dir(
    registry: &mut TemplateRegistry,
    dir: &Path,
    prefix: Option<&str>,
    extensions: &[&str],
) -> Result<()> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if !matches {
            continue;
        }

        let rel = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        let name = match prefix {
            Some(prefix) => format!("{prefix}/{rel}"),
            None => rel,
        };

        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let template = Template::new(name, content);
        template.check()?;
        registry.register(template);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_template_simple_render() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let mut ctx = TemplateContext::new();
        ctx.insert("name", "World");

        let result = template.render(&ctx).unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_template_dotted_paths() {
        let template = Template::new("test", "{{ page.title }} by {{ page.authors.0 }}");
        let ctx = TemplateContext::new().with_var(
            "page",
            json!({"title": "Intro", "authors": ["Ada", "Grace"]}),
        );

        assert_eq!(template.render(&ctx).unwrap(), "Intro by Ada");
    }

    #[test]
    fn test_template_escapes_by_default() {
        let template = Template::new("test", "{{ v }}|{{ v | safe }}");
        let ctx = TemplateContext::new().with_var("v", "<b>\"x\" & y</b>");

        assert_eq!(
            template.render(&ctx).unwrap(),
            "&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;|<b>\"x\" & y</b>"
        );
    }

    #[test]
    fn test_template_optional_variable() {
        let template = Template::new("test", "Hello{{ suffix? }}!");
        let ctx = TemplateContext::new();

        let result = template.render(&ctx).unwrap();
        assert_eq!(result, "Hello!");

        let ctx = TemplateContext::new().with_var("suffix", ", World");
        let result = template.render(&ctx).unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_template_missing_required_variable() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let ctx = TemplateContext::new();

        let result = template.render(&ctx);
        assert!(matches!(result, Err(TemplateError::MissingVariable(_))));
    }

    #[test]
    fn test_template_unclosed_delimiter() {
        let template = Template::new("broken.html", "Hello, {{ name");
        let result = template.check();
        assert!(matches!(result, Err(TemplateError::InvalidSyntax { .. })));
        assert!(result.unwrap_err().to_string().contains("broken.html"));
    }

    #[test]
    fn test_template_unknown_filter() {
        let template = Template::new("t", "{{ name | shout }}");
        assert!(matches!(
            template.check(),
            Err(TemplateError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn test_scalar_and_null_values() {
        let template = Template::new("t", "{{ n }} {{ b }} [{{ z }}]");
        let ctx = TemplateContext::new()
            .with_var("n", 3)
            .with_var("b", true)
            .with_var("z", Value::Null);
        assert_eq!(template.render(&ctx).unwrap(), "3 true []");
    }

    #[test]
    fn test_jsonify_filter() {
        let template = Template::new("t", "{{ page | jsonify }}");
        let ctx = TemplateContext::new().with_var("page", json!({"title": "<T>"}));
        assert_eq!(template.render(&ctx).unwrap(), "{\n  \"title\": \"<T>\"\n}");
    }

    #[test]
    fn test_comment_filter() {
        let template = Template::new("t", "{{ debug | jsonify | comment }}");
        let ctx = TemplateContext::new().with_var("debug", json!([1]));
        assert_eq!(template.render(&ctx).unwrap(), "<!--\n[\n  1\n]\n-->");
    }

    #[test]
    fn test_date_filter() {
        let template = Template::new("t", "{{ page.date | date:%B %-d, %Y }}");
        let ctx = TemplateContext::new().with_var("page", json!({"date": "2024-03-05"}));
        assert_eq!(template.render(&ctx).unwrap(), "March 5, 2024");

        let ctx =
            TemplateContext::new().with_var("page", json!({"date": "2024-03-05T10:30:00+02:00"}));
        assert_eq!(template.render(&ctx).unwrap(), "March 5, 2024");

        let ctx = TemplateContext::new().with_var("page", json!({"date": "soon"}));
        assert!(matches!(
            template.render(&ctx),
            Err(TemplateError::Filter { .. })
        ));
    }

    #[test]
    fn test_builtin_now() {
        let template = Template::new("t", "{{ now | date:%Y }}");
        let year = template.render(&TemplateContext::new()).unwrap();
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_registry_includes() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("base.html", "<h1>{{ title }}</h1>{{> nav.html }}"));
        registry.register(Template::new("nav.html", "<nav>{{ title }}</nav>"));

        let ctx = TemplateContext::new().with_var("title", "Home");
        assert_eq!(
            registry.render("base.html", &ctx).unwrap(),
            "<h1>Home</h1><nav>Home</nav>"
        );
    }

    #[test]
    fn test_include_cycle_is_reported() {
        let mut registry = TemplateRegistry::new();
        registry.register(Template::new("a", "{{> b }}"));
        registry.register(Template::new("b", "{{> a }}"));

        let result = registry.render("a", &TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::IncludeDepth(_))));
    }

    #[test]
    fn test_include_outside_registry_is_not_found() {
        let template = Template::new("t", "{{> other }}");
        assert!(matches!(
            template.render(&TemplateContext::new()),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_registry_missing_template() {
        let registry = TemplateRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.render("base.html", &TemplateContext::new()),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_loader_registers_templates_and_static_includes() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let templates = dir.path().join("templates");
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(templates.join("partials")).unwrap();
        std::fs::create_dir_all(static_dir.join("css")).unwrap();

        std::fs::write(templates.join("base.html"), "{{> partials/head.tmpl }}").unwrap();
        std::fs::write(templates.join("partials/head.tmpl"), "<style>{{> static/css/site.css }}</style>").unwrap();
        std::fs::write(static_dir.join("css/site.css"), "body{}").unwrap();
        std::fs::write(static_dir.join("logo.png"), [0u8, 1, 2]).unwrap();

        let registry = TemplateLoader::new(&templates, &static_dir).load().unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.get("static/logo.png").is_none());
        assert_eq!(
            registry.render("base.html", &TemplateContext::new()).unwrap(),
            "<style>body{}</style>"
        );
    }

    #[test]
    fn test_loader_templates_win_name_clash() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let templates = dir.path().join("templates");
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(templates.join("static")).unwrap();
        std::fs::create_dir_all(&static_dir).unwrap();

        std::fs::write(static_dir.join("x.html"), "from static").unwrap();
        std::fs::write(templates.join("static/x.html"), "from templates").unwrap();
        std::fs::write(static_dir.join("y.txt"), "plain").unwrap();
        std::fs::write(templates.join("static/y.txt"), "ignored extension").unwrap();

        let registry = TemplateLoader::new(&templates, &static_dir).load().unwrap();
        let ctx = TemplateContext::new();
        assert_eq!(registry.render("static/x.html", &ctx).unwrap(), "from templates");
        assert_eq!(registry.render("static/y.txt", &ctx).unwrap(), "plain");
    }

    #[test]
    fn test_loader_requires_templates_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let result = TemplateLoader::new(dir.path().join("missing"), dir.path().join("static")).load();
        assert!(matches!(result, Err(TemplateError::Walk(_))));
    }

    #[test]
    fn test_loader_reports_syntax_errors() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(templates.join("base.html"), "{{ oops").unwrap();

        let result = TemplateLoader::new(&templates, dir.path().join("static")).load();
        assert!(matches!(result, Err(TemplateError::InvalidSyntax { .. })));
    }
}
