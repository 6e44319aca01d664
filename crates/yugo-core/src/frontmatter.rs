//! Frontmatter parsing for content files.
//!
//! Frontmatter is free-form: whatever keys a page declares are handed to
//! templates as `page.*`. Two delimiters are recognised at the very start of
//! a file:
//!
//! ```text
//! ---                 +++
//! title: Hello        title = "Hello"
//! ---                 +++
//! ```
//!
//! YAML is a superset of JSON, so a JSON object between `---` lines works
//! as well.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

/// Parameters declared in a page's frontmatter.
pub type Params = Map<String, Value>;

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split content into frontmatter and body.
///
/// The opening delimiter must be the first non-blank line and the closing
/// delimiter must sit on a line of its own.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start();

    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };

    let delimiter = format.delimiter();
    let rest = &content[delimiter.len()..];
    let after_first = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    // Closing delimiter on its own line, possibly the very first one.
    let mut offset = 0;
    for line in after_first.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let frontmatter = after_first[..offset].trim();
            let body = after_first[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Some((format, frontmatter, body));
        }
        offset += line.len();
    }

    None
}

/// Parse frontmatter from a string, returning the parameters and the body.
///
/// Content without frontmatter yields empty parameters and the whole input
/// as body.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Params, String)> {
    let trimmed = content.trim_start();
    let opens = trimmed.starts_with("---") || trimmed.starts_with("+++");

    let Some((format, fm_str, body)) = split_frontmatter(content) else {
        if opens && first_line_is_delimiter(trimmed) {
            return Err(CoreError::frontmatter(path, "unclosed frontmatter block"));
        }
        return Ok((Params::new(), content.to_string()));
    };

    if fm_str.is_empty() {
        return Ok((Params::new(), body.to_string()));
    }

    let value = match format {
        FrontmatterFormat::Yaml => serde_yaml::from_str::<Value>(fm_str)
            .map_err(|e| CoreError::frontmatter(path, e.to_string()))?,
        FrontmatterFormat::Toml => toml::from_str::<toml::Table>(fm_str)
            .map(|table| toml_to_json(toml::Value::Table(table)))
            .map_err(|e| CoreError::frontmatter(path, e.to_string()))?,
    };

    match value {
        Value::Object(params) => Ok((params, body.to_string())),
        Value::Null => Ok((Params::new(), body.to_string())),
        other => Err(CoreError::frontmatter(
            path,
            format!("expected a mapping, found {}", json_kind(&other)),
        )),
    }
}

fn first_line_is_delimiter(content: &str) -> bool {
    let first = content.lines().next().unwrap_or_default().trim_end();
    first == "---" || first == "+++"
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Convert a TOML value to JSON. Datetimes become their RFC 3339 text;
/// non-finite floats become `null`.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
