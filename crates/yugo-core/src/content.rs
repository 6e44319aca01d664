//! Content types and structures.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    frontmatter::{Params, parse_frontmatter},
};

/// Kind of page source under `content/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Markdown content (.md files), converted to HTML.
    Markdown,
    /// HTML content (.html files), used as-is.
    Html,
}

impl ContentKind {
    /// Determine content kind from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Determine content kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Map a content-relative source path to its output path: Markdown becomes
/// `.html`, everything else keeps its name.
pub fn output_rel_path(rel: &Path) -> PathBuf {
    match ContentKind::from_path(rel) {
        Some(ContentKind::Markdown) => rel.with_extension("html"),
        _ => rel.to_path_buf(),
    }
}

/// A heading collected for the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,

    /// Anchor id of the heading.
    pub id: String,

    /// Plain heading text.
    pub text: String,
}

/// A content file split into frontmatter parameters and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Frontmatter parameters.
    pub params: Params,

    /// Source body after the frontmatter.
    pub body: String,
}

impl Page {
    /// Parse a page source. `path` is only used for error messages.
    pub fn parse(source: &str, path: &Path) -> Result<Self> {
        let (params, body) = parse_frontmatter(source, path)?;
        Ok(Self { params, body })
    }

    /// A string parameter, if present.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}
