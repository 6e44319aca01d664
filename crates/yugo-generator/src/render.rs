//! Rendering one content file into a finished HTML page.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;
use yugo_core::{ContentKind, CoreError, Options, TocEntry, parse_frontmatter};
use yugo_parser::{MarkdownError, MarkdownRenderer, ParsedMarkdown, toc_html};
use yugo_tidy::{TidyError, render_normalized};

use crate::{
    resources::LIVE_RELOAD_SCRIPT_TAG,
    template::{TemplateContext, TemplateError, TemplateRegistry},
};

/// Page rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Reading the source failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is neither Markdown nor HTML.
    #[error("not a page source: {0}")]
    Unsupported(PathBuf),

    /// Frontmatter error in an HTML page.
    #[error(transparent)]
    Frontmatter(#[from] CoreError),

    /// Markdown error.
    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    /// Template error.
    #[error("failed rendering template: {0}")]
    Template(#[from] TemplateError),

    /// Tidying the final HTML failed.
    #[error("failed normalizing HTML: {0}")]
    Tidy(#[from] TidyError),
}

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Renders content files through the base template.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    options: Options,
    templates: TemplateRegistry,
    markdown: MarkdownRenderer,
}

impl PageRenderer {
    /// Create a renderer for a site.
    pub fn new(options: Options, templates: TemplateRegistry) -> Self {
        let markdown = MarkdownRenderer::new().with_content_dir(options.content_dir());
        Self {
            options,
            templates,
            markdown,
        }
    }

    /// Render the file at `path`; `rel` is its path relative to the content
    /// directory and anchors relative links.
    pub fn render_file(&self, path: &Path, rel: &Path) -> Result<String> {
        let kind =
            ContentKind::from_path(path).ok_or_else(|| RenderError::Unsupported(path.to_path_buf()))?;
        let source = fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ParsedMarkdown { params, html, toc } = match kind {
            ContentKind::Markdown => self.markdown.parse(&source, path, rel)?,
            ContentKind::Html => {
                let (params, body) = parse_frontmatter(&source, path)?;
                ParsedMarkdown {
                    params,
                    html: body,
                    toc: Vec::new(),
                }
            }
        };

        let mut page = params;
        page.insert("toc_items".to_string(), toc_items(&toc));
        page.insert("toc".to_string(), Value::String(toc_html(&toc)));
        let page = Value::Object(page);

        let context = TemplateContext::new()
            .with_var("content", html)
            .with_var("page", page.clone())
            .with_var("site", self.options.site.clone())
            .with_var("live_reload", self.options.live_reload)
            .with_var(
                "debug_map",
                json!({
                    "page": page,
                    "site": self.options.site,
                    "live_reload": self.options.live_reload,
                }),
            );

        let mut out = self.templates.render(&self.options.base_template, &context)?;

        if self.options.live_reload {
            out = inject_live_reload(&out);
        }
        if self.options.tidy_html {
            out = render_normalized(&out)?;
        }

        debug!(path = %rel.display(), bytes = out.len(), "rendered page");
        Ok(out)
    }
}

fn toc_items(toc: &[TocEntry]) -> Value {
    toc.iter()
        .map(|entry| {
            json!({
                "level": entry.level,
                "id": entry.id,
                "text": entry.text,
            })
        })
        .collect()
}

/// Insert the live-reload script before the last `</body>`, or append it
/// when there is none. Pages that already carry it are returned unchanged.
pub fn inject_live_reload(html: &str) -> String {
    if html.contains(LIVE_RELOAD_SCRIPT_TAG) {
        return html.to_string();
    }

    // ASCII lowercasing keeps byte offsets valid.
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(index) => {
            let mut out = String::with_capacity(html.len() + LIVE_RELOAD_SCRIPT_TAG.len());
            out.push_str(&html[..index]);
            out.push_str(LIVE_RELOAD_SCRIPT_TAG);
            out.push_str(&html[index..]);
            out
        }
        None => format!("{html}{LIVE_RELOAD_SCRIPT_TAG}"),
    }
}
