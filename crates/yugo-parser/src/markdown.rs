//! Markdown renderer using pulldown-cmark.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use thiserror::Error;
use tracing::debug;
use yugo_core::{Params, TocEntry, frontmatter::parse_frontmatter};

use crate::links::rewrite_link;

/// Markdown errors.
#[derive(Debug, Error)]
pub enum MarkdownError {
    /// Failed to parse frontmatter.
    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] yugo_core::CoreError),
}

/// Result type for markdown operations.
pub type Result<T> = std::result::Result<T, MarkdownError>;

/// Rendered Markdown body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    /// HTML fragment.
    pub html: String,

    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// A Markdown page: frontmatter parameters plus the rendered body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMarkdown {
    /// Frontmatter parameters.
    pub params: Params,

    /// Rendered HTML fragment.
    pub html: String,

    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer with heading anchors and `.md` link rewriting.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    content_dir: Option<PathBuf>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a new renderer with default options.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            options,
            content_dir: None,
        }
    }

    /// Check rewritten link targets against this content directory.
    pub fn with_content_dir(mut self, content_dir: impl Into<PathBuf>) -> Self {
        self.content_dir = Some(content_dir.into());
        self
    }

    /// Parse a Markdown source with frontmatter. `path` is used in error
    /// messages; `source_rel` is the file's location under the content
    /// directory, used to resolve relative links.
    pub fn parse(&self, content: &str, path: &Path, source_rel: &Path) -> Result<ParsedMarkdown> {
        let (params, body) = parse_frontmatter(content, path)?;
        let Rendered { html, toc } = self.render(&body, source_rel);

        Ok(ParsedMarkdown { params, html, toc })
    }

    /// Render a Markdown body (no frontmatter) to HTML.
    pub fn render(&self, body: &str, source_rel: &Path) -> Rendered {
        let mut events: Vec<Event<'_>> = Parser::new_ext(body, self.options).collect();

        let toc = self.assign_heading_ids(&mut events);
        self.rewrite_links(&mut events, source_rel);

        let mut html = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut html, events.into_iter());

        debug!(
            source = %source_rel.display(),
            headings = toc.len(),
            "rendered markdown"
        );
        Rendered { html, toc }
    }

    /// Give every heading an id (explicit `{#id}` wins, otherwise a unique
    /// slug of its text) and collect the table of contents.
    fn assign_heading_ids(&self, events: &mut [Event<'_>]) -> Vec<TocEntry> {
        let mut used: HashSet<String> = events
            .iter()
            .filter_map(|event| match event {
                Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
                _ => None,
            })
            .collect();

        let mut toc = Vec::new();
        let mut current: Option<(usize, String)> = None;

        for index in 0..events.len() {
            match &events[index] {
                Event::Start(Tag::Heading { .. }) => {
                    current = Some((index, String::new()));
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, heading_text)) = current.as_mut() {
                        heading_text.push_str(text);
                    }
                }
                Event::End(TagEnd::Heading(level)) => {
                    let level = *level as u8;
                    let Some((start, text)) = current.take() else {
                        continue;
                    };

                    if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                        let anchor = match id {
                            Some(explicit) => explicit.to_string(),
                            None => {
                                let anchor = unique_id(&slugify(&text), &mut used);
                                *id = Some(CowStr::from(anchor.clone()));
                                anchor
                            }
                        };
                        toc.push(TocEntry {
                            level,
                            id: anchor,
                            text,
                        });
                    }
                }
                _ => {}
            }
        }

        toc
    }

    fn rewrite_links(&self, events: &mut [Event<'_>], source_rel: &Path) {
        for event in events.iter_mut() {
            if let Event::Start(Tag::Link { dest_url, .. }) = event {
                if let Some(rewritten) =
                    rewrite_link(dest_url, source_rel, self.content_dir.as_deref())
                {
                    *dest_url = CowStr::from(rewritten);
                }
            }
        }
    }
}

/// Pick `base`, or `base-1`, `base-2`, ... if it is taken, and mark it used.
fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let base = if base.is_empty() { "heading" } else { base };
    let mut candidate = base.to_string();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Convert text to a URL-safe slug: lowercase alphanumerics, every other
/// run of characters becomes a single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
