//! Yugo Parser Library
//!
//! Markdown to HTML with heading anchors, table of contents extraction and
//! rewriting of links between Markdown sources.

pub mod links;
pub mod markdown;
pub mod toc;

pub use links::rewrite_link;
pub use markdown::{MarkdownError, MarkdownRenderer, ParsedMarkdown, Rendered, slugify};
pub use toc::{toc_html, toc_html_filtered};
