//! Yugo HTML tidy
//!
//! Whitespace normalization and canonical pretty-printing for complete HTML
//! documents. The output is stable: tidying already-tidy markup returns it
//! unchanged.
//!
//! Formatting follows a few rules:
//! - runs of whitespace in text collapse to a single space;
//! - whitespace-only text between blocks is dropped;
//! - block elements are indented by four spaces per level;
//! - inline elements stay on the line of the text around them;
//! - `pre`, `script`, `style` and `textarea` content is kept verbatim.
//!
//! ```
//! let html = "<p>\n   some   <em>text</em>\n</p>";
//! let tidy = yugo_tidy::render_normalized(html).unwrap();
//! assert!(tidy.contains("        <p>\n            some <em>text</em>\n        </p>\n"));
//! ```

pub mod category;
pub mod dom;
pub mod mode;
pub mod normalize;
pub mod printer;
mod text;

pub use category::{Category, classify};
pub use dom::{Document, NodeId, NodeKind};
pub use mode::Mode;
pub use normalize::normalize_whitespace;
pub use printer::print_document;
use thiserror::Error;
use tracing::debug;

/// Tidy errors.
#[derive(Debug, Error)]
pub enum TidyError {
    /// The underlying reader failed while feeding the HTML parser.
    #[error("failed to parse HTML: {0}")]
    Parse(#[from] std::io::Error),
}

/// Result type for tidy operations.
pub type Result<T> = std::result::Result<T, TidyError>;

/// Parse, normalize and pretty-print a complete HTML document.
pub fn render_normalized(html: &str) -> Result<String> {
    let mut doc = Document::parse(html)?;
    normalize_whitespace(&mut doc);
    let output = print_document(&doc);

    debug!(
        input_bytes = html.len(),
        output_bytes = output.len(),
        "tidied HTML document"
    );
    Ok(output)
}
