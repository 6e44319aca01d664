//! Tag classification for formatting purposes.
//!
//! The sets here are static and lookups are ASCII case-insensitive. They are
//! deliberately exposed as independent predicates: `wbr` is both a void
//! element (no closing tag) and an inline element (it flows with text).

/// Formatting category of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// No content model and no closing tag.
    Void,
    /// Raw content that must be reproduced verbatim.
    PreserveContent,
    /// Flows within a line of text.
    Inline,
    /// Everything else; starts its own indented line.
    Block,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const PRESERVE_ELEMENTS: &[&str] = &["pre", "script", "style", "textarea"];

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "i", "ins", "kbd",
    "label", "mark", "q", "rp", "rt", "ruby", "s", "samp", "small", "span", "strong", "sub", "sup",
    "time", "u", "var", "wbr",
];

/// Elements whose text children are not entity-decoded by the parser and
/// therefore must not be escaped on output.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe",
    "noembed",
    "noframes",
    "noscript",
    "plaintext",
    "script",
    "style",
    "xmp",
];

fn contains(set: &[&str], tag: &str) -> bool {
    set.iter().any(|name| name.eq_ignore_ascii_case(tag))
}

/// Classify a tag name. Overlapping sets resolve as
/// Void > PreserveContent > Inline.
#[must_use]
pub fn classify(tag: &str) -> Category {
    if is_void(tag) {
        Category::Void
    } else if is_preserve(tag) {
        Category::PreserveContent
    } else if is_inline(tag) {
        Category::Inline
    } else {
        Category::Block
    }
}

/// Whether the element never has a closing tag.
#[must_use]
pub fn is_void(tag: &str) -> bool {
    contains(VOID_ELEMENTS, tag)
}

/// Whether the element's content is reproduced verbatim.
#[must_use]
pub fn is_preserve(tag: &str) -> bool {
    contains(PRESERVE_ELEMENTS, tag)
}

/// Whether the element flows inline with surrounding text.
#[must_use]
pub fn is_inline(tag: &str) -> bool {
    contains(INLINE_ELEMENTS, tag)
}

/// Whether text inside the element is raw (never entity-escaped).
#[must_use]
pub fn is_raw_text(tag: &str) -> bool {
    contains(RAW_TEXT_ELEMENTS, tag)
}
