//! Canonical pretty-printer.
//!
//! Walks a normalized [`Document`] and writes markup with four-space
//! indentation for blocks, inline runs kept on one line, and preserved
//! content reproduced verbatim. Printing never fails.

use std::borrow::Cow;

use crate::{
    category,
    dom::{Document, NodeId, NodeKind},
    mode::Mode,
    text::{SPACE_CHARS, ends_with_whitespace, escape_attribute, escape_text},
};

const INDENT: &str = "    ";

/// Serialize a document. Expects [`normalize_whitespace`] to have run first;
/// on an un-normalized tree the output is valid but not canonical.
///
/// [`normalize_whitespace`]: crate::normalize_whitespace
#[must_use]
pub fn print_document(doc: &Document) -> String {
    let mut printer = Printer::new(doc);
    printer.print_children(Mode::Free, 0, doc.root());
    printer.out
}

struct Printer<'a> {
    doc: &'a Document,
    out: String,
}

impl<'a> Printer<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            out: String::new(),
        }
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }

    /// Whether the last write ended a line. In running text this only
    /// happens after a preserved element.
    fn at_line_start(&self) -> bool {
        self.out.ends_with('\n')
    }

    fn print_children(&mut self, mut mode: Mode, depth: usize, parent: NodeId) {
        let doc = self.doc;
        for id in doc.children(parent) {
            mode = self.print_node(mode, depth, id);
        }
    }

    fn print_node(&mut self, mode: Mode, depth: usize, id: NodeId) -> Mode {
        let doc = self.doc;
        match doc.kind(id) {
            NodeKind::Document => {
                self.print_children(mode, depth, id);
                mode
            }
            NodeKind::Doctype(text) => {
                self.out.push_str("<!DOCTYPE ");
                self.out.push_str(text);
                self.out.push_str(">\n");
                mode
            }
            NodeKind::Comment(text) => {
                if mode == Mode::Free || (mode == Mode::Normalize && self.at_line_start()) {
                    self.indent(depth);
                }
                self.out.push_str("<!--");
                self.out.push_str(text);
                self.out.push_str("-->");
                if mode == Mode::Free {
                    self.out.push('\n');
                }
                mode
            }
            NodeKind::Text(text) => self.print_text(mode, depth, id, text),
            NodeKind::Element { name, attrs } => self.print_element(mode, depth, id, name, attrs),
        }
    }

    fn print_text(&mut self, mode: Mode, depth: usize, id: NodeId, text: &str) -> Mode {
        let doc = self.doc;
        let raw = doc
            .parent(id)
            .and_then(|parent| doc.element_name(parent))
            .is_some_and(category::is_raw_text);
        let escaped = if raw {
            Cow::Borrowed(text)
        } else {
            escape_text(text)
        };

        let next = doc.next_sibling(id);
        // A non-inline element after text starts its own indented line.
        let block_follows = next
            .and_then(|next| doc.element_name(next))
            .is_some_and(|name| !category::is_inline(name));

        match mode {
            Mode::Preserve => {
                self.out.push_str(&escaped);
                Mode::Preserve
            }
            Mode::Normalize => {
                // Running text resumes on a fresh line after a preserved
                // element closed it.
                let mut escaped: &str = &escaped;
                if self.at_line_start() {
                    self.indent(depth);
                    escaped = escaped.trim_start_matches(SPACE_CHARS);
                }
                let parent_inline = doc.is_inline(doc.parent(id));
                let line_break = block_follows
                    || (!doc.is_inline(next) && (ends_with_whitespace(text) || !parent_inline));
                if line_break {
                    self.out.push_str(escaped.trim_end_matches(SPACE_CHARS));
                    self.out.push('\n');
                } else {
                    self.out.push_str(escaped);
                }
                Mode::Normalize
            }
            Mode::Free => {
                self.indent(depth);
                let trimmed = escaped.trim_start_matches(SPACE_CHARS);
                if next.is_none() || block_follows {
                    self.out.push_str(trimmed.trim_end_matches(SPACE_CHARS));
                    self.out.push('\n');
                } else {
                    self.out.push_str(trimmed);
                }
                Mode::Normalize
            }
        }
    }

    fn print_element(
        &mut self,
        mode: Mode,
        depth: usize,
        id: NodeId,
        name: &str,
        attrs: &[(String, String)],
    ) -> Mode {
        let doc = self.doc;
        let void = category::is_void(name);
        let preserve = category::is_preserve(name);
        let inline = category::is_inline(name);

        // (mode the element itself renders in, mode for its children, mode
        // for the siblings after it)
        let (render, child, next) = match mode {
            Mode::Preserve => (Mode::Preserve, Mode::Preserve, Mode::Preserve),
            Mode::Normalize if preserve => (Mode::Free, Mode::Preserve, Mode::Normalize),
            Mode::Normalize if inline => (Mode::Normalize, Mode::Normalize, Mode::Normalize),
            Mode::Normalize => (Mode::Free, Mode::Free, Mode::Free),
            Mode::Free if preserve => (Mode::Free, Mode::Preserve, Mode::Free),
            // Differs from the normalization pass on purpose: an inline
            // element opening a line is printed as one unit, its interior
            // verbatim, and the text after it continues the same line.
            Mode::Free if inline => (Mode::Free, Mode::Preserve, Mode::Normalize),
            Mode::Free => (Mode::Free, Mode::Free, Mode::Free),
        };

        if render == Mode::Free || (render == Mode::Normalize && self.at_line_start()) {
            self.indent(depth);
        }

        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attribute(value));
            self.out.push('"');
        }
        self.out.push('>');

        if void {
            if render == Mode::Free {
                self.out.push('\n');
            }
            return next;
        }

        if preserve {
            // The parser eats one newline after `<pre>` and `<textarea>`, so
            // text content always starts on its own line.
            let needs_break = doc
                .first_child(id)
                .and_then(|first| doc.text(first))
                .is_some_and(|text| !text.starts_with('\n'));
            if needs_break {
                self.out.push('\n');
            }
        } else if !inline && render == Mode::Free {
            self.out.push('\n');
        }

        self.print_children(child, depth + 1, id);

        if render == Mode::Free && !preserve && !inline {
            self.indent(depth);
        }

        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');

        let sibling = doc.next_sibling(id);
        let line_break = match render {
            Mode::Preserve => false,
            Mode::Normalize => match sibling {
                Some(_) => !doc.is_inline(sibling) && !doc.is_text(sibling),
                None => !doc.is_inline(doc.parent(id)),
            },
            Mode::Free => {
                !inline
                    || doc.is_preserve(sibling)
                    || (!doc.is_inline(sibling) && !doc.is_text(sibling))
            }
        };
        if line_break {
            self.out.push('\n');
        }

        next
    }
}
