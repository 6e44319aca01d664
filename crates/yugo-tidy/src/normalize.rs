//! Whitespace normalization pass.
//!
//! Rewrites text nodes in place so that the printer only has to decide where
//! line breaks go. Whitespace-only text that carries no meaning is blanked
//! and unlinked once its sibling group has been processed; removal is
//! deferred so that neighbour checks within the group see the original
//! siblings.

use tracing::trace;

use crate::{
    category,
    dom::{Document, NodeId, NodeKind},
    mode::Mode,
    text::{SPACE_CHARS, collapse_whitespace, is_all_whitespace},
};

/// Normalize whitespace across the whole document, starting in
/// [`Mode::Free`] at the root.
pub fn normalize_whitespace(doc: &mut Document) {
    let root = doc.root();
    let pruned = normalize_children(doc, Mode::Free, root);
    trace!(pruned, "normalized whitespace");
}

/// Process the children of `parent` and return how many text nodes were
/// pruned in the subtree.
fn normalize_children(doc: &mut Document, mut mode: Mode, parent: NodeId) -> usize {
    let children: Vec<NodeId> = doc.children(parent).collect();
    let mut blanked = Vec::new();
    let mut pruned = 0;

    for id in children {
        mode = normalize_node(doc, mode, id, &mut blanked, &mut pruned);
    }

    pruned += blanked.len();
    for id in blanked {
        doc.detach(id);
    }
    pruned
}

fn normalize_node(
    doc: &mut Document,
    mode: Mode,
    id: NodeId,
    blanked: &mut Vec<NodeId>,
    pruned: &mut usize,
) -> Mode {
    match doc.kind(id) {
        NodeKind::Element { name, .. } => {
            let preserve = category::is_preserve(name);
            let inline = category::is_inline(name);

            let (child_mode, next) = match mode {
                Mode::Preserve => return Mode::Preserve,
                Mode::Normalize if preserve => (Mode::Preserve, Mode::Normalize),
                Mode::Normalize if inline => (Mode::Normalize, Mode::Normalize),
                Mode::Normalize => (Mode::Free, Mode::Free),
                Mode::Free if preserve => (Mode::Preserve, Mode::Free),
                Mode::Free if inline => (Mode::Normalize, Mode::Normalize),
                Mode::Free => (Mode::Free, Mode::Free),
            };

            *pruned += normalize_children(doc, child_mode, id);
            next
        }
        NodeKind::Text(_) => normalize_text(doc, mode, id, blanked),
        NodeKind::Document | NodeKind::Doctype(_) | NodeKind::Comment(_) => {
            *pruned += normalize_children(doc, mode, id);
            mode
        }
    }
}

fn normalize_text(doc: &mut Document, mode: Mode, id: NodeId, blanked: &mut Vec<NodeId>) -> Mode {
    let Some(original) = doc.text(id) else {
        return mode;
    };

    match mode {
        Mode::Preserve => Mode::Preserve,
        Mode::Normalize => {
            let collapsed = collapse_whitespace(original);
            let blank = is_all_whitespace(&collapsed)
                && !doc.is_inline(doc.prev_sibling(id))
                && !doc.is_inline(doc.next_sibling(id));

            set_text(doc, id, if blank { String::new() } else { collapsed });
            if blank {
                blanked.push(id);
            }
            Mode::Normalize
        }
        Mode::Free => {
            let collapsed = collapse_whitespace(original);
            if is_all_whitespace(&collapsed) {
                set_text(doc, id, String::new());
                blanked.push(id);
                return Mode::Free;
            }

            // Keep the line clear for indentation under block parents.
            let block_parent = !doc.is_inline(doc.parent(id));
            let mut text = collapsed.as_str();
            if block_parent && doc.prev_sibling(id).is_none() {
                text = text.trim_start_matches(SPACE_CHARS);
            }
            if block_parent && doc.next_sibling(id).is_none() {
                text = text.trim_end_matches(SPACE_CHARS);
            }
            let text = text.to_string();
            set_text(doc, id, text);

            // Real text has been seen; the rest of the run is flowing content.
            Mode::Normalize
        }
    }
}

fn set_text(doc: &mut Document, id: NodeId, value: String) {
    if let Some(text) = doc.text_mut(id) {
        *text = value;
    }
}
