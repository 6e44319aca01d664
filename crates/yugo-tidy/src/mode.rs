/// Whitespace handling in effect for a run of sibling nodes.
///
/// A mode is never stored on a node. Each pass threads it through a sibling
/// group as a fold value: every node receives the ambient mode and returns
/// the mode for the node after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Reproduce content verbatim (`pre`, `script`, `style`, `textarea`).
    Preserve,
    /// Running text: whitespace collapses but must not disappear.
    Normalize,
    /// Between blocks: whitespace may be added or dropped freely.
    Free,
}
