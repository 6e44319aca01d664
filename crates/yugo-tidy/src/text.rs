//! Character-level helpers shared by both passes.

use std::borrow::Cow;

/// Characters stripped at block boundaries. Narrower than the collapse set,
/// which is every Unicode whitespace character.
pub(crate) const SPACE_CHARS: &[char] = &[' ', '\n', '\t'];

/// Replace every run of Unicode whitespace with a single ASCII space.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }

    out
}

/// True for the empty string too.
pub(crate) fn is_all_whitespace(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

pub(crate) fn ends_with_whitespace(s: &str) -> bool {
    s.chars().next_back().is_some_and(char::is_whitespace)
}

/// Escape character data so it re-parses to the same text.
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    escape(s, |c| matches!(c, '&' | '<' | '>'))
}

/// Escape a double-quoted attribute value.
pub(crate) fn escape_attribute(s: &str) -> Cow<'_, str> {
    escape(s, |c| matches!(c, '&' | '"'))
}

fn escape(s: &str, needs_escape: impl Fn(char) -> bool) -> Cow<'_, str> {
    if !s.chars().any(&needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if needs_escape(c) {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
