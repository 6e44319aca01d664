//! Table of contents HTML.

use yugo_core::TocEntry;

/// Render entries as a nested list. Levels are taken relative to the
/// shallowest entry, and a jump of several levels nests only one list
/// deeper, so the markup is always balanced.
///
/// Returns an empty string when there are no entries.
pub fn toc_html(entries: &[TocEntry]) -> String {
    let Some(base) = entries.iter().map(|e| e.level).min() else {
        return String::new();
    };

    let mut out = String::from("<nav class=\"toc\">\n<h2>Table of Contents</h2>\n<ul>\n");
    let mut depth = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        let level = usize::from(entry.level - base);
        if index > 0 {
            if level > depth {
                out.push_str("\n<ul>\n");
                depth += 1;
            } else {
                out.push_str("</li>\n");
                while depth > level {
                    out.push_str("</ul>\n</li>\n");
                    depth -= 1;
                }
            }
        }

        out.push_str("<li><a href=\"#");
        out.push_str(&escape(&entry.id));
        out.push_str("\">");
        out.push_str(&escape(&entry.text));
        out.push_str("</a>");
    }

    out.push_str("</li>\n");
    while depth > 0 {
        out.push_str("</ul>\n</li>\n");
        depth -= 1;
    }
    out.push_str("</ul>\n</nav>\n");
    out
}

/// Like [`toc_html`], keeping only levels within `min..=max`.
pub fn toc_html_filtered(entries: &[TocEntry], min: u8, max: u8) -> String {
    let kept: Vec<TocEntry> = entries
        .iter()
        .filter(|e| (min..=max).contains(&e.level))
        .cloned()
        .collect();
    toc_html(&kept)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: u8, id: &str, text: &str) -> TocEntry {
        TocEntry {
            level,
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_toc() {
        assert_eq!(toc_html(&[]), "");
    }

    #[test]
    fn test_nested_toc() {
        let entries = [entry(1, "a", "A"), entry(2, "b", "B"), entry(1, "c", "C")];
        assert_eq!(
            toc_html(&entries),
            "<nav class=\"toc\">\n<h2>Table of Contents</h2>\n<ul>\n\
             <li><a href=\"#a\">A</a>\n<ul>\n\
             <li><a href=\"#b\">B</a></li>\n</ul>\n</li>\n\
             <li><a href=\"#c\">C</a></li>\n\
             </ul>\n</nav>\n"
        );
    }

    #[test]
    fn test_levels_relative_to_shallowest() {
        let entries = [entry(2, "a", "A"), entry(2, "b", "B")];
        assert_eq!(
            toc_html(&entries),
            "<nav class=\"toc\">\n<h2>Table of Contents</h2>\n<ul>\n\
             <li><a href=\"#a\">A</a></li>\n\
             <li><a href=\"#b\">B</a></li>\n\
             </ul>\n</nav>\n"
        );
    }

    #[test]
    fn test_skipped_levels_stay_balanced() {
        let entries = [entry(1, "a", "A"), entry(4, "b", "B"), entry(2, "c", "C")];
        let html = toc_html(&entries);
        assert_eq!(html.matches("<ul>").count(), html.matches("</ul>").count());
        assert_eq!(html.matches("<li>").count(), html.matches("</li>").count());
    }

    #[test]
    fn test_text_is_escaped() {
        let html = toc_html(&[entry(1, "q", "A < B & \"C\"")]);
        assert!(html.contains("A &lt; B &amp; &quot;C&quot;"));
    }

    #[test]
    fn test_filtered_toc() {
        let entries = [entry(1, "t", "Title"), entry(2, "a", "A"), entry(3, "b", "B")];
        let html = toc_html_filtered(&entries, 2, 2);
        assert!(!html.contains("Title"));
        assert!(html.contains("#a"));
        assert!(!html.contains("#b"));
        assert_eq!(toc_html_filtered(&entries, 5, 6), "");
    }
}
