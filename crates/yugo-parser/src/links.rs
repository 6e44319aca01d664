//! Rewriting of links between Markdown sources.
//!
//! `[intro](../intro.md#setup)` in a source file must point at the rendered
//! page, so the destination becomes `../intro.html#setup`. External links and
//! anything that is not a `.md` target are left alone.

use std::path::Path;

use tracing::warn;

/// Whether a link destination leaves the site.
pub fn is_external(dest: &str) -> bool {
    dest.starts_with("http://")
        || dest.starts_with("https://")
        || dest.starts_with("//")
        || dest.starts_with("mailto:")
}

/// Split `docs/x.md#sec` into `("docs/x.md", Some("sec"))`.
pub fn split_anchor(dest: &str) -> (&str, Option<&str>) {
    match dest.split_once('#') {
        Some((base, anchor)) => (base, Some(anchor)),
        None => (dest, None),
    }
}

/// Rewrite a link destination found in the source at `source_rel` (relative
/// to the content directory). Returns `None` when the link is left as is.
///
/// When `content_dir` is given the target is checked on disk and a missing
/// file is reported as a broken link; the link is rewritten either way.
pub fn rewrite_link(dest: &str, source_rel: &Path, content_dir: Option<&Path>) -> Option<String> {
    if is_external(dest) {
        return None;
    }

    let (base, anchor) = split_anchor(dest);
    let stem = base.strip_suffix(".md")?;

    if let Some(content_dir) = content_dir {
        let resolved = resolve_target(base, source_rel);
        if !content_dir.join(&resolved).exists() {
            warn!(
                link = dest,
                resolved = %resolved,
                source = %source_rel.display(),
                "broken link"
            );
        }
    }

    let mut rewritten = format!("{stem}.html");
    if let Some(anchor) = anchor {
        rewritten.push('#');
        rewritten.push_str(anchor);
    }
    Some(rewritten)
}

/// Resolve a link target to a path relative to the content directory.
/// Absolute targets are rooted at the content directory.
pub fn resolve_target(target: &str, source_rel: &Path) -> String {
    if let Some(rooted) = target.strip_prefix('/') {
        return clean_path(rooted);
    }

    let source_dir = source_rel
        .parent()
        .map(|dir| dir.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    if source_dir.is_empty() {
        clean_path(target)
    } else {
        clean_path(&format!("{source_dir}/{target}"))
    }
}

/// Lexically normalize a forward-slash path: drop `.` and empty segments and
/// fold `..` into its parent. Leading `..` that would escape the root are
/// dropped.
fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_external() {
        assert!(is_external("http://example.com/a.md"));
        assert!(is_external("https://example.com"));
        assert!(is_external("//cdn.example.com/x.md"));
        assert!(is_external("mailto:me@example.com"));
        assert!(!is_external("docs/a.md"));
        assert!(!is_external("/docs/a.md"));
    }

    #[test]
    fn test_split_anchor() {
        assert_eq!(split_anchor("a.md#sec"), ("a.md", Some("sec")));
        assert_eq!(split_anchor("a.md"), ("a.md", None));
        assert_eq!(split_anchor("#top"), ("", Some("top")));
    }

    #[test]
    fn test_rewrite_only_markdown_targets() {
        let src = Path::new("index.md");
        assert_eq!(rewrite_link("page.md", src, None), Some("page.html".to_string()));
        assert_eq!(rewrite_link("a.md#sec", src, None), Some("a.html#sec".to_string()));
        assert_eq!(rewrite_link("style.css", src, None), None);
        assert_eq!(rewrite_link("#top", src, None), None);
        assert_eq!(rewrite_link("https://x.org/a.md", src, None), None);
    }

    #[test]
    fn test_resolve_target() {
        let src = Path::new("docs/apps/page.md");
        assert_eq!(resolve_target("../intro.md", src), "docs/intro.md");
        assert_eq!(resolve_target("./sib.md", src), "docs/apps/sib.md");
        assert_eq!(resolve_target("/docs/intro.md", src), "docs/intro.md");
        assert_eq!(resolve_target("a.md", Path::new("index.md")), "a.md");
        assert_eq!(resolve_target("../../../x.md", src), "x.md");
    }
}
