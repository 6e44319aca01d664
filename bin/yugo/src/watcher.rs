//! Watching the site directory for changes.

use std::{
    path::{Component, Path, PathBuf},
    time::Duration,
};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// File and directory names whose changes never trigger a rebuild.
const IGNORED_NAMES: &[&str] = &[".git", ".DS_Store"];

/// Whether a change at `path` should be ignored: anything inside the output
/// directory (a build writes there), and anything with an ignored name in
/// its path.
pub fn should_ignore(path: &Path, out_dir: &Path) -> bool {
    if path.starts_with(out_dir) {
        return true;
    }
    path.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| IGNORED_NAMES.contains(&name)),
        _ => false,
    })
}

/// Whether an event is a content change: a create, a remove, a write or a
/// rename of at least one path that is not ignored.
pub fn is_relevant(event: &Event, out_dir: &Path) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    );
    kind_matches && event.paths.iter().any(|path| !should_ignore(path, out_dir))
}

/// Watches a site directory recursively and reports relevant changes.
pub struct SiteWatcher {
    // Dropping the watcher stops the notifications.
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<PathBuf>,
}

impl SiteWatcher {
    /// Start watching `site_dir`, ignoring changes under `out_dir`.
    pub fn new(site_dir: &Path, out_dir: &Path) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let out_dir = out_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant(&event, &out_dir) => {
                    trace!(?event, "change detected");
                    if let Some(path) = event.paths.into_iter().next() {
                        let _ = tx.send(path);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "watch error"),
            },
            notify::Config::default(),
        )?;
        watcher.watch(site_dir, RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait for the next burst of changes to settle. Returns the paths seen,
    /// or `None` once the watcher has shut down.
    pub async fn next_batch(&mut self, debounce: Duration) -> Option<Vec<PathBuf>> {
        debounce_batch(&mut self.rx, debounce).await
    }
}

/// Trailing debounce: wait for a first item, then keep collecting until no
/// new item arrives for `quiet`.
pub async fn debounce_batch<T>(
    rx: &mut mpsc::UnboundedReceiver<T>,
    quiet: Duration,
) -> Option<Vec<T>> {
    let mut batch = vec![rx.recv().await?];
    loop {
        match tokio::time::timeout(quiet, rx.recv()).await {
            Ok(Some(item)) => batch.push(item),
            // Closed mid-burst: still deliver what arrived.
            Ok(None) | Err(_) => return Some(batch),
        }
    }
}
