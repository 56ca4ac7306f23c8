//! Content directory watcher.
//!
//! Watches the content root and drops cached listings when content files
//! change, so edits show up on the next read without a restart.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use thiserror::Error;
use tokio::sync::mpsc;

use super::cache::CachedIndex;
use super::store::ContentStore;

/// Errors that can occur starting the watcher
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Content root does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Changed content files in one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub category: String,
    pub paths: Vec<PathBuf>,
}

/// Watches a content root for changes to content files
#[derive(Debug, Clone)]
pub struct ContentWatcher {
    root: PathBuf,
    extension: String,
    debounce: Duration,
}

impl ContentWatcher {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
            debounce: Duration::from_millis(500),
        }
    }

    /// Set the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching.
    ///
    /// Each debounced batch invalidates `cache` for the touched categories and
    /// is then reported on the returned channel.
    pub fn watch<S>(
        &self,
        cache: Arc<CachedIndex<S>>,
    ) -> Result<(mpsc::Receiver<ContentChange>, WatchHandle), WatchError>
    where
        S: ContentStore + 'static,
    {
        if !self.root.is_dir() {
            return Err(WatchError::DirectoryNotFound(self.root.clone()));
        }
        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<DebounceEventResult>();
        let mut debouncer = new_debouncer(self.debounce, move |result: DebounceEventResult| {
            let _ = raw_tx.send(result);
        })?;
        debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;

        let (change_tx, change_rx) = mpsc::channel::<ContentChange>(100);
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let extension = self.extension.clone();

        tracing::info!("Watching {} for .{} changes", root.display(), extension);

        let task = tokio::spawn(async move {
            // Dropping the debouncer stops notifications
            let _debouncer = debouncer;

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        tracing::info!("Content watcher stopping...");
                        break;
                    }
                    result = raw_rx.recv() => {
                        let Some(result) = result else {
                            tracing::error!("Watcher channel disconnected");
                            break;
                        };

                        let events = match result {
                            Ok(events) => events,
                            Err(e) => {
                                tracing::warn!("Watcher error: {:?}", e);
                                continue;
                            }
                        };

                        let paths = events.into_iter().map(|event| event.path);
                        for change in group_changes(&root, &extension, paths) {
                            cache.invalidate(&change.category).await;
                            tracing::info!(
                                "{} file(s) changed in '{}'",
                                change.paths.len(),
                                change.category
                            );
                            let _ = change_tx.send(change).await;
                        }
                    }
                }
            }
        });

        Ok((change_rx, WatchHandle { stop_tx, task }))
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher
    pub async fn stop(self) -> anyhow::Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await?;
        Ok(())
    }
}

/// Category of a content file: its first directory under `root`
pub fn category_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();

    let category = match components.next()? {
        Component::Normal(name) => name.to_str()?.to_string(),
        _ => return None,
    };
    // A file directly under the root belongs to no category
    components.next()?;

    Some(category)
}

/// Category named by a directory directly under `root`.
///
/// Covers a category directory that was created, renamed or removed as a
/// whole. A path that no longer exists counts if it has no extension.
pub fn category_dir_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();

    let category = match components.next()? {
        Component::Normal(name) => name.to_str()?.to_string(),
        _ => return None,
    };
    if components.next().is_some() {
        return None;
    }

    let is_dir = path.is_dir() || (!path.exists() && path.extension().is_none());
    is_dir.then_some(category)
}

/// Group changed paths by category, keeping content files and whole
/// category directories
pub fn group_changes(
    root: &Path,
    extension: &str,
    paths: impl IntoIterator<Item = PathBuf>,
) -> Vec<ContentChange> {
    let mut changes: Vec<ContentChange> = Vec::new();

    for path in paths {
        // Same case-sensitive match as `FsStore::list`
        let is_content = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == extension)
            .unwrap_or(false);

        let category = if is_content {
            category_of(root, &path)
        } else {
            category_dir_of(root, &path)
        };
        let Some(category) = category else {
            continue;
        };

        match changes.iter_mut().find(|c| c.category == category) {
            Some(change) => {
                if !change.paths.contains(&path) {
                    change.paths.push(path);
                }
            }
            None => changes.push(ContentChange {
                category,
                paths: vec![path],
            }),
        }
    }

    changes
}
