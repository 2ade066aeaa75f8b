//! File watching for live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Markdown content changed
    ContentModified(PathBuf),

    /// A stylesheet changed
    StyleModified(PathBuf),

    /// A template, layout or data file changed
    TemplateModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// Any other modification
    Modified(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::ContentModified(p)
            | Self::StyleModified(p)
            | Self::TemplateModified(p)
            | Self::Created(p)
            | Self::Deleted(p)
            | Self::Modified(p) => p,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths. Paths that do not exist are skipped.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if !path.exists() {
                tracing::debug!("Not watching {}: path does not exist", path.display());
                continue;
            }

            let mode = if path.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            watcher.watch(path, mode).map_err(std::io::Error::other)?;
            tracing::debug!("Watching {}", path.display());
        }

        // Forward events from notify's thread to the async side
        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                // Debounce rapid events
                let now = Instant::now();
                if last_event_time.is_some_and(|last| now.duration_since(last) < debounce_duration) {
                    continue;
                }
                last_event_time = Some(now);

                for path in event.paths {
                    if let Some(e) = classify_event(&path, &event.kind) {
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => match ext {
            "md" => Some(WatchEvent::ContentModified(path.to_path_buf())),
            "css" => Some(WatchEvent::StyleModified(path.to_path_buf())),
            "html" | "njk" | "json" | "yaml" | "yml" | "toml" => {
                Some(WatchEvent::TemplateModified(path.to_path_buf()))
            }
            _ => Some(WatchEvent::Modified(path.to_path_buf())),
        },
        _ => None,
    }
}
