use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Appeared,
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    size: u64,
    modified: Option<SystemTime>,
}

#[derive(Debug)]
struct Tracked {
    last_seen: Snapshot,
    reported: Option<Snapshot>,
}

/// Polls the top level of one directory. A file is reported once its size
/// and mtime are unchanged across two consecutive polls.
#[derive(Debug)]
pub struct PollingDirectoryWatcher {
    dir: PathBuf,
    interval: Duration,
    tracked: HashMap<PathBuf, Tracked>,
}

impl PollingDirectoryWatcher {
    pub fn new(dir: PathBuf, interval: Duration) -> Self {
        Self {
            dir,
            interval,
            tracked: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn poll_once(&mut self) -> Vec<WatchEvent> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(dir = %self.dir.display(), %error, "cannot read watched directory");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        let mut present = Vec::new();
        for entry in entries.filter_map(Result::ok) {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let path = entry.path();
            let snapshot = Snapshot {
                size: metadata.len(),
                modified: metadata.modified().ok(),
            };
            present.push(path.clone());

            match self.tracked.get_mut(&path) {
                None => {
                    self.tracked.insert(
                        path,
                        Tracked {
                            last_seen: snapshot,
                            reported: None,
                        },
                    );
                }
                Some(tracked) if tracked.last_seen != snapshot => tracked.last_seen = snapshot,
                Some(tracked) if tracked.reported != Some(snapshot) => {
                    let kind = if tracked.reported.is_none() {
                        WatchEventKind::Appeared
                    } else {
                        WatchEventKind::Changed
                    };
                    tracked.reported = Some(snapshot);
                    events.push(WatchEvent { kind, path });
                }
                Some(_) => {}
            }
        }

        self.tracked.retain(|path, _| present.contains(path));
        events
    }

    /// Polls on a background thread until the returned handle is stopped.
    pub fn spawn<F>(mut self, mut on_event: F) -> WatchHandle
    where
        F: FnMut(WatchEvent) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let join = thread::spawn(move || {
            debug!(dir = %self.dir.display(), "watcher started");
            while !stop_flag.load(Ordering::SeqCst) {
                for event in self.poll_once() {
                    on_event(event);
                }
                thread::sleep(self.interval);
            }
            debug!(dir = %self.dir.display(), "watcher stopped");
        });
        WatchHandle {
            stop,
            join: Some(join),
        }
    }
}

pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Stops polling and joins the thread. Returns `false` when the thread
    /// had died from a panic in the event callback.
    pub fn stop(mut self) -> bool {
        self.stop.store(true, Ordering::SeqCst);
        let Some(join) = self.join.take() else {
            return true;
        };
        match join.join() {
            Ok(()) => true,
            Err(_) => {
                error!("directory watcher thread panicked");
                false
            }
        }
    }
}
