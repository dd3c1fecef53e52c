//! FileSystem Actor
//!
//! Watches the source document and tells the coordinator when it changed.
//! Implements the "Watcher-First" pattern: the watcher is armed in `new`, so
//! events that happen before `run` starts are buffered, not lost.
//!
//! Architecture:
//! ```text
//! Watcher (parent dir) → Debouncer (target filter, timing) → SessionMsg
//! ```
//!
//! The parent directory is watched instead of the file itself: editors that
//! save by writing a temp file and renaming it over the target replace the
//! inode, and a file watch would go deaf after the first save.

use std::path::PathBuf;
use std::time::Instant;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::SessionMsg;

// Pure timing and missing-file state.
mod debouncer;
// Parent directory attach/re-attach lifecycle.
mod watch_roots;


use debouncer::{Debouncer, Outcome};
use watch_roots::WatchRoot;

/// FileSystem Actor - watches one source file
pub struct FsActor {
    /// Absolute path of the watched file
    target: PathBuf,
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_root: WatchRoot,
    /// Channel to the coordinator
    session_tx: mpsc::Sender<SessionMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Create the actor and start watching immediately.
    pub fn new(target: PathBuf, session_tx: mpsc::Sender<SessionMsg>) -> notify::Result<Self> {
        let dir = target
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| notify::Error::generic("source file has no parent directory"))?;

        // notify doesn't support async
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_root = WatchRoot::new(dir);
        watch_root.attach(&mut watcher)?;

        Ok(Self {
            debouncer: Debouncer::new(&target),
            target,
            notify_rx,
            watcher,
            watch_root,
            session_tx,
        })
    }

    /// Run the actor event loop.
    ///
    /// Returns when the target is gone for good or the coordinator hung up.
    /// Dropping the future (task abort) stops the watcher.
    pub async fn run(self) {
        let Self {
            target,
            notify_rx,
            mut watcher,
            mut watch_root,
            session_tx,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Bridge thread; exits once the watcher (and its sender) is dropped.
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::debug!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => {
                    let Some(event) = event else { break };
                    debouncer.add_event(&event, Instant::now());
                }
                _ = tokio::time::sleep(debouncer.sleep_duration(Instant::now())) => {
                    watch_root.maintain(&mut watcher);

                    let msg = match debouncer.resolve(Instant::now(), target.is_file()) {
                        Some(Outcome::Changed) => SessionMsg::SourceChanged,
                        Some(Outcome::Missing) => SessionMsg::SourceMissing,
                        Some(Outcome::Gone) => {
                            crate::debug!("watch"; "{} is gone, watcher stopped", target.display());
                            break;
                        }
                        None => continue,
                    };
                    if session_tx.send(msg).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}
