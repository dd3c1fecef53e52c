use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Keeps the watch on the target's parent directory attached.
///
/// Responsibility:
/// - Attach the directory at startup
/// - Re-attach it after it was removed and recreated
pub(super) struct WatchRoot {
    dir: PathBuf,
    attached: bool,
}

impl WatchRoot {
    pub(super) fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            attached: false,
        }
    }

    pub(super) fn attach(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;
        self.attached = true;
        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop the stale handle if the directory went away.
        if self.attached && !self.dir.exists() {
            let _ = watcher.unwatch(&self.dir);
            self.attached = false;
        }

        if self.attached || !self.dir.exists() {
            return;
        }

        if watcher.watch(&self.dir, RecursiveMode::NonRecursive).is_ok() {
            self.attached = true;
            crate::debug!("watch"; "re-attached watch: {}", self.dir.display());
        }
    }
}
