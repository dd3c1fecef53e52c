use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;

pub(super) const DEBOUNCE_MS: u64 = 150;
pub(super) const MISSING_GRACE_MS: u64 = 3000;
/// Re-check interval while the target is missing.
pub(super) const MISSING_POLL_MS: u64 = 250;

/// Result of a debounce flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Outcome {
    /// Target exists and was touched
    Changed,
    /// Target vanished; grace period started
    Missing,
    /// Target stayed missing for the whole grace period
    Gone,
}

/// Pure debouncer for a single target file.
///
/// Knows nothing about the watcher or the filesystem: the caller passes the
/// current time and whether the target exists.
pub(super) struct Debouncer {
    /// File name of the target inside the watched directory
    name: OsString,
    pub(super) last_event: Option<Instant>,
    pub(super) missing_since: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(target: &Path) -> Self {
        Self {
            name: target.file_name().map(OsString::from).unwrap_or_default(),
            last_event: None,
            missing_since: None,
        }
    }

    /// Record a notify event. Returns `true` if it concerns the target.
    pub(super) fn add_event(&mut self, event: &notify::Event, now: Instant) -> bool {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => {}
            // mtime/atime/chmod noise
            EventKind::Modify(ModifyKind::Metadata(_)) => return false,
            EventKind::Modify(_) => {}
            EventKind::Access(_) | EventKind::Other => return false,
        }

        let touches_target = event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(self.name.as_os_str()));
        if !touches_target {
            return false;
        }

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);
        self.last_event = Some(now);
        true
    }

    fn is_ready(&self, now: Instant) -> bool {
        self.last_event
            .is_some_and(|t| now.saturating_duration_since(t) >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Flush pending events and advance the missing-file state.
    pub(super) fn resolve(&mut self, now: Instant, exists: bool) -> Option<Outcome> {
        if self.is_ready(now) {
            self.last_event = None;
            if exists {
                self.missing_since = None;
                return Some(Outcome::Changed);
            }
            if self.missing_since.is_none() {
                self.missing_since = Some(now);
                return Some(Outcome::Missing);
            }
        }

        let since = self.missing_since?;
        if exists {
            self.missing_since = None;
            return Some(Outcome::Changed);
        }
        if now.saturating_duration_since(since) >= Duration::from_millis(MISSING_GRACE_MS) {
            return Some(Outcome::Gone);
        }
        None
    }

    /// Time until the next flush or missing-file check.
    pub(super) fn sleep_duration(&self, now: Instant) -> Duration {
        let debounce = self.last_event.map(|t| {
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(now.saturating_duration_since(t))
        });
        let missing = self.missing_since.map(|t| {
            let grace = Duration::from_millis(MISSING_GRACE_MS)
                .saturating_sub(now.saturating_duration_since(t));
            grace.min(Duration::from_millis(MISSING_POLL_MS))
        });

        match (debounce, missing) {
            (Some(a), Some(b)) => a.min(b),
            (Some(d), None) | (None, Some(d)) => d,
            (None, None) => return Duration::from_secs(86400),
        }
        .max(Duration::from_millis(1))
    }
}
