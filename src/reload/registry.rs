//! Viewer registry: the transport-independent half of the notification channel.
//!
//! Viewers are held in a concurrent map. Broadcasts copy the current set
//! first and deliver outside the map, so viewers may join or leave while a
//! broadcast is in flight.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use dashmap::DashMap;

use super::message::Notice;

/// Opaque identity of a registered viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(u64);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer#{}", self.0)
    }
}

/// One connected browser tab, as seen by the registry.
///
/// `deliver` must not block: a viewer that cannot take the notice right now
/// queues it or fails.
pub trait Viewer: Send + Sync {
    /// Hand a notice to the viewer.
    fn deliver(&self, notice: Notice) -> Result<()>;

    /// Service the connection; `false` once the peer is gone.
    fn poll_alive(&self) -> bool {
        true
    }

    /// Close the transport (best effort).
    fn close(&self) {}
}

/// Broadcast channel to all currently connected viewers.
pub trait NotificationChannel: Send + Sync {
    /// Admit a viewer. It only receives notices broadcast from now on.
    fn register(&self, viewer: Arc<dyn Viewer>) -> ViewerId;

    /// Deliver to every registered viewer; returns how many accepted it.
    ///
    /// A viewer that fails is dropped; the others still get the notice.
    fn broadcast(&self, notice: Notice) -> usize;

    /// Remove a viewer. Returns `false` if it was already gone.
    fn unregister(&self, id: ViewerId) -> bool;
}

/// In-process registry of viewers.
#[derive(Default)]
pub struct ViewerRegistry {
    viewers: DashMap<ViewerId, Arc<dyn Viewer>>,
    next_id: AtomicU64,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered viewers.
    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    /// Copy of the current viewer set, safe to iterate without holding locks.
    pub fn snapshot(&self) -> Vec<(ViewerId, Arc<dyn Viewer>)> {
        self.viewers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }

    /// Poll every viewer and drop the ones whose peer went away.
    ///
    /// Returns the number of viewers removed.
    pub fn prune(&self) -> usize {
        let mut removed = 0;
        for (id, viewer) in self.snapshot() {
            if !viewer.poll_alive() && self.unregister(id) {
                crate::debug!("ws"; "{} disconnected", id);
                removed += 1;
            }
        }
        removed
    }

    /// Close and forget every viewer.
    pub fn close_all(&self) {
        for (id, viewer) in self.snapshot() {
            viewer.close();
            self.unregister(id);
        }
    }
}

impl NotificationChannel for ViewerRegistry {
    fn register(&self, viewer: Arc<dyn Viewer>) -> ViewerId {
        let id = ViewerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.viewers.insert(id, viewer);
        crate::debug!("ws"; "{} connected (total: {})", id, self.viewers.len());
        id
    }

    fn broadcast(&self, notice: Notice) -> usize {
        let viewers = self.snapshot();
        if viewers.is_empty() {
            crate::debug!("ws"; "no viewers connected");
            return 0;
        }

        let mut delivered = 0;
        for (id, viewer) in viewers {
            match viewer.deliver(notice) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    crate::debug!("ws"; "dropping {}: {}", id, e);
                    self.unregister(id);
                }
            }
        }

        crate::debug!("ws"; "sent {} to {} viewers", notice, delivered);
        delivered
    }

    fn unregister(&self, id: ViewerId) -> bool {
        self.viewers.remove(&id).is_some()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording viewers shared by channel and coordinator tests.

    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicBool;

    /// Viewer that records every notice it receives.
    #[derive(Default)]
    pub struct RecordingViewer {
        pub received: Mutex<Vec<Notice>>,
        pub fail: AtomicBool,
        pub gone: AtomicBool,
        pub closed: AtomicBool,
    }

    impl RecordingViewer {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn received(&self) -> Vec<Notice> {
            self.received.lock().clone()
        }
    }

    impl Viewer for RecordingViewer {
        fn deliver(&self, notice: Notice) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("broken pipe");
            }
            self.received.lock().push(notice);
            Ok(())
        }

        fn poll_alive(&self) -> bool {
            !self.gone.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }
}
