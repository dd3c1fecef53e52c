//! Actor Message Definitions
//!
//! ```text
//! FsActor --SessionMsg--> Coordinator --Notice--> NotificationChannel
//! ```

/// Messages from the change watcher to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMsg {
    /// The source file was written (in place or replaced)
    SourceChanged,
    /// The source file disappeared; the watcher waits for it to return
    SourceMissing,
}
