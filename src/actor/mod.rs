//! Actor System for Live Reload
//!
//! Message-passing concurrency for watch mode:
//!
//! ```text
//! FsActor --SessionMsg--> Coordinator --Notice--> viewers
//! (watch)                 (lifecycle)             (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types between actors
//! - `fs` - File watcher with debouncing
//! - `coordinator` - Wires up the watcher, editor and browser, owns shutdown

pub mod coordinator;
pub mod fs;
pub mod messages;

pub use coordinator::Coordinator;
