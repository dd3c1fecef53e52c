//! Notification channel between the session and connected browsers.
//!
//! # Modules
//!
//! - `message` - Notices pushed to viewers (`reload`, `exit`)
//! - `registry` - Viewer set and the transport-independent broadcast
//! - `server` - WebSocket listener feeding the registry

pub mod message;
pub mod registry;
pub mod server;

pub use message::Notice;
pub use registry::{NotificationChannel, ViewerRegistry};
