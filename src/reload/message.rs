//! Notices pushed to viewers over the notification channel.
//!
//! The wire format is a bare text frame; the browser client compares the
//! frame against these literals.

use std::fmt;

/// A notification for every connected viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Source changed, fetch the document again
    Reload,
    /// Server is going away
    Shutdown,
}

impl Notice {
    /// Text frame sent to the browser.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::Shutdown => "exit",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
