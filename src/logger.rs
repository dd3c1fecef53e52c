//! Logging utilities with colored output and a watch status line.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output that only shows up with `--verbose`
//! - [`error`] for fatal messages on stderr
//! - `WatchStatus` for the single-line "change detected" display
//!
//! # Example
//!
//! ```ignore
//! log!("serve"; "http://localhost:{}", port);
//! debug!("watch"; "raw notify: {:?}", event.kind);
//! logger::error("no such file /tmp/missing.md");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stderr, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Global quiet flag (set while an editor owns the terminal)
static QUIET: AtomicBool = AtomicBool::new(false);

/// Configure output levels once the session is known.
pub fn init(verbose: bool, quiet: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
    QUIET.store(quiet, Ordering::SeqCst);
}

/// Check if verbose mode is enabled (and not silenced by quiet mode)
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst) && !is_quiet()
}

/// Check if regular log output is suppressed
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        if !$crate::logger::is_quiet() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    // Status lock first, stdout second: same order as `WatchStatus::display`.
    let mut status = WATCH_STATUS.lock();
    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();

    // A plain log line ends the status block; don't overwrite it later.
    status.detach();
}

/// Print a fatal error on stderr. Never suppressed.
pub fn error(message: &str) {
    let prefix = colorize_prefix("error", "error");
    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {message}").ok();
    stderr.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "editor" | "browser" => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch Status (single-line status with overwrite)
// ============================================================================

/// Single-line status display for watch mode
///
/// Each detected change replaces the previous status line, so a long editing
/// session leaves one line in the terminal instead of hundreds.
///
/// # Example
///
/// ```ignore
/// let mut status = WatchStatus::new();
/// status.success("change detected, 2 viewers reloaded");
/// status.warning("doc.md disappeared");
/// ```
pub struct WatchStatus {
    /// Lines of previous output to clear
    last_lines: usize,
    /// Number of status updates shown so far
    count: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    /// Create a new watch status display.
    pub const fn new() -> Self {
        Self {
            last_lines: 0,
            count: 0,
        }
    }

    /// Display success message (✓ prefix, green).
    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Display warning message (⚠ prefix, yellow).
    pub fn warning(&mut self, message: &str) {
        self.display(format!("{}", "⚠".yellow()), message);
    }

    /// Forget the previous block so the next message is printed below it.
    fn detach(&mut self) {
        self.last_lines = 0;
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines as u16;
            execute!(stdout, cursor::MoveUp(lines)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }

        self.count += 1;
        let counter = format!("[#{}]", self.count).dimmed().to_string();
        writeln!(stdout, "{counter} {symbol} {message}").ok();
        stdout.flush().ok();

        self.last_lines = line_count(message);
    }
}

/// Number of terminal lines a status message occupies.
fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

/// Global watch status: success
pub fn status_success(message: &str) {
    if !is_quiet() {
        WATCH_STATUS.lock().success(message);
    }
}

/// Global watch status: warning
pub fn status_warning(message: &str) {
    if !is_quiet() {
        WATCH_STATUS.lock().warning(message);
    }
}

// ============================================================================
// Tests
// ============================================================================
