//! Process-wide shutdown state.
//!
//! - `SHUTDOWN`: has shutdown begun? (Ctrl+C received or the editor exited)
//! - `SERVER`: the HTTP server to unblock once viewers were told to leave
//! - `SHUTDOWN_TX`: wakes the coordinator on Ctrl+C
//! - `EDITOR_ATTACHED`: an editor owns the terminal, Ctrl+C is meant for it

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

/// Shutdown has been requested
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for the coordinator
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// A spawned editor is running in the foreground
static EDITOR_ATTACHED: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a server has been registered:
/// - Before `register_server()`: exit immediately, nothing to drain
/// - After `register_server()`: wake the coordinator, which tells viewers
///   to leave before the server stops
/// - A second Ctrl+C while draining exits immediately
/// - While an editor is attached the signal belongs to the editor and is
///   ignored; the session ends when the editor exits
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if is_editor_attached() {
            crate::debug!("serve"; "Ctrl+C left to the editor");
            return;
        }

        let already = SHUTDOWN.swap(true, Ordering::SeqCst);

        match SHUTDOWN_TX.get() {
            Some(tx) if !already => {
                crate::log!("serve"; "shutting down...");
                let _ = tx.send(());
            }
            _ => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Mark shutdown and unblock the registered HTTP server's request loop
pub fn stop_server() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    if let Some(server) = SERVER.get() {
        server.unblock();
    }
}

/// Check if shutdown has been requested
///
/// Uses Relaxed ordering: worst case a few more requests are served
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Mark whether a spawned editor currently owns the terminal
pub fn set_editor_attached(attached: bool) {
    EDITOR_ATTACHED.store(attached, Ordering::SeqCst);
}

/// Check if Ctrl+C should be left to the editor
fn is_editor_attached() -> bool {
    EDITOR_ATTACHED.load(Ordering::SeqCst)
}
