//! Live session lifecycle: bind, serve, coordinate, shut down.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver};

use super::{ServeContext, bind_server};
use crate::actor::Coordinator;
use crate::reload::{NotificationChannel, ViewerRegistry};
use crate::session::Session;
use crate::{core, debug, log};

/// Run a live session until the editor exits or Ctrl+C.
///
/// Startup failures (port in use, watcher setup) are returned before any
/// viewer could have connected.
pub fn serve(session: Arc<Session>) -> Result<()> {
    let bound = bind_server(session.port)?;
    let registry = Arc::new(ViewerRegistry::new());
    let ws_port = crate::reload::server::start(Arc::clone(&registry))?;

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    core::register_server(bound.handle(), shutdown_tx);

    debug!("serve"; "bound {}, reload socket on {}", bound.addr(), ws_port);
    let http = bound.spawn(ServeContext::new(&session, ws_port))?;
    log!("serve"; "{} → {}", session.source_name(), session.url());

    let channel: Arc<dyn NotificationChannel> = registry.clone();
    let result = run_coordinator(session, channel, shutdown_rx);

    if !registry.is_empty() {
        debug!("serve"; "closing {} viewer connections", registry.len());
        registry.close_all();
    }
    core::stop_server();
    wait_for_shutdown(http);
    result
}

fn run_coordinator(
    session: Arc<Session>,
    channel: Arc<dyn NotificationChannel>,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(
        Coordinator::new(session, channel)
            .with_shutdown_signal(shutdown_rx)
            .run(),
    )
}

/// Wait for the request loop to finish (max 2 seconds).
fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    debug!("serve"; "request loop did not stop in time");
}
