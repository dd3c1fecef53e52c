//! Session Coordinator - drives a live session from start to shutdown.
//!
//! The Coordinator is a thin orchestrator that:
//! - Starts the file watcher actor
//! - Opens the browser (detached) and the editor (awaited)
//! - Turns source changes into `reload` broadcasts
//! - Broadcasts `exit` exactly once when the session ends
//!
//! ```text
//! FsActor --SessionMsg--> Coordinator --Notice--> NotificationChannel
//!    editor exit / Ctrl+C ----^
//! ```
//!
//! The coordinator is the only broadcaster. It stops the watcher before the
//! final `exit`, so nothing is ever sent after it.

mod lifecycle;
mod runtime;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::SessionMsg;
use crate::reload::{Notice, NotificationChannel};
use crate::session::Session;
use runtime::StopReason;

pub use lifecycle::{Lifecycle, Phase};

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs a live session.
pub struct Coordinator {
    session: Arc<Session>,
    channel: Arc<dyn NotificationChannel>,
    shutdown_rx: Option<Receiver<()>>,
    lifecycle: Lifecycle,
}

impl Coordinator {
    pub fn new(session: Arc<Session>, channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            session,
            channel,
            shutdown_rx: None,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run until the editor exits or Ctrl+C, then broadcast `exit`.
    ///
    /// Only watcher setup can fail; browser and editor problems are logged.
    pub async fn run(mut self) -> Result<()> {
        let session = Arc::clone(&self.session);

        let (session_tx, session_rx) = mpsc::channel::<SessionMsg>(CHANNEL_BUFFER);
        let fs_actor = FsActor::new(session.source.clone(), session_tx)
            .with_context(|| format!("failed to watch {}", session.source.display()))?;
        let fs_handle = tokio::spawn(fs_actor.run());
        self.lifecycle.advance(Phase::LiveServing);

        if session.open_browser
            && let Err(e) = crate::launch::open_browser(&session.url(), session.browser_command.as_deref())
        {
            crate::log!("browser"; "{:#}", e);
        }

        let editor = session.editor_command().map(|command| {
            runtime::spawn_editor_task(command, session.source.clone(), session.workdir.clone())
        });

        let reason = runtime::serve_until_stopped(
            &session.source_name(),
            session_rx,
            &self.channel,
            editor,
            self.shutdown_rx.take(),
        )
        .await;

        self.lifecycle.advance(Phase::Draining);
        match reason {
            StopReason::EditorExited => crate::debug!("session"; "editor closed"),
            StopReason::Interrupted => crate::debug!("session"; "interrupted"),
        }

        fs_handle.abort();
        let _ = fs_handle.await;

        let n = self.channel.broadcast(Notice::Shutdown);
        crate::debug!("session"; "sent exit to {} viewers", n);

        self.lifecycle.advance(Phase::Exited);
        Ok(())
    }
}
