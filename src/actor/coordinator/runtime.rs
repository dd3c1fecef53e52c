use std::future::pending;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actor::messages::SessionMsg;
use crate::reload::{Notice, NotificationChannel};

/// Why the live phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StopReason {
    EditorExited,
    Interrupted,
}

/// Launch the editor and wait for it in a task.
///
/// A launch failure counts as an editor that already exited. While the
/// editor runs, Ctrl+C is left to it.
pub(super) fn spawn_editor_task(command: String, file: PathBuf, cwd: PathBuf) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut child = match crate::launch::spawn_editor(&command, &file, &cwd) {
            Ok(child) => child,
            Err(e) => {
                crate::logger::error(&format!("{e:#}"));
                return;
            }
        };
        crate::core::set_editor_attached(true);
        let status = child.wait().await;
        crate::core::set_editor_attached(false);
        match status {
            Ok(status) => crate::debug!("editor"; "exited ({})", status),
            Err(e) => crate::logger::error(&format!("failed to wait for editor: {e}")),
        }
    })
}

/// Resolve once the Ctrl+C handler fires. Never resolves without a receiver.
async fn wait_for_signal(rx: Option<Receiver<()>>) {
    let Some(rx) = rx else {
        return pending().await;
    };
    loop {
        if rx.try_recv().is_ok() {
            crate::debug!("session"; "shutdown signal received");
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Fan watcher events out to viewers until the editor exits or Ctrl+C.
///
/// With an editor, only its exit ends the session; an interrupt is ignored.
pub(super) async fn serve_until_stopped(
    source_name: &str,
    mut session_rx: mpsc::Receiver<SessionMsg>,
    channel: &Arc<dyn NotificationChannel>,
    editor: Option<JoinHandle<()>>,
    shutdown_rx: Option<Receiver<()>>,
) -> StopReason {
    let has_editor = editor.is_some();
    let editor = async move {
        match editor {
            Some(handle) => {
                let _ = handle.await;
            }
            None => pending::<()>().await,
        }
    };
    let signal = wait_for_signal(shutdown_rx);
    tokio::pin!(editor, signal);

    let mut watching = true;
    loop {
        tokio::select! {
            msg = session_rx.recv(), if watching => match msg {
                Some(SessionMsg::SourceChanged) => {
                    let n = channel.broadcast(Notice::Reload);
                    let viewers = if n == 1 { "viewer" } else { "viewers" };
                    crate::logger::status_success(&format!(
                        "{source_name} changed, reloaded {n} {viewers}"
                    ));
                }
                Some(SessionMsg::SourceMissing) => {
                    crate::logger::status_warning(&format!("{source_name} disappeared"));
                }
                // Watcher gave up on a deleted file; keep serving.
                None => watching = false,
            },
            _ = &mut editor => return StopReason::EditorExited,
            _ = &mut signal, if !has_editor => return StopReason::Interrupted,
        }
    }
}
