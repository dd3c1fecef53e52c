use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::Coordinator;
use crate::cli::{Parsed, parse_args};
use crate::reload::registry::testing::RecordingViewer;
use crate::reload::{Notice, NotificationChannel, ViewerRegistry};
use crate::session::{Env, Session};

fn session(args: &[&str]) -> (TempDir, Arc<Session>) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    std::fs::write(root.join("doc.md"), "# Doc\n").unwrap();

    let argv = ["mdlive", "doc.md", "-w"].into_iter().chain(args.iter().copied());
    let Ok(Parsed::Run(cli)) = parse_args(argv) else {
        panic!("bad test args: {args:?}");
    };
    let session = Session::from_cli(&cli, &root, &Env::default()).unwrap();
    (dir, Arc::new(session))
}

fn channel_with_viewer() -> (Arc<ViewerRegistry>, Arc<RecordingViewer>) {
    let registry = Arc::new(ViewerRegistry::new());
    let viewer = RecordingViewer::new();
    registry.register(viewer.clone());
    (registry, viewer)
}

#[cfg(unix)]
#[tokio::test]
async fn test_editor_exit_sends_single_exit() {
    let (_dir, session) = session(&["-e", "true"]);
    let (registry, viewer) = channel_with_viewer();

    tokio::time::timeout(
        Duration::from_secs(10),
        Coordinator::new(session, registry).run(),
    )
    .await
    .expect("coordinator should finish when the editor exits")
    .unwrap();

    assert_eq!(viewer.received(), vec![Notice::Shutdown]);
}

#[tokio::test]
async fn test_missing_editor_still_sends_exit() {
    let (_dir, session) = session(&["-e", "mdlive-no-such-editor"]);
    let (registry, viewer) = channel_with_viewer();

    tokio::time::timeout(
        Duration::from_secs(10),
        Coordinator::new(session, registry).run(),
    )
    .await
    .expect("coordinator should not wait on an editor that never started")
    .unwrap();

    assert_eq!(viewer.received(), vec![Notice::Shutdown]);
}

#[tokio::test]
async fn test_changes_then_interrupt() {
    let (_dir, session) = session(&[]);
    let (registry, viewer) = channel_with_viewer();
    let (tx, rx) = crossbeam::channel::bounded(1);
    let source: PathBuf = session.source.clone();

    let channel: Arc<dyn NotificationChannel> = registry;
    let handle = tokio::spawn(Coordinator::new(session, channel).with_shutdown_signal(rx).run());

    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&source, "# Doc\n\nedited\n").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !viewer.received().contains(&Notice::Reload) {
        assert!(Instant::now() < deadline, "no reload after a change");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("coordinator should stop on interrupt")
        .unwrap()
        .unwrap();

    let received = viewer.received();
    assert_eq!(received.last(), Some(&Notice::Shutdown));
    assert_eq!(
        received.iter().filter(|n| **n == Notice::Shutdown).count(),
        1
    );
    assert!(received[..received.len() - 1]
        .iter()
        .all(|n| *n == Notice::Reload));
}

#[cfg(unix)]
#[tokio::test]
async fn test_interrupt_waits_for_open_editor() {
    let bin = TempDir::new().unwrap();
    let script = bin.path().join("slow-editor.sh");
    std::fs::write(&script, "sleep 1\n").unwrap();
    let editor = format!("sh {}", script.display());

    let (_dir, session) = session(&["-e", &editor]);
    let (registry, viewer) = channel_with_viewer();
    let (tx, rx) = crossbeam::channel::bounded(1);

    let started = Instant::now();
    let channel: Arc<dyn NotificationChannel> = registry;
    let handle = tokio::spawn(Coordinator::new(session, channel).with_shutdown_signal(rx).run());

    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!handle.is_finished(), "session ended while the editor was open");
    assert!(viewer.received().is_empty());

    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("coordinator should finish once the editor exits")
        .unwrap()
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(viewer.received(), vec![Notice::Shutdown]);
}

#[tokio::test]
async fn test_no_viewers_is_fine() {
    let (_dir, session) = session(&["-e", "mdlive-no-such-editor"]);
    let registry = Arc::new(ViewerRegistry::new());

    Coordinator::new(session, registry.clone()).run().await.unwrap();
    assert!(registry.is_empty());
}
