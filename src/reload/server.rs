//! WebSocket transport for the notification channel.
//!
//! Browsers connect to a loopback listener on an ephemeral port; the port is
//! baked into `/script.js`. Each connection is handshaken on the acceptor
//! thread, switched to non-blocking and registered as a [`WsViewer`].
//! A background thread polls all viewers and prunes closed ones.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::Notice;
use super::registry::{NotificationChannel, Viewer, ViewerRegistry};

/// Poll interval of the reader thread.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound for a client to finish the opening handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for socket IO once a viewer is being closed.
const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Bind the WebSocket listener and start the acceptor and reader threads.
///
/// Returns the port browsers should connect to.
pub fn start(registry: Arc<ViewerRegistry>) -> Result<u16> {
    let listener =
        TcpListener::bind("127.0.0.1:0").context("failed to bind the reload socket")?;
    let port = listener.local_addr()?.port();

    {
        let registry = Arc::clone(&registry);
        std::thread::Builder::new()
            .name("ws-accept".into())
            .spawn(move || accept_loop(listener, registry))
            .context("failed to spawn reload acceptor")?;
    }

    std::thread::Builder::new()
        .name("ws-reader".into())
        .spawn(move || reader_loop(registry))
        .context("failed to spawn reload reader")?;

    crate::debug!("ws"; "listening on 127.0.0.1:{}", port);
    Ok(port)
}

fn accept_loop(listener: TcpListener, registry: Arc<ViewerRegistry>) {
    for stream in listener.incoming() {
        if crate::core::is_shutdown() {
            break;
        }
        match stream {
            Ok(stream) => match WsViewer::accept(stream) {
                Ok(viewer) => {
                    registry.register(Arc::new(viewer));
                }
                Err(e) => crate::debug!("ws"; "handshake failed: {:#}", e),
            },
            Err(e) => {
                crate::debug!("ws"; "accept error: {}", e);
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

fn reader_loop(registry: Arc<ViewerRegistry>) {
    while !crate::core::is_shutdown() {
        std::thread::sleep(POLL_INTERVAL);
        registry.prune();
    }
}

/// A browser connected over WebSocket.
pub struct WsViewer {
    ws: Mutex<WebSocket<TcpStream>>,
    addr: SocketAddr,
}

impl WsViewer {
    /// Complete the opening handshake, then switch to non-blocking mode.
    fn accept(stream: TcpStream) -> Result<Self> {
        let addr = stream.peer_addr()?;
        stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;

        let ws = tungstenite::accept(stream)
            .map_err(|e| anyhow::anyhow!("{}: {}", addr, e))?;
        ws.get_ref().set_read_timeout(None)?;
        ws.get_ref().set_nonblocking(true)?;

        Ok(Self {
            ws: Mutex::new(ws),
            addr,
        })
    }
}

fn would_block(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Io(io) if io.kind() == ErrorKind::WouldBlock)
}

impl Viewer for WsViewer {
    fn deliver(&self, notice: Notice) -> Result<()> {
        let mut ws = self.ws.lock();
        match ws.send(Message::text(notice.as_str().to_string())) {
            Ok(()) => Ok(()),
            // Frame is buffered; the reader thread keeps flushing it.
            Err(e) if would_block(&e) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("{}: {}", self.addr, e)),
        }
    }

    fn poll_alive(&self) -> bool {
        let mut ws = self.ws.lock();
        match ws.flush() {
            Ok(()) => {}
            Err(e) if would_block(&e) => {}
            Err(_) => return false,
        }

        loop {
            match ws.read() {
                Ok(Message::Close(_)) => return false,
                Ok(_) => continue,
                Err(e) if would_block(&e) => return true,
                Err(_) => return false,
            }
        }
    }

    fn close(&self) {
        let mut ws = self.ws.lock();
        let stream = ws.get_ref();
        let _ = stream.set_nonblocking(false);
        let _ = stream.set_write_timeout(Some(CLOSE_TIMEOUT));
        let _ = stream.set_read_timeout(Some(CLOSE_TIMEOUT));
        let _ = ws.close(None);
        let _ = ws.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn connect(port: u16) -> WebSocket<tungstenite::stream::MaybeTlsStream<TcpStream>> {
        let (ws, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        if let tungstenite::stream::MaybeTlsStream::Plain(stream) = ws.get_ref() {
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .unwrap();
        }
        ws
    }

    fn wait_for(registry: &ViewerRegistry, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while registry.len() != count {
            assert!(Instant::now() < deadline, "expected {count} viewers");
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    fn read_text(ws: &mut WebSocket<tungstenite::stream::MaybeTlsStream<TcpStream>>) -> String {
        loop {
            match ws.read().unwrap() {
                Message::Text(text) => return text.as_str().to_string(),
                Message::Close(_) => return "<close>".to_string(),
                _ => continue,
            }
        }
    }

    #[test]
    fn test_broadcast_over_websocket() {
        let registry = Arc::new(ViewerRegistry::new());
        let port = start(Arc::clone(&registry)).unwrap();

        let mut a = connect(port);
        let mut b = connect(port);
        wait_for(&registry, 2);

        assert_eq!(registry.broadcast(Notice::Reload), 2);
        assert_eq!(read_text(&mut a), "reload");
        assert_eq!(read_text(&mut b), "reload");
    }

    #[test]
    fn test_closed_viewer_is_pruned() {
        let registry = Arc::new(ViewerRegistry::new());
        let port = start(Arc::clone(&registry)).unwrap();

        let mut ws = connect(port);
        wait_for(&registry, 1);

        ws.close(None).unwrap();
        let _ = ws.flush();
        wait_for(&registry, 0);
    }

    #[test]
    fn test_close_all_sends_close_frame() {
        let registry = Arc::new(ViewerRegistry::new());
        let port = start(Arc::clone(&registry)).unwrap();

        let mut ws = connect(port);
        wait_for(&registry, 1);

        registry.broadcast(Notice::Shutdown);
        registry.close_all();
        assert_eq!(read_text(&mut ws), "exit");
        assert_eq!(read_text(&mut ws), "<close>");
    }
}
