//! Document server with live reload support.
//!
//! Routes:
//! - `/`, `/index.html` - the document, rendered from disk on every request
//! - `/style.css`, `/script.js` - bundled assets
//! - anything else - files under the working directory (images, etc.)

mod lifecycle;
mod path;
mod response;


pub use lifecycle::serve;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tiny_http::{Request, Server};

use crate::compiler::{PageAssets, compile_page};
use crate::embed::serve::{RELOAD_JS, ReloadVars, STYLE_CSS};
use crate::session::Session;
use crate::utils::mime::types::{CSS, HTML, JAVASCRIPT};
use crate::{debug, log};

/// Size of the request handler pool.
const HANDLER_THREADS: usize = 4;

/// What the request handlers need to know.
#[derive(Debug, Clone)]
pub struct ServeContext {
    /// Previewed document
    pub source: PathBuf,
    /// Root for relative links in the document
    pub workdir: PathBuf,
    /// Port of the notification channel, baked into `/script.js`
    pub ws_port: u16,
}

impl ServeContext {
    pub fn new(session: &Session, ws_port: u16) -> Self {
        Self {
            source: session.source.clone(),
            workdir: session.workdir.clone(),
            ws_port,
        }
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Bind the HTTP server on loopback without starting the request loop.
///
/// The port is used as given: a port in use is a startup error.
pub fn bind_server(port: u16) -> Result<BoundServer> {
    let requested = SocketAddr::from(([127, 0, 0, 1], port));
    let server = Server::http(requested)
        .map_err(|e| anyhow::anyhow!("failed to bind port {port}: {e}"))?;
    let addr = server
        .server_addr()
        .to_ip()
        .context("server is not listening on an IP socket")?;

    Ok(BoundServer {
        server: Arc::new(server),
        addr,
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared handle, used to unblock the request loop at shutdown.
    pub fn handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Start the request loop on its own thread.
    pub fn spawn(self, ctx: ServeContext) -> Result<JoinHandle<()>> {
        // Slow renders must not hold up other requests
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(HANDLER_THREADS)
            .thread_name(|i| format!("http-{i}"))
            .build()
            .context("failed to create request thread pool")?;
        let ctx = Arc::new(ctx);

        std::thread::Builder::new()
            .name("http-accept".into())
            .spawn(move || run_request_loop(&self.server, &pool, &ctx))
            .context("failed to spawn request loop")
    }
}

fn run_request_loop(server: &Server, pool: &rayon::ThreadPool, ctx: &Arc<ServeContext>) {
    for request in server.incoming_requests() {
        let ctx = Arc::clone(ctx);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
    debug!("serve"; "request loop stopped");
}

/// Handle a single HTTP request
fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    debug!("serve"; "{} {}", request.method(), request.url());

    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if !response::is_get_or_head(&request) {
        return response::respond_method_not_allowed(request);
    }

    match path::route(request.url()) {
        "/" | "/index.html" => {
            let assets = PageAssets::Linked {
                ws_port: Some(ctx.ws_port),
            };
            match compile_page(&ctx.source, assets) {
                Ok(page) => response::respond_ok(request, HTML, page),
                Err(e) => {
                    debug!("serve"; "render failed: {e:#}");
                    response::respond_render_error(request, &e)
                }
            }
        }
        "/style.css" => response::respond_ok(request, CSS, STYLE_CSS.to_string()),
        "/script.js" => {
            let js = RELOAD_JS.render(&ReloadVars {
                ws_port: ctx.ws_port,
            });
            response::respond_ok(request, JAVASCRIPT, js)
        }
        _ => match path::resolve_path(request.url(), &ctx.workdir) {
            Some(file) => response::respond_file(request, &file),
            None => response::respond_not_found(request),
        },
    }
}
