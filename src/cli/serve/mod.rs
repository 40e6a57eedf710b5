//! Lab server: the page, its API and the sandboxed documents.

mod api;
mod lifecycle;
mod response;
mod route;

use crate::{
    config::{LabConfig, cfg},
    content::{ContentStore, Curriculum},
    lab::Lab,
    log,
    utils::origin::OriginPolicy,
};
use anyhow::{Context, Result};
use api::ServeState;
use crossbeam::channel;
use std::io::Read;
use std::net::TcpListener;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};

/// Request handler threads.
const POOL_THREADS: usize = 4;

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    relay: TcpListener,
    state: Arc<ServeState>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server and the relay listener, and build the lab.
///
/// The relay is bound first: its actual port is baked into the page.
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (relay, ws_port) = crate::relay::bind(config.serve.ws_port)?;
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let origin = OriginPolicy::new(config.serve.interface, addr.port());
    let state = Arc::new(build_state(&config, origin, ws_port)?);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);
    crate::debug!("relay"; "ws://127.0.0.1:{}", ws_port);

    Ok(BoundServer {
        server,
        relay,
        state,
        shutdown_rx,
    })
}

fn build_state(config: &LabConfig, origin: OriginPolicy, ws_port: u16) -> Result<ServeState> {
    let curriculum_path = config.content.curriculum_path();
    let curriculum = Curriculum::load_or_empty(&curriculum_path)
        .with_context(|| format!("loading {}", curriculum_path.display()))?;
    crate::debug!("serve"; "{} curriculum categories", curriculum.categories.len());

    let content = ContentStore::from_config(&config.content, Arc::new(curriculum));
    let lab = Arc::new(Lab::from_config(&config.sandbox));
    Ok(ServeState::new(lab, content, config, origin, ws_port))
}

impl BoundServer {
    /// Start the relay and the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let relay = lifecycle::spawn_relay(
            self.relay,
            Arc::clone(&self.state.lab),
            self.state.origin,
            self.shutdown_rx,
        );
        run_request_loop(&self.server, &self.state)?;
        lifecycle::wait_for_shutdown(relay);
        Ok(())
    }
}

fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_THREADS)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, state: &ServeState) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let method = request.method().clone();
    let url = request.url().to_string();

    let origin = response::request_header(&request, "Origin");
    let fetch_site = response::request_header(&request, "Sec-Fetch-Site");
    if let Some(reply) = api::guard(state, &method, origin, fetch_site) {
        return response::send(request, reply);
    }

    let mut body = String::new();
    if method == Method::Put
        && let Err(e) = request.as_reader().read_to_string(&mut body)
    {
        let reply = response::Reply::error(400, &format!("unreadable body: {e}"));
        return response::send(request, reply);
    }

    let reply = api::dispatch(state, &method, &url, &body);
    crate::debug!("serve"; "{} {} -> {}", method, url, reply.status);
    response::send(request, reply)
}
