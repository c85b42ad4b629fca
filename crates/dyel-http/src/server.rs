//! `tiny_http` listener.
//!
//! `tiny_http` blocks on `recv`, so the accept loop runs in `spawn_blocking`
//! and drives each request on the runtime through a [`Handle`]. Requests are
//! served one at a time; the repository serializes storage access anyway.

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dyel_db::{CallContext, ProgramRepository};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::error::HttpError;
use crate::router::{ApiResponse, handle};

/// How often the accept loop wakes up to look at the shutdown token.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Largest request body accepted; anything bigger gets 413.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

pub struct ApiServer {
    server: tiny_http::Server,
}

impl ApiServer {
    /// Bind the listener. Port `0` picks a free port.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Bind` if the address cannot be bound.
    pub fn bind(addr: &str) -> Result<Self, HttpError> {
        let server = tiny_http::Server::http(addr).map_err(|e| HttpError::Bind {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { server })
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until `shutdown` is cancelled.
    ///
    /// Every request gets its own [`CallContext`] with `timeout` as deadline
    /// and a child of `shutdown` as token, so in-flight work is canceled on
    /// shutdown too.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Io` if the listener fails, or `HttpError::Join` if
    /// the accept thread panics.
    pub async fn run<R>(
        self,
        repo: Arc<R>,
        timeout: Duration,
        shutdown: CancellationToken,
    ) -> Result<(), HttpError>
    where
        R: ProgramRepository + 'static,
    {
        if let Some(addr) = self.local_addr() {
            tracing::info!(%addr, "listening");
        }
        let runtime = Handle::current();
        tokio::task::spawn_blocking(move || {
            accept_loop(&self.server, &runtime, repo.as_ref(), timeout, &shutdown)
        })
        .await
        .map_err(|e| HttpError::Join(e.to_string()))?
    }
}

fn accept_loop<R: ProgramRepository>(
    server: &tiny_http::Server,
    runtime: &Handle,
    repo: &R,
    timeout: Duration,
    shutdown: &CancellationToken,
) -> Result<(), HttpError> {
    while !shutdown.is_cancelled() {
        let Some(request) = server.recv_timeout(POLL_INTERVAL)? else {
            continue;
        };
        serve_one(request, runtime, repo, timeout, shutdown);
    }
    tracing::info!("server stopped");
    Ok(())
}

fn serve_one<R: ProgramRepository>(
    mut request: tiny_http::Request,
    runtime: &Handle,
    repo: &R,
    timeout: Duration,
    shutdown: &CancellationToken,
) {
    let started = Instant::now();
    let method = request.method().to_string();
    let url = request.url().to_string();

    let response = match read_body(request.as_reader(), MAX_BODY_BYTES) {
        Ok(body) => runtime.block_on(async {
            let ctx = CallContext::with_token(shutdown.child_token()).with_timeout(timeout);
            handle(repo, &ctx, &method, &url, &body).await
        }),
        Err(response) => response,
    };

    let status = response.status;
    if let Err(e) = request.respond(into_tiny(response)) {
        tracing::warn!(error = %e, "failed to write response");
    }
    tracing::info!(
        %method,
        %url,
        status,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request"
    );
}

/// Read at most `limit` bytes of body.
fn read_body(reader: impl Read, limit: u64) -> Result<Vec<u8>, ApiResponse> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| ApiResponse::error(400, &format!("failed to read body: {e}")))?;
    if body.len() as u64 > limit {
        return Err(ApiResponse::error(
            413,
            &format!("request body exceeds {limit} bytes"),
        ));
    }
    Ok(body)
}

fn into_tiny(response: ApiResponse) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let payload = response
        .body
        .map(|body| body.to_string())
        .unwrap_or_default();
    let mut out = tiny_http::Response::from_string(payload).with_status_code(response.status);
    if response.status == 204 {
        return out;
    }
    if let Ok(header) = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        out = out.with_header(header);
    }
    out
}
