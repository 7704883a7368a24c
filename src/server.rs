//! HTTP server, per-request dispatch, and graceful shutdown.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`; no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::method::Method;
use crate::middleware::{cors, trace};
use crate::request::Request;
use crate::responder::{self, ApiError};
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// Largest request body read into memory; anything bigger is answered with 413.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve<S>(self, router: Router<S>) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `signal` resolves.
    pub async fn serve_with_shutdown<S>(
        self,
        router: Router<S>,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let router = Arc::new(router);

        info!(addr = %self.addr, "server is running on http://{}", self.addr);

        // Every spawned connection task, so shutdown can wait for them.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move {
                                Ok::<_, Infallible>(dispatch(&router, req).await.into_inner())
                            }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("server stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces exactly one response.
///
/// Every failure along the way is an [`ApiError`] value. It is logged and
/// rendered here, once, by [`responder::respond`]. CORS headers are added to
/// whatever response comes out.
pub async fn dispatch<S, B>(router: &Router<S>, req: http::Request<B>) -> Response
where
    S: Clone + Send + Sync + 'static,
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    trace::incoming(&parts);

    let method = parts.method.as_str().to_owned();
    let path = parts.uri.path().to_owned();
    let mut route = None;

    let mut response = match handle(router, parts, body, &mut route).await {
        Ok(res) => res,
        Err(err) => {
            trace::failure(&method, &path, route.as_deref(), &err);
            responder::respond(&err)
        }
    };
    cors::apply(&mut response);

    trace::completed(&method, &path, route.as_deref(), response.status_code(), started.elapsed());
    response
}

async fn handle<S, B>(
    router: &Router<S>,
    parts: http::request::Parts,
    body: B,
    route: &mut Option<String>,
) -> Result<Response, ApiError>
where
    S: Clone + Send + Sync + 'static,
    B: Body,
    B::Error: Into<BoxError>,
{
    let path = parts.uri.path();
    if path.is_empty() {
        return Err(ApiError::missing_path());
    }
    let method: Method = parts
        .method
        .as_str()
        .parse()
        .map_err(|_| ApiError::method_not_allowed())?;

    if method == Method::Options {
        return Ok(Response::status(Status::NoContent));
    }

    let (matched, params) = router
        .lookup(method, path)
        .ok_or_else(ApiError::route_not_found)?;
    *route = Some(matched.pattern.to_string());

    let body: Bytes = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                ApiError::body_too_large()
            } else {
                ApiError::internal(format!("failed to read request body: {e}"))
            }
        })?
        .to_bytes();

    let req = Request::new(method, path.to_owned(), parts.headers, body, params);
    matched.handler.call(req, router.state().clone()).await
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives: SIGTERM or
/// SIGINT on Unix, Ctrl-C elsewhere. A handler that cannot be installed is
/// logged and that arm never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
