//! Single-use localhost listener that captures the OAuth redirect.
//!
//! The server runs on its own task. The first request to the callback path
//! resolves a one-shot channel and triggers shutdown; later requests get the
//! same page but are ignored. Request details are never logged.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;

use crate::error::{OAuthError, Result};
use crate::oauth::CALLBACK_PATH;

/// How long to wait for in-flight connections after shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Claw-Log</title></head>
<body style="font-family: system-ui, sans-serif; text-align: center; padding: 60px;">
<h1>Login complete</h1>
<p>Claw-Log is now signed in.</p>
<p>You can close this window and return to the terminal.</p>
</body>
</html>"#;

/// Query parameters captured from the redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackResult {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Provider `error` parameter, e.g. `access_denied`.
    pub error: Option<String>,
}

/// Shared between the handler and the listener owner.
struct CallbackState {
    sender: Mutex<Option<oneshot::Sender<CallbackResult>>>,
    shutdown: Arc<Notify>,
}

/// A bound, running callback listener.
pub struct CallbackListener {
    local_addr: SocketAddr,
    receiver: oneshot::Receiver<CallbackResult>,
    shutdown: Arc<Notify>,
    server: JoinHandle<()>,
}

impl std::fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackListener")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

impl CallbackListener {
    /// Bind `addr` and start serving. Returns once the socket is accepting.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                OAuthError::PortInUse { port: addr.port() }
            } else {
                OAuthError::Bind {
                    addr: addr.to_string(),
                    source: e,
                }
            }
        })?;
        let local_addr = listener.local_addr().map_err(|e| OAuthError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        let (sender, receiver) = oneshot::channel();
        let shutdown = Arc::new(Notify::new());
        let state = Arc::new(CallbackState {
            sender: Mutex::new(Some(sender)),
            shutdown: shutdown.clone(),
        });

        let signal = shutdown.clone();
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, router(state))
                .with_graceful_shutdown(async move { signal.notified().await })
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Callback listener stopped with an error");
            }
        });

        tracing::debug!(addr = %local_addr, "Callback listener bound");
        Ok(Self {
            local_addr,
            receiver,
            shutdown,
            server,
        })
    }

    /// Address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the callback, then stop the server and release the socket.
    ///
    /// The socket is released before this returns on every path.
    pub async fn wait(self, timeout: Duration) -> Result<CallbackResult> {
        let Self {
            receiver,
            shutdown,
            server,
            ..
        } = self;

        let outcome = tokio::time::timeout(timeout, receiver).await;
        stop_server(&shutdown, server).await;

        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(OAuthError::Network(
                "callback listener closed before a redirect arrived".to_string(),
            )),
            Err(_) => Err(OAuthError::CallbackTimeout { timeout }),
        }
    }

    /// Stop without waiting for a callback.
    pub async fn close(self) {
        stop_server(&self.shutdown, self.server).await;
    }
}

async fn stop_server(shutdown: &Notify, mut server: JoinHandle<()>) {
    shutdown.notify_one();
    if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
        server.abort();
        let _ = server.await;
    }
    tracing::debug!("Callback listener released");
}

fn router(state: Arc<CallbackState>) -> Router {
    Router::new()
        .route(CALLBACK_PATH, get(handle_callback))
        .fallback(handle_not_found)
        .with_state(state)
}

/// Handle GET /auth/callback
async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let sender = state.sender.lock().take();
    if let Some(sender) = sender {
        let result = CallbackResult {
            code: params.get("code").cloned(),
            state: params.get("state").cloned(),
            error: params.get("error").cloned(),
        };
        let _ = sender.send(result);
        state.shutdown.notify_one();
    }

    Html(SUCCESS_PAGE)
}

async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
