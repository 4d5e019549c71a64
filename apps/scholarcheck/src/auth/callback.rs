use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::errors::ClientError;

pub const CALLBACK_PATH: &str = "/auth/callback";

const DONE_PAGE: &str = "<!doctype html><title>scholarcheck</title>\
<p>Login complete. You can close this window and return to the terminal.</p>";
const FAILED_PAGE: &str = "<!doctype html><title>scholarcheck</title>\
<p>Login failed. Return to the terminal and try again.</p>";
const STALE_PAGE: &str = "<!doctype html><title>scholarcheck</title>\
<p>This login was already handled.</p>";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub token: Option<String>,
}

// The sender is taken by the first callback; later hits see `None`.
type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<Option<String>>>>>;

/// Router for the OAuth redirect. The first request delivers its token
/// (or its absence) through `tx`.
pub fn callback_router(tx: oneshot::Sender<Option<String>>) -> Router {
    let slot: CallbackSlot = Arc::new(Mutex::new(Some(tx)));
    Router::new()
        .route(CALLBACK_PATH, get(handle_callback))
        .with_state(slot)
        .layer(TraceLayer::new_for_http())
}

async fn handle_callback(
    State(slot): State<CallbackSlot>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let sender = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    let Some(sender) = sender else {
        return Html(STALE_PAGE);
    };

    let token = params.token.filter(|t| !t.trim().is_empty());
    let page = if token.is_some() { DONE_PAGE } else { FAILED_PAGE };
    if sender.send(token).is_err() {
        warn!("login callback arrived after the client stopped waiting");
    }
    Html(page)
}

/// Serves the callback on the loopback interface until one request arrives
/// or `timeout` passes. `Ok(None)` means no token was delivered.
pub async fn wait_for_token(port: u16, timeout: Duration) -> Result<Option<String>, ClientError> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("waiting for login callback on http://{addr}{CALLBACK_PATH}");

    let (token_tx, token_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let app = callback_router(token_tx);
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    let outcome = tokio::time::timeout(timeout, token_rx).await;
    let _ = stop_tx.send(());
    match tokio::time::timeout(Duration::from_secs(5), server).await {
        Ok(Ok(Err(e))) => warn!("callback listener error: {e}"),
        Ok(Err(e)) => warn!("callback listener task failed: {e}"),
        Err(_) => warn!("callback listener did not shut down in time"),
        Ok(Ok(Ok(()))) => {}
    }

    match outcome {
        Ok(Ok(token)) => Ok(token),
        Ok(Err(_)) => Ok(None),
        Err(_) => {
            warn!(secs = timeout.as_secs(), "login callback timed out");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_callback_delivers_token_once() {
        let (tx, rx) = oneshot::channel();
        let app = callback_router(tx);

        let first = app
            .clone()
            .oneshot(get_request("/auth/callback?token=jwt-123"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert!(body_text(first).await.contains("Login complete"));
        assert_eq!(rx.await.unwrap().as_deref(), Some("jwt-123"));

        let second = app
            .oneshot(get_request("/auth/callback?token=other"))
            .await
            .unwrap();
        assert!(body_text(second).await.contains("already handled"));
    }

    #[tokio::test]
    async fn test_callback_without_token_reports_failure() {
        let (tx, rx) = oneshot::channel();
        let app = callback_router(tx);

        let response = app.oneshot(get_request("/auth/callback")).await.unwrap();
        assert!(body_text(response).await.contains("Login failed"));
        assert_eq!(rx.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_other_paths_are_not_served() {
        let (tx, _rx) = oneshot::channel();
        let response = callback_router(tx)
            .oneshot(get_request("/auth/other"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wait_for_token_over_loopback() {
        let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let waiter = tokio::spawn(wait_for_token(port, Duration::from_secs(5)));
        let url = format!("http://127.0.0.1:{port}/auth/callback?token=abc");
        let mut delivered = false;
        for _ in 0..50 {
            if reqwest::get(&url).await.is_ok() {
                delivered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(delivered);
        assert_eq!(waiter.await.unwrap().unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_wait_for_token_times_out_as_none() {
        let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let token = wait_for_token(port, Duration::from_millis(50)).await.unwrap();
        assert_eq!(token, None);
    }
}
