//! HTTP health endpoint for external uptime probes.
//!
//! Exposes a single readiness flag: 200 once startup housekeeping finished,
//! 503 before that. This flag tracks the bot process itself and is unrelated
//! to EverLink's heartbeat-derived status.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::error::Result;

/// Process-wide readiness flag, set once after startup housekeeping.
pub type ReadyFlag = Arc<AtomicBool>;

/// Creates a fresh not-ready flag.
pub fn ready_flag() -> ReadyFlag {
    Arc::new(AtomicBool::new(false))
}

/// Builds the health router.
pub fn router(ready: ReadyFlag) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .with_state(ready)
}

/// Binds and serves the health endpoint until the process exits.
pub async fn serve(addr: String, ready: ReadyFlag) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Health server listening on {}", addr);
    axum::serve(listener, router(ready)).await?;
    Ok(())
}

async fn health(State(ready): State<ReadyFlag>) -> impl IntoResponse {
    if ready.load(Ordering::SeqCst) {
        (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "bot": "online" })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "bot": "starting" })),
        )
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Minimal self-refreshing status page for humans hitting the root URL.
const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>EverLink Monitor Bot</title>
    <style>
      body { font-family: Arial, sans-serif; padding: 20px; background: #f5f5f5; }
      .container { max-width: 600px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; }
      .status { padding: 10px; border-radius: 4px; margin: 10px 0; font-weight: bold; }
      .online { background: #d4edda; color: #155724; }
      .offline { background: #f8d7da; color: #721c24; }
      .starting { background: #fff3cd; color: #856404; }
      code { background: #f4f4f4; padding: 2px 6px; border-radius: 3px; }
    </style>
  </head>
  <body>
    <div class="container">
      <h1>EverLink Monitor Bot</h1>
      <p>Discord bot monitoring EverLink heartbeat status</p>
      <div id="status" class="status starting">Status: Loading...</div>
      <p><small>For health checks, visit <code>/health</code></small></p>
    </div>
    <script>
      async function updateStatus() {
        const statusDiv = document.getElementById('status');
        try {
          const response = await fetch('/health');
          const data = await response.json();
          if (data.bot === 'online') {
            statusDiv.className = 'status online';
            statusDiv.textContent = 'Bot: Online';
          } else {
            statusDiv.className = 'status starting';
            statusDiv.textContent = 'Bot: Starting...';
          }
        } catch (error) {
          statusDiv.className = 'status offline';
          statusDiv.textContent = 'Connection Error';
        }
      }
      updateStatus();
      setInterval(updateStatus, 5000);
    </script>
  </body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::Response;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_not_ready() {
        let flag = ready_flag();
        let response = health(State(flag)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["bot"], "starting");
    }

    #[tokio::test]
    async fn test_health_ready() {
        let flag = ready_flag();
        flag.store(true, Ordering::SeqCst);
        let response = health(State(flag)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["bot"], "online");
    }

    #[tokio::test]
    async fn test_index_serves_html() {
        let response = index().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("EverLink Monitor Bot"));
    }
}
