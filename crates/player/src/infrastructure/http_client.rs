//! HTTP client for the server's JSON endpoints
//!
//! reqwest on desktop, gloo-net (browser fetch) on WASM. Both resolve paths
//! against the same base URL the socket uses.

use rpgboard_protocol::{HealthStatus, ServerConfig, CONFIG_PATH, HEALTH_PATH};
use serde::de::DeserializeOwned;

use crate::ports::outbound::{ApiError, ServerApiPort};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

/// Request timeout for the desktop client.
#[cfg(not(target_arch = "wasm32"))]
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for `/api/*` on the game server
#[derive(Clone)]
pub struct HttpServerApi {
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::Client,
    base_url: String,
}

impl HttpServerApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidBody(e.to_string()))
    }

    #[cfg(target_arch = "wasm32")]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = gloo_net::http::Request::get(&self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        if !response.ok() {
            return Err(ApiError::Status(response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidBody(e.to_string()))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl ServerApiPort for HttpServerApi {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(HEALTH_PATH).await
    }

    async fn config(&self) -> Result<ServerConfig, ApiError> {
        self.get_json(CONFIG_PATH).await
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and return the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });

        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let base = serve_once(
            "200 OK",
            r#"{"status":"ok","message":"RPG server is running"}"#,
        )
        .await;
        let api = HttpServerApi::new(&base);

        let health = api.health().await.unwrap();
        assert!(health.is_ok());
        assert_eq!(health.message.as_deref(), Some("RPG server is running"));
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let base = serve_once("200 OK", r#"{"grid_size":20,"max_players":10}"#).await;
        let api = HttpServerApi::new(&base);

        let config = api.config().await.unwrap();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.max_players, 10);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let base = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let api = HttpServerApi::new(&base);

        assert!(matches!(api.health().await, Err(ApiError::Status(500))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let base = serve_once("200 OK", r#"{"grid":"nope"}"#).await;
        let api = HttpServerApi::new(&base);

        assert!(matches!(api.config().await, Err(ApiError::InvalidBody(_))));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let api = HttpServerApi::new("http://127.0.0.1:5000/");
        assert_eq!(api.base_url(), "http://127.0.0.1:5000");
        assert_eq!(api.url(HEALTH_PATH), "http://127.0.0.1:5000/api/health");
    }
}
