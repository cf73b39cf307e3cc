//! Server API Port - JSON endpoints served next to the socket

use rpgboard_protocol::{HealthStatus, ServerConfig};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

#[cfg_attr(test, mockall::automock)]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait ServerApiPort: Send + Sync {
    /// `GET /api/health`
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// `GET /api/config`
    async fn config(&self) -> Result<ServerConfig, ApiError>;
}
