//! HTTP endpoints served next to the realtime socket

use serde::{Deserialize, Serialize};

pub const HEALTH_PATH: &str = "/api/health";
pub const CONFIG_PATH: &str = "/api/config";

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Body of `GET /api/config`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub grid_size: u32,
    pub max_players: u32,
}
