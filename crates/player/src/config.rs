//! Client configuration
//!
//! Desktop reads `.env` + environment variables; the browser connects back to
//! the page origin like `io()` with no arguments does.

use std::str::FromStr;

use rpgboard_protocol::DEFAULT_NAMESPACE;

/// Matches the server's default HOST/PORT.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Path the Socket.IO server is mounted on.
pub const DEFAULT_SOCKET_PATH: &str = "socket.io";

pub mod env_keys {
    pub const SERVER_URL: &str = "RPG_SERVER_URL";
    pub const SOCKET_PATH: &str = "RPG_SOCKET_PATH";
    pub const NAMESPACE: &str = "RPG_NAMESPACE";
    pub const RECONNECT: &str = "RPG_RECONNECT";
    pub const RECONNECT_ATTEMPTS: &str = "RPG_RECONNECT_ATTEMPTS";
    pub const RECONNECT_DELAY_MS: &str = "RPG_RECONNECT_DELAY_MS";
    pub const RECONNECT_DELAY_MAX_MS: &str = "RPG_RECONNECT_DELAY_MAX_MS";
}

/// Reconnection behavior of the realtime transport.
///
/// Defaults follow the Socket.IO client: 1s initial delay doubling up to 5s,
/// +/-50% jitter, unlimited attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    /// `None` retries forever
    pub max_attempts: Option<u32>,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub factor: f64,
    /// Fraction of the delay used as jitter, in [0, 1]
    pub randomization: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: None,
            initial_delay_ms: 1_000,
            max_delay_ms: 5_000,
            factor: 2.0,
            randomization: 0.5,
        }
    }
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the game server (http, https, ws or wss)
    pub server_url: String,
    pub socket_path: String,
    pub namespace: String,
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Build a config from a key lookup. Unknown or unparsable values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ReconnectPolicy::default();
        let server_url = lookup(env_keys::SERVER_URL)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let mut config = Self::new(server_url);

        if let Some(path) = lookup(env_keys::SOCKET_PATH) {
            let path = path.trim().trim_matches('/');
            if !path.is_empty() {
                config.socket_path = path.to_string();
            }
        }

        if let Some(namespace) = lookup(env_keys::NAMESPACE) {
            let namespace = namespace.trim();
            if namespace.starts_with('/') {
                config.namespace = namespace.to_string();
            } else if !namespace.is_empty() {
                config.namespace = format!("/{}", namespace);
            }
        }

        config.reconnect = ReconnectPolicy {
            enabled: parse_or(
                env_keys::RECONNECT,
                lookup(env_keys::RECONNECT),
                defaults.enabled,
            ),
            max_attempts: lookup(env_keys::RECONNECT_ATTEMPTS)
                .and_then(|raw| parse_value::<u32>(env_keys::RECONNECT_ATTEMPTS, &raw)),
            initial_delay_ms: parse_or(
                env_keys::RECONNECT_DELAY_MS,
                lookup(env_keys::RECONNECT_DELAY_MS),
                defaults.initial_delay_ms,
            ),
            max_delay_ms: parse_or(
                env_keys::RECONNECT_DELAY_MAX_MS,
                lookup(env_keys::RECONNECT_DELAY_MAX_MS),
                defaults.max_delay_ms,
            ),
            ..defaults
        };

        if config.reconnect.max_delay_ms < config.reconnect.initial_delay_ms {
            tracing::warn!(
                initial = config.reconnect.initial_delay_ms,
                max = config.reconnect.max_delay_ms,
                "Reconnect max delay below initial delay, raising it"
            );
            config.reconnect.max_delay_ms = config.reconnect.initial_delay_ms;
        }

        config
    }

    /// Load `.env` (if present) and read the process environment.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to load .env: {}", e);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Connect back to the origin that served the page.
    #[cfg(target_arch = "wasm32")]
    pub fn from_location() -> Self {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self::new(origin)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    raw.and_then(|raw| parse_value(key, &raw)).unwrap_or(default)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "Ignoring invalid config value");
            None
        }
    }
}
