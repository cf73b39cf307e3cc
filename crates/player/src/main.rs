//! rpgboard Player - terminal client binary.

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpgboard_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting rpgboard Player");

    let config = rpgboard_player::ClientConfig::from_env();
    rpgboard_player::runner::run_terminal(config).await
}

// The browser build starts from `rpgboard_player::start`.
#[cfg(target_arch = "wasm32")]
fn main() {}
