//! briefsmith binary entrypoint.

use std::sync::Arc;

use clap::Parser;

use briefsmith::api::server::{start_server, AppState};
use briefsmith::providers::OpenAiProvider;
use briefsmith::Config;

#[derive(Parser, Debug)]
#[command(
    name = "briefsmith",
    version,
    about = "AI design-brief API service with per-client request gating"
)]
struct Cli {
    /// Bind address (overrides BRIEFSMITH_BIND).
    #[arg(long)]
    bind: Option<String>,

    /// Listener port (overrides BRIEFSMITH_PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "briefsmith=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let provider = OpenAiProvider::from_config(&config.provider);
    if !provider.has_key() {
        tracing::warn!("OPENAI_API_KEY is not set; upstream calls will fail until it is provided");
    }

    tracing::info!(
        daily_limit = config.gate.daily_limit,
        cooldown_policy = ?config.gate.cooldown_policy,
        gate_mode = ?config.gate.mode,
        "starting briefsmith"
    );

    let state = AppState::new(config, Arc::new(provider));
    start_server(state).await?;
    Ok(())
}
