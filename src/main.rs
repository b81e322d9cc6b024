use anyhow::Context;
use clap::Parser;
use cloud_renderer::WordCloud;
use cloudword_core::{AppConfig, ErrorExt, ENV_CONFIG_PATH};
use reddit_client::{PostSource, RedditClient, RedditCredentials};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_service::{create_router, AppState};

const DEFAULT_LOG_DIRECTIVES: &str = "cloudword=info,web_service=info,reddit_client=info,tower_http=info";

#[derive(Parser)]
#[command(name = "cloudword")]
#[command(about = "Word cloud server for free text and subreddits")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding data_raw_*, data_terms_* and outputs/
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_DIRECTIVES.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    config.validate()?;

    let cloud = WordCloud::from_font_path(config.font_path.as_deref())?;
    info!("Rendering with glyph source '{}'", cloud.glyph_source().name());

    let state = match RedditCredentials::from_env() {
        Ok(credentials) => {
            let client: Arc<dyn PostSource> = Arc::new(RedditClient::new(credentials)?);
            AppState::new(config.clone(), Some(client), cloud)
        }
        Err(e) => {
            warn!("{}; subreddit endpoints are disabled", e);
            AppState::new(config.clone(), None, cloud)
                .with_unavailable_reason(e.user_friendly_message())
        }
    };

    let app = create_router(state);
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!("cloudword server listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("Shutting down gracefully, draining in-flight requests...");
}
