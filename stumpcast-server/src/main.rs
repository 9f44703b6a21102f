use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stumpcast_core::{
    DownstreamPublisher, NoopPublisher, RedisStreamPublisher, SqliteCommentaryStore,
};
use stumpcast_server::{AppState, infra::config::Config, routes};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "stumpcast-server")]
#[command(about = "Live cricket commentary broadcast server")]
struct Cli {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,stumpcast_server=debug,stumpcast_core=debug",
                )
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    let store = SqliteCommentaryStore::connect(&config.database_url)
        .await
        .context("failed to open commentary database")?;
    store
        .init_schema()
        .await
        .context("failed to initialize commentary schema")?;

    let publisher: Arc<dyn DownstreamPublisher> = match config.redis_url.as_deref() {
        Some(redis_url) => {
            match RedisStreamPublisher::connect(redis_url, config.commentary_topic.clone()).await {
                Ok(publisher) => Arc::new(publisher),
                Err(err) => {
                    // The mirror is best-effort; a missing sink never stops
                    // the server.
                    warn!(error = %err, "Downstream sink unavailable, mirroring disabled");
                    Arc::new(NoopPublisher)
                }
            }
        }
        None => {
            info!("No REDIS_URL configured, downstream mirroring disabled");
            Arc::new(NoopPublisher)
        }
    };

    let config = Arc::new(config);
    let state = AppState::new(Arc::new(store), publisher, Arc::clone(&config));
    let router = routes::create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting Stumpcast server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}
