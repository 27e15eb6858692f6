use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use logview_server::{app, config, AppState, Config, MongoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // RUST_LOG wins over DEBUG
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::log_directive_from_env()));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::from_env()?;

    let host_name = hostname::get()
        .context("failed to resolve host name")?
        .to_string_lossy()
        .into_owned();

    tracing::info!(
        uri = %config.mongo_uri,
        database = %config.database,
        collection = %config.collection,
        "[server] database connection info"
    );
    tracing::info!("[server] using {} as timezone", config.timezone);
    tracing::info!("[server] CORS enabled");

    let addr = config.listen_addr();
    let state = Arc::new(AppState {
        store: Arc::new(MongoStore::new(&config)),
        config,
        host_name,
    });

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("[server] failed to bind {}: {}", addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("[server] listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
