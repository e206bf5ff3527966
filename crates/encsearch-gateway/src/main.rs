//! encsearch gateway binary.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use encsearch_backends::{MongoSettings, MongoStore, PostgresSettings, RelationalStore};
use encsearch_core::{RequestLimiter, SearchService};
use encsearch_gateway::{create_router, AppState, Args, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line args
    let args = Args::parse();
    let config = GatewayConfig::from(&args);

    info!(
        listen = %config.listen_addr,
        mongodb = %args.mongodb_uri,
        postgres = %args.postgres_uri,
        "Starting encsearch gateway"
    );

    // The key decrypts relational columns in-database; it is read once and
    // passed through opaquely.
    let decrypt_key = std::fs::read_to_string(&args.key_file)
        .map_err(|e| anyhow::anyhow!("cannot read key file {}: {e}", args.key_file))?
        .trim()
        .to_string();

    let mongo_settings = MongoSettings {
        uri: args.mongodb_uri.clone(),
        database: args.mongodb_database.clone(),
        collection: args.mongodb_collection.clone(),
        timeout: config.backend_timeout,
    };
    let postgres_settings = PostgresSettings {
        uri: args.postgres_uri.clone(),
        decrypt_key,
        max_connections: args.pool_max_connections,
        timeout: config.backend_timeout,
    };

    let primary = MongoStore::connect(&mongo_settings).await?;
    let secondary = RelationalStore::connect(&postgres_settings).await?;
    info!("Connected to both stores");

    let service = SearchService::new(Arc::new(primary), Arc::new(secondary));
    let limiter = config
        .max_concurrent_requests
        .map(|max| RequestLimiter::new(max, config.throttle_wait));
    if let Some(max) = config.max_concurrent_requests {
        info!(max_concurrent = max, "Request throttling enabled");
    }

    let state = AppState::new(service, limiter, config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
