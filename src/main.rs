mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod search;
mod services;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use search::handoff::HandoffSlot;
use search::{HandoffChannel, MemorySlot};
use services::{CachedPropertyStore, EmailClient, PgPropertyStore, PropertyStore, RedisCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        agency = %settings.agency.name,
        "Starting agency site backend"
    );

    // Create database pool
    let pool = db::create_pool(&settings).await?;

    // Create Redis cache
    let cache = RedisCache::new(&settings.redis_url, settings.redis_cache_ttl_seconds).await?;
    tracing::info!("Redis cache initialized");

    // Listings are read through the Redis cache
    let properties: Arc<dyn PropertyStore> = Arc::new(CachedPropertyStore::new(
        PgPropertyStore::new(pool.clone()),
        cache.clone(),
    ));

    // Quick-search hand-off slots live in Redis next to the cache
    let slot: Arc<dyn HandoffSlot> = if settings.handoff_in_memory {
        tracing::warn!("Hand-off slots kept in memory; run a single instance only");
        Arc::new(MemorySlot::new())
    } else {
        Arc::new(cache.clone())
    };
    let handoff = HandoffChannel::new(slot, Duration::from_secs(settings.handoff_ttl_seconds));

    // Create email delivery client
    let email = EmailClient::new(
        &settings.email_api_url,
        &settings.email_api_key,
        &settings.email_from,
        &settings.agency_inbox,
        settings.email_timeout_seconds,
    )?;

    // Create application state
    let state = app::AppState::new(pool, settings.clone(), cache, properties, handoff, email);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
