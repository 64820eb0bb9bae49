//! WeChat MP RSS API Server
//!
//! Serves the public-account articles a WeChat/Telegram bridge has logged as
//! per-account RSS feeds.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{SqliteMessageRepository, WxpyCacheFiles};
use app::{ContentRenderer, FeedAssembler, FeedCache, IdentityResolver};
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub identities: Arc<IdentityResolver<WxpyCacheFiles>>,
    pub messages: Arc<SqliteMessageRepository>,
    pub feeds: Arc<FeedCache<WxpyCacheFiles, SqliteMessageRepository>>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        identities: Arc<IdentityResolver<WxpyCacheFiles>>,
        db: DatabaseConnection,
    ) -> Self {
        let messages = Arc::new(
            SqliteMessageRepository::new(db, config.slave_channel_id.clone())
                .with_message_types(config.message_types.clone()),
        );
        let renderer = ContentRenderer::new(config.title_max_chars, config.log_utc_offset);
        let assembler = Arc::new(
            FeedAssembler::new(identities.clone(), messages.clone(), renderer)
                .with_article_hosts(config.article_hosts.clone()),
        );
        let feeds = Arc::new(FeedCache::new(
            assembler,
            Duration::from_secs(config.feed_cache_ttl_secs),
        ));

        Self {
            identities,
            messages,
            feeds,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    accounts: usize,
    identities_loaded_at: DateTime<Utc>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        accounts: state.identities.accounts().len(),
        identities_loaded_at: state.identities.loaded_at(),
    })
}

fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/mps", get(handlers::list_accounts))
        .route("/api/rss/:account", get(handlers::get_rss_feed))
        .route("/api/has-articles/:account", get(handlers::has_articles))
        .route("/api/has-articles-batch", get(handlers::has_articles_batch))
        .route(
            "/api/article-counts-batch",
            get(handlers::article_counts_batch),
        )
        .route("/api/opml", post(handlers::export_opml))
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mprss_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting WeChat MP RSS API...");

    // Load configuration
    let config = Config::from_env()?;

    // Identity caches must be readable before serving anything
    let cache_files = Arc::new(WxpyCacheFiles::new(
        &config.account_cache_path,
        &config.puid_cache_path,
    ));
    tracing::info!(
        "Loading identity caches from {} and {}",
        cache_files.account_cache().display(),
        cache_files.puid_cache().display()
    );
    let identities = Arc::new(
        IdentityResolver::new(cache_files, config.hidden_accounts.clone())
            .context("Failed to load identity caches")?,
    );

    tracing::info!("Opening message log {}", config.message_log_path.display());
    let db = adapters::sqlite::connect(&config.message_log_url())
        .await
        .context("Failed to open message log")?;

    let addr = format!("{}:{}", config.host, config.port);
    let app = app_router(AppState::new(config, identities, db));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
