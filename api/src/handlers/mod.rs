//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod accounts;
pub mod feeds;
pub mod opml;

use axum::http::{header, HeaderMap};

use crate::config::Config;

pub use accounts::{article_counts_batch, has_articles, has_articles_batch, list_accounts};
pub use feeds::get_rss_feed;
pub use opml::export_opml;

/// Base URL clients reach this server under, without a trailing slash
fn public_base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(url) = &config.public_base_url {
        return url.clone();
    }
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|host| !host.is_empty())
        .map(|host| format!("http://{}", host))
        .unwrap_or_else(|| format!("http://localhost:{}", config.port))
}
