//! Feed handlers
//!
//! Per-account RSS feeds.
//! Supports content negotiation: Accept: application/json for JSON, otherwise RSS.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::feed::render_rss;
use crate::AppState;

use super::public_base_url;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u64>,
}

/// Check if the client wants JSON response
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

/// GET /api/rss/:account
///
/// `account` may be a puid, a session user name or a display name.
/// - Accept: application/json → the feed document as JSON
/// - Otherwise → RSS 2.0
pub async fn get_rss_feed(
    State(state): State<AppState>,
    Path(account): Path<String>,
    Query(query): Query<FeedQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let limit = state.config.clamp_feed_limit(query.limit);
    let feed = state.feeds.get_or_build(&account, limit).await?;

    if wants_json(&headers) {
        return Ok(Json(feed.as_ref()).into_response());
    }

    let feed_url = format!(
        "{}/api/rss/{}",
        public_base_url(&state.config, &headers),
        urlencoding::encode(feed.account.key.as_str())
    );
    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        render_rss(&feed, Some(&feed_url)),
    )
        .into_response())
}
