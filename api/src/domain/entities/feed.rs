//! Feed documents
//!
//! Derived per assembly and never persisted.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::AccountIdentity;

/// One syndication entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    /// Deterministic, non-permalink identifier
    pub guid: String,
    pub title: String,
    /// Escaped HTML body
    pub body: String,
    pub published_at: DateTime<FixedOffset>,
    /// Article URL for shared links
    pub link: Option<String>,
    /// Log sequence of the source record
    pub seq: i64,
}

/// A complete feed for one account, newest item first
#[derive(Debug, Clone, Serialize)]
pub struct FeedDocument {
    pub account: AccountIdentity,
    pub items: Vec<FeedItem>,
    pub generated_at: DateTime<Utc>,
}
