//! Feed assembler
//!
//! Builds the feed document for one public account: resolve the account,
//! read its newest log records, render each one independently and put the
//! survivors into canonical order.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::{FeedDocument, FeedItem, MessageKind};
use crate::domain::ports::{IdentitySource, MessageRepository};
use crate::error::DomainError;

use super::{ContentRenderer, IdentityResolver};

// The log orders by raw time text, which misorders rows whose offsets differ;
// fetch extra rows so the newest instants survive the final cut
const MAX_EXTRA_ROWS: u64 = 200;

/// Service for assembling per-account feeds
pub struct FeedAssembler<S, MR>
where
    S: IdentitySource,
    MR: MessageRepository,
{
    identities: Arc<IdentityResolver<S>>,
    messages: Arc<MR>,
    renderer: ContentRenderer,
    article_hosts: Vec<String>,
}

impl<S, MR> FeedAssembler<S, MR>
where
    S: IdentitySource,
    MR: MessageRepository,
{
    pub fn new(
        identities: Arc<IdentityResolver<S>>,
        messages: Arc<MR>,
        renderer: ContentRenderer,
    ) -> Self {
        Self {
            identities,
            messages,
            renderer,
            article_hosts: Vec::new(),
        }
    }

    /// Keep only shared links pointing at these hosts (or their subdomains).
    /// Empty keeps every link.
    pub fn with_article_hosts(mut self, hosts: Vec<String>) -> Self {
        self.article_hosts = hosts
            .into_iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();
        self
    }

    fn is_allowed_article(&self, link: Option<&str>) -> bool {
        if self.article_hosts.is_empty() {
            return true;
        }
        let Some(host) = link.and_then(url_host) else {
            return false;
        };
        self.article_hosts
            .iter()
            .any(|allowed| host == *allowed || host.ends_with(&format!(".{}", allowed)))
    }

    /// Assemble the feed for `account_name` with at most `item_limit` items.
    ///
    /// Unknown accounts and log failures are errors; a record that cannot be
    /// rendered is logged and left out.
    pub async fn assemble(
        &self,
        account_name: &str,
        item_limit: u64,
    ) -> Result<FeedDocument, DomainError> {
        let key = self.identities.resolve(account_name)?;
        let account = self.identities.describe(&key)?;
        let fetch_limit = item_limit.saturating_add(item_limit.min(MAX_EXTRA_ROWS));
        let records = self.messages.fetch(&key, fetch_limit).await?;

        let mut items: Vec<FeedItem> = Vec::with_capacity(records.len());
        for record in &records {
            if record.account.as_ref().is_some_and(|owner| owner != &key) {
                tracing::warn!(
                    "Skipping message {} attributed to {:?} in feed for {}",
                    record.message_id,
                    record.account,
                    key
                );
                continue;
            }
            match self.renderer.render(record) {
                Ok(item)
                    if record.kind == MessageKind::Link
                        && !self.is_allowed_article(item.link.as_deref()) =>
                {
                    tracing::debug!(
                        "Skipping message {} in feed for {}: link {:?} is not an article",
                        record.message_id,
                        key,
                        item.link
                    );
                }
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("Skipping message in feed for {}: {}", key, e),
            }
        }

        // Newest first; the log sequence breaks timestamp ties
        items.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });

        let mut seen_guids = HashSet::new();
        let mut seen_links = HashSet::new();
        items.retain(|item| {
            if !seen_guids.insert(item.guid.clone()) {
                return false;
            }
            // The bridge re-delivers the same article on every push
            match &item.link {
                Some(link) => seen_links.insert(link.clone()),
                None => true,
            }
        });
        items.truncate(usize::try_from(item_limit).unwrap_or(usize::MAX));

        tracing::debug!(
            "Assembled feed for {} ({}): {} of {} records",
            account.name,
            key,
            items.len(),
            records.len()
        );

        Ok(FeedDocument {
            account,
            items,
            generated_at: Utc::now(),
        })
    }
}

/// Lowercased host of an absolute http(s) URL, without port or credentials
fn url_host(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?;
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}
