//! Feed cache
//!
//! Keeps assembled documents for a short while so a feed reader polling every
//! minute does not hit the message log every time. No lock is held while a
//! document is built: two requests racing on an expired entry both rebuild
//! and the last one to finish wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::domain::entities::FeedDocument;
use crate::domain::ports::{IdentitySource, MessageRepository};
use crate::error::DomainError;

use super::FeedAssembler;

struct CachedFeed {
    document: Arc<FeedDocument>,
    built_at: Instant,
}

/// TTL cache in front of a `FeedAssembler`, keyed by `(account name, item limit)`
pub struct FeedCache<S, MR>
where
    S: IdentitySource,
    MR: MessageRepository,
{
    assembler: Arc<FeedAssembler<S, MR>>,
    ttl: Duration,
    entries: DashMap<(String, u64), CachedFeed>,
}

impl<S, MR> FeedCache<S, MR>
where
    S: IdentitySource,
    MR: MessageRepository,
{
    /// A zero `ttl` turns the cache into a pass-through
    pub fn new(assembler: Arc<FeedAssembler<S, MR>>, ttl: Duration) -> Self {
        Self {
            assembler,
            ttl,
            entries: DashMap::new(),
        }
    }

    pub async fn get_or_build(
        &self,
        account_name: &str,
        item_limit: u64,
    ) -> Result<Arc<FeedDocument>, DomainError> {
        let key = (account_name.to_string(), item_limit);

        if let Some(entry) = self.entries.get(&key) {
            if entry.built_at.elapsed() < self.ttl {
                return Ok(entry.document.clone());
            }
        }

        let document = Arc::new(self.assembler.assemble(account_name, item_limit).await?);

        if !self.ttl.is_zero() {
            self.entries.retain(|_, cached| cached.built_at.elapsed() < self.ttl);
            self.entries.insert(
                key,
                CachedFeed {
                    document: document.clone(),
                    built_at: Instant::now(),
                },
            );
            tracing::debug!("Cached feed for {} ({} cached)", account_name, self.entries.len());
        }

        Ok(document)
    }

    /// Drop every cached document
    pub fn clear(&self) {
        self.entries.clear();
    }
}
