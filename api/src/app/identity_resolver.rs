//! Identity resolver
//!
//! Merges the account cache and the puid cache into one lookup. A loaded
//! generation is immutable; `refresh` swaps in a new one atomically, so a
//! request that already holds a generation keeps resolving against it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::domain::entities::{AccountIdentity, AccountKey, IdentityTables};
use crate::domain::ports::IdentitySource;
use crate::error::DomainError;

/// One loaded snapshot of both caches
#[derive(Debug)]
struct IdentityGeneration {
    /// Visible accounts in cache order
    accounts: Vec<AccountIdentity>,
    by_key: HashMap<AccountKey, usize>,
    by_user_name: HashMap<String, usize>,
    by_display_name: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl IdentityGeneration {
    fn build(tables: IdentityTables, hidden: &HashSet<String>) -> Self {
        let mut generation = Self {
            accounts: Vec::with_capacity(tables.accounts.len()),
            by_key: HashMap::new(),
            by_user_name: HashMap::new(),
            by_display_name: HashMap::new(),
            loaded_at: Utc::now(),
        };

        let mut skipped = 0usize;
        for cached in tables.accounts {
            if hidden.contains(&cached.nick_name) {
                continue;
            }
            let Some(puid) = tables.puids.get(&cached.user_name).filter(|p| !p.is_empty())
            else {
                skipped += 1;
                continue;
            };
            let key = AccountKey::new(puid.clone());
            if generation.by_key.contains_key(&key) {
                tracing::warn!("Duplicate puid {} in identity cache, keeping first", key);
                continue;
            }

            let index = generation.accounts.len();
            generation.by_key.insert(key.clone(), index);
            generation
                .by_user_name
                .entry(cached.user_name.clone())
                .or_insert(index);
            generation
                .by_display_name
                .entry(cached.nick_name.clone())
                .or_insert(index);
            generation.accounts.push(AccountIdentity {
                key,
                name: cached.nick_name,
                signature: cached.signature,
                avatar_url: Some(cached.head_img_url).filter(|url| !url.is_empty()),
                user_name: cached.user_name,
            });
        }

        if skipped > 0 {
            tracing::debug!("{} cached accounts have no puid and were skipped", skipped);
        }

        generation
    }

    fn lookup(&self, name: &str) -> Option<&AccountIdentity> {
        self.by_key
            .get(&AccountKey::from(name))
            .or_else(|| self.by_user_name.get(name))
            .or_else(|| self.by_display_name.get(name))
            .map(|&index| &self.accounts[index])
    }
}

/// Resolves account names to stable keys and keys to display metadata
pub struct IdentityResolver<S>
where
    S: IdentitySource,
{
    source: Arc<S>,
    hidden: HashSet<String>,
    current: RwLock<Arc<IdentityGeneration>>,
}

impl<S> IdentityResolver<S>
where
    S: IdentitySource,
{
    /// Load both caches; any failure is fatal to the caller
    pub fn new(source: Arc<S>, hidden_accounts: Vec<String>) -> Result<Self, DomainError> {
        let hidden: HashSet<String> = hidden_accounts.into_iter().collect();
        let generation = IdentityGeneration::build(source.load()?, &hidden);

        tracing::info!("Loaded {} public accounts", generation.accounts.len());

        Ok(Self {
            source,
            hidden,
            current: RwLock::new(Arc::new(generation)),
        })
    }

    fn generation(&self) -> Arc<IdentityGeneration> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Resolve a puid, session user name or display name, in that order
    pub fn resolve(&self, account_name: &str) -> Result<AccountKey, DomainError> {
        self.generation()
            .lookup(account_name)
            .map(|identity| identity.key.clone())
            .ok_or_else(|| {
                DomainError::NotFound(format!("Public account '{}' not found", account_name))
            })
    }

    pub fn describe(&self, key: &AccountKey) -> Result<AccountIdentity, DomainError> {
        let generation = self.generation();
        generation
            .by_key
            .get(key)
            .map(|&index| generation.accounts[index].clone())
            .ok_or_else(|| DomainError::NotFound(format!("Public account key '{}' not found", key)))
    }

    /// Every visible account, in cache order
    pub fn accounts(&self) -> Vec<AccountIdentity> {
        self.generation().accounts.clone()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.generation().loaded_at
    }

    /// Reload both caches. On failure the previous generation stays active.
    pub fn refresh(&self) -> Result<usize, DomainError> {
        let tables = self.source.load().map_err(|e| {
            tracing::warn!("Identity refresh failed, keeping previous caches: {}", e);
            e
        })?;
        let generation = Arc::new(IdentityGeneration::build(tables, &self.hidden));
        let count = generation.accounts.len();

        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = generation;

        tracing::info!("Refreshed identity caches: {} public accounts", count);
        Ok(count)
    }
}
