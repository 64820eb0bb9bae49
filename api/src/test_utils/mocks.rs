//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{AccountKey, IdentityTables, MessageRecord};
use crate::domain::ports::{IdentitySource, MessageRepository};
use crate::error::DomainError;

// ============================================================================
// Static Identity Source
// ============================================================================

/// Serves whatever tables it currently holds; `set_failing` simulates a corrupt
/// cache on disk.
#[derive(Default, Clone)]
pub struct StaticIdentitySource {
    tables: Arc<RwLock<IdentityTables>>,
    failing: Arc<RwLock<bool>>,
    loads: Arc<AtomicUsize>,
}

impl StaticIdentitySource {
    pub fn new(tables: IdentityTables) -> Self {
        Self {
            tables: Arc::new(RwLock::new(tables)),
            ..Self::default()
        }
    }

    /// Replace the tables returned by later loads
    pub fn set_tables(&self, tables: IdentityTables) {
        *self.tables.write().unwrap() = tables;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.write().unwrap() = failing;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl IdentitySource for StaticIdentitySource {
    fn load(&self) -> Result<IdentityTables, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if *self.failing.read().unwrap() {
            return Err(DomainError::Load("cache unreadable".to_string()));
        }
        Ok(self.tables.read().unwrap().clone())
    }
}

// ============================================================================
// In-Memory Message Repository
// ============================================================================

/// Sorts like the SQLite adapter (time text, then seq, both descending)
/// before applying the limit. Records are filed under their own
/// `MessageRecord::account`; `with_foreign_record` files one under another
/// account to simulate a leaking store.
#[derive(Default)]
pub struct InMemoryMessageRepository {
    records: Arc<RwLock<HashMap<AccountKey, Vec<MessageRecord>>>>,
    fetches: Arc<AtomicUsize>,
    fail: bool,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a record under its own account
    pub fn with_record(self, record: MessageRecord) -> Self {
        let key = record
            .account
            .clone()
            .expect("record has no account, use with_foreign_record");
        self.records
            .write()
            .unwrap()
            .entry(key)
            .or_default()
            .push(record);
        self
    }

    /// Attach a record to `key` regardless of its own account reference
    pub fn with_foreign_record(self, key: &AccountKey, record: MessageRecord) -> Self {
        self.records
            .write()
            .unwrap()
            .entry(key.clone())
            .or_default()
            .push(record);
        self
    }

    /// Every call fails with a query error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.fail {
            Err(DomainError::Query("database is locked".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn fetch(
        &self,
        account: &AccountKey,
        limit: u64,
    ) -> Result<Vec<MessageRecord>, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let records = self.records.read().unwrap();
        let mut list = records.get(account).cloned().unwrap_or_default();
        list.sort_by(|a, b| b.time.cmp(&a.time).then(b.seq.cmp(&a.seq)));
        list.truncate(limit as usize);
        Ok(list)
    }

    async fn count(&self, account: &AccountKey) -> Result<u64, DomainError> {
        self.check()?;
        let records = self.records.read().unwrap();
        Ok(records.get(account).map(|list| list.len() as u64).unwrap_or(0))
    }

    async fn has_any(&self, account: &AccountKey) -> Result<bool, DomainError> {
        Ok(self.count(account).await? > 0)
    }

    async fn counts(
        &self,
        accounts: &[AccountKey],
    ) -> Result<HashMap<AccountKey, u64>, DomainError> {
        let mut result = HashMap::new();
        for key in accounts {
            result.insert(key.clone(), self.count(key).await?);
        }
        Ok(result)
    }
}
