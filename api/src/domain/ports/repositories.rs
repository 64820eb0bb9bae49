//! Repository port traits
//!
//! These traits define read-only access to the bridge's message log.
//! Implementations are provided by adapters (e.g., SQLite).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::entities::{AccountKey, MessageRecord};
use crate::error::DomainError;

/// Read-only view of the message log
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Records attributed to `account`, newest first, at most `limit`
    async fn fetch(
        &self,
        account: &AccountKey,
        limit: u64,
    ) -> Result<Vec<MessageRecord>, DomainError>;

    /// Number of records attributed to `account`
    async fn count(&self, account: &AccountKey) -> Result<u64, DomainError>;

    /// Whether `account` has at least one record
    async fn has_any(&self, account: &AccountKey) -> Result<bool, DomainError>;

    /// Record counts for many accounts at once; every requested key is present
    async fn counts(
        &self,
        accounts: &[AccountKey],
    ) -> Result<HashMap<AccountKey, u64>, DomainError>;
}
