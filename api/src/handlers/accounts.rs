//! Account handlers
//!
//! Listing of visible public accounts and article availability checks.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{AccountIdentity, AccountKey};
use crate::domain::ports::MessageRepository;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// Account card as listed by `/api/mps`
#[derive(Serialize)]
pub struct AccountSummary {
    pub puid: String,
    pub name: String,
    pub signature: String,
    /// Empty when the account has no avatar
    pub head_img: String,
}

impl From<AccountIdentity> for AccountSummary {
    fn from(account: AccountIdentity) -> Self {
        Self {
            puid: account.key.0,
            name: account.name,
            signature: account.signature,
            head_img: account.avatar_url.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
pub struct HasArticlesResponse {
    pub has_articles: bool,
}

/// GET /api/mps
///
/// `refresh=true` reloads the identity caches first and drops cached feeds.
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<AccountSummary>>, AppError> {
    if query.refresh {
        state.identities.refresh()?;
        state.feeds.clear();
    }

    let accounts = state
        .identities
        .accounts()
        .into_iter()
        .map(AccountSummary::from)
        .collect();
    Ok(Json(accounts))
}

/// GET /api/has-articles/:account
pub async fn has_articles(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<HasArticlesResponse>, AppError> {
    let key = state.identities.resolve(&account)?;
    let has_articles = state.messages.has_any(&key).await?;
    Ok(Json(HasArticlesResponse { has_articles }))
}

/// GET /api/has-articles-batch
pub async fn has_articles_batch(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, bool>>, AppError> {
    let counts = visible_counts(&state).await?;
    Ok(Json(
        counts
            .into_iter()
            .map(|(puid, count)| (puid, count > 0))
            .collect(),
    ))
}

/// GET /api/article-counts-batch
pub async fn article_counts_batch(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, u64>>, AppError> {
    Ok(Json(visible_counts(&state).await?))
}

async fn visible_counts(state: &AppState) -> Result<BTreeMap<String, u64>, AppError> {
    let keys: Vec<AccountKey> = state
        .identities
        .accounts()
        .into_iter()
        .map(|account| account.key)
        .collect();
    let counts = state.messages.counts(&keys).await?;

    Ok(keys
        .into_iter()
        .map(|key| {
            let count = counts.get(&key).copied().unwrap_or(0);
            (key.0, count)
        })
        .collect())
}
