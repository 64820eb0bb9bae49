//! Public account identity
//!
//! WeChat hands out a fresh `UserName` every login session, so feeds are keyed
//! by the wxpy `puid`, which survives re-logins and display-name changes.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier of a public account (the wxpy puid)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountKey(pub String);

impl AccountKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Everything a feed needs to know about an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountIdentity {
    pub key: AccountKey,
    /// Display name (`NickName`)
    pub name: String,
    /// Account bio (`Signature`)
    pub signature: String,
    pub avatar_url: Option<String>,
    /// Session-local WeChat id; only meaningful for the cache generation it came from
    pub user_name: String,
}

/// One entry of the account cache's `mpList`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CachedAccount {
    #[serde(rename = "UserName", default, deserialize_with = "null_as_empty")]
    pub user_name: String,
    #[serde(rename = "NickName", default, deserialize_with = "null_as_empty")]
    pub nick_name: String,
    #[serde(rename = "Signature", default, deserialize_with = "null_as_empty")]
    pub signature: String,
    #[serde(rename = "HeadImgUrl", default, deserialize_with = "null_as_empty")]
    pub head_img_url: String,
}

// wxpy leaves unset profile fields as None
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw contents of both identity caches, before any merging
#[derive(Debug, Clone, Default)]
pub struct IdentityTables {
    /// Accounts in cache order
    pub accounts: Vec<CachedAccount>,
    /// `UserName` -> puid
    pub puids: HashMap<String, String>,
}
