//! SQLite adapter for MessageRepository
//!
//! The bridge stores every forwarded message in `msglog`, keyed by
//! `slave_origin_uid = "<channel id> <puid>"`. Structured payloads live in the
//! `pickle` column; this adapter understands the JSON form written by the
//! bridge's extraction step and treats anything else as absent.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{DatabaseBackend, DatabaseConnection, FromQueryResult, Statement, Value};

use crate::domain::entities::{AccountKey, MediaDescriptor, MessageKind, MessageRecord};
use crate::domain::ports::MessageRepository;
use crate::error::DomainError;

// SQLite's default bound-parameter ceiling is 999
const COUNT_CHUNK: usize = 500;

#[derive(Debug, FromQueryResult)]
struct MsgLogRow {
    seq: i64,
    master_msg_id: Option<String>,
    text: Option<String>,
    slave_origin_uid: Option<String>,
    msg_type: Option<String>,
    media_type: Option<String>,
    mime: Option<String>,
    time: Option<String>,
    pickle: Option<Vec<u8>>,
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    origin: String,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct ScalarRow {
    value: i64,
}

/// SQLite implementation of MessageRepository
pub struct SqliteMessageRepository {
    db: DatabaseConnection,
    channel_id: String,
    message_types: Vec<String>,
}

impl SqliteMessageRepository {
    pub fn new(db: DatabaseConnection, channel_id: impl Into<String>) -> Self {
        Self {
            db,
            channel_id: channel_id.into(),
            message_types: Vec::new(),
        }
    }

    /// Only consider these `msg_type` values
    pub fn with_message_types(mut self, message_types: Vec<String>) -> Self {
        self.message_types = message_types;
        self
    }

    fn origin_uid(&self, account: &AccountKey) -> String {
        format!("{} {}", self.channel_id, account)
    }

    fn account_from_origin(&self, origin: &str) -> Option<AccountKey> {
        origin
            .strip_prefix(self.channel_id.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
            .filter(|puid| !puid.is_empty())
            .map(AccountKey::from)
    }

    /// `AND msg_type IN (...)` plus its values, or nothing when unrestricted
    fn type_filter(&self) -> (String, Vec<Value>) {
        if self.message_types.is_empty() {
            return (String::new(), Vec::new());
        }
        let clause = format!(" AND msg_type IN ({})", placeholders(self.message_types.len()));
        let values = self.message_types.iter().cloned().map(Value::from).collect();
        (clause, values)
    }

    fn statement(&self, sql: String, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values)
    }

    fn to_record(&self, row: MsgLogRow) -> MessageRecord {
        let kind = row
            .msg_type
            .as_deref()
            .unwrap_or("Unsupported")
            .parse()
            .unwrap_or(MessageKind::Unsupported);

        let media = if row.media_type.is_some() || row.mime.is_some() {
            Some(MediaDescriptor {
                media_type: row.media_type,
                mime: row.mime,
            })
        } else {
            None
        };

        MessageRecord {
            message_id: row.master_msg_id.unwrap_or_default(),
            seq: row.seq,
            account: row
                .slave_origin_uid
                .as_deref()
                .and_then(|origin| self.account_from_origin(origin)),
            kind,
            text: row.text.unwrap_or_default(),
            media,
            attributes: row.pickle.as_deref().and_then(decode_payload),
            time: row.time,
        }
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn fetch(
        &self,
        account: &AccountKey,
        limit: u64,
    ) -> Result<Vec<MessageRecord>, DomainError> {
        let (type_clause, type_values) = self.type_filter();
        let sql = format!(
            "SELECT rowid AS seq, master_msg_id, text, slave_origin_uid, msg_type, media_type, \
             mime, CAST(time AS TEXT) AS time, pickle \
             FROM msglog WHERE slave_origin_uid = ?{} \
             ORDER BY time DESC, rowid DESC LIMIT ?",
            type_clause
        );

        let mut values = vec![Value::from(self.origin_uid(account))];
        values.extend(type_values);
        values.push(Value::from(i64::try_from(limit).unwrap_or(i64::MAX)));

        let rows = MsgLogRow::find_by_statement(self.statement(sql, values))
            .all(&self.db)
            .await?;

        tracing::debug!("Fetched {} log rows for {}", rows.len(), account);

        Ok(rows.into_iter().map(|row| self.to_record(row)).collect())
    }

    async fn count(&self, account: &AccountKey) -> Result<u64, DomainError> {
        let (type_clause, type_values) = self.type_filter();
        let sql = format!(
            "SELECT COUNT(*) AS value FROM msglog WHERE slave_origin_uid = ?{}",
            type_clause
        );

        let mut values = vec![Value::from(self.origin_uid(account))];
        values.extend(type_values);

        let row = ScalarRow::find_by_statement(self.statement(sql, values))
            .one(&self.db)
            .await?;

        Ok(row.map(|r| r.value.max(0) as u64).unwrap_or(0))
    }

    async fn has_any(&self, account: &AccountKey) -> Result<bool, DomainError> {
        let (type_clause, type_values) = self.type_filter();
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM msglog WHERE slave_origin_uid = ?{} LIMIT 1) AS value",
            type_clause
        );

        let mut values = vec![Value::from(self.origin_uid(account))];
        values.extend(type_values);

        let row = ScalarRow::find_by_statement(self.statement(sql, values))
            .one(&self.db)
            .await?;

        Ok(row.map(|r| r.value != 0).unwrap_or(false))
    }

    async fn counts(
        &self,
        accounts: &[AccountKey],
    ) -> Result<HashMap<AccountKey, u64>, DomainError> {
        let mut result: HashMap<AccountKey, u64> =
            accounts.iter().map(|key| (key.clone(), 0)).collect();

        let (type_clause, type_values) = self.type_filter();
        for chunk in accounts.chunks(COUNT_CHUNK) {
            let sql = format!(
                "SELECT slave_origin_uid AS origin, COUNT(*) AS total FROM msglog \
                 WHERE slave_origin_uid IN ({}){} GROUP BY slave_origin_uid",
                placeholders(chunk.len()),
                type_clause
            );

            let mut values: Vec<Value> = chunk
                .iter()
                .map(|key| Value::from(self.origin_uid(key)))
                .collect();
            values.extend(type_values.iter().cloned());

            let rows = CountRow::find_by_statement(self.statement(sql, values))
                .all(&self.db)
                .await?;

            for row in rows {
                if let Some(key) = self.account_from_origin(&row.origin) {
                    result.insert(key, row.total.max(0) as u64);
                }
            }
        }

        Ok(result)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Structured payload of a row; `{"attributes": {...}}` wrappers are unwrapped
fn decode_payload(raw: &[u8]) -> Option<serde_json::Value> {
    match serde_json::from_slice::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(mut map)) => match map.remove("attributes") {
            Some(serde_json::Value::Null) => None,
            Some(attributes) => Some(attributes),
            None => Some(serde_json::Value::Object(map)),
        },
        Ok(serde_json::Value::Null) => None,
        Ok(other) => Some(other),
        Err(_) => {
            tracing::trace!("Ignoring non-JSON message payload ({} bytes)", raw.len());
            None
        }
    }
}
