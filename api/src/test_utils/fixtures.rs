//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid value that can be customized.

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement, Value};
use tempfile::TempDir;

use crate::adapters::sqlite::connect;
use crate::domain::entities::{
    AccountKey, CachedAccount, FeedDocument, IdentityTables, MessageKind, MessageRecord,
};

/// Schema the bridge creates for its message log
const MSGLOG_SCHEMA: &str = r#"
CREATE TABLE "msglog" (
    "master_msg_id" TEXT NOT NULL PRIMARY KEY,
    "master_msg_id_alt" TEXT,
    "slave_message_id" TEXT NOT NULL,
    "text" TEXT NOT NULL,
    "slave_origin_uid" TEXT NOT NULL,
    "slave_origin_display_name" TEXT,
    "slave_member_uid" TEXT,
    "slave_member_display_name" TEXT,
    "media_type" TEXT,
    "mime" TEXT,
    "file_id" TEXT,
    "msg_type" TEXT NOT NULL,
    "sent_to" TEXT NOT NULL,
    "time" DATETIME,
    "pickle" BLOB
)
"#;

/// Cached account with a puid mapping
pub fn test_cached_account(user_name: &str, nick_name: &str) -> CachedAccount {
    CachedAccount {
        user_name: user_name.to_string(),
        nick_name: nick_name.to_string(),
        signature: format!("{} signature", nick_name),
        head_img_url: format!("https://wx.qq.com/head/{}", user_name.trim_start_matches('@')),
    }
}

/// Identity tables for "Rust Weekly" (puid `aaa`) and "Tokio News" (puid `bbb`)
pub fn test_identity_tables() -> IdentityTables {
    let mut tables = IdentityTables {
        accounts: vec![
            test_cached_account("@rust", "Rust Weekly"),
            test_cached_account("@tokio", "Tokio News"),
        ],
        ..IdentityTables::default()
    };
    tables.puids.insert("@rust".into(), "aaa".into());
    tables.puids.insert("@tokio".into(), "bbb".into());
    tables
}

/// A text record for account `aaa`
pub fn test_record(seq: i64, time: &str, text: &str) -> MessageRecord {
    MessageRecord {
        message_id: format!("100.{}", seq),
        seq,
        account: Some(AccountKey::from("aaa")),
        kind: MessageKind::Text,
        text: text.to_string(),
        media: None,
        attributes: None,
        time: Some(time.to_string()),
    }
}

/// A link record for account `aaa`
pub fn test_link_record(seq: i64, time: &str, title: &str, url: &str) -> MessageRecord {
    MessageRecord {
        kind: MessageKind::Link,
        text: String::new(),
        attributes: Some(serde_json::json!({
            "title": title,
            "description": format!("About {}", title),
            "url": url,
            "image": null,
        })),
        ..test_record(seq, time, "")
    }
}

/// GUIDs of a feed in document order
pub fn feed_guids(feed: &FeedDocument) -> Vec<String> {
    feed.items.iter().map(|item| item.guid.clone()).collect()
}

/// One row to insert into a test message log
#[derive(Debug, Clone)]
pub struct LogRow {
    pub master_msg_id: String,
    pub slave_origin_uid: String,
    pub msg_type: String,
    pub text: String,
    pub time: Option<String>,
    pub mime: Option<String>,
    pub pickle: Option<Vec<u8>>,
}

impl LogRow {
    pub fn text(id: &str, origin: &str, time: &str, text: &str) -> Self {
        Self {
            master_msg_id: id.to_string(),
            slave_origin_uid: origin.to_string(),
            msg_type: "Text".to_string(),
            text: text.to_string(),
            time: Some(time.to_string()),
            mime: None,
            pickle: None,
        }
    }
}

/// Create an empty message log inside `dir` and open it read-write
pub async fn message_log(dir: &TempDir) -> DatabaseConnection {
    let path = dir.path().join("tgdata.db");
    let db = connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("open test message log");
    db.execute_unprepared(MSGLOG_SCHEMA)
        .await
        .expect("create msglog table");
    db
}

pub async fn insert_log_row(db: &DatabaseConnection, row: &LogRow) {
    let values: Vec<Value> = vec![
        row.master_msg_id.clone().into(),
        row.master_msg_id.clone().into(),
        row.text.clone().into(),
        row.slave_origin_uid.clone().into(),
        row.mime.clone().into(),
        row.msg_type.clone().into(),
        row.time.clone().into(),
        row.pickle.clone().into(),
    ];
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"INSERT INTO msglog
            (master_msg_id, slave_message_id, text, slave_origin_uid, mime, msg_type, sent_to, time, pickle)
            VALUES (?, ?, ?, ?, ?, ?, 'master', ?, ?)"#,
        values,
    );
    db.execute(stmt).await.expect("insert log row");
}
