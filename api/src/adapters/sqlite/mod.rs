//! SQLite adapters
//!
//! Read-only implementations of repository traits over the bridge's
//! `tgdata.db`, using SeaORM raw statements (the schema belongs to the bridge).

pub mod message_repo;

pub use message_repo::SqliteMessageRepository;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::DomainError;

/// Open the message log
pub async fn connect(url: &str) -> Result<DatabaseConnection, DomainError> {
    let mut options = ConnectOptions::new(url.to_owned());
    options.sqlx_logging(false);

    Database::connect(options)
        .await
        .map_err(|e| DomainError::Query(format!("cannot open message log: {}", e)))
}
