//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod sqlite;
pub mod wxpy;

pub use sqlite::SqliteMessageRepository;
pub use wxpy::WxpyCacheFiles;
