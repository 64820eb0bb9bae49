//! Domain entities
//!
//! Pure domain models for the message-to-feed pipeline.
//! Row shapes for the SQLite log live in the adapter, not here.

pub mod account;
pub mod feed;
pub mod message;

pub use account::{AccountIdentity, AccountKey, CachedAccount, IdentityTables};
pub use feed::{FeedDocument, FeedItem};
pub use message::{LinkAttributes, MediaDescriptor, MessageKind, MessageRecord};
