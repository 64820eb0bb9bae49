//! Domain layer
//!
//! Contains the feed pipeline's data model with no I/O.
//! - `entities`: accounts, log records and feed documents
//! - `ports`: Trait definitions for the identity caches and the message log

pub mod entities;
pub mod ports;
