//! Domain ports (traits)
//!
//! Port traits define the upstream stores the pipeline reads from.
//! Adapters provide concrete implementations of these traits.

pub mod identity;
pub mod repositories;

pub use identity::IdentitySource;
pub use repositories::MessageRepository;
