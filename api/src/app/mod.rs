//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod content_renderer;
pub mod feed_assembler;
pub mod feed_cache;
pub mod identity_resolver;

pub use content_renderer::{escape_html, ContentRenderer};
pub use feed_assembler::FeedAssembler;
pub use feed_cache::FeedCache;
pub use identity_resolver::IdentityResolver;
