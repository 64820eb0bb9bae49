//! Identity cache port

use crate::domain::entities::IdentityTables;
use crate::error::DomainError;

/// Source of the two identity caches.
///
/// Loading is synchronous: the caches are small local files read at startup
/// and on explicit refresh. Implementations return `DomainError::Load` for
/// unreadable or malformed input.
pub trait IdentitySource: Send + Sync {
    /// Read both caches from scratch
    fn load(&self) -> Result<IdentityTables, DomainError>;
}
