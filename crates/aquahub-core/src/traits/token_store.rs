//! Session token persistence seam.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Principal, SessionToken};

/// Persistence for the one-token-per-principal session table.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert the record, or overwrite the hash and issue time of the
    /// principal's existing record.
    async fn upsert(&self, record: &SessionToken) -> AppResult<()>;

    /// Fetch the principal's current record.
    async fn find(&self, principal: &Principal) -> AppResult<Option<SessionToken>>;

    /// Delete the principal's record only if it still holds `token_hash`.
    ///
    /// Returns `true` if a row was deleted.
    async fn delete_matching(&self, principal: &Principal, token_hash: &str) -> AppResult<bool>;
}
