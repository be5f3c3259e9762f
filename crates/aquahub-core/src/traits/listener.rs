//! Listen-command seam for the datastore notification connection.

use async_trait::async_trait;

use crate::result::AppResult;

/// Issues `LISTEN`/`UNLISTEN` on the dedicated notification connection.
///
/// Implementations must only return once the datastore has acknowledged the
/// command. Reference counting is the caller's job: each call maps to
/// exactly one command.
#[async_trait]
pub trait ListenCommander: Send + Sync + std::fmt::Debug + 'static {
    /// Start receiving notifications raised on `channel`.
    async fn start_listening(&self, channel: &str) -> AppResult<()>;

    /// Stop receiving notifications raised on `channel`.
    async fn stop_listening(&self, channel: &str) -> AppResult<()>;
}
