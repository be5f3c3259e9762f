//! In-process [`TokenStore`] backed by a concurrent map.
//!
//! Used by tests and by deployments that run without Postgres persistence
//! for sessions. Records do not survive a restart.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use aquahub_core::result::AppResult;
use aquahub_core::traits::TokenStore;
use aquahub_core::types::{Principal, SessionToken};

/// Session records keyed by principal.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: DashMap<Principal, SessionToken>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn upsert(&self, record: &SessionToken) -> AppResult<()> {
        self.records.insert(record.principal, record.clone());
        Ok(())
    }

    async fn find(&self, principal: &Principal) -> AppResult<Option<SessionToken>> {
        Ok(self.records.get(principal).map(|r| r.value().clone()))
    }

    async fn delete_matching(&self, principal: &Principal, token_hash: &str) -> AppResult<bool> {
        // The entry guard holds the shard lock, so check-and-remove is atomic.
        match self.records.entry(*principal) {
            Entry::Occupied(entry) if entry.get().token_hash == token_hash => {
                entry.remove();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use aquahub_core::types::Role;

    use super::*;

    fn record(id: i64, hash: &str) -> SessionToken {
        SessionToken {
            principal: Principal::new(id, Role::Customer),
            token_hash: hash.to_string(),
            issued_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let store = MemoryTokenStore::new();
        store.upsert(&record(7, "a")).await.unwrap();
        store.upsert(&record(7, "b")).await.unwrap();

        assert_eq!(store.len(), 1);
        let found = store
            .find(&Principal::new(7, Role::Customer))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.token_hash, "b");
    }

    #[tokio::test]
    async fn test_delete_matching_requires_same_hash() {
        let store = MemoryTokenStore::new();
        let principal = Principal::new(7, Role::Customer);
        store.upsert(&record(7, "a")).await.unwrap();

        assert!(!store.delete_matching(&principal, "b").await.unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.delete_matching(&principal, "a").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_roles_are_separate_keys() {
        let store = MemoryTokenStore::new();
        store.upsert(&record(7, "a")).await.unwrap();
        store
            .upsert(&SessionToken {
                principal: Principal::new(7, Role::Staff),
                token_hash: "b".to_string(),
                issued_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        let staff = Principal::new(7, Role::Staff);
        assert!(store.delete_matching(&staff, "b").await.unwrap());
        assert!(!store.delete_matching(&staff, "b").await.unwrap());
        assert_eq!(store.len(), 1);
    }
}
