//! `authentication` table repository: one session token row per principal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use aquahub_core::error::{AppError, ErrorKind};
use aquahub_core::result::AppResult;
use aquahub_core::traits::TokenStore;
use aquahub_core::types::{Principal, Role, SessionToken};

/// Raw row shape of the `authentication` table.
#[derive(Debug, sqlx::FromRow)]
struct AuthenticationRow {
    user_id: i64,
    user_type: i16,
    token_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuthenticationRow> for SessionToken {
    type Error = AppError;

    fn try_from(row: AuthenticationRow) -> Result<Self, Self::Error> {
        Ok(SessionToken {
            principal: Principal::new(row.user_id, Role::from_code(row.user_type)?),
            token_hash: row.token_hash,
            issued_at: row.created_at,
        })
    }
}

/// Postgres-backed [`TokenStore`].
#[derive(Debug, Clone)]
pub struct AuthenticationRepository {
    pool: PgPool,
}

impl AuthenticationRepository {
    /// Create a new authentication repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for AuthenticationRepository {
    async fn upsert(&self, record: &SessionToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO authentication (user_id, user_type, token_hash, created_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, user_type) \
             DO UPDATE SET token_hash = EXCLUDED.token_hash, created_at = EXCLUDED.created_at",
        )
        .bind(record.principal.id)
        .bind(record.principal.role.code())
        .bind(&record.token_hash)
        .bind(record.issued_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store session token", e))?;
        Ok(())
    }

    async fn find(&self, principal: &Principal) -> AppResult<Option<SessionToken>> {
        let row = sqlx::query_as::<_, AuthenticationRow>(
            "SELECT user_id, user_type, token_hash, created_at FROM authentication \
             WHERE user_id = $1 AND user_type = $2",
        )
        .bind(principal.id)
        .bind(principal.role.code())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session token", e))?;

        row.map(SessionToken::try_from).transpose()
    }

    async fn delete_matching(&self, principal: &Principal, token_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM authentication WHERE user_id = $1 AND user_type = $2 AND token_hash = $3",
        )
        .bind(principal.id)
        .bind(principal.role.code())
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete session token", e)
        })?;
        Ok(result.rows_affected() > 0)
    }
}
