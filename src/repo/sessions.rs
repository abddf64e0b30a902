use async_trait::async_trait;

use sqlx::PgPool;

use uuid::Uuid;

use crate::model::SessionToken;

use super::{SessionStore, StoreError, StoreResult};

/// Postgres-backed session rows
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    #[tracing::instrument("Insert a session token", skip(self, token), fields(token_id = %token.token_id, user_id = %token.user_id))]
    async fn insert(&self, token: &SessionToken) -> StoreResult<()> {
        sqlx::query("insert into sessions(token_id, user_id, created_at) values ($1, $2, $3)")
            .bind(token.token_id)
            .bind(token.user_id)
            .bind(token.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::UnknownReference
                }
                other => StoreError::Database(other),
            })?;
        Ok(())
    }

    #[tracing::instrument("Fetch a session token", skip(self))]
    async fn fetch(&self, token_id: Uuid) -> StoreResult<Option<SessionToken>> {
        let token = sqlx::query_as::<_, SessionToken>(
            "select token_id, user_id, created_at from sessions where token_id=$1",
        )
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    #[tracing::instrument("Delete a session token", skip(self))]
    async fn delete(&self, token_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("delete from sessions where token_id=$1")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
