use async_trait::async_trait;

use secrecy::{ExposeSecret, Secret};

use sqlx::{PgExecutor, PgPool};

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::model::{NewUser, User, UserCredentials};

use super::{StoreError, StoreResult, UserStore};

/// Postgres-backed user records
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument("Insert a new user record", skip(executor, new_user), fields(user_id = %new_user.id))]
    pub async fn insert_with<'conn>(
        executor: impl PgExecutor<'conn>,
        new_user: &NewUser,
    ) -> StoreResult<User> {
        let (email, password_hash) = match &new_user.registration {
            Some(registration) => (
                Some(registration.email.as_ref()),
                Some(registration.password_hash.expose_secret().as_str()),
            ),
            None => (None, None),
        };

        sqlx::query_as::<_, User>(
            "insert into users(id, name, email, password_hash, created_at) \
             values ($1, $2, $3, $4, $5) \
             returning id, name, email, email_confirmed, created_at",
        )
        .bind(new_user.id)
        .bind(new_user.name.as_ref().map(|name| name.as_ref()))
        .bind(email)
        .bind(password_hash)
        .bind(new_user.created_at)
        .fetch_one(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Database(other),
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: Uuid,
    password_hash: String,
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, new_user: &NewUser) -> StoreResult<User> {
        Self::insert_with(&self.pool, new_user).await
    }

    #[tracing::instrument("Fetch a user by id", skip(self))]
    async fn fetch(&self, id: Uuid) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "select id, name, email, email_confirmed, created_at from users where id=$1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    #[tracing::instrument("Fetch user credentials by email", skip(self))]
    async fn fetch_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "select id, password_hash from users where email=$1 and password_hash is not null",
        )
        .bind(email.as_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UserCredentials {
            id: row.id,
            password_hash: Secret::new(row.password_hash),
        }))
    }
}
