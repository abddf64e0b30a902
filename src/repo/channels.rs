use async_trait::async_trait;

use chrono::{DateTime, Utc};

use sqlx::PgPool;

use uuid::Uuid;

use crate::model::NotificationChannel;

use super::{ChannelStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct PgChannelStore {
    pool: PgPool,
}

impl PgChannelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ChannelRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    name: String,
    value: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChannelRow> for NotificationChannel {
    type Error = StoreError;

    fn try_from(row: ChannelRow) -> StoreResult<Self> {
        let kind = row
            .kind
            .parse()
            .map_err(|e: String| StoreError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            kind,
            name: row.name,
            value: row.value,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ChannelStore for PgChannelStore {
    #[tracing::instrument("Insert a notification channel", skip(self, channel), fields(channel_id = %channel.id))]
    async fn insert(&self, channel: &NotificationChannel) -> StoreResult<()> {
        sqlx::query(
            "insert into notification_channels(id, user_id, kind, name, value, created_at) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(channel.id)
        .bind(channel.user_id)
        .bind(channel.kind.as_str())
        .bind(&channel.name)
        .bind(&channel.value)
        .bind(channel.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::UnknownReference
            }
            e => e.into(),
        })?;
        Ok(())
    }

    #[tracing::instrument("Fetch notification channels for a user", skip(self))]
    async fn fetch_all_for_user(&self, user_id: Uuid) -> StoreResult<Vec<NotificationChannel>> {
        sqlx::query_as::<_, ChannelRow>(
            "select id, user_id, kind, name, value, created_at from notification_channels \
             where user_id=$1 order by created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(NotificationChannel::try_from)
        .collect()
    }
}
