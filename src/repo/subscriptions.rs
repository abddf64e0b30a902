use std::collections::HashMap;

use async_trait::async_trait;

use chrono::{DateTime, Utc};

use sqlx::PgPool;

use uuid::Uuid;

use crate::domain::WeekdaySet;
use crate::model::Subscription;

use super::{StoreError, StoreResult, SubscriptionStore};

/// Postgres-backed subscriptions. Channel links live in `subscription_channels`,
/// ordered by `position`.
#[derive(Debug, Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument("Fetch channel links", skip(self, subscription_ids))]
    async fn fetch_links(&self, subscription_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<Uuid>>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            "select subscription_id, channel_id from subscription_channels \
             where subscription_id = any($1) order by subscription_id, position",
        )
        .bind(subscription_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut links: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            links.entry(row.subscription_id).or_default().push(row.channel_id);
        }
        Ok(links)
    }
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    trip_id: String,
    stop_time_id: String,
    archived: bool,
    created_at: DateTime<Utc>,
    monday: bool,
    tuesday: bool,
    wednesday: bool,
    thursday: bool,
    friday: bool,
    saturday: bool,
    sunday: bool,
}

impl SubscriptionRow {
    fn into_subscription(self, notification_ids: Vec<Uuid>) -> Subscription {
        Subscription {
            id: self.id,
            user_id: self.user_id,
            trip_id: self.trip_id,
            stop_time_id: self.stop_time_id,
            archived: self.archived,
            created_at: self.created_at,
            days: WeekdaySet {
                monday: self.monday,
                tuesday: self.tuesday,
                wednesday: self.wednesday,
                thursday: self.thursday,
                friday: self.friday,
                saturday: self.saturday,
                sunday: self.sunday,
            },
            notification_ids,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    subscription_id: Uuid,
    channel_id: Uuid,
}

const SELECT_SUBSCRIPTION: &str = "select id, user_id, trip_id, stop_time_id, archived, created_at, \
     monday, tuesday, wednesday, thursday, friday, saturday, sunday from subscriptions";

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    #[tracing::instrument("Insert a subscription", skip(self, subscription), fields(subscription_id = %subscription.id))]
    async fn insert(&self, subscription: &Subscription) -> StoreResult<()> {
        // The subscription and every link commit together or not at all
        let mut tx = self.pool.begin().await?;

        let days = &subscription.days;
        sqlx::query(
            "insert into subscriptions(id, user_id, trip_id, stop_time_id, archived, created_at, \
             monday, tuesday, wednesday, thursday, friday, saturday, sunday) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(&subscription.trip_id)
        .bind(&subscription.stop_time_id)
        .bind(subscription.archived)
        .bind(subscription.created_at)
        .bind(days.monday)
        .bind(days.tuesday)
        .bind(days.wednesday)
        .bind(days.thursday)
        .bind(days.friday)
        .bind(days.saturday)
        .bind(days.sunday)
        .execute(&mut *tx)
        .await?;

        for (position, channel_id) in subscription.notification_ids.iter().enumerate() {
            sqlx::query(
                "insert into subscription_channels(subscription_id, position, channel_id) \
                 values ($1, $2, $3)",
            )
            .bind(subscription.id)
            .bind(position as i32)
            .bind(channel_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::UnknownReference
                }
                other => StoreError::Database(other),
            })?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument("Fetch subscriptions for a user", skip(self))]
    async fn fetch_all_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "{} where user_id=$1 order by created_at, id",
            SELECT_SUBSCRIPTION
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut links = self.fetch_links(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let notification_ids = links.remove(&row.id).unwrap_or_default();
                row.into_subscription(notification_ids)
            })
            .collect())
    }
}
