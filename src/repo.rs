use async_trait::async_trait;

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::model::{
    NewUser, NotificationChannel, SessionToken, Subscription, User, UserCredentials,
};

mod channels;
mod feed;
pub mod memory;
mod sessions;
mod subscriptions;
mod users;

pub use channels::PgChannelStore;
pub use feed::RedisFeedSource;
pub use sessions::PgSessionStore;
pub use subscriptions::PgSubscriptionStore;
pub use users::PgUserStore;

/// Failures surfaced by the storage collaborators
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Email address is already registered")]
    DuplicateEmail,
    #[error("Referenced record does not exist")]
    UnknownReference,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Feed cache error: {0}")]
    Feed(#[source] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User identity records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user, failing with `DuplicateEmail` when the email is taken
    async fn insert(&self, new_user: &NewUser) -> StoreResult<User>;

    async fn fetch(&self, id: Uuid) -> StoreResult<User>;

    async fn fetch_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Option<UserCredentials>>;
}

/// Server-side session rows
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: &SessionToken) -> StoreResult<()>;

    async fn fetch(&self, token_id: Uuid) -> StoreResult<Option<SessionToken>>;

    /// Returns whether a row was removed
    async fn delete(&self, token_id: Uuid) -> StoreResult<bool>;
}

/// Delay subscriptions and their notification channel links
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Persist the subscription together with its channel links, all or nothing
    async fn insert(&self, subscription: &Subscription) -> StoreResult<()>;

    async fn fetch_all_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>>;
}

/// Notification channel records
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn insert(&self, channel: &NotificationChannel) -> StoreResult<()>;

    async fn fetch_all_for_user(&self, user_id: Uuid) -> StoreResult<Vec<NotificationChannel>>;
}

/// Get-by-key blob store holding the latest delay feed snapshot
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`
    async fn fetch(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
}
