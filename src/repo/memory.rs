//! In-process stores for tests and local runs without Postgres or Redis

use std::collections::HashMap;

use async_trait::async_trait;

use secrecy::Secret;

use tokio::sync::Mutex;

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::model::{
    NewUser, NotificationChannel, SessionToken, Subscription, User, UserCredentials,
};

use super::{
    ChannelStore, FeedSource, SessionStore, StoreError, StoreResult, SubscriptionStore, UserStore,
};

struct StoredUser {
    user: User,
    password_hash: Option<Secret<String>>,
}

#[derive(Default)]
struct State {
    users: Vec<StoredUser>,
    sessions: HashMap<Uuid, SessionToken>,
    channels: Vec<NotificationChannel>,
    subscriptions: Vec<Subscription>,
    feeds: HashMap<String, Vec<u8>>,
    feed_down: bool,
    subscriptions_down: bool,
}

impl State {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|stored| stored.user.id == id)
    }
}

/// Every store trait and the feed source behind one lock
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user's email as confirmed, returning false for unknown ids
    pub async fn confirm_email(&self, user_id: Uuid) -> bool {
        let mut state = self.state.lock().await;
        match state.users.iter_mut().find(|stored| stored.user.id == user_id) {
            Some(stored) => {
                stored.user.email_confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Replace the blob stored under `key`
    pub async fn put_feed(&self, key: &str, feed: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .await
            .feeds
            .insert(key.to_string(), feed.into());
    }

    /// Make every feed read fail until switched back
    pub async fn set_feed_down(&self, down: bool) {
        self.state.lock().await.feed_down = down;
    }

    /// Make every subscription read or write fail until switched back
    pub async fn set_subscriptions_down(&self, down: bool) {
        self.state.lock().await.subscriptions_down = down;
    }

    pub async fn subscription_count(&self) -> usize {
        self.state.lock().await.subscriptions.len()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Database(sqlx::Error::Protocol(format!("{} unavailable", what)))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, new_user: &NewUser) -> StoreResult<User> {
        let mut state = self.state.lock().await;

        if let Some(registration) = &new_user.registration {
            let taken = state
                .users
                .iter()
                .any(|stored| stored.user.email.as_deref() == Some(registration.email.as_ref()));
            if taken {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let user = User::from(new_user);
        state.users.push(StoredUser {
            user: user.clone(),
            password_hash: new_user
                .registration
                .as_ref()
                .map(|registration| registration.password_hash.clone()),
        });
        Ok(user)
    }

    async fn fetch(&self, id: Uuid) -> StoreResult<User> {
        self.state
            .lock()
            .await
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn fetch_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Option<UserCredentials>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find_map(|stored| {
            let matches = stored.user.email.as_deref() == Some(email.as_ref());
            match (&stored.password_hash, matches) {
                (Some(password_hash), true) => Some(UserCredentials {
                    id: stored.user.id,
                    password_hash: password_hash.clone(),
                }),
                _ => None,
            }
        }))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, token: &SessionToken) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if !state.user_exists(token.user_id) {
            return Err(StoreError::UnknownReference);
        }
        state.sessions.insert(token.token_id, token.clone());
        Ok(())
    }

    async fn fetch(&self, token_id: Uuid) -> StoreResult<Option<SessionToken>> {
        Ok(self.state.lock().await.sessions.get(&token_id).cloned())
    }

    async fn delete(&self, token_id: Uuid) -> StoreResult<bool> {
        Ok(self.state.lock().await.sessions.remove(&token_id).is_some())
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn insert(&self, channel: &NotificationChannel) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if !state.user_exists(channel.user_id) {
            return Err(StoreError::UnknownReference);
        }
        state.channels.push(channel.clone());
        Ok(())
    }

    async fn fetch_all_for_user(&self, user_id: Uuid) -> StoreResult<Vec<NotificationChannel>> {
        Ok(self
            .state
            .lock()
            .await
            .channels
            .iter()
            .filter(|channel| channel.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn insert(&self, subscription: &Subscription) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.subscriptions_down {
            return Err(unavailable("subscriptions"));
        }
        if !state.user_exists(subscription.user_id) {
            return Err(StoreError::UnknownReference);
        }
        let all_linked = subscription
            .notification_ids
            .iter()
            .all(|id| state.channels.iter().any(|channel| channel.id == *id));
        if !all_linked {
            return Err(StoreError::UnknownReference);
        }
        state.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn fetch_all_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        let state = self.state.lock().await;
        if state.subscriptions_down {
            return Err(unavailable("subscriptions"));
        }
        Ok(state
            .subscriptions
            .iter()
            .filter(|subscription| subscription.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FeedSource for MemoryStore {
    async fn fetch(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let state = self.state.lock().await;
        if state.feed_down {
            return Err(StoreError::Feed(anyhow::anyhow!("feed cache unavailable")));
        }
        Ok(state.feeds.get(key).cloned())
    }
}
