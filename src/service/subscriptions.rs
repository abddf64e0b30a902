use std::sync::Arc;

use uuid::Uuid;

use crate::model::{NewSubscription, Subscription};
use crate::repo::{ChannelStore, StoreError, SubscriptionStore};

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("A subscription needs at least one notification method")]
    NoNotificationMethods,
    #[error("Notification channel {0} does not belong to the user")]
    UnknownNotificationChannel(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionStore>,
    channels: Arc<dyn ChannelStore>,
}

impl SubscriptionService {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, channels: Arc<dyn ChannelStore>) -> Self {
        Self {
            subscriptions,
            channels,
        }
    }

    /// Validate and store a subscription. Nothing is written unless every
    /// referenced channel exists and belongs to `user_id`.
    #[tracing::instrument("Create a subscription", skip(self, new_subscription), fields(trip_id = %new_subscription.trip_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        new_subscription: NewSubscription,
    ) -> Result<Subscription, SubscriptionError> {
        if new_subscription.notification_ids.is_empty() {
            return Err(SubscriptionError::NoNotificationMethods);
        }

        let owned = self.channels.fetch_all_for_user(user_id).await?;
        if let Some(unknown) = new_subscription
            .notification_ids
            .iter()
            .find(|id| !owned.iter().any(|channel| channel.id == **id))
        {
            return Err(SubscriptionError::UnknownNotificationChannel(*unknown));
        }

        let subscription = Subscription::new(user_id, new_subscription);
        self.subscriptions.insert(&subscription).await?;
        Ok(subscription)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Subscription>, SubscriptionError> {
        Ok(self.subscriptions.fetch_all_for_user(user_id).await?)
    }
}
