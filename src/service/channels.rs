use std::sync::Arc;

use uuid::Uuid;

use crate::model::{NewNotificationChannel, NotificationChannel};
use crate::repo::{ChannelStore, StoreResult};

/// Notification channel records owned by a user
#[derive(Clone)]
pub struct ChannelService {
    channels: Arc<dyn ChannelStore>,
}

impl ChannelService {
    pub fn new(channels: Arc<dyn ChannelStore>) -> Self {
        Self { channels }
    }

    #[tracing::instrument("Create a notification channel", skip(self, new_channel), fields(kind = %new_channel.kind))]
    pub async fn create(
        &self,
        user_id: Uuid,
        new_channel: NewNotificationChannel,
    ) -> StoreResult<NotificationChannel> {
        let channel = NotificationChannel::new(user_id, new_channel);
        self.channels.insert(&channel).await?;
        Ok(channel)
    }

    pub async fn list(&self, user_id: Uuid) -> StoreResult<Vec<NotificationChannel>> {
        self.channels.fetch_all_for_user(user_id).await
    }
}
