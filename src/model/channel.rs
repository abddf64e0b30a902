use chrono::{DateTime, SubsecRound, Utc};

use serde::Serialize;

use uuid::Uuid;

use crate::domain::ChannelKind;

#[derive(Debug)]
pub struct NewNotificationChannel {
    pub kind: ChannelKind,
    pub name: String,
    pub value: String,
}

/// A named way to reach a user, referenced by subscriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationChannel {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub name: String,
    pub value: String,
    #[serde(rename = "date_created", with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl NotificationChannel {
    pub fn new(user_id: Uuid, new_channel: NewNotificationChannel) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: new_channel.kind,
            name: new_channel.name,
            value: new_channel.value,
            created_at: Utc::now().trunc_subsecs(0),
        }
    }
}
