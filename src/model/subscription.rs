use chrono::{DateTime, SubsecRound, Utc};

use serde::Serialize;

use uuid::Uuid;

use crate::domain::WeekdaySet;

/// Subscription request, validated before anything is written
#[derive(Debug)]
pub struct NewSubscription {
    pub trip_id: String,
    pub stop_time_id: String,
    pub days: WeekdaySet,
    pub notification_ids: Vec<Uuid>,
}

/// A standing request to hear about delays on a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub trip_id: String,
    pub stop_time_id: String,
    pub archived: bool,
    #[serde(rename = "created", with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub days: WeekdaySet,
    /// Ordered as requested
    pub notification_ids: Vec<Uuid>,
}

impl Subscription {
    pub fn new(user_id: Uuid, new_subscription: NewSubscription) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            trip_id: new_subscription.trip_id,
            stop_time_id: new_subscription.stop_time_id,
            archived: false,
            created_at: Utc::now().trunc_subsecs(0),
            days: new_subscription.days,
            notification_ids: new_subscription.notification_ids,
        }
    }
}
