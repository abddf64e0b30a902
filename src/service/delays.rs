use std::sync::Arc;

use anyhow::Context;

use uuid::Uuid;

use crate::model::{DelayFeed, DelayedTrip, Subscription};
use crate::repo::{FeedSource, StoreError, SubscriptionStore};

#[derive(Debug, thiserror::Error)]
pub enum DelayError {
    #[error("Delay feed is unavailable")]
    FeedUnavailable(#[source] anyhow::Error),
    #[error("Failed to load subscriptions")]
    SubscriptionLookupFailed(#[source] StoreError),
}

/// Serves the live delay feed, whole or narrowed to one user's subscriptions
#[derive(Clone)]
pub struct DelayService {
    feed: Arc<dyn FeedSource>,
    subscriptions: Arc<dyn SubscriptionStore>,
    feed_key: String,
}

impl DelayService {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        subscriptions: Arc<dyn SubscriptionStore>,
        feed_key: impl Into<String>,
    ) -> Self {
        Self {
            feed,
            subscriptions,
            feed_key: feed_key.into(),
        }
    }

    /// The current snapshot, as stored
    #[tracing::instrument("Read all delays", skip(self), fields(feed_key = %self.feed_key))]
    pub async fn all_delays(&self) -> Result<DelayFeed, DelayError> {
        let raw = self
            .feed
            .fetch(&self.feed_key)
            .await
            .map_err(|e| DelayError::FeedUnavailable(e.into()))?
            .with_context(|| format!("No delay feed stored under {}", self.feed_key))
            .map_err(DelayError::FeedUnavailable)?;

        serde_json::from_slice(&raw)
            .context("Failed to parse the delay feed")
            .map_err(DelayError::FeedUnavailable)
    }

    /// The snapshot narrowed to trips the user subscribes to
    #[tracing::instrument("Read delays for a user", skip(self))]
    pub async fn delays_for_user(&self, user_id: Uuid) -> Result<DelayFeed, DelayError> {
        let feed = self.all_delays().await?;
        let subscriptions = self
            .subscriptions
            .fetch_all_for_user(user_id)
            .await
            .map_err(DelayError::SubscriptionLookupFailed)?;

        let trips = correlate(&feed.trips, &subscriptions);
        Ok(feed.with_trips(trips))
    }
}

/// Feed trips matching any subscription's trip, in feed order.
/// A trip appears once per subscription that names it.
pub fn correlate(trips: &[DelayedTrip], subscriptions: &[Subscription]) -> Vec<DelayedTrip> {
    let mut matched = Vec::new();
    for trip in trips {
        for subscription in subscriptions {
            if subscription.trip_id == trip.trip_id {
                matched.push(trip.clone());
            }
        }
    }
    matched
}
