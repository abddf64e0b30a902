use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{get, post, web, HttpResponse};

use serde::Deserialize;

use uuid::Uuid;

use crate::auth::{self, Authenticated};
use crate::domain::WeekdaySet;
use crate::error::RestResult;
use crate::model::NewSubscription;
use crate::output::{self, codes};
use crate::service::{SubscriptionError, SubscriptionService};

#[derive(Debug, Deserialize)]
pub struct NewSubscriptionBody {
    trip_id: String,
    stop_time_id: String,
    #[serde(default)]
    days: Vec<String>,
    #[serde(default)]
    notification_ids: Vec<Uuid>,
}

impl From<NewSubscriptionBody> for NewSubscription {
    fn from(body: NewSubscriptionBody) -> Self {
        Self {
            trip_id: body.trip_id,
            stop_time_id: body.stop_time_id,
            days: WeekdaySet::from_codes(&body.days),
            notification_ids: body.notification_ids,
        }
    }
}

/// Subscribe the caller to delays on a trip
#[tracing::instrument(name = "Create a subscription", skip_all, fields(user_id = %auth.session().user_id))]
#[post("")]
async fn create(
    auth: Authenticated,
    subscriptions: web::Data<SubscriptionService>,
    body: web::Json<NewSubscriptionBody>,
) -> RestResult<HttpResponse> {
    let new_subscription = NewSubscription::from(body.into_inner());

    match subscriptions
        .create(auth.session().user_id, new_subscription)
        .await
    {
        Ok(subscription) => Ok(output::ok(subscription)),
        Err(e @ SubscriptionError::NoNotificationMethods) => {
            tracing::info!(reason = %e, "Subscription rejected");
            Ok(output::domain_error(
                codes::NO_NOTIFICATION_METHODS,
                "No notification methods provided",
            ))
        }
        Err(e @ SubscriptionError::UnknownNotificationChannel(_)) => {
            tracing::info!(reason = %e, "Subscription rejected");
            Ok(output::domain_error(
                codes::UNKNOWN_NOTIFICATION_CHANNEL,
                "Unknown notification method",
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// All of the caller's subscriptions
#[tracing::instrument(name = "List subscriptions", skip_all, fields(user_id = %auth.session().user_id))]
#[get("")]
async fn list(
    auth: Authenticated,
    subscriptions: web::Data<SubscriptionService>,
) -> RestResult<HttpResponse> {
    let subscriptions = subscriptions.list(auth.session().user_id).await?;
    Ok(output::ok(subscriptions))
}

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/subscriptions")
        .wrap(from_fn(auth::confirmed))
        .service(create)
        .service(list)
}
