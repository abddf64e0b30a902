use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{get, post, web, HttpResponse};

use serde::Deserialize;

use crate::auth::{self, Authenticated};
use crate::domain::ChannelKind;
use crate::error::{RestError, RestResult};
use crate::model::NewNotificationChannel;
use crate::output;
use crate::service::ChannelService;

#[derive(Debug, Deserialize)]
pub struct NewChannelBody {
    #[serde(rename = "type", alias = "Type")]
    kind: ChannelKind,
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "Value")]
    value: String,
}

impl TryFrom<NewChannelBody> for NewNotificationChannel {
    type Error = String;

    fn try_from(body: NewChannelBody) -> Result<Self, Self::Error> {
        if body.value.trim().is_empty() {
            return Err("Notification value cannot be empty".into());
        }
        Ok(Self {
            kind: body.kind,
            name: body.name.trim().to_string(),
            value: body.value.trim().to_string(),
        })
    }
}

/// Register a way to reach the caller
#[tracing::instrument(name = "Create a notification channel", skip_all, fields(user_id = %auth.session().user_id))]
#[post("")]
async fn create(
    auth: Authenticated,
    channels: web::Data<ChannelService>,
    body: web::Json<NewChannelBody>,
) -> RestResult<HttpResponse> {
    let new_channel =
        NewNotificationChannel::try_from(body.into_inner()).map_err(RestError::BadRequest)?;

    let channel = channels.create(auth.session().user_id, new_channel).await?;

    Ok(output::ok(channel))
}

/// All of the caller's notification channels
#[tracing::instrument(name = "List notification channels", skip_all, fields(user_id = %auth.session().user_id))]
#[get("")]
async fn list(auth: Authenticated, channels: web::Data<ChannelService>) -> RestResult<HttpResponse> {
    let channels = channels.list(auth.session().user_id).await?;
    Ok(output::ok(channels))
}

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/notifications")
        .wrap(from_fn(auth::confirmed))
        .service(create)
        .service(list)
}
