use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{get, web, HttpResponse};

use crate::auth::{self, Authenticated};
use crate::error::RestResult;
use crate::output;
use crate::service::DelayService;

/// Every trip currently running late
#[tracing::instrument(name = "Get all delays", skip_all)]
#[get("")]
async fn all(delays: web::Data<DelayService>) -> RestResult<HttpResponse> {
    let feed = delays.all_delays().await?;
    Ok(output::ok(feed))
}

/// Late trips the caller subscribes to
#[tracing::instrument(name = "Get subscribed delays", skip_all, fields(user_id = %auth.session().user_id))]
#[get("/subscribed")]
async fn subscribed(
    auth: Authenticated,
    delays: web::Data<DelayService>,
) -> RestResult<HttpResponse> {
    let feed = delays.delays_for_user(auth.session().user_id).await?;
    Ok(output::ok(feed))
}

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/delays")
        .wrap(from_fn(auth::confirmed))
        .service(all)
        .service(subscribed)
}
