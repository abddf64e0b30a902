use std::future::{ready, Ready};

use actix_web::{dev, FromRequest, HttpMessage, HttpRequest};

use crate::error::RestError;
use crate::model::SessionToken;

/// The session resolved by the authorization pipeline for this request
#[derive(Debug, Clone)]
pub struct Authenticated(pub SessionToken);

impl Authenticated {
    pub fn session(&self) -> &SessionToken {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = RestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        // NOTE: Only present on routes wrapped by the pipeline middleware
        let session = req
            .extensions()
            .get::<SessionToken>()
            .cloned()
            .map(Self)
            .ok_or_else(|| {
                RestError::Internal(anyhow::anyhow!(
                    "Handler requires a session but no pipeline resolved one"
                ))
            });
        ready(session)
    }
}
