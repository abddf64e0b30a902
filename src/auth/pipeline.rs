use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{web, HttpMessage, HttpResponse};

use anyhow::Context;

use crate::error::RestError;
use crate::model::SessionToken;
use crate::service::{CredentialService, SessionError, SessionService};

use super::{AUTH_HEADER, CONFIRMED_HEADER};

/// One named check a protected route runs before its handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Decode the auth header into a live session
    RequireToken,
    /// Flag, without rejecting, sessions whose user has not confirmed their email
    RequireConfirmedEmail,
}

/// Outcome of a single step
#[derive(Debug)]
pub enum Flow {
    Continue,
    Halt(RestError),
}

/// Values the steps hand to later steps and to the handler.
/// A fresh scope is built for every request.
#[derive(Debug, Default)]
pub struct RequestScope {
    pub session: Option<SessionToken>,
    pub response_headers: Vec<(HeaderName, HeaderValue)>,
}

/// What a step may read from the request
pub struct StepContext<'a> {
    pub headers: &'a HeaderMap,
    pub sessions: &'a SessionService,
    pub credentials: &'a CredentialService,
}

impl<'a> StepContext<'a> {
    fn from_request(req: &'a ServiceRequest) -> Result<Self, RestError> {
        // NOTE: Both services must be registered with the application at startup
        let sessions = req
            .app_data::<web::Data<SessionService>>()
            .context("SessionService not registered for application")?;
        let credentials = req
            .app_data::<web::Data<CredentialService>>()
            .context("CredentialService not registered for application")?;

        Ok(Self {
            headers: req.headers(),
            sessions: sessions.get_ref(),
            credentials: credentials.get_ref(),
        })
    }
}

impl Step {
    pub async fn run(&self, ctx: &StepContext<'_>, scope: &mut RequestScope) -> Flow {
        match self {
            Self::RequireToken => require_token(ctx, scope).await,
            Self::RequireConfirmedEmail => require_confirmed_email(ctx, scope).await,
        }
    }
}

#[tracing::instrument("Require session token", skip_all, fields(user_id = tracing::field::Empty))]
async fn require_token(ctx: &StepContext<'_>, scope: &mut RequestScope) -> Flow {
    let Some(value) = ctx.headers.get(AUTH_HEADER) else {
        tracing::info!("Request carried no auth header");
        return Flow::Halt(RestError::MissingAuthHeader);
    };
    let Ok(encoded) = value.to_str() else {
        tracing::warn!(reason = "not visible ASCII", "Rejected session token");
        return Flow::Halt(RestError::Unauthorized);
    };
    let encoded = encoded.trim();
    if encoded.is_empty() {
        tracing::info!("Request carried an empty auth header");
        return Flow::Halt(RestError::MissingAuthHeader);
    }

    match ctx.sessions.decode(encoded).await {
        Ok(session) => {
            tracing::Span::current().record("user_id", tracing::field::display(session.user_id));
            scope.session = Some(session);
            Flow::Continue
        }
        Err(SessionError::Store(e)) => Flow::Halt(e.into()),
        Err(e) => {
            tracing::warn!(reason = %e, "Rejected session token");
            Flow::Halt(RestError::Unauthorized)
        }
    }
}

#[tracing::instrument("Check email confirmation", skip_all)]
async fn require_confirmed_email(ctx: &StepContext<'_>, scope: &mut RequestScope) -> Flow {
    let Some(session) = &scope.session else {
        return Flow::Halt(RestError::Internal(anyhow::anyhow!(
            "Email confirmation checked before a session was resolved"
        )));
    };

    match ctx.credentials.get_user(session.user_id).await {
        Ok(user) if user.email_confirmed => Flow::Continue,
        Ok(_) => {
            scope.response_headers.push((
                HeaderName::from_static(CONFIRMED_HEADER),
                HeaderValue::from_static("false"),
            ));
            Flow::Continue
        }
        Err(e) => Flow::Halt(RestError::Internal(e.into())),
    }
}

/// An ordered list of steps shared by a group of routes
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    steps: &'static [Step],
}

impl Pipeline {
    pub const AUTHENTICATED: Self = Self {
        steps: &[Step::RequireToken],
    };

    pub const CONFIRMED: Self = Self {
        steps: &[Step::RequireToken, Step::RequireConfirmedEmail],
    };

    #[cfg(test)]
    pub fn steps(&self) -> &'static [Step] {
        self.steps
    }

    /// Run every step in order, stopping at the first halt
    pub async fn run(&self, ctx: &StepContext<'_>, scope: &mut RequestScope) -> Flow {
        for step in self.steps {
            if let Flow::Halt(e) = step.run(ctx, scope).await {
                return Flow::Halt(e);
            }
        }
        Flow::Continue
    }

    async fn handle<B: MessageBody + 'static>(
        &self,
        req: ServiceRequest,
        next: Next<B>,
    ) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
        let mut scope = RequestScope::default();
        let flow = match StepContext::from_request(&req) {
            Ok(ctx) => self.run(&ctx, &mut scope).await,
            Err(e) => Flow::Halt(e),
        };

        if let Flow::Halt(e) = flow {
            let (request, _) = req.into_parts();
            let response = HttpResponse::from_error(e);
            return Ok(ServiceResponse::new(request, response).map_into_right_body());
        }

        if let Some(session) = scope.session {
            req.extensions_mut().insert(session);
        }

        let mut res = next.call(req).await?;
        for (name, value) in scope.response_headers {
            res.headers_mut().insert(name, value);
        }
        Ok(res.map_into_left_body())
    }
}

/// Middleware for routes that need a live session
pub async fn authenticated(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    Pipeline::AUTHENTICATED.handle(req, next).await
}

/// Middleware for routes that need a live session and report email confirmation
pub async fn confirmed(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    Pipeline::CONFIRMED.handle(req, next).await
}
