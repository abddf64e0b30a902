use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpResponse};

use secrecy::Secret;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::error::RestResult;
use crate::output::{self, codes};
use crate::service::{CredentialError, CredentialService, SessionService};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(alias = "Email")]
    email: String,
    #[serde(alias = "Password")]
    password: Secret<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoginResult {
    #[serde(rename = "UserID")]
    user_id: Uuid,
    auth_token: String,
}

const INCORRECT_LOGIN: &str = "Incorrect email or password";

/// Exchange an email and password for a new session token
#[tracing::instrument(name = "Log in", skip_all)]
#[post("")]
async fn create(
    credentials: web::Data<CredentialService>,
    sessions: web::Data<SessionService>,
    body: web::Json<LoginBody>,
) -> RestResult<HttpResponse> {
    let LoginBody { email, password } = body.into_inner();

    // An unparseable email can never belong to an account
    let Ok(email) = email.parse::<EmailAddress>() else {
        return Ok(output::domain_error(
            codes::INCORRECT_EMAIL_OR_PASSWORD,
            INCORRECT_LOGIN,
        ));
    };

    let user = match credentials.authenticate(&email, password).await {
        Ok(user) => user,
        // Both cases read the same to the client so registered emails cannot be probed
        Err(e @ (CredentialError::EmailNotFound | CredentialError::InvalidCredentials)) => {
            tracing::info!(reason = %e, "Login failed");
            return Ok(output::domain_error(
                codes::INCORRECT_EMAIL_OR_PASSWORD,
                INCORRECT_LOGIN,
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let session = sessions.issue(user.id).await?;
    let token = sessions.encode(&session)?;

    Ok(output::ok(LoginResult {
        user_id: user.id,
        auth_token: token.to_string(),
    }))
}

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/tokens").service(create)
}
