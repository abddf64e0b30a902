use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::{get, post, web, HttpResponse};

use secrecy::{ExposeSecret, Secret};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::auth::{self, Authenticated};
use crate::client::ConfirmationMailer;
use crate::domain::{EmailAddress, PersonName};
use crate::error::{RestError, RestResult};
use crate::output;
use crate::service::{CredentialService, SessionService};

/// Signup body. Leaving out both email and password creates an anonymous user.
#[derive(Debug, Deserialize)]
pub struct NewUserBody {
    #[serde(default, alias = "Name")]
    name: Option<String>,
    #[serde(default, alias = "Email")]
    email: Option<String>,
    #[serde(default, alias = "Password")]
    password: Option<Secret<String>>,
}

/// What a signup asked for, once the body has been validated
#[derive(Debug)]
enum Signup {
    Anonymous,
    Registered {
        name: Option<PersonName>,
        email: EmailAddress,
        password: Secret<String>,
    },
}

impl TryFrom<NewUserBody> for Signup {
    type Error = String;

    fn try_from(body: NewUserBody) -> Result<Self, Self::Error> {
        let email = body.email.filter(|email| !email.trim().is_empty());
        let password = body
            .password
            .filter(|password| !password.expose_secret().is_empty());

        match (email, password) {
            (None, None) => Ok(Self::Anonymous),
            (Some(email), Some(password)) => {
                let name = body
                    .name
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| name.parse())
                    .transpose()?;
                let email = email.parse()?;
                Ok(Self::Registered {
                    name,
                    email,
                    password,
                })
            }
            _ => Err("Email and password must be given together".into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignupResult {
    #[serde(rename = "ID")]
    id: Uuid,
    token: String,
    created_on: i64,
}

/// Create a registered or anonymous user and sign them in
#[tracing::instrument(name = "Create a new user", skip_all)]
#[post("")]
async fn create(
    credentials: web::Data<CredentialService>,
    sessions: web::Data<SessionService>,
    mailer: web::Data<ConfirmationMailer>,
    body: web::Json<NewUserBody>,
) -> RestResult<HttpResponse> {
    let signup = Signup::try_from(body.into_inner()).map_err(RestError::BadRequest)?;

    let user = match signup {
        Signup::Anonymous => credentials.create_anonymous_user().await?,
        Signup::Registered {
            name,
            email,
            password,
        } => {
            let user = credentials
                .create_registered_user(name, email, password)
                .await?;
            // The account exists either way; the user can ask for a resend
            if let Err(e) = mailer.send(&user).await {
                tracing::error!(error = ?e, user_id = %user.id, "Failed to send confirmation email");
            }
            user
        }
    };

    let session = sessions.issue(user.id).await?;
    let token = sessions.encode(&session)?;

    Ok(output::ok(SignupResult {
        id: user.id,
        token: token.to_string(),
        created_on: user.created_at.timestamp(),
    }))
}

/// Send the confirmation email again
#[tracing::instrument(name = "Resend confirmation email", skip_all)]
#[get("/resend", wrap = "from_fn(auth::authenticated)")]
async fn resend(
    auth: Authenticated,
    credentials: web::Data<CredentialService>,
    mailer: web::Data<ConfirmationMailer>,
) -> RestResult<HttpResponse> {
    let user = credentials.get_user(auth.session().user_id).await?;
    if user.is_anonymous() {
        return Err(RestError::BadRequest(
            "Anonymous users have no email to confirm".into(),
        ));
    }

    mailer.send(&user).await?;

    Ok(output::ok(()))
}

pub fn scope() -> impl HttpServiceFactory {
    web::scope("/users").service(create).service(resend)
}
