use anyhow::Context;

use url::Url;

use crate::crypto::{Confirmation, SigningKey};
use crate::domain::EmailAddress;
use crate::model::User;

use super::{Email, EmailClient};

/// Sends the "confirm your email" message with a signed link
#[derive(Debug)]
pub struct ConfirmationMailer {
    email_client: EmailClient,
    signing_key: SigningKey,
    confirm_base_url: Url,
}

impl ConfirmationMailer {
    pub fn new(email_client: EmailClient, signing_key: SigningKey, confirm_base_url: Url) -> Self {
        Self {
            email_client,
            signing_key,
            confirm_base_url,
        }
    }

    /// Link of the form `<base>/confirm/<signed user id>`
    pub fn confirmation_url(&self, user: &User) -> anyhow::Result<Url> {
        let token = Confirmation::from(user.id)
            .sign(&self.signing_key)
            .context("Failed to sign confirmation token")?;
        self.confirm_base_url
            .join(&format!("confirm/{}", token))
            .context("Failed to build confirmation URL")
    }

    #[tracing::instrument("Send confirmation email", skip(self, user), fields(user_id = %user.id))]
    pub async fn send(&self, user: &User) -> anyhow::Result<()> {
        let recipient: EmailAddress = user
            .email
            .as_deref()
            .context("User has no email address")?
            .parse()
            .map_err(|e| anyhow::anyhow!("Stored email is invalid: {}", e))?;

        let confirmation_url = self.confirmation_url(user)?;
        let email = build_confirmation_email(user.name.as_deref(), &confirmation_url);

        self.email_client.send(&recipient, &email).await
    }
}

fn build_confirmation_email(name: Option<&str>, confirmation_url: &Url) -> Email {
    let name = name.unwrap_or("there");
    let subject = "Confirm Your Email".to_string();
    let html_body = format!(
        "<p>Hey {}</p><p>Thank you for signing up to Delayed. Please confirm your email so we can keep you posted about delays.</p><p>Click <a href=\"{}\">here</a> to confirm.</p>",
        name, confirmation_url
    );
    let text_body = format!(
        "Hey {}\r\n\r\nThank you for signing up to Delayed. Please confirm your email so we can keep you posted about delays.\r\nVisit {} to confirm.\r\n\r\nThe Delayed Team",
        name, confirmation_url
    );

    Email {
        subject,
        html_body,
        text_body,
    }
}
