use std::net::TcpListener;
use std::time::Duration;

use anyhow::Context;

use secrecy::ExposeSecret;

use sqlx::postgres::PgPoolOptions;

use delay_api::app::{self, AppState, Stores};
use delay_api::client::{ConfirmationMailer, EmailClient};
use delay_api::crypto::SigningKey;
use delay_api::repo::RedisFeedSource;
use delay_api::settings::Settings;
use delay_api::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info".into(), std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load()?;

    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(settings.database.with_db());
    if settings.app.run_migrations() {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let feed = RedisFeedSource::connect_lazy(settings.feed.redis_url().expose_secret())?;

    let signing_key = SigningKey::new(settings.app.secret_key())?;

    let email_client = EmailClient::new(
        settings.email.sender()?,
        settings.email.api_timeout(),
        settings.email.api_base_url()?,
        settings.email.api_auth_token(),
    )?;
    let mailer = ConfirmationMailer::new(
        email_client,
        signing_key.clone(),
        settings.email.confirm_base_url()?,
    );

    let state = AppState::new(
        Stores::postgres(pool, feed),
        signing_key,
        settings.feed.key(),
        mailer,
    )
    .with_session_options(settings.session.ttl(), settings.session.embed_user_id());

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    app::run(listener, state)?.await.context("Failed to run app")
}
