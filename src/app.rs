use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use chrono::Duration;

use sqlx::PgPool;

use tracing_actix_web::TracingLogger;

use crate::client::ConfirmationMailer;
use crate::controller::{delays, notifications, subscriptions, tokens, users};
use crate::crypto::SigningKey;
use crate::error::json_error_handler;
use crate::repo::memory::MemoryStore;
use crate::repo::{
    ChannelStore, FeedSource, PgChannelStore, PgSessionStore, PgSubscriptionStore, PgUserStore,
    RedisFeedSource, SessionStore, SubscriptionStore, UserStore,
};
use crate::service::{
    ChannelService, CredentialService, DelayService, SessionService, SubscriptionService,
};

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("I am alive")
}

/// Storage collaborators the services are built on
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub channels: Arc<dyn ChannelStore>,
    pub feed: Arc<dyn FeedSource>,
}

impl Stores {
    pub fn postgres(pool: PgPool, feed: RedisFeedSource) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            sessions: Arc::new(PgSessionStore::new(pool.clone())),
            subscriptions: Arc::new(PgSubscriptionStore::new(pool.clone())),
            channels: Arc::new(PgChannelStore::new(pool)),
            feed: Arc::new(feed),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            sessions: store.clone(),
            subscriptions: store.clone(),
            channels: store.clone(),
            feed: store,
        }
    }
}

/// Services shared by every worker
pub struct AppState {
    pub credentials: CredentialService,
    pub sessions: SessionService,
    pub delays: DelayService,
    pub subscriptions: SubscriptionService,
    pub channels: ChannelService,
    pub mailer: ConfirmationMailer,
}

impl AppState {
    pub fn new(
        stores: Stores,
        signing_key: SigningKey,
        feed_key: &str,
        mailer: ConfirmationMailer,
    ) -> Self {
        Self {
            credentials: CredentialService::new(stores.users),
            sessions: SessionService::new(signing_key, stores.sessions),
            delays: DelayService::new(stores.feed, stores.subscriptions.clone(), feed_key),
            subscriptions: SubscriptionService::new(stores.subscriptions, stores.channels.clone()),
            channels: ChannelService::new(stores.channels),
            mailer,
        }
    }

    pub fn with_session_options(mut self, ttl: Option<Duration>, embed_user_id: bool) -> Self {
        self.sessions = self.sessions.with_ttl(ttl).embedding_user_id(embed_user_id);
        self
    }
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, state: AppState) -> anyhow::Result<Server> {
    // Wrap application data
    let credentials = web::Data::new(state.credentials);
    let sessions = web::Data::new(state.sessions);
    let delay_service = web::Data::new(state.delays);
    let subscription_service = web::Data::new(state.subscriptions);
    let channel_service = web::Data::new(state.channels);
    let mailer = web::Data::new(state.mailer);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(credentials.clone())
            .app_data(sessions.clone())
            .app_data(delay_service.clone())
            .app_data(subscription_service.clone())
            .app_data(channel_service.clone())
            .app_data(mailer.clone())
            .service(health_check)
            .service(users::scope())
            .service(tokens::scope())
            .service(delays::scope())
            .service(subscriptions::scope())
            .service(notifications::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
