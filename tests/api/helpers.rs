use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response};

use secrecy::Secret;

use serde_json::{json, Value};

use url::Url;

use uuid::Uuid;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use delay_api::app::{self, AppState, Stores};
use delay_api::auth::AUTH_HEADER;
use delay_api::client::{ConfirmationMailer, EmailClient};
use delay_api::crypto::SigningKey;
use delay_api::repo::memory::MemoryStore;
use delay_api::service::SessionService;
use delay_api::telemetry;

pub const FEED_KEY: &str = "delays";

lazy_static::lazy_static! {
    static ref TRACING: () = {
        let filter = "debug".to_string();
        if std::env::var("TEST_LOG").is_ok() {
            let subscriber = telemetry::create_subscriber(filter, std::io::stdout);
            telemetry::set_subscriber(subscriber).expect("Failed to set subscriber");
        } else {
            let subscriber = telemetry::create_subscriber(filter, std::io::sink);
            telemetry::set_subscriber(subscriber).expect("Failed to set subscriber");
        }
    };
}

pub struct TestApp {
    addr: String,

    pub client: Client,
    pub email_server: MockServer,
    pub store: Arc<MemoryStore>,
    pub sessions: SessionService,
}

/// A signed-in user
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        use rand::{distributions::Alphanumeric, Rng};

        lazy_static::initialize(&TRACING);

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let signing_key = {
            let rand_key: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();
            let rand_key = Secret::new(rand_key);

            SigningKey::new(&rand_key).expect("Failed to create signing key")
        };

        let email_server = MockServer::start().await;

        let mailer = {
            let sender = "confirm@delayed.test"
                .parse()
                .expect("Failed to parse sender email address");
            let api_base_url =
                Url::parse(&email_server.uri()).expect("Failed to parse mock server uri");
            let api_auth_token = Secret::new("TestAuthorization".into());
            let api_timeout = Duration::from_secs(2);

            let email_client = EmailClient::new(sender, api_timeout, api_base_url, api_auth_token)
                .expect("Failed to create email client");
            let confirm_base_url = Url::parse(&addr).expect("Failed to parse app address");

            ConfirmationMailer::new(email_client, signing_key.clone(), confirm_base_url)
        };

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            Stores::memory(store.clone()),
            signing_key,
            FEED_KEY,
            mailer,
        );
        let sessions = state.sessions.clone();

        let server = app::run(listener, state).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            client,
            email_server,
            store,
            sessions,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub fn authorized_request(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let req = self.request(method, url);
        if let Some(token) = token {
            req.header(AUTH_HEADER, token)
        } else {
            req
        }
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn create_user(&self, body: &Value) -> reqwest::Result<Response> {
        self.request(Method::POST, "users").json(body).send().await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Result<Response> {
        self.request(Method::POST, "tokens")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
    }

    pub async fn get(&self, url: &str, token: Option<&str>) -> reqwest::Result<Response> {
        self.authorized_request(Method::GET, url, token).send().await
    }

    pub async fn post(
        &self,
        url: &str,
        token: Option<&str>,
        body: &Value,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::POST, url, token)
            .json(body)
            .send()
            .await
    }

    /// Accept every email the app tries to send
    pub async fn accept_emails(&self) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.email_server)
            .await;
    }

    pub async fn anonymous_user(&self) -> TestUser {
        let body = envelope(self.create_user(&json!({})).await.unwrap()).await;
        signup_user(&body)
    }

    pub async fn registered_user(&self, email: &str, password: &str) -> TestUser {
        let body = envelope(
            self.create_user(&json!({ "name": "Test User", "email": email, "password": password }))
                .await
                .unwrap(),
        )
        .await;
        signup_user(&body)
    }

    /// A signed-in user with one email channel, returning the channel id
    pub async fn user_with_channel(&self) -> (TestUser, Uuid) {
        let user = self.anonymous_user().await;
        let body = envelope(
            self.post(
                "notifications",
                Some(&user.token),
                &json!({ "type": "e", "name": "Work", "value": "work@example.com" }),
            )
            .await
            .unwrap(),
        )
        .await;
        let channel_id = body["Result"]["id"].as_str().unwrap().parse().unwrap();
        (user, channel_id)
    }

    pub async fn subscribe(&self, user: &TestUser, trip_id: &str, channel_id: Uuid) -> Value {
        envelope(
            self.post(
                "subscriptions",
                Some(&user.token),
                &json!({
                    "trip_id": trip_id,
                    "stop_time_id": format!("{}-stop", trip_id),
                    "days": ["Mon", "Wed"],
                    "notification_ids": [channel_id],
                }),
            )
            .await
            .unwrap(),
        )
        .await
    }

    pub async fn put_feed(&self, trip_ids: &[&str]) {
        let feed = delay_feed(trip_ids);
        self.store
            .put_feed(FEED_KEY, serde_json::to_vec(&feed).unwrap())
            .await;
    }
}

/// Parse a response body that must be a 200 envelope
pub async fn envelope(res: Response) -> Value {
    assert_eq!(200, res.status().as_u16());
    res.json().await.expect("Response was not JSON")
}

fn signup_user(body: &Value) -> TestUser {
    assert_eq!(true, body["Success"]);
    TestUser {
        id: body["Result"]["ID"].as_str().unwrap().parse().unwrap(),
        token: body["Result"]["Token"].as_str().unwrap().to_string(),
    }
}

/// A collection job snapshot listing `trip_ids` in order
pub fn delay_feed(trip_ids: &[&str]) -> Value {
    let trips: Vec<Value> = trip_ids
        .iter()
        .map(|trip_id| {
            json!({
                "trip_id": trip_id,
                "route_id": format!("route-{}", trip_id),
                "route_long_name": "Britomart To Albany",
                "route_short_name": "NEX",
                "next_stop": {
                    "id": "7001",
                    "name": "Akoranga",
                    "lat": -36.79,
                    "lon": 174.76,
                    "scheduled_arrival": "2017-10-01T08:15:00+13:00",
                    "eta": "2017-10-01T08:21:30+13:00",
                    "delay": 390
                },
                "vehicle_id": format!("vehicle-{}", trip_id),
                "lat": -36.8,
                "lon": 174.75
            })
        })
        .collect();

    json!({
        "count": trips.len(),
        "trips": trips,
        "exec_name": "collector",
        "created": 1506800000,
        "valid_until": 1506800060
    })
}

pub fn trip_ids(body: &Value) -> Vec<String> {
    body["Result"]["trips"]
        .as_array()
        .unwrap()
        .iter()
        .map(|trip| trip["trip_id"].as_str().unwrap().to_string())
        .collect()
}
