use serde_json::{json, Value};

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{envelope, TestApp};

#[tokio::test]
async fn anonymous_signup_returns_a_working_token() {
    let app = TestApp::spawn().await;

    app.put_feed(&["A"]).await;

    let user = app.anonymous_user().await;
    let res = app.get("delays", Some(&user.token)).await.unwrap();

    // Anonymous users are never confirmed, so the gate only annotates
    assert_eq!(200, res.status().as_u16());
    assert_eq!(
        "false",
        res.headers().get("x-delay-confirmed").unwrap().to_str().unwrap()
    );
}

#[tokio::test]
async fn registered_signup_sends_a_confirmation_link() {
    let app = TestApp::spawn().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let body = envelope(
        app.create_user(&json!({ "name": "Ann", "email": "ann@example.com", "password": "p1" }))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(true, body["Success"]);
    assert!(body["Result"]["CreatedOn"].as_i64().unwrap() > 0);

    let email_request = &app.email_server.received_requests().await.unwrap()[0];
    let email_body: Value = serde_json::from_slice(&email_request.body).unwrap();
    let text = email_body["TextBody"].as_str().unwrap();

    let links: Vec<_> = linkify::LinkFinder::new()
        .links(text)
        .filter(|l| *l.kind() == linkify::LinkKind::Url)
        .collect();
    assert_eq!(1, links.len());
    assert!(links[0].as_str().contains("/confirm/"));
}

#[tokio::test]
async fn signup_succeeds_when_the_email_api_fails() {
    let app = TestApp::spawn().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .create_user(&json!({ "email": "ann@example.com", "password": "p1" }))
        .await
        .unwrap();

    assert_eq!(200, res.status().as_u16());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;
    app.accept_emails().await;

    app.registered_user("ann@example.com", "p1").await;
    let res = app
        .create_user(&json!({ "email": "ANN@example.com", "password": "p2" }))
        .await
        .unwrap();

    assert_eq!(409, res.status().as_u16());
    let body: Value = res.json().await.unwrap();
    assert_eq!(false, body["Success"]);
    assert_eq!(409, body["Errors"]["Code"]);
}

#[tokio::test]
async fn invalid_signups_are_rejected() {
    let app = TestApp::spawn().await;

    let cases = [
        (json!({ "email": "ann@example.com" }), "missing password"),
        (json!({ "password": "p1" }), "missing email"),
        (json!({ "email": "not-an-email", "password": "p1" }), "invalid email"),
        (json!({ "email": 5 }), "malformed body"),
    ];

    for (body, description) in cases {
        let res = app.create_user(&body).await.unwrap();
        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not fail with 400 when the payload had a {}",
            description
        );
    }
}

#[tokio::test]
async fn resend_requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get("users/resend", None).await.unwrap();

    assert_eq!(403, res.status().as_u16());
}

#[tokio::test]
async fn resend_is_rejected_for_anonymous_users() {
    let app = TestApp::spawn().await;
    let user = app.anonymous_user().await;

    let res = app.get("users/resend", Some(&user.token)).await.unwrap();

    assert_eq!(400, res.status().as_u16());
}

#[tokio::test]
async fn resend_sends_another_email() {
    let app = TestApp::spawn().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;

    let user = app.registered_user("ann@example.com", "p1").await;
    let res = app.get("users/resend", Some(&user.token)).await.unwrap();

    assert_eq!(200, res.status().as_u16());
}

#[tokio::test]
async fn resend_fails_when_the_email_api_fails() {
    let app = TestApp::spawn().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.email_server)
        .await;

    let user = app.registered_user("ann@example.com", "p1").await;
    let res = app.get("users/resend", Some(&user.token)).await.unwrap();

    assert_eq!(500, res.status().as_u16());
}
