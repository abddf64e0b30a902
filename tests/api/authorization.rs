use serde_json::Value;

use crate::helpers::{envelope, trip_ids, TestApp};

const CONFIRMED: &str = "x-delay-confirmed";

#[tokio::test]
async fn missing_token_is_forbidden() {
    let app = TestApp::spawn().await;

    for url in ["delays", "delays/subscribed", "subscriptions", "notifications"] {
        let res = app.get(url, None).await.unwrap();
        assert_eq!(403, res.status().as_u16(), "GET /{} without a token", url);
    }
}

#[tokio::test]
async fn blank_token_is_forbidden() {
    let app = TestApp::spawn().await;

    for token in ["", "  "] {
        let res = app.get("notifications", Some(token)).await.unwrap();
        assert_eq!(403, res.status().as_u16(), "token {:?}", token);
    }
}

#[tokio::test]
async fn invalid_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    let user = app.anonymous_user().await;

    let tampered = format!("{}x", user.token);
    for token in ["garbage", "a.b", tampered.as_str()] {
        let res = app.get("notifications", Some(token)).await.unwrap();
        assert_eq!(401, res.status().as_u16(), "token {:?}", token);

        let body: Value = res.json().await.unwrap();
        assert_eq!(false, body["Success"]);
        assert_eq!(401, body["Errors"]["Code"]);
    }
}

#[tokio::test]
async fn revoked_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    let user = app.anonymous_user().await;

    let claims = app.sessions.verify(&user.token).unwrap();
    assert!(app.sessions.revoke(claims.token_id).await.unwrap());

    let res = app.get("notifications", Some(&user.token)).await.unwrap();
    assert_eq!(401, res.status().as_u16());
}

#[tokio::test]
async fn unconfirmed_user_is_annotated_but_served() {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    app.put_feed(&["A", "B"]).await;

    app.registered_user("a@example.com", "p1").await;
    let login = envelope(app.login("a@example.com", "p1").await.unwrap()).await;
    let token = login["Result"]["AuthToken"].as_str().unwrap();

    let res = app.get("delays/subscribed", Some(token)).await.unwrap();

    assert_eq!(200, res.status().as_u16());
    assert_eq!(
        "false",
        res.headers().get(CONFIRMED).unwrap().to_str().unwrap()
    );
    let body: Value = res.json().await.unwrap();
    assert_eq!(true, body["Success"]);
    assert_eq!(0, body["Result"]["count"]);
}

#[tokio::test]
async fn confirmed_user_has_no_annotation() {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    app.put_feed(&["A", "B"]).await;

    let user = app.registered_user("a@example.com", "p1").await;
    assert!(app.store.confirm_email(user.id).await);

    let res = app.get("delays", Some(&user.token)).await.unwrap();

    assert_eq!(200, res.status().as_u16());
    assert!(res.headers().get(CONFIRMED).is_none());
    let body: Value = res.json().await.unwrap();
    assert_eq!(vec!["A", "B"], trip_ids(&body));
}

#[tokio::test]
async fn resend_is_not_behind_the_confirmation_gate() {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    let user = app.registered_user("a@example.com", "p1").await;

    let res = app.get("users/resend", Some(&user.token)).await.unwrap();

    assert_eq!(200, res.status().as_u16());
    assert!(res.headers().get(CONFIRMED).is_none());
}
