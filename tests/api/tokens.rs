use serde_json::Value;

use crate::helpers::{envelope, TestApp};

#[tokio::test]
async fn login_returns_a_token_for_the_user() {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    let user = app.registered_user("ann@example.com", "p1").await;

    let body = envelope(app.login("ann@example.com", "p1").await.unwrap()).await;

    assert_eq!(true, body["Success"]);
    assert_eq!(user.id.to_string(), body["Result"]["UserID"].as_str().unwrap());

    let token = body["Result"]["AuthToken"].as_str().unwrap();
    assert_ne!(user.token, token);
    let res = app.get("notifications", Some(token)).await.unwrap();
    assert_eq!(200, res.status().as_u16());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    app.registered_user("ann@example.com", "p1").await;

    let wrong_password = envelope(app.login("ann@example.com", "p2").await.unwrap()).await;
    let unknown_email = envelope(app.login("bob@example.com", "p1").await.unwrap()).await;

    assert_eq!(false, wrong_password["Success"]);
    assert_eq!(1002, wrong_password["Errors"]["Code"]);
    assert_eq!(wrong_password["Errors"], unknown_email["Errors"]);
    assert_eq!(Value::Null, unknown_email["Result"]);
}

#[tokio::test]
async fn unparseable_email_is_an_incorrect_login() {
    let app = TestApp::spawn().await;

    let body = envelope(app.login("not-an-email", "p1").await.unwrap()).await;

    assert_eq!(1002, body["Errors"]["Code"]);
}
