use serde_json::json;

use crate::helpers::{envelope, TestApp};

#[tokio::test]
async fn channels_are_created_and_listed() {
    let app = TestApp::spawn().await;
    let user = app.anonymous_user().await;

    let channels = [
        json!({ "type": "e", "name": "Work", "value": "work@example.com" }),
        json!({ "type": "t", "name": "Phone", "value": "+64210000000" }),
        json!({ "type": "p", "name": "Pixel", "value": "push-token" }),
    ];
    for channel in &channels {
        let body = envelope(app.post("notifications", Some(&user.token), channel).await.unwrap()).await;
        assert_eq!(true, body["Success"]);
        assert_eq!(channel["type"], body["Result"]["type"]);
        assert_eq!(user.id.to_string(), body["Result"]["user_id"].as_str().unwrap());
    }

    let listed = envelope(app.get("notifications", Some(&user.token)).await.unwrap()).await;
    let kinds: Vec<&str> = listed["Result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|channel| channel["type"].as_str().unwrap())
        .collect();
    assert_eq!(vec!["e", "t", "p"], kinds);
}

#[tokio::test]
async fn invalid_channels_are_rejected() {
    let app = TestApp::spawn().await;
    let user = app.anonymous_user().await;

    let cases = [
        (json!({ "type": "x", "name": "Fax", "value": "12345" }), "unknown type"),
        (json!({ "type": "e", "name": "Work", "value": "  " }), "blank value"),
        (json!({ "name": "Work", "value": "work@example.com" }), "missing type"),
    ];

    for (body, description) in cases {
        let res = app.post("notifications", Some(&user.token), &body).await.unwrap();
        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not fail with 400 when the payload had a {}",
            description
        );
    }
}

#[tokio::test]
async fn channels_require_a_token() {
    let app = TestApp::spawn().await;

    let res = app
        .post("notifications", None, &json!({ "type": "e", "name": "Work", "value": "w@example.com" }))
        .await
        .unwrap();

    assert_eq!(403, res.status().as_u16());
}
