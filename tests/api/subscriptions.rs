use serde_json::{json, Value};

use uuid::Uuid;

use crate::helpers::{envelope, TestApp};

#[tokio::test]
async fn subscription_is_created_and_listed() {
    let app = TestApp::spawn().await;
    let (user, channel_id) = app.user_with_channel().await;

    let created = app.subscribe(&user, "trip-1", channel_id).await;

    assert_eq!(true, created["Success"]);
    let subscription = &created["Result"];
    assert_eq!("trip-1", subscription["trip_id"]);
    assert_eq!(true, subscription["monday"]);
    assert_eq!(false, subscription["tuesday"]);
    assert_eq!(true, subscription["wednesday"]);
    assert_eq!(json!([channel_id]), subscription["notification_ids"]);

    let listed = envelope(app.get("subscriptions", Some(&user.token)).await.unwrap()).await;
    assert_eq!(json!([subscription]), listed["Result"]);
}

#[tokio::test]
async fn subscription_without_channels_is_rejected() {
    let app = TestApp::spawn().await;
    let (user, _) = app.user_with_channel().await;

    let body = envelope(
        app.post(
            "subscriptions",
            Some(&user.token),
            &json!({ "trip_id": "trip-1", "stop_time_id": "stop-1", "days": ["Mon"], "notification_ids": [] }),
        )
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(false, body["Success"]);
    assert_eq!(1003, body["Errors"]["Code"]);
    assert_eq!(0, app.store.subscription_count().await);
}

#[tokio::test]
async fn subscription_with_someone_elses_channel_is_rejected() {
    let app = TestApp::spawn().await;
    let (ann, _) = app.user_with_channel().await;
    let (_, bob_channel) = app.user_with_channel().await;

    for channel_id in [bob_channel, Uuid::new_v4()] {
        let body = envelope(
            app.post(
                "subscriptions",
                Some(&ann.token),
                &json!({ "trip_id": "trip-1", "stop_time_id": "stop-1", "notification_ids": [channel_id] }),
            )
            .await
            .unwrap(),
        )
        .await;

        assert_eq!(1005, body["Errors"]["Code"]);
    }
    assert_eq!(0, app.store.subscription_count().await);
}

#[tokio::test]
async fn malformed_subscription_is_a_bad_request() {
    let app = TestApp::spawn().await;
    let (user, _) = app.user_with_channel().await;

    let cases = [
        json!({ "stop_time_id": "stop-1", "notification_ids": [] }),
        json!({ "trip_id": "trip-1", "stop_time_id": "stop-1", "notification_ids": ["not-a-uuid"] }),
    ];

    for body in cases {
        let res = app.post("subscriptions", Some(&user.token), &body).await.unwrap();
        assert_eq!(400, res.status().as_u16(), "payload {}", body);
    }
}

#[tokio::test]
async fn subscriptions_are_private_to_their_owner() {
    let app = TestApp::spawn().await;
    let (ann, ann_channel) = app.user_with_channel().await;
    let bob = app.anonymous_user().await;

    app.subscribe(&ann, "trip-1", ann_channel).await;

    let listed = envelope(app.get("subscriptions", Some(&bob.token)).await.unwrap()).await;
    assert_eq!(Value::Array(vec![]), listed["Result"]);
}
