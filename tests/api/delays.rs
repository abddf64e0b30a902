use serde_json::Value;

use crate::helpers::{envelope, trip_ids, TestApp};

#[tokio::test]
async fn all_delays_returns_the_feed_as_published() {
    let app = TestApp::spawn().await;
    app.put_feed(&["A", "B", "C"]).await;
    let user = app.anonymous_user().await;

    let body = envelope(app.get("delays", Some(&user.token)).await.unwrap()).await;

    assert_eq!(true, body["Success"]);
    assert_eq!(3, body["Result"]["count"]);
    assert_eq!(vec!["A", "B", "C"], trip_ids(&body));
    assert_eq!("collector", body["Result"]["exec_name"]);
}

#[tokio::test]
async fn subscribed_delays_follow_feed_order_and_keep_duplicates() {
    let app = TestApp::spawn().await;
    app.put_feed(&["A", "B", "C"]).await;
    let (user, channel_id) = app.user_with_channel().await;

    for trip_id in ["C", "B", "C", "Z"] {
        let body = app.subscribe(&user, trip_id, channel_id).await;
        assert_eq!(true, body["Success"]);
    }

    let body = envelope(app.get("delays/subscribed", Some(&user.token)).await.unwrap()).await;

    assert_eq!(vec!["B", "C", "C"], trip_ids(&body));
    assert_eq!(3, body["Result"]["count"]);
    assert_eq!(1506800060, body["Result"]["valid_until"]);
}

#[tokio::test]
async fn subscribed_delays_only_include_the_callers_subscriptions() {
    let app = TestApp::spawn().await;
    app.put_feed(&["A", "B"]).await;
    let (ann, ann_channel) = app.user_with_channel().await;
    let (bob, bob_channel) = app.user_with_channel().await;

    app.subscribe(&ann, "A", ann_channel).await;
    app.subscribe(&bob, "B", bob_channel).await;

    let body = envelope(app.get("delays/subscribed", Some(&ann.token)).await.unwrap()).await;

    assert_eq!(vec!["A"], trip_ids(&body));
}

#[tokio::test]
async fn missing_feed_is_an_internal_error() {
    let app = TestApp::spawn().await;
    let user = app.anonymous_user().await;

    for url in ["delays", "delays/subscribed"] {
        let res = app.get(url, Some(&user.token)).await.unwrap();
        assert_eq!(500, res.status().as_u16(), "GET /{}", url);

        let body: Value = res.json().await.unwrap();
        assert_eq!(false, body["Success"]);
        assert_eq!(Value::Null, body["Result"]);
    }
}

#[tokio::test]
async fn unreachable_feed_is_an_internal_error() {
    let app = TestApp::spawn().await;
    app.put_feed(&["A"]).await;
    app.store.set_feed_down(true).await;
    let user = app.anonymous_user().await;

    let res = app.get("delays", Some(&user.token)).await.unwrap();

    assert_eq!(500, res.status().as_u16());
}

#[tokio::test]
async fn failed_subscription_lookup_is_an_internal_error() {
    let app = TestApp::spawn().await;
    app.put_feed(&["A"]).await;
    let user = app.anonymous_user().await;
    app.store.set_subscriptions_down(true).await;

    let res = app.get("delays/subscribed", Some(&user.token)).await.unwrap();

    assert_eq!(500, res.status().as_u16());
}
