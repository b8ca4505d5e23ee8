#![allow(clippy::unwrap_used, clippy::panic, unreachable_pub)]
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::atomic::Ordering;

mod common;

#[tokio::test]
async fn test_email_failure_does_not_change_response() {
    let healthy = common::TestApp::spawn().await;
    let failing = common::TestApp::spawn().await;
    failing.email.fail.store(true, Ordering::SeqCst);

    let ok_resp = healthy.authed(Method::POST, "/messages").json(&common::valid_payload()).send().await.unwrap();
    let failing_resp = failing.authed(Method::POST, "/messages").json(&common::valid_payload()).send().await.unwrap();

    assert_eq!(failing_resp.status(), ok_resp.status());
    assert_eq!(failing_resp.status(), StatusCode::CREATED);

    let ok_body: Value = ok_resp.json().await.unwrap();
    let failing_body: Value = failing_resp.json().await.unwrap();
    let keys = |v: &Value| v.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
    assert_eq!(keys(&ok_body), keys(&failing_body));
    assert_eq!(failing_body["content"], common::valid_payload()["content"]);

    // The email was attempted and the message stays stored.
    assert_eq!(failing.email.sent_count(), 1);
    assert_eq!(failing.store.records.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_error_is_forwarded() {
    let app = common::TestApp::spawn().await;
    let raw = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
    *app.store.reject_insert.lock().unwrap() = Some((409, raw.to_string()));

    let resp = app.authed(Method::POST, "/messages").json(&common::valid_payload()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], raw);
    assert_eq!(app.email.sent_count(), 0, "no notification for a message that was not stored");
}

#[tokio::test]
async fn test_store_server_error_is_forwarded() {
    let app = common::TestApp::spawn().await;
    *app.store.reject_insert.lock().unwrap() = Some((503, "upstream overloaded".to_string()));

    let resp = app.authed(Method::POST, "/messages").json(&common::valid_payload()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.json::<Value>().await.unwrap()["detail"], "upstream overloaded");
}

#[tokio::test]
async fn test_unreachable_store_is_bad_gateway() {
    let app = common::TestApp::spawn().await;

    // Rebuild against a store address nothing listens on.
    let mut config = app.config.clone();
    config.store.url = "http://127.0.0.1:9".to_string();
    let services = mensageria_server::AppBuilder::new(config.clone()).build().unwrap();
    let router = mensageria_server::api::app_router(config, services);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<std::net::SocketAddr>()).await.unwrap();
    });

    let resp = app
        .client
        .get(format!("http://{addr}/messages"))
        .header("Authorization", format!("Bearer {}", common::API_SECRET))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(resp.json::<Value>().await.unwrap()["detail"], "Bad gateway");
}
