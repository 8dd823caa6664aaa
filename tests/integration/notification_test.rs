//! Integration tests for the notification inbox, push delivery, and admin
//! broadcasts.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{TestApp, TestUser};

const DEVICE_TOKEN: &str = "ExponentPushToken[integration-device]";

async fn upload(app: &TestApp, user: &TestUser) -> String {
    let response = app
        .post("/api/posts/upload", json!({ "story": "Harvest" }), user)
        .await;
    response.body["postId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_like_pushes_to_registered_device() {
    let app = TestApp::new().await;
    let owner = app.register("t1", "Achebe").await;
    let fan = app.register("t2", "Banda").await;

    let response = app
        .post("/api/notifications/token", json!({ "expoToken": DEVICE_TOKEN }), &owner)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let post = upload(&app, &owner).await;
    app.post(&format!("/api/posts/like/{post}"), json!({}), &fan)
        .await;

    let sent = app.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, DEVICE_TOKEN);
    assert_eq!(sent[0].title, "Famileey");
    assert_eq!(sent[0].body, "Banda liked your post");
    assert_eq!(sent[0].data["type"], "like");
    assert_eq!(sent[0].data["postId"], post.as_str());

    let response = app.get("/api/notifications", &owner).await;
    let inbox = response.body["notifications"].as_array().unwrap();
    assert_eq!(inbox[0]["type"], "like");
    assert_eq!(inbox[0]["data"]["postId"], post.as_str());
    assert_eq!(inbox[0]["from"]["familyName"], "Banda");
    assert_eq!(inbox[0]["read"], false);
}

#[tokio::test]
async fn test_no_push_without_token() {
    let app = TestApp::new().await;
    let owner = app.register("w1", "Achebe").await;
    let fan = app.register("w2", "Banda").await;
    let post = upload(&app, &owner).await;
    app.post(&format!("/api/posts/like/{post}"), json!({}), &fan)
        .await;

    assert!(app.push.sent().is_empty());
    let response = app.get("/api/notifications/unread-count", &owner).await;
    assert_eq!(response.body["count"], 1);
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let app = TestApp::new().await;
    let user = app.register("k1", "Achebe").await;
    let response = app
        .post("/api/notifications/token", json!({ "token": "not-a-device" }), &user)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_mark_read_and_read_all() {
    let app = TestApp::new().await;
    let owner = app.register("a1", "Achebe").await;
    let fan = app.register("a2", "Banda").await;
    let post = upload(&app, &owner).await;
    app.post(&format!("/api/posts/like/{post}"), json!({}), &fan)
        .await;
    app.post(
        &format!("/api/posts/comments/{post}"),
        json!({ "comment": "Lovely" }),
        &fan,
    )
    .await;

    let response = app.get("/api/notifications/unread-count", &owner).await;
    assert_eq!(response.body["count"], 2);

    let response = app.get("/api/notifications", &owner).await;
    let newest = response.body["notifications"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .post(&format!("/api/notifications/read/{newest}"), json!({}), &owner)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get("/api/notifications/unread-count", &owner).await;
    assert_eq!(response.body["count"], 1);

    let response = app
        .post("/api/notifications/read-all", json!({}), &owner)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get("/api/notifications/unread-count", &owner).await;
    assert_eq!(response.body["count"], 0);

    let response = app
        .post("/api/notifications/read/missing", json!({}), &owner)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reply_reaches_original_sender() {
    let app = TestApp::new().await;
    let owner = app.register("y1", "Achebe").await;
    let fan = app.register("y2", "Banda").await;
    let post = upload(&app, &owner).await;
    app.post(&format!("/api/posts/like/{post}"), json!({}), &fan)
        .await;

    let response = app.get("/api/notifications", &owner).await;
    let id = response.body["notifications"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let path = format!("/api/notifications/reply/{id}");
    let response = app.post(&path, json!({ "reply": "Thank you" }), &owner).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["replyId"].is_string());

    let response = app.get("/api/notifications", &owner).await;
    let replies = response.body["notifications"][0]["replies"]
        .as_object()
        .unwrap();
    assert_eq!(replies.len(), 1);
    let reply = replies.values().next().unwrap();
    assert_eq!(reply["reply"], "Thank you");
    assert_eq!(reply["userId"], owner.uid.as_str());

    let response = app.get("/api/notifications", &fan).await;
    let inbox = response.body["notifications"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "notification-reply");
    assert_eq!(inbox[0]["data"]["notificationId"], id.as_str());

    let response = app.post(&path, json!({ "reply": "  " }), &owner).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.post(&path, json!({ "reply": "hijack" }), &fan).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notify_all_requires_admin() {
    let app = TestApp::new().await;
    let admin = app.register("x1", "Achebe").await;
    let b = app.register("x2", "Banda").await;
    let c = app.register("x3", "Chege").await;
    let body = json!({ "title": "Reunion", "message": "Sunday at noon" });

    let response = app.post("/api/admin/notify-all", body.clone(), &admin).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    app.promote(&admin).await;
    let response = app.post("/api/admin/notify-all", body, &admin).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 2);
    assert_eq!(response.body["message"], "Notification sent to all users");

    for user in [&b, &c] {
        let response = app.get("/api/notifications", user).await;
        let inbox = response.body["notifications"].as_array().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["type"], "admin-broadcast");
        assert_eq!(inbox[0]["data"]["title"], "Reunion");
        assert_eq!(inbox[0]["message"], "Sunday at noon");
    }
    let response = app.get("/api/notifications", &admin).await;
    assert!(response.body["notifications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_make_admin() {
    let app = TestApp::new().await;
    let admin = app.register("z1", "Achebe").await;
    let b = app.register("z2", "Banda").await;
    let body = json!({ "userId": b.uid });

    let response = app.post("/api/admin/make-admin", body.clone(), &b).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    app.promote(&admin).await;
    let response = app.post("/api/admin/make-admin", body, &admin).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/api/accounts/user", &b).await;
    assert_eq!(response.body["user"]["role"], "admin");

    let response = app
        .post("/api/admin/make-admin", json!({ "userId": "ghost" }), &admin)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
