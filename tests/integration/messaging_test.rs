//! Integration tests for direct chats, presence, and broadcast groups.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{TestApp, TestUser};

async fn send(app: &TestApp, from: &TestUser, to: &TestUser, text: &str) -> (String, String) {
    let response = app
        .post(
            "/api/messaging/send",
            json!({ "recipientId": to.uid, "text": text }),
            from,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    (
        response.body["chatId"].as_str().unwrap().to_string(),
        response.body["messageId"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_send_message_and_read_log() {
    let app = TestApp::new().await;
    let a = app.register("m1", "Achebe").await;
    let b = app.register("m2", "Banda").await;

    let (chat_id, _) = send(&app, &a, &b, "hello").await;
    send(&app, &b, &a, "welcome").await;

    let response = app
        .get(&format!("/api/messaging/messages/{chat_id}"), &b)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let messages = response.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "hello");
    assert_eq!(messages[0]["senderId"], a.uid.as_str());
    assert_eq!(messages[1]["text"], "welcome");

    let response = app
        .post(
            "/api/messaging/getOrCreateChatId",
            json!({ "userA": b.uid, "userB": a.uid }),
            &b,
        )
        .await;
    assert_eq!(response.body["chatId"], chat_id.as_str());

    let response = app
        .post("/api/messaging/getOrCreateChatId", json!({ "userB": b.uid }), &a)
        .await;
    assert_eq!(response.body["chatId"], chat_id.as_str());
}

#[tokio::test]
async fn test_outsiders_are_kept_out() {
    let app = TestApp::new().await;
    let a = app.register("o1", "Achebe").await;
    let b = app.register("o2", "Banda").await;
    let c = app.register("o3", "Chege").await;
    let (chat_id, _) = send(&app, &a, &b, "private").await;

    let response = app
        .get(&format!("/api/messaging/messages/{chat_id}"), &c)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .post(
            "/api/messaging/getOrCreateChatId",
            json!({ "userA": a.uid, "userB": b.uid }),
            &c,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get("/api/messaging/messages/missing", &c).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_validation() {
    let app = TestApp::new().await;
    let a = app.register("s1", "Achebe").await;
    let b = app.register("s2", "Banda").await;

    let response = app
        .post(
            "/api/messaging/send",
            json!({ "recipientId": b.uid, "text": "   " }),
            &a,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/api/messaging/send",
            json!({ "recipientId": "ghost", "text": "hi" }),
            &a,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_read_only_by_recipient() {
    let app = TestApp::new().await;
    let a = app.register("r1", "Achebe").await;
    let b = app.register("r2", "Banda").await;
    let (chat_id, message_id) = send(&app, &a, &b, "are you there").await;
    let path = format!("/api/messaging/read/{chat_id}/{message_id}");

    let response = app.request("PATCH", &path, None, Some(&a.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/api/messaging/chats", &b).await;
    assert_eq!(response.body["chats"][0]["hasRead"], false);

    let response = app.request("PATCH", &path, None, Some(&b.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["readAt"].as_i64().unwrap() > 0);

    let response = app.get("/api/messaging/chats", &b).await;
    let chats = response.body["chats"].as_array().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["chatId"], chat_id.as_str());
    assert_eq!(chats[0]["kind"], "direct");
    assert_eq!(chats[0]["withUser"], a.uid.as_str());
    assert_eq!(chats[0]["hasRead"], true);
    assert_eq!(chats[0]["lastMessage"]["text"], "are you there");
    assert_eq!(chats[0]["participants"][0]["familyName"], "Achebe");
}

#[tokio::test]
async fn test_message_notifies_unless_viewing() {
    let app = TestApp::new().await;
    let a = app.register("n1", "Achebe").await;
    let b = app.register("n2", "Banda").await;

    let (chat_id, _) = send(&app, &a, &b, "first").await;
    let response = app.get("/api/notifications", &b).await;
    let inbox = response.body["notifications"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "message");

    let response = app
        .post(
            &format!("/api/messaging/inchat/{chat_id}/true"),
            json!({}),
            &b,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    send(&app, &a, &b, "second").await;
    let response = app.get("/api/notifications", &b).await;
    assert_eq!(response.body["notifications"].as_array().unwrap().len(), 1);

    app.post(
        &format!("/api/messaging/inchat/{chat_id}/false"),
        json!({}),
        &b,
    )
    .await;
    send(&app, &a, &b, "third").await;
    let response = app.get("/api/notifications", &b).await;
    assert_eq!(response.body["notifications"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_broadcast_reaches_followers() {
    let app = TestApp::new().await;
    let admin = app.register("b1", "Achebe").await;
    let fan = app.register("b2", "Banda").await;
    let other = app.register("b3", "Chege").await;
    app.post(
        &format!("/api/families/follow/{}", admin.uid),
        json!({}),
        &fan,
    )
    .await;

    let response = app
        .post("/api/messaging/broadcast", json!({ "text": "Family reunion on Sunday" }), &admin)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["recipients"], 1);
    let group_id = response.body["groupId"].as_str().unwrap().to_string();

    let response = app.get("/api/notifications", &fan).await;
    let inbox = response.body["notifications"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "broadcast");
    let response = app.get("/api/notifications", &other).await;
    assert!(response.body["notifications"].as_array().unwrap().is_empty());

    let response = app.get("/api/messaging/broadcast/group", &admin).await;
    assert_eq!(response.body["groupId"], group_id.as_str());
    assert_eq!(response.body["group"]["name"], "Achebe Broadcast");

    let response = app
        .get(&format!("/api/messaging/group/messages/{group_id}"), &fan)
        .await;
    let messages = response.body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let message_id = messages[0]["id"].as_str().unwrap().to_string();

    let response = app
        .post(
            "/api/messaging/group/send",
            json!({ "groupId": group_id, "text": "me too" }),
            &fan,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .get(&format!("/api/messaging/group/messages/{group_id}"), &other)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let path = format!("/api/messaging/group/read/{group_id}/{message_id}");
    let response = app.request("PATCH", &path, None, Some(&fan.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.request("PATCH", &path, None, Some(&admin.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/api/messaging/chats", &fan).await;
    let chats = response.body["chats"].as_array().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["kind"], "group");
    assert_eq!(chats[0]["isBroadcastGroup"], true);
}

#[tokio::test]
async fn test_broadcast_group_drops_unfollowers() {
    let app = TestApp::new().await;
    let admin = app.register("g1", "Achebe").await;
    let fan = app.register("g2", "Banda").await;
    let follow = format!("/api/families/follow/{}", admin.uid);
    app.post(&follow, json!({}), &fan).await;

    let response = app.get("/api/messaging/broadcast/group", &admin).await;
    assert!(response.body["group"]["participants"][fan.uid.as_str()].as_bool().unwrap());

    app.post(&format!("/api/families/unfollow/{}", admin.uid), json!({}), &fan)
        .await;
    let response = app.get("/api/messaging/broadcast/group", &admin).await;
    assert!(response.body["group"]["participants"].get(fan.uid.as_str()).is_none());
    assert!(response.body["group"]["participants"][admin.uid.as_str()].as_bool().unwrap());
}
