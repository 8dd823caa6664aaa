//! Integration tests for posts, ranking, and the follow workflow.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{TestApp, TestUser};

async fn upload(app: &TestApp, user: &TestUser, story: &str) -> String {
    let response = app
        .post("/api/posts/upload", json!({ "story": story }), user)
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["postId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_family_posts_carry_engagement_and_score() {
    let app = TestApp::new().await;
    let u1 = app.register("u1", "Achebe").await;
    let u2 = app.register("u2", "Banda").await;
    let u3 = app.register("u3", "Chege").await;

    let post = upload(&app, &u1, "Harvest day").await;
    let response = app.post(&format!("/api/posts/like/{post}"), json!({}), &u2).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app
        .post(
            &format!("/api/posts/comments/{post}"),
            json!({ "comment": "hi" }),
            &u2,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .get(&format!("/api/families/posts/{}", u1.uid), &u3)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let posts = response.body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["postId"], post.as_str());
    assert_eq!(posts[0]["likes"], 1);
    assert_eq!(posts[0]["commentsCount"], 1);
    assert_eq!(posts[0]["hasUserLiked"], false);
    assert_eq!(posts[0]["views"], 0);
    assert_eq!(posts[0]["score"], 3.5);
    assert_eq!(posts[0]["user"]["familyName"], "Achebe");

    let response = app
        .get(&format!("/api/families/posts/{}", u1.uid), &u2)
        .await;
    assert_eq!(response.body["posts"][0]["hasUserLiked"], true);
}

#[tokio::test]
async fn test_families_ranked_by_engagement() {
    let app = TestApp::new().await;
    let u1 = app.register("r1", "Achebe").await;
    let u2 = app.register("r2", "Banda").await;
    let u3 = app.register("r3", "Chege").await;

    let post = upload(&app, &u2, "Wedding").await;
    app.post(&format!("/api/posts/like/{post}"), json!({}), &u1).await;
    app.post(&format!("/api/families/follow/{}", u2.uid), json!({}), &u3)
        .await;

    let response = app.get("/api/families", &u3).await;
    assert_eq!(response.status, StatusCode::OK);
    let families = response.body["families"].as_array().unwrap();
    assert_eq!(families.len(), 2);
    assert_eq!(families[0]["uid"], u2.uid.as_str());
    assert_eq!(families[0]["totalPosts"], 1);
    assert_eq!(families[0]["totalEngagement"], 1);
    assert_eq!(families[0]["isFollowing"], true);
    assert_eq!(families[1]["uid"], u1.uid.as_str());
    assert_eq!(families[1]["totalPosts"], 0);
    assert!(families.iter().all(|f| f["uid"] != u3.uid.as_str()));
}

#[tokio::test]
async fn test_duplicate_like_and_missing_post() {
    let app = TestApp::new().await;
    let u1 = app.register("l1", "Achebe").await;
    let post = upload(&app, &u1, "Graduation").await;

    let like = format!("/api/posts/like/{post}");
    assert_eq!(app.post(&like, json!({}), &u1).await.status, StatusCode::OK);
    assert_eq!(
        app.post(&like, json!({}), &u1).await.status,
        StatusCode::CONFLICT
    );
    assert_eq!(
        app.post("/api/posts/like/missing", json!({}), &u1).await.status,
        StatusCode::NOT_FOUND
    );

    let unlike = format!("/api/posts/unlike/{post}");
    assert_eq!(app.post(&unlike, json!({}), &u1).await.status, StatusCode::OK);
    assert_eq!(
        app.post(&unlike, json!({}), &u1).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_comment_deletion_rules() {
    let app = TestApp::new().await;
    let owner = app.register("c1", "Achebe").await;
    let author = app.register("c2", "Banda").await;
    let stranger = app.register("c3", "Chege").await;
    let post = upload(&app, &owner, "Reunion").await;

    let response = app
        .post(
            &format!("/api/posts/comments/{post}"),
            json!({ "comment": "Beautiful" }),
            &author,
        )
        .await;
    let comment = response.body["commentId"].as_str().unwrap().to_string();
    let path = format!("/api/posts/comments/{post}/{comment}");

    let response = app
        .request("DELETE", &path, None, Some(&stranger.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("DELETE", &path, None, Some(&owner.token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .get(&format!("/api/posts/comments/{post}"), &owner)
        .await;
    assert_eq!(response.body["comments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_follow_and_unfollow_update_counts() {
    let app = TestApp::new().await;
    let a = app.register("f1", "Achebe").await;
    let b = app.register("f2", "Banda").await;

    let response = app
        .post(&format!("/api/families/follow/{}", b.uid), json!({}), &a)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/api/accounts/user", &b).await;
    assert_eq!(response.body["user"]["followersCount"], 1);
    let response = app.get("/api/accounts/user", &a).await;
    assert_eq!(response.body["user"]["followingCount"], 1);

    app.post(&format!("/api/families/unfollow/{}", b.uid), json!({}), &a)
        .await;
    let response = app.get("/api/accounts/user", &b).await;
    assert_eq!(response.body["user"]["followersCount"], 0);

    let response = app
        .post(&format!("/api/families/follow/{}", a.uid), json!({}), &a)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_accept_flow() {
    let app = TestApp::new().await;
    let a = app.register("q1", "Achebe").await;
    let b = app.register("q2", "Banda").await;

    let request = format!("/api/families/request-follow/{}", b.uid);
    assert_eq!(app.post(&request, json!({}), &a).await.status, StatusCode::OK);
    assert_eq!(
        app.post(&request, json!({}), &a).await.status,
        StatusCode::CONFLICT
    );

    let response = app.get("/api/notifications", &b).await;
    let inbox = response.body["notifications"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "follow-request");
    assert_eq!(inbox[0]["from"]["uid"], a.uid.as_str());

    let response = app
        .post(&format!("/api/families/accept-follow/{}", a.uid), json!({}), &b)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/api/notifications", &b).await;
    let inbox = response.body["notifications"].as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["type"], "follow-confirmed");

    let response = app.get("/api/notifications", &a).await;
    assert_eq!(response.body["notifications"][0]["type"], "follow-accepted");

    let response = app.get("/api/accounts/user", &b).await;
    assert_eq!(response.body["user"]["followersCount"], 1);

    assert_eq!(
        app.post(&request, json!({}), &a).await.status,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_decline_and_cancel() {
    let app = TestApp::new().await;
    let a = app.register("d1", "Achebe").await;
    let b = app.register("d2", "Banda").await;
    let request = format!("/api/families/request-follow/{}", b.uid);

    app.post(&request, json!({}), &a).await;
    let response = app
        .post(&format!("/api/families/decline-follow/{}", a.uid), json!({}), &b)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get("/api/notifications", &a).await;
    assert_eq!(response.body["notifications"][0]["type"], "follow-declined");

    app.post(&request, json!({}), &a).await;
    let response = app
        .post(&format!("/api/families/cancel-follow/{}", b.uid), json!({}), &a)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get("/api/notifications", &b).await;
    assert!(response.body["notifications"].as_array().unwrap().is_empty());

    let response = app
        .post(&format!("/api/families/accept-follow/{}", a.uid), json!({}), &b)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_views_and_search() {
    let app = TestApp::new().await;
    let a = app.register("v1", "Achebe").await;
    app.register("v2", "Okonkwo").await;
    let post = upload(&app, &a, "Naming ceremony").await;

    for expected in 1..=3 {
        let response = app
            .post(&format!("/api/families/postviewed/{post}"), json!({}), &a)
            .await;
        assert_eq!(response.body["views"], expected);
    }

    let response = app.get("/api/families/search?search=ONK", &a).await;
    let users = response.body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["familyName"], "Okonkwo");

    let response = app.get("/api/families/search", &a).await;
    assert_eq!(response.body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_posts_newest_first() {
    let app = TestApp::new().await;
    let a = app.register("p1", "Achebe").await;
    let first = upload(&app, &a, "first").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = upload(&app, &a, "second").await;

    let response = app.get("/api/posts", &a).await;
    let posts = response.body["posts"].as_array().unwrap();
    assert_eq!(posts[0]["postId"], second.as_str());
    assert_eq!(posts[1]["postId"], first.as_str());

    let response = app.get(&format!("/api/posts/{first}"), &a).await;
    assert_eq!(response.body["post"]["story"], "first");
}
