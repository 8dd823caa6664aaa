//! Integration tests for registration, sign-in, profiles, and the server surface.

mod helpers;

use http::StatusCode;
use serde_json::json;

use famileey_core::config::AppConfig;

#[tokio::test]
async fn test_register_and_read_profile() {
    let app = helpers::TestApp::new().await;
    let user = app.register("okafor", "Okafor").await;

    let response = app.get("/api/accounts/user", &user).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let profile = &response.body["user"];
    assert_eq!(profile["uid"], user.uid.as_str());
    assert_eq!(profile["familyName"], "Okafor");
    assert_eq!(profile["email"], "okafor@example.com");
    assert_eq!(profile["followersCount"], 0);
    assert_eq!(profile["followingCount"], 0);
    assert!(profile.get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = helpers::TestApp::new().await;
    app.register("banda", "Banda").await;

    let response = app
        .request(
            "POST",
            "/api/accounts/register",
            Some(helpers::TestApp::registration("banda", "Banda Again")),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_registration_missing_field_is_rejected() {
    let app = helpers::TestApp::new().await;
    let mut body = helpers::TestApp::registration("chege", "Chege");
    body.as_object_mut().unwrap().remove("occupation");

    let response = app
        .request("POST", "/api/accounts/register", Some(body), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("occupation")
    );
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = helpers::TestApp::new().await;
    app.register("diallo", "Diallo").await;

    let response = app
        .request(
            "POST",
            "/api/accounts/login",
            Some(json!({ "login": "diallo@example.com", "password": "not-it" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_by_phone() {
    let app = helpers::TestApp::new().await;
    let user = app.register("eze", "Eze").await;

    let response = app
        .request(
            "POST",
            "/api/accounts/login",
            Some(json!({ "phone": helpers::phone_for("eze"), "password": "family-secret" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["uid"], user.uid.as_str());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/accounts/user", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);

    let response = app
        .request("GET", "/api/posts", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_account_allow_list() {
    let app = helpers::TestApp::new().await;
    let user = app.register("fofana", "Fofana").await;

    let response = app
        .request(
            "PUT",
            "/api/accounts/updateaccount",
            Some(json!({ "updateData": { "role": "admin" } })),
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "PUT",
            "/api/accounts/updateaccount",
            Some(json!({ "updateData": { "bio": "Cocoa farmers", "residence": "Accra" } })),
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["bio"], "Cocoa farmers");
    assert_eq!(response.body["user"]["residence"], "Accra");
    assert_eq!(response.body["user"]["role"], "user");
}

#[tokio::test]
async fn test_user_by_id_not_found() {
    let app = helpers::TestApp::new().await;
    let user = app.register("gueye", "Gueye").await;

    let response = app.get("/api/accounts/user/nobody", &user).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_page_escapes_html() {
    let app = helpers::TestApp::new().await;
    let user = app.register("hassan", "<script>Hassan</script>").await;

    let response = app
        .request("GET", &format!("/profile/{}", user.uid), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.text.contains("&lt;script&gt;Hassan&lt;/script&gt;"));
    assert!(!response.text.contains("<script>"));
    assert!(response.text.contains("og:title"));

    let response = app.request("GET", "/profile/nobody", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["store"], "reachable");
}

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let mut config = AppConfig::default();
    config.server.rate_limit.max_requests = 2;
    let app = helpers::TestApp::with_config(config);

    for _ in 0..2 {
        let response = app.request("GET", "/api/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["error"], "RATE_LIMITED");
}
