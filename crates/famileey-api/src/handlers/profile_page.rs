//! Public profile page with Open Graph tags for link previews.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use famileey_core::types::id::UserId;
use famileey_entity::user::UserProfile;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_DESCRIPTION: &str = "View my Famileey profile!";

/// GET /profile/{user_id}
pub async fn profile_page(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    let uid = UserId::from(user_id);
    match state.user_repo.find_by_id(&uid).await {
        Ok(Some(profile)) => Html(render(&state.config.server.public_url, &uid, &profile)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "User not found").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Escapes text for use in HTML content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render(public_url: &str, uid: &UserId, profile: &UserProfile) -> String {
    let base = public_url.trim_end_matches('/');
    let name = escape(&profile.family_name);
    let bio = profile.bio.as_deref().filter(|b| !b.is_empty());
    let description = escape(bio.unwrap_or(DEFAULT_DESCRIPTION));
    let image = escape(
        &profile
            .photo_url
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| format!("{base}/logo.jpg")),
    );
    let url = escape(&format!("{base}/profile/{uid}"));
    let body_bio = escape(bio.unwrap_or_default());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Famileey | {name}'s Profile</title>
    <meta property="og:title" content="Famileey | {name}'s Profile" />
    <meta property="og:description" content="{description}" />
    <meta property="og:image" content="{image}" />
    <meta property="og:type" content="profile" />
    <meta property="og:url" content="{url}" />
    <meta name="twitter:card" content="summary_large_image" />
    <meta name="twitter:title" content="Famileey | {name}'s Profile" />
    <meta name="twitter:description" content="{description}" />
    <meta name="twitter:image" content="{image}" />
</head>
<body>
    <h1>{name}'s Famileey Profile</h1>
    <img src="{image}" alt="Profile Photo" style="max-width:200px;">
    <p>{body_bio}</p>
</body>
</html>
"#
    )
}
