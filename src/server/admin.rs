//! Admin routes: login/logout/session and post management

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use super::public::ListQuery;
use super::response::{done, ok, ok_with_message};
use super::AppState;
use crate::auth::{clear_session, extract_token, session_cookie, AdminUser};
use crate::content::{filter_by_tag, NewPost, PostUpdate};
use crate::error::{BlogError, Result};

#[derive(Debug, Default, Deserialize)]
pub(super) struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/admin/auth
pub(super) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>)> {
    let Json(req) = payload.map_err(|e| BlogError::validation(e.body_text()))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| BlogError::validation("Password is required"))?;

    let token = state
        .tokens
        .issue(&password)
        .inspect_err(|_| tracing::info!("Admin login rejected"))?;
    tracing::info!("Admin logged in");

    let cookie = session_cookie(
        token.clone(),
        state.tokens.lifetime_secs(),
        state.settings.secure_cookies,
    );
    Ok((
        jar.add(cookie),
        Json(json!({ "success": true, "message": "Logged in", "token": token })),
    ))
}

/// DELETE /api/admin/auth
///
/// Only clears the cookie; a copied bearer token stays valid until it expires.
pub(super) async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (clear_session(jar), done("Logged out"))
}

/// GET /api/admin/session
pub(super) async fn session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let claims = extract_token(&headers).and_then(|t| state.tokens.verify(&t).ok());
    match claims {
        Some(claims) => Json(json!({
            "success": true,
            "authenticated": true,
            "user": { "userId": claims.user_id, "role": claims.role },
        }))
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": "Not logged in",
                "authenticated": false,
            })),
        )
            .into_response(),
    }
}

/// GET /api/admin/posts
pub(super) async fn list_posts(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let repo = state.posts();
    let posts = match query.tag() {
        Some(tag) => repo.filter_by_tag(tag, query.include_content())?,
        None => repo.list_all(query.include_content())?,
    };
    Ok(ok(posts))
}

/// POST /api/admin/posts
pub(super) async fn create_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(new): Json<NewPost>,
) -> Result<Json<Value>> {
    let post = state.posts().create(new)?;
    Ok(ok_with_message(post, "Post created"))
}

/// GET /api/admin/posts/:slug
pub(super) async fn get_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let post = state
        .posts()
        .get_by_slug(&slug)?
        .ok_or_else(|| BlogError::not_found(format!("Post not found: {}", slug)))?;
    Ok(ok(post))
}

/// PUT /api/admin/posts/:slug
pub(super) async fn update_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(update): Json<PostUpdate>,
) -> Result<Json<Value>> {
    let post = state.posts().update(&slug, update)?;
    Ok(ok_with_message(post, "Post updated"))
}

/// DELETE /api/admin/posts/:slug
pub(super) async fn delete_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    state.posts().delete(&slug)?;
    Ok(done("Post deleted"))
}

/// GET /api/admin/tags, drafts included
pub(super) async fn list_tags(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let repo = state.posts();
    match query.tag() {
        Some(tag) => Ok(ok(super::public::TagPosts::new(
            tag,
            filter_by_tag(repo.list_all(false)?, tag),
        ))),
        None => Ok(ok(repo.list_tags()?)),
    }
}
