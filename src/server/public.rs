//! Public read-only routes: published posts, tags, pages and feeds

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::response::ok;
use super::AppState;
use crate::content::{filter_by_tag, tag_counts, Post};
use crate::error::{BlogError, Result};
use crate::feed::FeedOptions;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListQuery {
    pub tag: Option<String>,
    pub include_content: Option<String>,
}

impl ListQuery {
    pub fn include_content(&self) -> bool {
        self.include_content.as_deref() == Some("true")
    }

    /// The tag filter, ignoring a blank value
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// A post plus its rendered body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub html_content: String,
}

/// Posts under a tag
#[derive(Debug, Serialize)]
pub(super) struct TagPosts {
    pub tag: String,
    pub count: usize,
    pub posts: Vec<Post>,
}

impl TagPosts {
    pub fn new(tag: &str, posts: Vec<Post>) -> Self {
        Self {
            tag: tag.to_string(),
            count: posts.len(),
            posts,
        }
    }
}

fn published(state: &AppState, include_content: bool) -> Result<Vec<Post>> {
    Ok(state
        .posts()
        .list_all(include_content)?
        .into_iter()
        .filter(|p| p.published)
        .collect())
}

/// GET /api/posts
pub(super) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let mut posts = published(&state, query.include_content())?;
    if let Some(tag) = query.tag() {
        posts = filter_by_tag(posts, tag);
    }
    Ok(ok(posts))
}

/// GET /api/posts/:slug
pub(super) async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let post = state
        .posts()
        .get_by_slug(&slug)?
        .filter(|p| p.published)
        .ok_or_else(|| BlogError::not_found(format!("Post not found: {}", slug)))?;

    let html_content = state
        .renderer
        .render(post.content.as_deref().unwrap_or_default())
        .map_err(|e| BlogError::Render(e.to_string()))?;

    Ok(ok(PostDetail { post, html_content }))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct TagQuery {
    pub tag: Option<String>,
}

/// GET /api/tags, or the posts of one tag with `?tag=`
pub(super) async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<TagQuery>,
) -> Result<Json<Value>> {
    let posts = published(&state, false)?;
    match query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(tag) => Ok(ok(TagPosts::new(tag, filter_by_tag(posts, tag)))),
        None => Ok(ok(tag_counts(&posts))),
    }
}

/// GET /api/tags/:tag
pub(super) async fn posts_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<Value>> {
    let posts = filter_by_tag(published(&state, false)?, &tag);
    Ok(ok(TagPosts::new(&tag, posts)))
}

/// GET /api/pages/:name
pub(super) async fn get_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>> {
    let page = state
        .pages()
        .get(&name, &state.renderer)?
        .ok_or_else(|| BlogError::not_found(format!("Page not found: {}", name)))?;
    Ok(ok(page))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FeedQuery {
    pub format: Option<String>,
    pub limit: Option<String>,
    pub full_content: Option<String>,
}

/// GET /api/rss
pub(super) async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let options = FeedOptions::from_query(
        query.format.as_deref(),
        query.limit.as_deref(),
        query.full_content.as_deref(),
    );
    let body = state.feeds.build(options);

    (
        [
            (header::CONTENT_TYPE, options.format.content_type()),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, s-maxage=3600, stale-while-revalidate=86400",
            ),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        body,
    )
}
