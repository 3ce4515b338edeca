//! HTTP API server

mod admin;
mod config;
mod media;
mod public;
pub mod response;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::TokenCodec;
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigStore, Settings};
use crate::content::{MarkdownRenderer, MediaStore, PageStore, PostRepository, MAX_UPLOAD_BYTES};
use crate::feed::{CachePolicy, FeedBuilder, FeedCache};
use crate::Blog;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub config: ConfigStore,
    pub tokens: Arc<TokenCodec>,
    pub renderer: Arc<MarkdownRenderer>,
    pub feeds: Arc<FeedBuilder>,
    pub clock: Arc<dyn Clock>,
    posts_dir: PathBuf,
    pages_dir: PathBuf,
    images_dir: PathBuf,
}

impl AppState {
    pub fn new(blog: &Blog, clock: Arc<dyn Clock>) -> Self {
        let settings = blog.settings.clone();
        let config = blog.config_store();
        let renderer = Arc::new(MarkdownRenderer::new());
        let cache = Arc::new(FeedCache::new(CachePolicy::default(), clock.clone()));
        let feeds = Arc::new(FeedBuilder::new(
            &blog.posts_dir,
            config.clone(),
            renderer.clone(),
            cache,
            clock.clone(),
        ));
        let tokens = Arc::new(TokenCodec::new(
            &settings.jwt_secret,
            &settings.admin_password,
            clock.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            config,
            tokens,
            renderer,
            feeds,
            clock,
            posts_dir: blog.posts_dir.clone(),
            pages_dir: blog.pages_dir.clone(),
            images_dir: blog.images_dir.clone(),
        }
    }

    /// Repository for this request, with the excerpt length from the current config
    pub fn posts(&self) -> PostRepository {
        let excerpt_length = self.config.load().excerpt_length as usize;
        PostRepository::new(&self.posts_dir).with_excerpt_length(excerpt_length)
    }

    pub fn pages(&self) -> PageStore {
        PageStore::new(&self.pages_dir)
    }

    pub fn media(&self) -> MediaStore {
        MediaStore::new(&self.images_dir)
    }
}

impl FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/auth", post(admin::login).delete(admin::logout))
        .route("/session", get(admin::session))
        .route("/posts", get(admin::list_posts).post(admin::create_post))
        .route(
            "/posts/:slug",
            get(admin::get_post)
                .put(admin::update_post)
                .delete(admin::delete_post),
        )
        .route("/tags", get(admin::list_tags))
        .route(
            "/media",
            get(media::list)
                .post(media::upload)
                // Leave headroom for multipart framing around the file
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/media/:filename", delete(media::delete));

    let api = Router::new()
        .route("/posts", get(public::list_posts))
        .route("/posts/:slug", get(public::get_post))
        .route("/tags", get(public::list_tags))
        .route("/tags/:tag", get(public::posts_by_tag))
        .route("/pages/:name", get(public::get_page))
        .route("/rss", get(public::feed))
        .route("/images/*path", get(media::serve))
        .route("/config", get(config::get).put(config::update))
        .route("/config/reset", post(config::reset))
        .nest("/admin", admin);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Start the HTTP server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    blog.settings.warn_insecure_defaults();

    let state = AppState::new(blog, Arc::new(SystemClock));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::content::NewPost;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    pub(crate) struct TestApp {
        pub dir: TempDir,
        pub state: AppState,
        pub clock: Arc<ManualClock>,
    }

    impl TestApp {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let settings = Settings {
                content_dir: dir.path().join("content"),
                config_path: dir.path().join("config/site.config.json"),
                config_override: None,
                admin_password: "letmein".to_string(),
                jwt_secret: "test-secret".to_string(),
                secure_cookies: false,
            };
            let clock = Arc::new(ManualClock::default());
            let state = AppState::new(&Blog::new(settings), clock.clone());
            Self { dir, state, clock }
        }

        pub fn admin_token(&self) -> String {
            self.state.tokens.issue("letmein").unwrap()
        }

        pub fn add_post(&self, slug: &str, date: &str, tags: &[&str], published: bool) {
            self.state
                .posts()
                .create(NewPost {
                    slug: slug.to_string(),
                    title: format!("Title {}", slug),
                    content: format!("## Intro\n\nBody of {}.", slug),
                    date: Some(date.to_string()),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    published: Some(published),
                    ..Default::default()
                })
                .unwrap();
        }

        pub async fn send(&self, request: Request<Body>) -> Response {
            router(self.state.clone()).oneshot(request).await.unwrap()
        }

        pub async fn get(&self, uri: &str) -> Response {
            self.send(Request::get(uri).body(Body::empty()).unwrap())
                .await
        }

        pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.admin_token()));
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };
            self.send(builder.body(body).unwrap()).await
        }
    }

    pub(crate) async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub(crate) async fn text_body(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let response = app.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text_body(response).await, "ok");
    }

    #[tokio::test]
    async fn test_guard_without_token_is_401() {
        let app = TestApp::new();
        let response = app.get("/api/admin/posts").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_guard_with_non_admin_token_is_403() {
        let app = TestApp::new();
        let token = app.state.tokens.issue_for("guest", "viewer").unwrap();
        let request = Request::get("/api/admin/posts")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_guard_with_invalid_token_is_403() {
        let app = TestApp::new();
        let request = Request::get("/api/admin/posts")
            .header(header::COOKIE, "admin-token=forged")
            .body(Body::empty())
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_guard_with_admin_token_runs_handler() {
        let app = TestApp::new();
        app.add_post("hello", "2024-01-01", &[], true);
        let response = app.admin("GET", "/api/admin/posts", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0]["slug"], "hello");
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let app = TestApp::new();
        let token = app.admin_token();
        app.clock.advance(chrono::Duration::hours(25));

        let request = Request::get("/api/admin/posts")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(request).await.status(), StatusCode::FORBIDDEN);
    }
}
