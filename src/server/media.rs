//! Media routes: admin upload/list/delete and public image serving

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::response::{done, ok, ok_with_message};
use super::AppState;
use crate::auth::AdminUser;
use crate::error::{BlogError, Result};

/// GET /api/admin/media
pub(super) async fn list(_admin: AdminUser, State(state): State<AppState>) -> Result<Json<Value>> {
    Ok(ok(state.media().list()?))
}

/// POST /api/admin/media, multipart with a `file` field
pub(super) async fn upload(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BlogError::validation(format!("Invalid upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| BlogError::validation(format!("Invalid upload: {}", e)))?;

        let uploaded = state
            .media()
            .save(&file_name, &content_type, &bytes, state.clock.now())?;
        return Ok(ok_with_message(uploaded, "File uploaded"));
    }

    Err(BlogError::validation("No file selected"))
}

/// DELETE /api/admin/media/:filename
pub(super) async fn delete(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>> {
    state.media().delete(&filename)?;
    Ok(done("File deleted"))
}

/// GET /api/images/*path
pub(super) async fn serve(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    match state.media().read(&path) {
        Ok((bytes, content_type)) => (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{json_body, TestApp};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::fs;

    const BOUNDARY: &str = "XBOUNDARYX";

    fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(token: &str, body: Vec<u8>) -> Request<Body> {
        Request::post("/api/admin/media")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_list_serve_delete() {
        let app = TestApp::new();
        let token = app.admin_token();

        let response = app
            .send(upload_request(
                &token,
                multipart_body("file", "my cat.png", "image/png", b"\x89PNG"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let name = body["data"]["name"].as_str().unwrap().to_string();
        assert!(name.ends_with("-mycat.png"));
        assert_eq!(body["data"]["type"], "image/png");

        let listed = json_body(app.admin("GET", "/api/admin/media", None).await).await;
        assert_eq!(listed["data"][0]["name"], name.as_str());
        assert_eq!(listed["data"][0]["size"], 4);

        let response = app.get(&format!("/api/images/{}", name)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=31536000, immutable"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"\x89PNG");

        let response = app
            .admin("DELETE", &format!("/api/admin/media/{}", name), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = app
            .admin("DELETE", &format!("/api/admin/media/{}", name), None)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let app = TestApp::new();
        let token = app.admin_token();

        let response = app
            .send(upload_request(
                &token,
                multipart_body("file", "doc.pdf", "application/pdf", b"%PDF"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .send(upload_request(
                &token,
                multipart_body("other", "a.png", "image/png", b"x"),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = Request::post("/api/admin/media")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body("file", "a.png", "image/png", b"x")))
            .unwrap();
        assert_eq!(app.send(request).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_serve_rejects_traversal_and_missing() {
        let app = TestApp::new();
        fs::write(app.dir.path().join("content/secret.txt"), "x").ok();

        let response = app.get("/api/images/../secret.txt").await;
        assert_ne!(response.status(), StatusCode::OK);
        let response = app.get("/api/images/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal() {
        let app = TestApp::new();
        let response = app
            .admin("DELETE", "/api/admin/media/..%2Fposts", None)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
