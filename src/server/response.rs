//! JSON envelope shared by every API route

use axum::{
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::BlogError;

/// `{ "success": true, "data": ... }`
pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Success envelope with a human-readable message
pub fn ok_with_message<T: Serialize>(data: T, message: &str) -> Json<Value> {
    Json(json!({ "success": true, "data": data, "message": message }))
}

/// Success envelope carrying only a message
pub fn done(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

/// Headers that keep clients and proxies from caching a response
pub fn no_store() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
        ),
        (header::PRAGMA, HeaderValue::from_static("no-cache")),
        (header::EXPIRES, HeaderValue::from_static("0")),
        (
            HeaderName::from_static("surrogate-control"),
            HeaderValue::from_static("no-store"),
        ),
    ]
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            BlogError::InvalidConfig(errors) => json!({
                "success": false,
                "error": self.to_string(),
                "code": self.code(),
                "errors": errors,
            }),
            e if e.is_internal() => {
                // Details stay in the log so file paths do not leak
                tracing::error!("Internal error: {}", e);
                json!({
                    "success": false,
                    "error": "Internal server error",
                    "code": self.code(),
                })
            }
            e => json!({
                "success": false,
                "error": e.to_string(),
                "code": self.code(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = BlogError::not_found("Post not found: x").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Post not found: x");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let err: BlogError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/secret/path").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("/secret/path"));
    }

    #[tokio::test]
    async fn test_invalid_config_lists_fields() {
        let err = BlogError::InvalidConfig(vec![FieldError::new("url", "bad")]);
        let body = body_json(err.into_response()).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"][0]["field"], "url");
    }
}
