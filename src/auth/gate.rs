//! Auth gate: token extraction and the admin guard extractor

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use super::token::{TokenClaims, TokenCodec};
use crate::error::BlogError;

/// Name of the session cookie
pub const ADMIN_COOKIE: &str = "admin-token";

/// Pull a token from `Authorization: Bearer`, falling back to the session cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(ADMIN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Verify whatever token a request carries and require the admin role
///
/// No token is `Unauthorized`; a bad token or the wrong role is `Forbidden`.
pub fn authorize(headers: &HeaderMap, codec: &TokenCodec) -> Result<TokenClaims, BlogError> {
    let token = extract_token(headers).ok_or_else(|| BlogError::unauthorized("Login required"))?;

    match codec.verify(&token) {
        Ok(claims) if claims.is_admin() => Ok(claims),
        Ok(claims) => {
            tracing::debug!("Rejected token with role {}", claims.role);
            Err(BlogError::forbidden("Insufficient permissions"))
        }
        Err(_) => Err(BlogError::forbidden("Insufficient permissions")),
    }
}

/// A request that passed the admin guard
///
/// Taking this as a handler argument guards the handler.
#[derive(Debug, Clone)]
pub struct AdminUser(pub TokenClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<TokenCodec>: FromRef<S>,
{
    type Rejection = BlogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = Arc::<TokenCodec>::from_ref(state);
        authorize(&parts.headers, &codec).map(AdminUser)
    }
}

/// The `admin-token` cookie set after a successful login
pub fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Drop the session cookie from `jar`
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ADMIN_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use axum::http::HeaderValue;

    fn codec() -> TokenCodec {
        TokenCodec::new("secret", "pw", Arc::new(SystemClock))
    }

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_prefers_bearer() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "admin-token=from-cookie"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_falls_back_to_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic abc"),
            (header::COOKIE, "theme=dark; admin-token=from-cookie"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-cookie"));
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_authorize_outcomes() {
        let codec = codec();

        let err = authorize(&HeaderMap::new(), &codec).unwrap_err();
        assert!(matches!(err, BlogError::Unauthorized(_)));

        let map = headers(&[(header::AUTHORIZATION, "Bearer garbage")]);
        assert!(matches!(
            authorize(&map, &codec),
            Err(BlogError::Forbidden(_))
        ));

        let viewer = format!("Bearer {}", codec.issue_for("guest", "viewer").unwrap());
        let map = headers(&[(header::AUTHORIZATION, viewer.as_str())]);
        assert!(matches!(
            authorize(&map, &codec),
            Err(BlogError::Forbidden(_))
        ));

        let admin = format!("admin-token={}", codec.issue("pw").unwrap());
        let map = headers(&[(header::COOKIE, admin.as_str())]);
        assert_eq!(authorize(&map, &codec).unwrap().role, "admin");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), 86400, true).to_string();
        assert!(cookie.starts_with("admin-token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=86400"));
    }
}
