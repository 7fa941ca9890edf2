use axum::{
    body::Body,
    extract::{Query, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use contracts::system::auth::TokenClaims;
use contracts::usecases::common::UseCaseError;
use serde::Deserialize;

use crate::shared::data::db::get_connection;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Bearer token from the Authorization header, or `access_token` query
/// parameter (browsers cannot set headers on WebSocket upgrades)
pub fn extract_token(req: &Request<Body>) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(req.uri())
            .ok()
            .and_then(|Query(query)| query.access_token)
            .filter(|token| !token.is_empty())
    })
}

async fn authenticate_token(token: Option<String>) -> Result<TokenClaims, StatusCode> {
    let token = token.ok_or(StatusCode::UNAUTHORIZED)?;
    super::jwt::validate_token(get_connection(), &token)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let token = extract_token(&req);
    let claims = authenticate_token(token).await?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware that requires admin privileges (every CMS route)
pub async fn require_admin(mut req: Request<Body>, next: Next) -> Response {
    let token = extract_token(&req);
    let claims = match authenticate_token(token).await {
        Ok(claims) => claims,
        Err(status) => return status.into_response(),
    };

    if !claims.can_manage_site() {
        tracing::warn!("User {} denied access to {}", claims.username, req.uri().path());
        return (
            StatusCode::FORBIDDEN,
            Json(UseCaseError::permission_denied(
                "Управление сайтом доступно только администраторам",
            )),
        )
            .into_response();
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_token_from_header() {
        let req = request("/api/pages", Some("Bearer abc"));
        assert_eq!(extract_token(&req).as_deref(), Some("abc"));
    }

    #[test]
    fn test_token_from_query() {
        let req = request("/api/realtime?channel=public:pages&access_token=xyz", None);
        assert_eq!(extract_token(&req).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_query_token_is_percent_decoded() {
        let req = request("/api/realtime?access_token=a%2Bb%3D&channel=public:pages", None);
        assert_eq!(extract_token(&req).as_deref(), Some("a+b="));
    }

    #[test]
    fn test_missing_or_malformed_token() {
        assert_eq!(extract_token(&request("/api/pages", None)), None);
        assert_eq!(extract_token(&request("/api/pages", Some("Basic abc"))), None);
        assert_eq!(extract_token(&request("/api/pages?access_token=", None)), None);
    }
}
