use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use contracts::system::auth::TokenClaims;
use contracts::usecases::common::UseCaseError;

/// Оператор, прошедший проверку токена в `require_auth`/`require_admin`
pub struct CurrentUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<UseCaseError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<TokenClaims>() {
            Some(claims) => Ok(CurrentUser(claims.clone())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(UseCaseError::new("UNAUTHORIZED", "Требуется вход в систему")),
            )),
        }
    }
}
