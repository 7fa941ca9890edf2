use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::common::UseCaseError;
use sea_orm::{DbErr, SqlErr};

/// Ошибки операций реестра страниц, навигации и синхронизации
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Protected(String),

    #[error("route sync failed: {0}")]
    Sync(String),

    #[error("bootstrap check failed: {0}")]
    Bootstrap(String),

    #[error("force restore failed: {0}")]
    ForceSync(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

pub type CmsResult<T> = Result<T, CmsError>;

impl CmsError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CmsError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CmsError::Validation(_) => StatusCode::BAD_REQUEST,
            CmsError::NotFound { .. } => StatusCode::NOT_FOUND,
            CmsError::Protected(_) => StatusCode::CONFLICT,
            CmsError::Sync(_)
            | CmsError::Bootstrap(_)
            | CmsError::ForceSync(_)
            | CmsError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Тело ответа клиенту; детали ошибок БД в ответ не попадают
    pub fn to_usecase_error(&self) -> UseCaseError {
        match self {
            CmsError::Validation(msg) => UseCaseError::validation(msg.clone()),
            CmsError::NotFound { .. } => UseCaseError::not_found(self.to_string()),
            CmsError::Protected(msg) => UseCaseError::protected(msg.clone()),
            CmsError::Sync(msg) => UseCaseError::new(UseCaseError::SYNC, msg.clone()),
            CmsError::Bootstrap(msg) => UseCaseError::new(UseCaseError::BOOTSTRAP, msg.clone()),
            CmsError::ForceSync(msg) => UseCaseError::new(UseCaseError::FORCE_SYNC, msg.clone()),
            CmsError::Database(_) => UseCaseError::internal("Database error"),
        }
    }
}

/// Нарушение уникальности при записи превращается в ошибку валидации
pub fn unique_violation_as_validation(err: DbErr, message: impl FnOnce() -> String) -> CmsError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CmsError::Validation(message()),
        _ => CmsError::Database(err),
    }
}

impl IntoResponse for CmsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(self.to_usecase_error())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CmsError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CmsError::not_found("Page", "42").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CmsError::Protected("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CmsError::Sync("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_details_are_hidden() {
        let err = CmsError::from(DbErr::Custom("disk I/O error".into()));
        let body = err.to_usecase_error();
        assert_eq!(body.code, UseCaseError::INTERNAL);
        assert!(!body.message.contains("disk"));
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let body = CmsError::not_found("Page", "abc").to_usecase_error();
        assert_eq!(body.code, UseCaseError::NOT_FOUND);
        assert_eq!(body.message, "Page 'abc' not found");
    }
}
