use serde::{Deserialize, Serialize};

/// Вход оператора по логину и паролю
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Пара токенов и сведения об операторе
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Текущий оператор; `is_admin` открывает доступ к управлению страницами и навигацией
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_admin: bool,
}

/// Содержимое access-токена
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// ID оператора
    pub sub: String,
    pub username: String,
    pub is_admin: bool,
    /// Unix-время истечения
    pub exp: usize,
    /// Unix-время выпуска
    pub iat: usize,
}

impl TokenClaims {
    /// Разрешено ли оператору менять страницы, навигацию и запускать синхронизацию
    pub fn can_manage_site(&self) -> bool {
        self.is_admin
    }
}
