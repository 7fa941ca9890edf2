use serde::{Deserialize, Serialize};

/// Запрос на принудительное восстановление страниц маршрутов
///
/// Операция перезаписывает существующие страницы, поэтому требует явного подтверждения.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForceRestoreRequest {
    #[serde(default)]
    pub confirm: bool,
}
