use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::a001_page::aggregate::PageId;
use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};

/// Группа навигации по умолчанию
pub const DEFAULT_NAV_GROUP: &str = "header";

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор пункта навигации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavItemId(pub Uuid);

impl NavItemId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for NavItemId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s.trim())
            .map(NavItemId::new)
            .map_err(|e| format!("Invalid nav item id '{}': {}", s, e))
    }
}

impl std::fmt::Display for NavItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Link target
// ============================================================================

/// Цель ссылки пункта навигации: страница реестра либо внешний URL, ровно одно из двух
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavTarget {
    Page { linked_page_id: PageId },
    External { external_url: String },
}

impl NavTarget {
    pub fn linked_page_id(&self) -> Option<PageId> {
        match self {
            NavTarget::Page { linked_page_id } => Some(*linked_page_id),
            NavTarget::External { .. } => None,
        }
    }

    pub fn external_url(&self) -> Option<&str> {
        match self {
            NavTarget::Page { .. } => None,
            NavTarget::External { external_url } => Some(external_url),
        }
    }

    /// Собрать цель из пары необязательных полей формы
    ///
    /// Пустые строки считаются отсутствующими. `Ok(None)`, если не задано ни одно поле.
    pub fn from_parts(
        linked_page_id: Option<&str>,
        external_url: Option<&str>,
    ) -> Result<Option<Self>, String> {
        let linked = linked_page_id.map(str::trim).filter(|s| !s.is_empty());
        let external = external_url.map(str::trim).filter(|s| !s.is_empty());

        match (linked, external) {
            (Some(_), Some(_)) => Err(
                "Пункт навигации ссылается либо на страницу, либо на внешний URL, но не на оба сразу"
                    .into(),
            ),
            (Some(page), None) => Ok(Some(NavTarget::Page {
                linked_page_id: PageId::from_string(page)?,
            })),
            (None, Some(url)) => {
                validate_external_url(url)?;
                Ok(Some(NavTarget::External {
                    external_url: url.to_string(),
                }))
            }
            (None, None) => Ok(None),
        }
    }
}

/// Проверка внешней ссылки: абсолютный http(s) URL или путь от корня сайта
pub fn validate_external_url(url: &str) -> Result<(), String> {
    if url.chars().any(char::is_whitespace) {
        return Err(format!("URL '{}' содержит пробелы", url));
    }
    let absolute = ["http://", "https://"]
        .iter()
        .any(|prefix| url.len() > prefix.len() && url.starts_with(prefix));
    let site_relative = url.starts_with('/') && !url.starts_with("//");
    if absolute || site_relative {
        Ok(())
    } else {
        Err(format!(
            "URL '{}' должен начинаться с http://, https:// или /",
            url
        ))
    }
}

/// Нормализация имени группы навигации; пустое имя означает группу по умолчанию
pub fn normalize_nav_group(raw: Option<&str>) -> String {
    match raw.map(|g| g.trim().to_lowercase()) {
        Some(group) if !group.is_empty() => group,
        _ => DEFAULT_NAV_GROUP.to_string(),
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Пункт навигации сайта
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: NavItemId,
    pub label: String,
    #[serde(flatten)]
    pub target: NavTarget,
    pub nav_group: String,
    pub order_index: i32,
    pub visible: bool,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl NavItem {
    /// Создать пункт навигации в конце группы
    pub fn new_for_insert(
        label: String,
        target: NavTarget,
        nav_group: String,
        order_index: i32,
        visible: bool,
    ) -> Self {
        Self {
            id: NavItemId::new_v4(),
            label: label.trim().to_string(),
            target,
            nav_group,
            order_index,
            visible,
            metadata: EntityMetadata::new(),
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.label.trim().is_empty() {
            return Err("Название пункта навигации не может быть пустым".into());
        }
        if self.nav_group.trim().is_empty() {
            return Err("Группа навигации не может быть пустой".into());
        }
        if self.order_index < 0 {
            return Err("Порядковый номер не может быть отрицательным".into());
        }
        if let NavTarget::External { external_url } = &self.target {
            validate_external_url(external_url)?;
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.record_write();
    }
}

impl AggregateRoot for NavItem {
    type Id = NavItemId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "nav_items"
    }

    fn element_name() -> &'static str {
        "Пункт навигации"
    }

    fn list_name() -> &'static str {
        "Навигация"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

fn default_true() -> bool {
    true
}

/// DTO для создания пункта навигации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItemDto {
    pub label: String,
    pub linked_page_id: Option<String>,
    pub external_url: Option<String>,
    pub nav_group: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl NavItemDto {
    /// Цель ссылки; ровно одно из полей обязано быть заполнено
    pub fn target(&self) -> Result<NavTarget, String> {
        NavTarget::from_parts(self.linked_page_id.as_deref(), self.external_url.as_deref())?
            .ok_or_else(|| {
                "Пункт навигации должен ссылаться на страницу или на внешний URL".to_string()
            })
    }
}

/// DTO для частичного обновления пункта навигации
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavItemUpdateDto {
    pub label: Option<String>,
    pub linked_page_id: Option<String>,
    pub external_url: Option<String>,
    pub nav_group: Option<String>,
    pub visible: Option<bool>,
}

impl NavItemUpdateDto {
    /// Новая цель ссылки, если она передана; заменяет прежнюю целиком
    pub fn target_change(&self) -> Result<Option<NavTarget>, String> {
        NavTarget::from_parts(self.linked_page_id.as_deref(), self.external_url.as_deref())
    }
}

/// Запрос на перестановку пунктов внутри группы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub nav_group: String,
    pub ordered_ids: Vec<String>,
}

/// Запрос на перенос пункта между группами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub item_id: String,
    pub from_group: String,
    pub to_group: String,
    pub destination_index: usize,
}

/// Запрос на быстрое создание пунктов навигации по выбранным страницам
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickSetupRequest {
    pub page_ids: Vec<String>,
    pub nav_group: Option<String>,
}

/// Параметры запроса списка пунктов навигации
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavItemListQuery {
    pub nav_group: Option<String>,
}

/// Готовый к отображению пункт меню сайта
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub label: String,
    pub href: String,
    pub external: bool,
}
