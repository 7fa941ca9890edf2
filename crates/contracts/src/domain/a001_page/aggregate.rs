use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use crate::shared::route_inventory::{RouteDescriptor, HOME_SLUG};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор страницы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
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

impl AggregateId for PageId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s.trim())
            .map(PageId::new)
            .map_err(|e| format!("Invalid page id '{}': {}", s, e))
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Page type
// ============================================================================

/// Тип страницы
///
/// `System` и `Dynamic` создаются только синхронизацией маршрутов и защищены
/// от удаления и от смены slug/type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Custom,
    System,
    Dynamic,
}

impl PageType {
    pub fn code(&self) -> &'static str {
        match self {
            PageType::Custom => "custom",
            PageType::System => "system",
            PageType::Dynamic => "dynamic",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "custom" => Some(PageType::Custom),
            "system" => Some(PageType::System),
            "dynamic" => Some(PageType::Dynamic),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, PageType::Custom)
    }

    /// Порядок при сортировке списка по типу: system, dynamic, custom
    pub fn sort_rank(&self) -> u8 {
        match self {
            PageType::System => 0,
            PageType::Dynamic => 1,
            PageType::Custom => 2,
        }
    }
}

// ============================================================================
// Slug helpers
// ============================================================================

pub use crate::shared::slug_rules::normalize_slug;

/// Проверка slug пользовательской страницы (уже нормализованного)
pub fn validate_custom_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug не может быть пустым".into());
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '/')))
    {
        return Err(format!("Недопустимый символ '{}' в slug '{}'", bad, slug));
    }
    if slug.starts_with('/') || slug.ends_with('/') || slug.contains("//") {
        return Err(format!("Slug '{}' содержит пустой сегмент пути", slug));
    }
    Ok(())
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Страница сайта (запись реестра страниц)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub parent_id: Option<PageId>,
    pub visible: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

/// Причина отказа в редактировании страницы
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEditError {
    /// Попытка изменить защищённое поле system/dynamic страницы
    Protected(String),
    /// Некорректные входные данные
    Invalid(String),
}

impl std::fmt::Display for PageEditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageEditError::Protected(msg) | PageEditError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl Page {
    /// Создать пользовательскую страницу из DTO (slug нормализуется)
    pub fn new_custom(dto: &PageDto) -> Result<Self, String> {
        let slug = normalize_slug(&dto.slug);
        validate_custom_slug(&slug)?;

        let parent_id = match dto.parent_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(PageId::from_string(raw)?),
            _ => None,
        };

        let page = Self {
            id: PageId::new_v4(),
            title: dto.title.trim().to_string(),
            slug,
            page_type: PageType::Custom,
            parent_id,
            visible: dto.visible,
            meta_description: clean_optional(dto.meta_description.as_deref()),
            meta_keywords: clean_optional(dto.meta_keywords.as_deref()),
            metadata: EntityMetadata::new(),
        };
        page.validate()?;
        Ok(page)
    }

    /// Создать системную/динамическую страницу для маршрута
    pub fn new_for_route(route: &RouteDescriptor) -> Self {
        Self {
            id: PageId::new_v4(),
            title: route.page_name.to_string(),
            slug: route.slug(),
            page_type: route.page_type(),
            parent_id: None,
            visible: true,
            meta_description: None,
            meta_keywords: None,
            metadata: EntityMetadata::new(),
        }
    }

    /// Перезаписать страницу данными маршрута (принудительное восстановление)
    pub fn restore_from_route(&mut self, route: &RouteDescriptor) {
        self.title = route.page_name.to_string();
        self.slug = route.slug();
        self.page_type = route.page_type();
        self.visible = true;
    }

    /// Применить частичное обновление
    ///
    /// Все проверки выполняются до изменения полей: при ошибке страница не меняется.
    pub fn apply_update(&mut self, dto: &PageUpdateDto) -> Result<(), PageEditError> {
        if let Some(new_type) = dto.page_type {
            if new_type != self.page_type {
                if self.page_type.is_protected() {
                    return Err(PageEditError::Protected(format!(
                        "Тип {} страницы '{}' нельзя изменить",
                        self.page_type.code(),
                        self.slug
                    )));
                }
                return Err(PageEditError::Invalid(
                    "System и dynamic страницы создаются только синхронизацией маршрутов".into(),
                ));
            }
        }

        let slug = match dto.slug.as_deref() {
            Some(raw) => {
                let slug = normalize_slug(raw);
                if slug != self.slug {
                    if self.page_type.is_protected() {
                        return Err(PageEditError::Protected(format!(
                            "Slug {} страницы '{}' нельзя изменить",
                            self.page_type.code(),
                            self.slug
                        )));
                    }
                    validate_custom_slug(&slug).map_err(PageEditError::Invalid)?;
                }
                slug
            }
            None => self.slug.clone(),
        };

        let title = match dto.title.as_deref() {
            Some(raw) if raw.trim().is_empty() => {
                return Err(PageEditError::Invalid("Заголовок не может быть пустым".into()))
            }
            Some(raw) => raw.trim().to_string(),
            None => self.title.clone(),
        };

        let parent_id = match &dto.parent_id {
            Some(Some(raw)) => {
                let parent = PageId::from_string(raw).map_err(PageEditError::Invalid)?;
                if parent == self.id {
                    return Err(PageEditError::Invalid(
                        "Страница не может быть родителем самой себя".into(),
                    ));
                }
                Some(parent)
            }
            Some(None) => None,
            None => self.parent_id,
        };

        self.slug = slug;
        self.title = title;
        self.parent_id = parent_id;
        if let Some(visible) = dto.visible {
            self.visible = visible;
        }
        if let Some(meta) = &dto.meta_description {
            self.meta_description = clean_optional(Some(meta));
        }
        if let Some(meta) = &dto.meta_keywords {
            self.meta_keywords = clean_optional(Some(meta));
        }
        Ok(())
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Заголовок не может быть пустым".into());
        }
        if self.slug.is_empty() {
            return Err("Slug не может быть пустым".into());
        }
        if self.parent_id == Some(self.id) {
            return Err("Страница не может быть родителем самой себя".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.record_write();
    }

    /// Путь страницы на сайте
    pub fn href(&self) -> String {
        if self.slug == HOME_SLUG {
            "/".to_string()
        } else {
            format!("/{}", self.slug)
        }
    }
}

impl AggregateRoot for Page {
    type Id = PageId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "pages"
    }

    fn element_name() -> &'static str {
        "Страница"
    }

    fn list_name() -> &'static str {
        "Страницы"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

fn default_true() -> bool {
    true
}

/// Поле, которое может отсутствовать, быть null или содержать значение
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// DTO для создания пользовательской страницы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDto {
    pub title: String,
    pub slug: String,
    pub parent_id: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

impl PageDto {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            parent_id: None,
            visible: true,
            meta_description: None,
            meta_keywords: None,
        }
    }
}

/// DTO для частичного обновления страницы (передаются только изменяемые поля)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageUpdateDto {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "type")]
    pub page_type: Option<PageType>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<String>>,
    pub visible: Option<bool>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

/// Порядок сортировки списка страниц
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageListOrder {
    #[default]
    Title,
    Type,
}

/// Параметры запроса списка страниц
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageListQuery {
    #[serde(default)]
    pub order: PageListOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_page(slug: &str) -> Page {
        Page::new_custom(&PageDto::new("Title", slug)).unwrap()
    }

    fn route(path: &'static str, is_dynamic: bool) -> RouteDescriptor {
        RouteDescriptor {
            path,
            page_name: "Route page",
            is_dynamic,
            source_file_path: "site/pages/test",
        }
    }

    #[test]
    fn test_normalize_slug_collapses_case_and_spaces() {
        assert_eq!(normalize_slug("About-Us"), "about-us");
        assert_eq!(normalize_slug("  about   us "), "about-us");
        assert_eq!(normalize_slug("Team"), "team");
    }

    #[test]
    fn test_custom_slug_rejects_unsafe_characters() {
        assert!(validate_custom_slug("about-us").is_ok());
        assert!(validate_custom_slug("blog/summer_2024").is_ok());
        assert!(validate_custom_slug("").is_err());
        assert!(validate_custom_slug("a?b").is_err());
        assert!(validate_custom_slug("/about").is_err());
        assert!(validate_custom_slug("a//b").is_err());
    }

    #[test]
    fn test_new_custom_normalizes_and_validates() {
        let page = custom_page("About Us");
        assert_eq!(page.slug, "about-us");
        assert_eq!(page.page_type, PageType::Custom);
        assert!(page.visible);

        let err = Page::new_custom(&PageDto::new("   ", "about")).unwrap_err();
        assert!(err.contains("Заголовок"));
    }

    #[test]
    fn test_route_pages_take_type_from_dynamic_flag() {
        let home = Page::new_for_route(&route("/", false));
        assert_eq!(home.slug, "home");
        assert_eq!(home.page_type, PageType::System);
        assert_eq!(home.href(), "/");

        let details = Page::new_for_route(&route("/classes/:id", true));
        assert_eq!(details.slug, "classes/:id");
        assert_eq!(details.page_type, PageType::Dynamic);
    }

    #[test]
    fn test_protected_page_rejects_slug_and_type_change() {
        let mut page = Page::new_for_route(&route("/about", false));
        let before = page.clone();

        let err = page
            .apply_update(&PageUpdateDto {
                slug: Some("about-us".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PageEditError::Protected(_)));

        let err = page
            .apply_update(&PageUpdateDto {
                page_type: Some(PageType::Custom),
                title: Some("Renamed".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PageEditError::Protected(_)));
        assert_eq!(page, before);
    }

    #[test]
    fn test_protected_page_allows_other_fields() {
        let mut page = Page::new_for_route(&route("/about", false));
        page.apply_update(&PageUpdateDto {
            title: Some("About our gym".into()),
            slug: Some("About".into()),
            visible: Some(false),
            meta_description: Some("Who we are".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(page.title, "About our gym");
        assert_eq!(page.slug, "about");
        assert!(!page.visible);
        assert_eq!(page.meta_description.as_deref(), Some("Who we are"));
    }

    #[test]
    fn test_custom_page_cannot_become_system() {
        let mut page = custom_page("promo");
        let err = page
            .apply_update(&PageUpdateDto {
                page_type: Some(PageType::System),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PageEditError::Invalid(_)));
    }

    #[test]
    fn test_page_cannot_parent_itself() {
        let mut page = custom_page("promo");
        let err = page
            .apply_update(&PageUpdateDto {
                parent_id: Some(Some(page.id.as_string())),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PageEditError::Invalid(_)));
    }

    #[test]
    fn test_update_dto_distinguishes_null_parent_from_missing() {
        let missing: PageUpdateDto = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(missing.parent_id, None);

        let cleared: PageUpdateDto = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(cleared.parent_id, Some(None));

        let typed: PageUpdateDto = serde_json::from_str(r#"{"type":"dynamic"}"#).unwrap();
        assert_eq!(typed.page_type, Some(PageType::Dynamic));
    }

    #[test]
    fn test_page_serializes_type_field() {
        let page = custom_page("promo");
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["slug"], "promo");
        assert_eq!(json["version"], 0);
    }

    #[test]
    fn test_realtime_channel_uses_table_name() {
        assert_eq!(Page::realtime_channel(), "public:pages");
        assert_eq!(Page::full_name(), "a001_pages");
    }
}
