use std::collections::HashSet;

use super::repository;
use crate::shared::error::{unique_violation_as_validation, CmsError, CmsResult};
use crate::shared::realtime;
use contracts::domain::a001_page::aggregate::{
    Page, PageDto, PageEditError, PageId, PageListOrder, PageUpdateDto,
};
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::realtime::ChangeKind;
use sea_orm::DatabaseConnection;

pub fn parse_page_id(raw: &str) -> CmsResult<PageId> {
    PageId::from_string(raw).map_err(CmsError::Validation)
}

fn slug_taken(slug: &str) -> String {
    format!("Страница со slug '{}' уже существует", slug)
}

/// Создание пользовательской страницы
pub async fn create(db: &DatabaseConnection, dto: PageDto) -> CmsResult<Page> {
    let page = Page::new_custom(&dto).map_err(CmsError::Validation)?;

    if repository::get_by_slug(db, &page.slug).await?.is_some() {
        return Err(CmsError::Validation(slug_taken(&page.slug)));
    }
    if let Some(parent_id) = page.parent_id {
        ensure_parent_exists(db, parent_id).await?;
    }

    repository::insert(db, &page)
        .await
        .map_err(|e| unique_violation_as_validation(e, || slug_taken(&page.slug)))?;

    tracing::info!("Created page '{}' ({})", page.slug, page.id);
    realtime::notify::<Page>(ChangeKind::Insert, page.id);
    Ok(page)
}

/// Частичное обновление страницы
pub async fn update(db: &DatabaseConnection, id: PageId, dto: PageUpdateDto) -> CmsResult<Page> {
    let mut page = get(db, id).await?;
    let previous_slug = page.slug.clone();
    let previous_parent = page.parent_id;

    page.apply_update(&dto).map_err(|e| match e {
        PageEditError::Protected(msg) => CmsError::Protected(msg),
        PageEditError::Invalid(msg) => CmsError::Validation(msg),
    })?;

    if page.slug != previous_slug {
        if let Some(other) = repository::get_by_slug(db, &page.slug).await? {
            if other.id != page.id {
                return Err(CmsError::Validation(slug_taken(&page.slug)));
            }
        }
    }
    if page.parent_id != previous_parent {
        if let Some(parent_id) = page.parent_id {
            ensure_no_cycle(db, page.id, parent_id).await?;
        }
    }

    page.validate().map_err(CmsError::Validation)?;
    page.before_write();
    repository::update(db, &page)
        .await
        .map_err(|e| unique_violation_as_validation(e, || slug_taken(&page.slug)))?;

    realtime::notify::<Page>(ChangeKind::Update, page.id);
    Ok(page)
}

/// Удаление страницы; допускается только для пользовательских страниц
///
/// Пункты навигации, ссылающиеся на страницу, остаются и попадают в отчёт
/// синхронизации как осиротевшие.
pub async fn delete(db: &DatabaseConnection, id: PageId) -> CmsResult<()> {
    let page = get(db, id).await?;
    if page.page_type.is_protected() {
        return Err(CmsError::Protected(format!(
            "Страницу '{}' типа {} нельзя удалить",
            page.slug,
            page.page_type.code()
        )));
    }

    if !repository::delete(db, id).await? {
        return Err(CmsError::not_found(Page::element_name(), id));
    }

    tracing::info!("Deleted page '{}' ({})", page.slug, page.id);
    realtime::notify::<Page>(ChangeKind::Delete, id);
    Ok(())
}

pub async fn toggle_visibility(db: &DatabaseConnection, id: PageId) -> CmsResult<Page> {
    let mut page = get(db, id).await?;
    page.visible = !page.visible;
    page.before_write();
    repository::update(db, &page).await?;

    realtime::notify::<Page>(ChangeKind::Update, page.id);
    Ok(page)
}

pub async fn get(db: &DatabaseConnection, id: PageId) -> CmsResult<Page> {
    repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| CmsError::not_found(Page::element_name(), id))
}

/// Список страниц: по заголовку без учёта регистра либо по типу, затем по заголовку
pub async fn list(db: &DatabaseConnection, order: PageListOrder) -> CmsResult<Vec<Page>> {
    let mut pages = repository::list_all(db).await?;
    sort_pages(&mut pages, order);
    Ok(pages)
}

/// Непосредственные дочерние страницы
pub async fn children(db: &DatabaseConnection, id: PageId) -> CmsResult<Vec<Page>> {
    get(db, id).await?;
    let mut pages = repository::list_children(db, id).await?;
    sort_pages(&mut pages, PageListOrder::Title);
    Ok(pages)
}

pub(crate) fn sort_pages(pages: &mut [Page], order: PageListOrder) {
    match order {
        PageListOrder::Title => {
            pages.sort_by_cached_key(|p| (p.title.to_lowercase(), p.slug.clone()));
        }
        PageListOrder::Type => {
            pages.sort_by_cached_key(|p| {
                (p.page_type.sort_rank(), p.title.to_lowercase(), p.slug.clone())
            });
        }
    }
}

async fn ensure_parent_exists(db: &DatabaseConnection, parent_id: PageId) -> CmsResult<Page> {
    repository::get_by_id(db, parent_id).await?.ok_or_else(|| {
        CmsError::Validation(format!("Родительская страница {} не найдена", parent_id))
    })
}

/// Новый родитель не должен быть самой страницей или её потомком
async fn ensure_no_cycle(db: &DatabaseConnection, page_id: PageId, parent_id: PageId) -> CmsResult<()> {
    let mut visited = HashSet::new();
    let mut current = Some(ensure_parent_exists(db, parent_id).await?);

    while let Some(ancestor) = current {
        if ancestor.id == page_id {
            return Err(CmsError::Validation(
                "Страница не может стать потомком самой себя".into(),
            ));
        }
        if !visited.insert(ancestor.id) {
            // цикл уже есть в данных выше по дереву
            break;
        }
        current = match ancestor.parent_id {
            Some(next) => repository::get_by_id(db, next).await?,
            None => None,
        };
    }
    Ok(())
}
