use std::collections::{HashMap, HashSet};

use super::{ordering, repository};
use crate::domain::a001_page::repository as page_repository;
use crate::shared::error::{CmsError, CmsResult};
use crate::shared::realtime;
use contracts::domain::a001_page::aggregate::{Page, PageId};
use contracts::domain::a002_nav_item::aggregate::{
    normalize_nav_group, MenuEntry, MoveRequest, NavItem, NavItemDto, NavItemId,
    NavItemUpdateDto, NavTarget, QuickSetupRequest, ReorderRequest,
};
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::realtime::ChangeKind;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

pub fn parse_nav_item_id(raw: &str) -> CmsResult<NavItemId> {
    NavItemId::from_string(raw).map_err(CmsError::Validation)
}

fn not_found(id: NavItemId) -> CmsError {
    CmsError::not_found(NavItem::element_name(), id)
}

fn notify_updates(ids: &[NavItemId]) {
    for id in ids {
        realtime::notify::<NavItem>(ChangeKind::Update, id);
    }
}

/// Ссылка на страницу допустима только на существующую страницу
async fn ensure_page_target<C: ConnectionTrait>(conn: &C, target: &NavTarget) -> CmsResult<()> {
    if let Some(page_id) = target.linked_page_id() {
        if page_repository::get_by_id(conn, page_id).await?.is_none() {
            return Err(CmsError::Validation(format!(
                "Страница {} не найдена",
                page_id
            )));
        }
    }
    Ok(())
}

/// Записать новые позиции; возвращает пункты, чей order_index изменился
async fn write_order<C: ConnectionTrait>(
    conn: &C,
    items: &[NavItem],
    ordered: &[NavItemId],
) -> CmsResult<Vec<NavItemId>> {
    let changes = ordering::changed_indexes(items, ordered);
    for (id, order_index) in &changes {
        repository::set_order_index(conn, *id, *order_index).await?;
    }
    Ok(changes.into_iter().map(|(id, _)| id).collect())
}

/// Уплотнить нумерацию группы после удаления или ухода пункта
async fn renumber_group<C: ConnectionTrait>(
    conn: &C,
    nav_group: &str,
) -> CmsResult<Vec<NavItemId>> {
    let items = repository::list_by_group(conn, nav_group).await?;
    let ids: Vec<_> = items.iter().map(|item| item.id).collect();
    write_order(conn, &items, &ids).await
}

async fn next_index<C: ConnectionTrait>(conn: &C, nav_group: &str) -> CmsResult<i32> {
    let count = repository::count_in_group(conn, nav_group).await?;
    i32::try_from(count).map_err(|_| CmsError::Validation("Слишком много пунктов в группе".into()))
}

/// Создание пункта навигации в конце группы
pub async fn create(db: &DatabaseConnection, dto: NavItemDto) -> CmsResult<NavItem> {
    let target = dto.target().map_err(CmsError::Validation)?;
    let nav_group = normalize_nav_group(dto.nav_group.as_deref());

    let txn = db.begin().await?;
    ensure_page_target(&txn, &target).await?;
    let order_index = next_index(&txn, &nav_group).await?;

    let item = NavItem::new_for_insert(dto.label, target, nav_group, order_index, dto.visible);
    item.validate().map_err(CmsError::Validation)?;
    repository::insert(&txn, &item).await?;
    txn.commit().await?;

    tracing::info!(
        "Created nav item '{}' in {} at {}",
        item.label,
        item.nav_group,
        item.order_index
    );
    realtime::notify::<NavItem>(ChangeKind::Insert, item.id);
    Ok(item)
}

/// Частичное обновление; смена группы переносит пункт в конец новой группы
pub async fn update(
    db: &DatabaseConnection,
    id: NavItemId,
    dto: NavItemUpdateDto,
) -> CmsResult<NavItem> {
    let target_change = dto.target_change().map_err(CmsError::Validation)?;

    let txn = db.begin().await?;
    let mut item = repository::get_by_id(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let previous_group = item.nav_group.clone();

    if let Some(label) = &dto.label {
        item.label = label.trim().to_string();
    }
    if let Some(target) = target_change {
        ensure_page_target(&txn, &target).await?;
        item.target = target;
    }
    if let Some(visible) = dto.visible {
        item.visible = visible;
    }
    if let Some(raw) = dto.nav_group.as_deref() {
        let nav_group = normalize_nav_group(Some(raw));
        if nav_group != previous_group {
            item.order_index = next_index(&txn, &nav_group).await?;
            item.nav_group = nav_group;
        }
    }

    item.validate().map_err(CmsError::Validation)?;
    item.before_write();
    repository::update(&txn, &item).await?;

    let renumbered = if item.nav_group != previous_group {
        renumber_group(&txn, &previous_group).await?
    } else {
        Vec::new()
    };
    txn.commit().await?;

    realtime::notify::<NavItem>(ChangeKind::Update, item.id);
    notify_updates(&renumbered);
    Ok(item)
}

/// Перестановка пунктов внутри группы одной транзакцией
pub async fn reorder_within_group(
    db: &DatabaseConnection,
    request: ReorderRequest,
) -> CmsResult<Vec<NavItem>> {
    let nav_group = normalize_nav_group(Some(&request.nav_group));
    let requested = request
        .ordered_ids
        .iter()
        .map(|raw| parse_nav_item_id(raw))
        .collect::<CmsResult<Vec<_>>>()?;

    let txn = db.begin().await?;
    let items = repository::list_by_group(&txn, &nav_group).await?;
    let current: Vec<_> = items.iter().map(|item| item.id).collect();
    ordering::check_permutation(&current, &requested).map_err(CmsError::Validation)?;

    let changed = write_order(&txn, &items, &requested).await?;
    let reordered = repository::list_by_group(&txn, &nav_group).await?;
    txn.commit().await?;

    tracing::info!("Reordered {} item(s) in {}", changed.len(), nav_group);
    notify_updates(&changed);
    Ok(reordered)
}

/// Перенос пункта в другую группу (или на другую позицию той же группы)
///
/// Обе группы перенумеровываются плотно от нуля. Возвращает итоговую целевую группу.
pub async fn move_between_groups(
    db: &DatabaseConnection,
    request: MoveRequest,
) -> CmsResult<Vec<NavItem>> {
    let item_id = parse_nav_item_id(&request.item_id)?;
    let from_group = normalize_nav_group(Some(&request.from_group));
    let to_group = normalize_nav_group(Some(&request.to_group));

    let txn = db.begin().await?;
    let mut item = repository::get_by_id(&txn, item_id)
        .await?
        .ok_or_else(|| not_found(item_id))?;
    if item.nav_group != from_group {
        return Err(CmsError::Validation(format!(
            "Пункт находится в группе '{}', а не '{}'",
            item.nav_group, from_group
        )));
    }

    let source = repository::list_by_group(&txn, &from_group).await?;
    let mut source_ids: Vec<_> = source
        .iter()
        .map(|i| i.id)
        .filter(|id| *id != item_id)
        .collect();

    let mut changed = if from_group == to_group {
        ordering::insert_clamped(&mut source_ids, item_id, request.destination_index);
        write_order(&txn, &source, &source_ids).await?
    } else {
        let destination = repository::list_by_group(&txn, &to_group).await?;
        let mut destination_ids: Vec<_> = destination.iter().map(|i| i.id).collect();
        let position =
            ordering::insert_clamped(&mut destination_ids, item_id, request.destination_index);

        item.nav_group = to_group.clone();
        item.order_index = position as i32;
        item.before_write();
        repository::update(&txn, &item).await?;

        let mut changed = write_order(&txn, &source, &source_ids).await?;
        changed.extend(write_order(&txn, &destination, &destination_ids).await?);
        changed.retain(|id| *id != item_id);
        changed.push(item_id);
        changed
    };
    changed.dedup();

    let result = repository::list_by_group(&txn, &to_group).await?;
    txn.commit().await?;

    tracing::info!(
        "Moved nav item {} from {} to {} at {}",
        item_id,
        from_group,
        to_group,
        request.destination_index
    );
    notify_updates(&changed);
    Ok(result)
}

/// Удаление пункта; оставшиеся пункты группы перенумеровываются
pub async fn delete(db: &DatabaseConnection, id: NavItemId) -> CmsResult<()> {
    let txn = db.begin().await?;
    let item = repository::get_by_id(&txn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    repository::delete(&txn, id).await?;
    let renumbered = renumber_group(&txn, &item.nav_group).await?;
    txn.commit().await?;

    realtime::notify::<NavItem>(ChangeKind::Delete, id);
    notify_updates(&renumbered);
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: NavItemId) -> CmsResult<NavItem> {
    repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Пункты одной группы либо всех групп, по (order_index, created_at, id)
pub async fn list(db: &DatabaseConnection, nav_group: Option<&str>) -> CmsResult<Vec<NavItem>> {
    let items = match nav_group {
        Some(raw) => repository::list_by_group(db, &normalize_nav_group(Some(raw))).await?,
        None => repository::list_all(db).await?,
    };
    Ok(items)
}

/// Быстрое создание пунктов для выбранных страниц
///
/// Страницы, уже имеющие пункт в группе, пропускаются. Подпись берётся из заголовка.
pub async fn quick_setup(
    db: &DatabaseConnection,
    request: QuickSetupRequest,
) -> CmsResult<Vec<NavItem>> {
    let nav_group = normalize_nav_group(request.nav_group.as_deref());
    let page_ids = request
        .page_ids
        .iter()
        .map(|raw| PageId::from_string(raw).map_err(CmsError::Validation))
        .collect::<CmsResult<Vec<_>>>()?;

    let txn = db.begin().await?;
    let existing = repository::list_by_group(&txn, &nav_group).await?;
    let mut linked: HashSet<PageId> = existing
        .iter()
        .filter_map(|item| item.target.linked_page_id())
        .collect();
    let mut order_index = next_index(&txn, &nav_group).await?;

    let mut created = Vec::new();
    for page_id in page_ids {
        if !linked.insert(page_id) {
            continue;
        }
        let page = page_repository::get_by_id(&txn, page_id)
            .await?
            .ok_or_else(|| CmsError::Validation(format!("Страница {} не найдена", page_id)))?;

        let item = NavItem::new_for_insert(
            page.title.clone(),
            NavTarget::Page {
                linked_page_id: page_id,
            },
            nav_group.clone(),
            order_index,
            true,
        );
        item.validate().map_err(CmsError::Validation)?;
        repository::insert(&txn, &item).await?;
        order_index += 1;
        created.push(item);
    }
    txn.commit().await?;

    tracing::info!("Quick setup added {} item(s) to {}", created.len(), nav_group);
    for item in &created {
        realtime::notify::<NavItem>(ChangeKind::Insert, item.id);
    }
    Ok(created)
}

/// Меню группы для публичного сайта: только видимые пункты с доступной целью
pub async fn render_menu(db: &DatabaseConnection, nav_group: &str) -> CmsResult<Vec<MenuEntry>> {
    let nav_group = normalize_nav_group(Some(nav_group));
    let items = repository::list_by_group(db, &nav_group).await?;
    let pages: HashMap<PageId, Page> = page_repository::list_all(db)
        .await?
        .into_iter()
        .map(|page| (page.id, page))
        .collect();
    Ok(resolve_menu(&items, &pages))
}

pub(crate) fn resolve_menu(items: &[NavItem], pages: &HashMap<PageId, Page>) -> Vec<MenuEntry> {
    items
        .iter()
        .filter(|item| item.visible)
        .filter_map(|item| match &item.target {
            NavTarget::Page { linked_page_id } => pages
                .get(linked_page_id)
                .filter(|page| page.visible)
                .map(|page| MenuEntry {
                    label: item.label.clone(),
                    href: page.href(),
                    external: false,
                }),
            NavTarget::External { external_url } => Some(MenuEntry {
                label: item.label.clone(),
                href: external_url.clone(),
                external: !external_url.starts_with('/'),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_page::service as page_service;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a001_page::aggregate::PageDto;

    fn external_dto(label: &str, group: &str) -> NavItemDto {
        NavItemDto {
            label: label.into(),
            linked_page_id: None,
            external_url: Some(format!("/{}", label.to_lowercase())),
            nav_group: Some(group.into()),
            visible: true,
        }
    }

    async fn seed(db: &DatabaseConnection, group: &str, labels: &[&str]) -> Vec<NavItem> {
        let mut items = Vec::new();
        for label in labels {
            items.push(create(db, external_dto(label, group)).await.unwrap());
        }
        items
    }

    async fn indexes(db: &DatabaseConnection, group: &str) -> Vec<(String, i32)> {
        list(db, Some(group))
            .await
            .unwrap()
            .into_iter()
            .map(|i| (i.label, i.order_index))
            .collect()
    }

    #[tokio::test]
    async fn test_create_appends_to_group() {
        let db = connect_in_memory().await;
        let items = seed(&db, "header", &["Home", "About", "Contact"]).await;
        assert_eq!(
            items.iter().map(|i| i.order_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let footer = create(&db, external_dto("Legal", "footer")).await.unwrap();
        assert_eq!(footer.order_index, 0);

        let defaulted = create(
            &db,
            NavItemDto {
                nav_group: None,
                ..external_dto("Blog", "")
            },
        )
        .await
        .unwrap();
        assert_eq!(defaulted.nav_group, "header");
        assert_eq!(defaulted.order_index, 3);
    }

    #[tokio::test]
    async fn test_both_targets_is_validation_error() {
        let db = connect_in_memory().await;
        let page = page_service::create(&db, PageDto::new("About", "about"))
            .await
            .unwrap();

        let err = create(
            &db,
            NavItemDto {
                label: "About".into(),
                linked_page_id: Some(page.id.as_string()),
                external_url: Some("https://example.com".into()),
                nav_group: Some("header".into()),
                visible: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));

        let err = create(
            &db,
            NavItemDto {
                label: "Nothing".into(),
                linked_page_id: None,
                external_url: None,
                nav_group: None,
                visible: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));
        assert_eq!(repository::count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_link_to_missing_page_is_rejected() {
        let db = connect_in_memory().await;
        let err = create(
            &db,
            NavItemDto {
                label: "Ghost".into(),
                linked_page_id: Some(PageId::new_v4().as_string()),
                external_url: None,
                nav_group: None,
                visible: true,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_target_replaces_previous_one() {
        let db = connect_in_memory().await;
        let page = page_service::create(&db, PageDto::new("Team", "team"))
            .await
            .unwrap();
        let item = create(&db, external_dto("Team", "header")).await.unwrap();

        let updated = update(
            &db,
            item.id,
            NavItemUpdateDto {
                linked_page_id: Some(page.id.as_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.target.linked_page_id(), Some(page.id));
        assert_eq!(updated.target.external_url(), None);
        assert_eq!(updated.metadata.version, 1);
    }

    #[tokio::test]
    async fn test_reorder_within_group() {
        let db = connect_in_memory().await;
        let items = seed(&db, "header", &["A", "B", "C"]).await;

        let reordered = reorder_within_group(
            &db,
            ReorderRequest {
                nav_group: "header".into(),
                ordered_ids: vec![
                    items[2].id.as_string(),
                    items[0].id.as_string(),
                    items[1].id.as_string(),
                ],
            },
        )
        .await
        .unwrap();
        let labels: Vec<_> = reordered.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["C", "A", "B"]);
        assert_eq!(
            reordered.iter().map(|i| i.order_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn test_reorder_with_partial_list_changes_nothing() {
        let db = connect_in_memory().await;
        let items = seed(&db, "header", &["A", "B", "C"]).await;

        let err = reorder_within_group(
            &db,
            ReorderRequest {
                nav_group: "header".into(),
                ordered_ids: vec![items[1].id.as_string(), items[0].id.as_string()],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));
        assert_eq!(
            indexes(&db, "header").await,
            vec![("A".into(), 0), ("B".into(), 1), ("C".into(), 2)]
        );
    }

    #[tokio::test]
    async fn test_move_between_groups_renumbers_both() {
        let db = connect_in_memory().await;
        let header = seed(&db, "header", &["H0", "H1", "H2"]).await;
        seed(&db, "footer", &["F0", "F1"]).await;

        let footer = move_between_groups(
            &db,
            MoveRequest {
                item_id: header[1].id.as_string(),
                from_group: "header".into(),
                to_group: "footer".into(),
                destination_index: 0,
            },
        )
        .await
        .unwrap();

        assert_eq!(footer[0].id, header[1].id);
        assert_eq!(
            indexes(&db, "header").await,
            vec![("H0".into(), 0), ("H2".into(), 1)]
        );
        assert_eq!(
            indexes(&db, "footer").await,
            vec![("H1".into(), 0), ("F0".into(), 1), ("F1".into(), 2)]
        );
    }

    #[tokio::test]
    async fn test_move_destination_index_is_clamped() {
        let db = connect_in_memory().await;
        let header = seed(&db, "header", &["A", "B"]).await;
        seed(&db, "footer", &["F0"]).await;

        move_between_groups(
            &db,
            MoveRequest {
                item_id: header[0].id.as_string(),
                from_group: "header".into(),
                to_group: "footer".into(),
                destination_index: 99,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            indexes(&db, "footer").await,
            vec![("F0".into(), 0), ("A".into(), 1)]
        );
        assert_eq!(indexes(&db, "header").await, vec![("B".into(), 0)]);
    }

    #[tokio::test]
    async fn test_move_within_same_group_reorders() {
        let db = connect_in_memory().await;
        let header = seed(&db, "header", &["A", "B", "C"]).await;
        seed(&db, "footer", &["F0"]).await;

        let result = move_between_groups(
            &db,
            MoveRequest {
                item_id: header[0].id.as_string(),
                from_group: "header".into(),
                to_group: "header".into(),
                destination_index: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(
            indexes(&db, "header").await,
            vec![("B".into(), 0), ("C".into(), 1), ("A".into(), 2)]
        );
        assert_eq!(indexes(&db, "footer").await, vec![("F0".into(), 0)]);
    }

    #[tokio::test]
    async fn test_move_from_wrong_group_is_rejected() {
        let db = connect_in_memory().await;
        let header = seed(&db, "header", &["A"]).await;
        let err = move_between_groups(
            &db,
            MoveRequest {
                item_id: header[0].id.as_string(),
                from_group: "footer".into(),
                to_group: "sidebar".into(),
                destination_index: 0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CmsError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_keeps_group_dense() {
        let db = connect_in_memory().await;
        let items = seed(&db, "header", &["A", "B", "C"]).await;

        delete(&db, items[0].id).await.unwrap();
        assert_eq!(
            indexes(&db, "header").await,
            vec![("B".into(), 0), ("C".into(), 1)]
        );
        assert!(matches!(
            delete(&db, items[0].id).await,
            Err(CmsError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_group_change_via_update_keeps_both_groups_dense() {
        let db = connect_in_memory().await;
        let header = seed(&db, "header", &["A", "B", "C"]).await;
        seed(&db, "footer", &["F0"]).await;

        let moved = update(
            &db,
            header[0].id,
            NavItemUpdateDto {
                nav_group: Some("Footer".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.nav_group, "footer");
        assert_eq!(moved.order_index, 1);
        assert_eq!(
            indexes(&db, "header").await,
            vec![("B".into(), 0), ("C".into(), 1)]
        );
    }

    #[tokio::test]
    async fn test_quick_setup_skips_pages_already_in_group() {
        let db = connect_in_memory().await;
        let about = page_service::create(&db, PageDto::new("About", "about"))
            .await
            .unwrap();
        let team = page_service::create(&db, PageDto::new("Team", "team"))
            .await
            .unwrap();
        seed(&db, "header", &["Blog"]).await;

        let request = QuickSetupRequest {
            page_ids: vec![about.id.as_string(), team.id.as_string()],
            nav_group: Some("header".into()),
        };
        let created = quick_setup(&db, request.clone()).await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].label, "About");
        assert_eq!(created[1].order_index, 2);

        let again = quick_setup(&db, request).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(repository::count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_render_menu_omits_hidden_and_missing_pages() {
        let db = connect_in_memory().await;
        let about = page_service::create(&db, PageDto::new("About", "about"))
            .await
            .unwrap();
        let hidden = page_service::create(&db, PageDto::new("Secret", "secret"))
            .await
            .unwrap();
        let removed = page_service::create(&db, PageDto::new("Old", "old"))
            .await
            .unwrap();
        quick_setup(
            &db,
            QuickSetupRequest {
                page_ids: vec![
                    about.id.as_string(),
                    hidden.id.as_string(),
                    removed.id.as_string(),
                ],
                nav_group: None,
            },
        )
        .await
        .unwrap();
        create(
            &db,
            NavItemDto {
                external_url: Some("https://shop.example.com".into()),
                ..external_dto("Shop", "header")
            },
        )
        .await
        .unwrap();
        page_service::toggle_visibility(&db, hidden.id).await.unwrap();
        page_service::delete(&db, removed.id).await.unwrap();

        let menu = render_menu(&db, "header").await.unwrap();
        assert_eq!(
            menu,
            vec![
                MenuEntry {
                    label: "About".into(),
                    href: "/about".into(),
                    external: false,
                },
                MenuEntry {
                    label: "Shop".into(),
                    href: "https://shop.example.com".into(),
                    external: true,
                },
            ]
        );
    }
}
