//! Pure matching of the route inventory against registry pages and nav items.

use std::collections::{HashMap, HashSet};

use contracts::domain::a001_page::aggregate::{Page, PageId};
use contracts::domain::a002_nav_item::aggregate::NavItem;
use contracts::domain::common::AggregateId;
use contracts::shared::route_inventory::RouteDescriptor;
use contracts::usecases::u001_route_sync::{OrphanedNavItem, RouteSyncRow, SyncStatusReport};

/// slug -> page
pub fn index_by_slug(pages: &[Page]) -> HashMap<&str, &Page> {
    pages.iter().map(|p| (p.slug.as_str(), p)).collect()
}

/// Routes without a page whose slug equals the route slug.
pub fn unmatched_routes<'r>(
    routes: &'r [RouteDescriptor],
    pages: &[Page],
) -> Vec<&'r RouteDescriptor> {
    let by_slug = index_by_slug(pages);
    routes
        .iter()
        .filter(|route| !by_slug.contains_key(route.slug().as_str()))
        .collect()
}

pub fn route_rows(routes: &[RouteDescriptor], pages: &[Page]) -> Vec<RouteSyncRow> {
    let by_slug = index_by_slug(pages);
    routes
        .iter()
        .map(|route| {
            let slug = route.slug();
            let page_id = by_slug.get(slug.as_str()).map(|p| p.id.as_string());
            RouteSyncRow {
                path: route.path.to_string(),
                page_name: route.page_name.to_string(),
                is_dynamic: route.is_dynamic,
                synced: page_id.is_some(),
                slug,
                page_id,
            }
        })
        .collect()
}

/// Nav items pointing at pages that no longer exist.
pub fn orphaned_items(items: &[NavItem], pages: &[Page]) -> Vec<OrphanedNavItem> {
    let existing: HashSet<PageId> = pages.iter().map(|p| p.id).collect();
    items
        .iter()
        .filter_map(|item| {
            let page_id = item.target.linked_page_id()?;
            (!existing.contains(&page_id)).then(|| OrphanedNavItem {
                id: item.id.as_string(),
                label: item.label.clone(),
                nav_group: item.nav_group.clone(),
                linked_page_id: page_id.as_string(),
            })
        })
        .collect()
}

pub fn status_report(
    routes: &[RouteDescriptor],
    pages: &[Page],
    items: &[NavItem],
) -> SyncStatusReport {
    let rows = route_rows(routes, pages);
    let synced_routes = rows.iter().filter(|r| r.synced).count();
    SyncStatusReport {
        total_routes: rows.len(),
        synced_routes,
        routes: rows,
        orphaned_nav_items: orphaned_items(items, pages),
        nav_items_total: items.len(),
        navigation_setup_pending: !pages.is_empty() && items.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_page::aggregate::PageDto;
    use contracts::domain::a002_nav_item::aggregate::NavTarget;

    const ROUTES: &[RouteDescriptor] = &[
        RouteDescriptor {
            path: "/",
            page_name: "Home",
            is_dynamic: false,
            source_file_path: "site/pages/index",
        },
        RouteDescriptor {
            path: "/about",
            page_name: "About",
            is_dynamic: false,
            source_file_path: "site/pages/about",
        },
    ];

    #[test]
    fn test_matching_is_by_slug() {
        let home = Page::new_for_route(&ROUTES[0]);
        let unrelated = Page::new_custom(&PageDto::new("About us", "about-us")).unwrap();
        let pages = vec![home.clone(), unrelated];

        let missing = unmatched_routes(ROUTES, &pages);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path, "/about");

        let rows = route_rows(ROUTES, &pages);
        assert_eq!(rows[0].page_id, Some(home.id.as_string()));
        assert!(rows[0].synced);
        assert!(!rows[1].synced);
    }

    #[test]
    fn test_custom_page_with_route_slug_counts_as_match() {
        let about = Page::new_custom(&PageDto::new("About", "about")).unwrap();
        assert_eq!(unmatched_routes(&ROUTES[1..], &[about]).len(), 0);
    }

    #[test]
    fn test_orphans_and_navigation_hint() {
        let home = Page::new_for_route(&ROUTES[0]);
        let gone = PageId::new_v4();
        let items = vec![
            NavItem::new_for_insert(
                "Home".into(),
                NavTarget::Page {
                    linked_page_id: home.id,
                },
                "header".into(),
                0,
                true,
            ),
            NavItem::new_for_insert(
                "Gone".into(),
                NavTarget::Page {
                    linked_page_id: gone,
                },
                "header".into(),
                1,
                true,
            ),
            NavItem::new_for_insert(
                "Docs".into(),
                NavTarget::External {
                    external_url: "https://docs.example.com".into(),
                },
                "footer".into(),
                0,
                true,
            ),
        ];

        let report = status_report(ROUTES, &[home.clone()], &items);
        assert_eq!(report.total_routes, 2);
        assert_eq!(report.synced_routes, 1);
        assert!(!report.is_fully_synced());
        assert_eq!(report.orphaned_nav_items.len(), 1);
        assert_eq!(report.orphaned_nav_items[0].linked_page_id, gone.as_string());
        assert!(!report.navigation_setup_pending);

        let bare = status_report(ROUTES, &[home], &[]);
        assert!(bare.navigation_setup_pending);
    }
}
