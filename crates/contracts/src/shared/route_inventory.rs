//! Compiled route inventory of the public site.
//!
//! The list is generated at build time from `site_routes.json` (see `build.rs`)
//! and never changes at runtime.

use serde::Serialize;

use crate::domain::a001_page::aggregate::PageType;

pub use crate::shared::slug_rules::{route_slug, HOME_SLUG};

/// One navigable application path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub page_name: &'static str,
    pub is_dynamic: bool,
    /// Provenance of the route declaration, informational only.
    pub source_file_path: &'static str,
}

impl RouteDescriptor {
    /// Slug a registry page must carry to count as synced with this route.
    pub fn slug(&self) -> String {
        route_slug(self.path)
    }

    /// Type of the page created for this route by the sync.
    pub fn page_type(&self) -> PageType {
        if self.is_dynamic {
            PageType::Dynamic
        } else {
            PageType::System
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/site_routes_gen.rs"));

/// All routes of the current build.
pub fn list_routes() -> &'static [RouteDescriptor] {
    SITE_ROUTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_root_path_maps_to_home() {
        assert_eq!(route_slug("/"), "home");
        assert_eq!(route_slug(""), "home");
    }

    #[test]
    fn test_leading_slash_is_stripped() {
        assert_eq!(route_slug("/about"), "about");
        assert_eq!(route_slug("/classes/:id"), "classes/:id");
        assert_eq!(route_slug("/Membership/"), "membership");
    }

    #[test]
    fn test_compiled_inventory_has_unique_slugs() {
        let routes = list_routes();
        let slugs: HashSet<_> = routes.iter().map(|r| r.slug()).collect();
        assert_eq!(slugs.len(), routes.len());
        assert!(routes.iter().all(|r| r.path.starts_with('/')));
    }

    #[test]
    fn test_compiled_inventory_contains_home() {
        let home = list_routes().iter().find(|r| r.path == "/");
        assert!(home.is_some());
        assert_eq!(home.map(|r| r.page_type()), Some(PageType::System));
    }

    #[test]
    fn test_dynamic_routes_become_dynamic_pages() {
        let route = RouteDescriptor {
            path: "/blog/:slug",
            page_name: "Blog Post",
            is_dynamic: true,
            source_file_path: "site/pages/blog/[slug]",
        };
        assert_eq!(route.page_type(), PageType::Dynamic);
        assert_eq!(route.slug(), "blog/:slug");
    }
}
