//! Slug rules shared by the contracts crate and its build script.
//!
//! Only `std` is used here: `build.rs` includes this file with `#[path]`
//! to reject route inventories whose paths collapse to one slug.

/// Slug of the page that backs the root path `/`
pub const HOME_SLUG: &str = "home";

/// Нормализация slug: trim, нижний регистр, пробелы -> дефис
pub fn normalize_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Map a route path to its page slug: `/` is `home`, otherwise the path
/// without surrounding slashes, normalized like any other slug.
pub fn route_slug(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        HOME_SLUG.to_string()
    } else {
        normalize_slug(trimmed)
    }
}

/// First pair of paths that map to the same slug, in declaration order.
pub fn find_slug_collision<'a, I>(paths: I) -> Option<(&'a str, &'a str)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashMap::new();
    for path in paths {
        if let Some(first) = seen.insert(route_slug(path), path) {
            return Some((first, path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_and_case_collide() {
        assert_eq!(
            find_slug_collision(["/", "/about", "/about/"]),
            Some(("/about", "/about/"))
        );
        assert_eq!(
            find_slug_collision(["/About", "/about"]),
            Some(("/About", "/about"))
        );
        assert_eq!(find_slug_collision(["/", "//"]), Some(("/", "//")));
    }

    #[test]
    fn test_distinct_slugs_pass() {
        assert_eq!(
            find_slug_collision(["/", "/about", "/classes", "/classes/:id"]),
            None
        );
    }
}
