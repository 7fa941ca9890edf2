//! Build script for generating the compiled route inventory from site_routes.json
//!
//! The site's navigable paths are declared once in `site_routes.json`; this script
//! validates them and emits `site_routes_gen.rs` into OUT_DIR with a static slice
//! of `RouteDescriptor` constants.

use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

#[path = "src/shared/slug_rules.rs"]
mod slug_rules;

fn main() {
    println!("cargo:rerun-if-changed=site_routes.json");
    println!("cargo:rerun-if-changed=src/shared/slug_rules.rs");

    let routes_json = Path::new("site_routes.json");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is not set");
    let output_rs = Path::new(&out_dir).join("site_routes_gen.rs");

    let routes = if routes_json.exists() {
        match load_routes(routes_json) {
            Ok(routes) => routes,
            Err(e) => panic!("Failed to load site_routes.json: {}", e),
        }
    } else {
        println!("cargo:warning=site_routes.json not found, generating empty route inventory");
        Vec::new()
    };

    if let Err(e) = validate_routes(&routes) {
        panic!("Invalid route inventory: {}", e);
    }

    fs::write(&output_rs, generate_rust_code(&routes))
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", output_rs.display(), e));
}

// ============================================================================
// JSON Schema Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct RouteJson {
    path: String,
    page_name: String,
    #[serde(default)]
    is_dynamic: bool,
    #[serde(default)]
    source_file_path: String,
}

fn load_routes(json_path: &Path) -> Result<Vec<RouteJson>, Box<dyn std::error::Error>> {
    let json_content = fs::read_to_string(json_path)?;
    let routes: Vec<RouteJson> = serde_json::from_str(&json_content)?;
    Ok(routes)
}

fn validate_routes(routes: &[RouteJson]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for route in routes {
        if !route.path.starts_with('/') {
            return Err(format!("route path must start with '/': {}", route.path));
        }
        if route.page_name.trim().is_empty() {
            return Err(format!("route {} has an empty page_name", route.path));
        }
        if !seen.insert(route.path.as_str()) {
            return Err(format!("duplicate route path: {}", route.path));
        }
    }
    if let Some((first, second)) =
        slug_rules::find_slug_collision(routes.iter().map(|r| r.path.as_str()))
    {
        return Err(format!(
            "route paths {} and {} map to the same page slug",
            first, second
        ));
    }
    Ok(())
}

// ============================================================================
// Code Generation
// ============================================================================

fn generate_rust_code(routes: &[RouteJson]) -> String {
    let mut code = String::from(
        "// ============================================================================\n\
         // AUTO-GENERATED FROM site_routes.json - DO NOT EDIT MANUALLY\n\
         // ============================================================================\n\n\
         /// Compiled route inventory\n\
         pub static SITE_ROUTES: &[RouteDescriptor] = &[\n",
    );

    for route in routes {
        code.push_str(&format!(
            "    RouteDescriptor {{\n\
             \x20       path: \"{}\",\n\
             \x20       page_name: \"{}\",\n\
             \x20       is_dynamic: {},\n\
             \x20       source_file_path: \"{}\",\n\
             \x20   }},\n",
            escape_string(&route.path),
            escape_string(&route.page_name),
            route.is_dynamic,
            escape_string(&route.source_file_path),
        ));
    }

    code.push_str("];\n");
    code
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
