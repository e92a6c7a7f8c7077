//! Request path routing for the development server.
//!
//! Two page routes exist: `/` and `/project/:slug`. Anything else is looked
//! up as a file in the output directory.

use std::path::{Component, Path, PathBuf};

use crate::util::url_decode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The listing page
    Home,
    /// A project detail page; the slug is matched case-sensitively
    Project(String),
    /// A file relative to the output directory
    Asset(PathBuf),
    /// Path that can never be served (traversal, malformed project route)
    Invalid,
}

impl Route {
    /// Parse a raw request target such as `/project/campa%C3%B1a/?ref=x`.
    pub fn parse(target: &str) -> Self {
        let path = target
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');

        if path.is_empty() || path == "index.html" {
            return Route::Home;
        }

        if let Some(rest) = path.strip_prefix("project/") {
            let rest = rest
                .strip_suffix("/index.html")
                .unwrap_or(rest)
                .trim_end_matches('/');

            let slug = url_decode(rest);
            if slug.is_empty() || slug.contains('/') || slug == "." || slug == ".." {
                return Route::Invalid;
            }
            return Route::Project(slug);
        }

        let decoded = url_decode(path);
        let relative = Path::new(&decoded);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Route::Invalid;
        }

        Route::Asset(relative.to_path_buf())
    }
}

/// Output file backing a route, if it maps to one.
pub fn file_for(route: &Route, output_dir: &Path) -> Option<PathBuf> {
    match route {
        Route::Home => Some(output_dir.join("index.html")),
        Route::Project(slug) => Some(output_dir.join("project").join(slug).join("index.html")),
        Route::Asset(relative) => {
            let path = output_dir.join(relative);
            if path.is_dir() {
                Some(path.join("index.html"))
            } else {
                Some(path)
            }
        }
        Route::Invalid => None,
    }
}

pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") | Some("map") => "application/json; charset=utf-8",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        _ => "application/octet-stream",
    }
}
