//! Built-in layouts shipped with the binary.

use include_dir::{Dir, include_dir};

/// The "classic" built-in layout: single page with hero, carousel, skills and
/// experience, plus project detail and not-found pages.
static CLASSIC: Dir = include_dir!("$CARGO_MANIFEST_DIR/layouts/classic");

/// Look up a built-in layout by name.
pub fn get(name: &str) -> Option<&'static Dir<'static>> {
    match name {
        "classic" => Some(&CLASSIC),
        _ => None,
    }
}

/// Names of every built-in layout.
pub fn names() -> &'static [&'static str] {
    &["classic"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_resolves() {
        for name in names() {
            assert!(get(name).is_some(), "{name} should be embedded");
        }
        assert!(get("fancy").is_none());
    }
}
