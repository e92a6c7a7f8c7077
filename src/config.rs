use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::carousel;
use crate::error::Result;

/// Layout configuration supporting both simple and extended formats.
///
/// Simple format:
/// ```toml
/// layout = "classic"
/// ```
///
/// Extended format with settings:
/// ```toml
/// [layout]
/// name = "classic"
/// accent = "#2563eb"
/// show_contact_card = false
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayoutConfig {
    /// Simple string format: `layout = "classic"`
    Name(String),
    /// Table format with name and optional settings
    Table(LayoutTableConfig),
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig::Name("classic".to_string())
    }
}

impl std::fmt::Display for LayoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl LayoutConfig {
    pub fn name(&self) -> &str {
        match self {
            LayoutConfig::Name(name) => name,
            LayoutConfig::Table(table) => &table.name,
        }
    }

    /// Returns user-provided settings (empty for simple string format).
    pub fn settings(&self) -> &HashMap<String, toml::Value> {
        match self {
            LayoutConfig::Name(_) => {
                static EMPTY: std::sync::LazyLock<HashMap<String, toml::Value>> =
                    std::sync::LazyLock::new(HashMap::new);
                &EMPTY
            }
            LayoutConfig::Table(table) => &table.settings,
        }
    }
}

/// Table-based layout configuration with name and arbitrary settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutTableConfig {
    pub name: String,
    #[serde(flatten)]
    pub settings: HashMap<String, toml::Value>,
}

/// Carousel tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct CarouselConfig {
    /// Horizontal drag distance that switches slides
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: default_swipe_threshold(),
        }
    }
}

/// Site configuration loaded from site.toml
#[derive(Debug, Deserialize)]
pub struct Site {
    /// The domain where this site will be hosted
    pub domain: String,

    /// Page title (defaults to the profile name)
    pub title: Option<String>,

    /// Layout configuration (defaults to "classic").
    ///
    /// Resolution order (handled by Pipeline::load):
    /// 1. Local directory with this name → use local
    /// 2. Built-in layout with this name → use embedded
    /// 3. Error
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Portfolio data file (relative to site root)
    #[serde(default = "default_data")]
    pub data: PathBuf,

    /// Files copied verbatim into the output (relative to site root)
    #[serde(default = "default_public")]
    pub public: PathBuf,

    /// Directory for build output (relative to site root)
    #[serde(default = "default_build")]
    pub build: PathBuf,

    /// Whether to minify HTML, CSS, and JS output (defaults to true)
    #[serde(default = "default_minify")]
    pub minify: bool,

    /// UI language code
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub carousel: CarouselConfig,
}

impl Site {
    /// Read and parse a site.toml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

fn default_data() -> PathBuf {
    PathBuf::from("portfolio.toml")
}

fn default_public() -> PathBuf {
    PathBuf::from("public")
}

fn default_build() -> PathBuf {
    PathBuf::from("dist")
}

fn default_minify() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_swipe_threshold() -> f64 {
    carousel::SWIPE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config() {
        let toml = r#"domain = "jscott.example.com""#;
        let site: Site = toml::from_str(toml).unwrap();

        assert_eq!(site.domain, "jscott.example.com");
        assert_eq!(site.title, None);
        assert_eq!(site.layout.name(), "classic");
        assert!(site.layout.settings().is_empty());
        assert_eq!(site.data, PathBuf::from("portfolio.toml"));
        assert_eq!(site.public, PathBuf::from("public"));
        assert_eq!(site.build, PathBuf::from("dist"));
        assert!(site.minify);
        assert_eq!(site.language, "en");
        assert_eq!(site.carousel.swipe_threshold, 60.0);
    }

    #[test]
    fn full_config() {
        let toml = r#"
            domain = "jscott.example.com"
            title = "JScott"
            layout = "layouts/mine"
            data = "content/me.toml"
            public = "assets"
            build = "output"
            minify = false
            language = "es"

            [carousel]
            swipe_threshold = 45.0
        "#;
        let site: Site = toml::from_str(toml).unwrap();

        assert_eq!(site.title.as_deref(), Some("JScott"));
        assert_eq!(site.layout.name(), "layouts/mine");
        assert_eq!(site.data, PathBuf::from("content/me.toml"));
        assert_eq!(site.public, PathBuf::from("assets"));
        assert_eq!(site.build, PathBuf::from("output"));
        assert!(!site.minify);
        assert_eq!(site.language, "es");
        assert_eq!(site.carousel.swipe_threshold, 45.0);
    }

    #[test]
    fn missing_domain_fails() {
        let toml = r#"layout = "classic""#;
        let result: std::result::Result<Site, _> = toml::from_str(toml);

        assert!(result.is_err());
    }

    #[test]
    fn layout_table_format() {
        let toml = r##"
            domain = "example.com"

            [layout]
            name = "classic"
            accent = "#2563eb"
            show_contact_card = false
        "##;
        let site: Site = toml::from_str(toml).unwrap();

        assert_eq!(site.layout.name(), "classic");
        assert_eq!(
            site.layout.settings().get("accent"),
            Some(&toml::Value::String("#2563eb".to_string()))
        );
        assert_eq!(
            site.layout.settings().get("show_contact_card"),
            Some(&toml::Value::Boolean(false))
        );
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "domain = \"example.com\"\nlanguage = \"es\"\n").unwrap();

        let site = Site::load(&path).unwrap();
        assert_eq!(site.language, "es");
    }
}
