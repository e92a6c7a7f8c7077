use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use include_dir::Dir;
use serde::Deserialize;
use tera::Tera;

use crate::error::{Error, Result};

/// Well-known template names.
pub mod templates {
    /// Listing page with hero, carousel, skills and experience (required)
    pub const INDEX: &str = "index.html";
    /// Project detail pages (optional)
    pub const PROJECT: &str = "project.html";
    /// Unknown project / missing page (optional)
    pub const NOT_FOUND: &str = "not_found.html";
}

/// Source of static assets for a layout.
#[derive(Debug)]
pub enum StaticSource {
    /// Static files in a local directory
    Directory(PathBuf),
    /// Static files embedded at compile time
    Builtin(&'static Dir<'static>),
    /// No static files
    None,
}

/// A loaded layout with templates, static assets, and configuration defaults.
#[derive(Debug)]
pub struct Layout {
    /// Tera template engine with all templates loaded
    pub templates: Tera,

    pub static_source: StaticSource,

    pub has_project_template: bool,

    pub has_not_found_template: bool,

    /// Defaults from layout.toml, overridden by `[layout]` settings in site.toml
    pub defaults: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
struct LayoutToml {
    #[serde(default)]
    defaults: BTreeMap<String, toml::Value>,
}

fn parse_defaults(content: &str) -> Result<BTreeMap<String, toml::Value>> {
    let parsed: LayoutToml = toml::from_str(content)?;

    tracing::debug!(
        keys = ?parsed.defaults.keys().collect::<Vec<_>>(),
        "loaded layout defaults"
    );

    Ok(parsed.defaults)
}

impl Layout {
    /// Load a layout from the given directory.
    ///
    /// The directory must contain a `templates/` subdirectory with at least
    /// an `index.html` template.
    pub fn load(layout_dir: &Path) -> Result<Self> {
        let templates_dir = layout_dir.join("templates");
        let static_dir = layout_dir.join("static");

        let glob_pattern = format!("{}/**/*.html", templates_dir.display());
        let templates = Tera::new(&glob_pattern)?;

        let static_source = if static_dir.is_dir() {
            StaticSource::Directory(static_dir)
        } else {
            StaticSource::None
        };

        let layout_toml = layout_dir.join("layout.toml");
        let defaults = if layout_toml.exists() {
            parse_defaults(&std::fs::read_to_string(&layout_toml)?)?
        } else {
            BTreeMap::new()
        };

        Self::assemble(templates, static_source, defaults)
    }

    /// Load a layout from an embedded directory with the same structure as
    /// a local one.
    pub fn from_builtin(dir: &'static Dir<'static>) -> Result<Self> {
        let mut templates = Tera::default();

        let templates_dir = dir.get_dir("templates").ok_or(Error::MissingIndexTemplate)?;

        let sources: Vec<(&str, &str)> = templates_dir
            .files()
            .filter_map(|file| {
                let name = file.path().file_name()?.to_str()?;
                if name.starts_with('.') || !name.ends_with(".html") {
                    return None;
                }
                Some((name, file.contents_utf8()?))
            })
            .collect();

        // Added together so `{% extends %}` resolves regardless of file order
        templates.add_raw_templates(sources)?;

        let static_source = dir
            .get_dir("static")
            .map(StaticSource::Builtin)
            .unwrap_or(StaticSource::None);

        let defaults = match dir.get_file("layout.toml").and_then(|f| f.contents_utf8()) {
            Some(content) => parse_defaults(content)?,
            None => BTreeMap::new(),
        };

        Self::assemble(templates, static_source, defaults)
    }

    fn assemble(
        mut templates: Tera,
        static_source: StaticSource,
        defaults: BTreeMap<String, toml::Value>,
    ) -> Result<Self> {
        let has = |wanted: &str| templates.get_template_names().any(|n| n == wanted);

        if !has(templates::INDEX) {
            return Err(Error::MissingIndexTemplate);
        }

        let has_project_template = has(templates::PROJECT);
        let has_not_found_template = has(templates::NOT_FOUND);

        templates.set_escape_fn(escape_markup);

        tracing::info!(
            has_project = has_project_template,
            has_not_found = has_not_found_template,
            has_static = !matches!(static_source, StaticSource::None),
            defaults = defaults.len(),
            "layout loaded"
        );

        Ok(Self {
            templates,
            static_source,
            has_project_template,
            has_not_found_template,
            defaults,
        })
    }

    /// Layout defaults with user settings layered on top.
    pub fn settings(
        &self,
        overrides: &std::collections::HashMap<String, toml::Value>,
    ) -> BTreeMap<String, toml::Value> {
        let mut merged = self.defaults.clone();
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

/// Escape portfolio text for HTML bodies and quoted attributes.
///
/// Unlike Tera's default this leaves `/` alone so URLs stay readable.
fn escape_markup(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn create_temp_layout(templates: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("templates");
        fs::create_dir(&templates_dir).unwrap();

        for (name, content) in templates {
            fs::write(templates_dir.join(name), content).unwrap();
        }

        dir
    }

    #[test]
    fn load_minimal_layout() {
        let dir = create_temp_layout(&[("index.html", "<html></html>")]);

        let layout = Layout::load(dir.path()).unwrap();

        assert!(!layout.has_project_template);
        assert!(!layout.has_not_found_template);
        assert!(matches!(layout.static_source, StaticSource::None));
        assert!(layout.defaults.is_empty());
    }

    #[test]
    fn load_full_layout() {
        let dir = create_temp_layout(&[
            ("index.html", "<html></html>"),
            ("project.html", "<html></html>"),
            ("not_found.html", "<html></html>"),
        ]);
        fs::create_dir(dir.path().join("static")).unwrap();

        let layout = Layout::load(dir.path()).unwrap();

        assert!(layout.has_project_template);
        assert!(layout.has_not_found_template);
        assert!(matches!(layout.static_source, StaticSource::Directory(_)));
    }

    #[test]
    fn settings_override_defaults() {
        let dir = create_temp_layout(&[("index.html", "<html></html>")]);
        fs::write(
            dir.path().join("layout.toml"),
            r##"
                [defaults]
                accent = "#0f172a"
                show_contact_card = true
            "##,
        )
        .unwrap();

        let layout = Layout::load(dir.path()).unwrap();
        let overrides = HashMap::from([(
            "accent".to_string(),
            toml::Value::String("#2563eb".to_string()),
        )]);
        let settings = layout.settings(&overrides);

        assert_eq!(
            settings.get("accent"),
            Some(&toml::Value::String("#2563eb".to_string()))
        );
        assert_eq!(
            settings.get("show_contact_card"),
            Some(&toml::Value::Boolean(true))
        );
    }

    #[test]
    fn missing_index_fails() {
        let dir = create_temp_layout(&[("project.html", "<html></html>")]);

        let result = Layout::load(dir.path());

        assert!(matches!(result, Err(Error::MissingIndexTemplate)));
    }

    #[test]
    fn escapes_markup_but_not_slashes() {
        assert_eq!(
            escape_markup(r#"<a href="/x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;/x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
    }

    #[test]
    fn rendering_escapes_data() {
        let dir = create_temp_layout(&[("index.html", "<p title=\"{{ v }}\">{{ v }}</p>")]);
        let layout = Layout::load(dir.path()).unwrap();

        let mut context = tera::Context::new();
        context.insert("v", "a/b <i>\"c\"</i>");
        let html = layout.templates.render(templates::INDEX, &context).unwrap();

        assert_eq!(
            html,
            "<p title=\"a/b &lt;i&gt;&quot;c&quot;&lt;/i&gt;\">a/b &lt;i&gt;&quot;c&quot;&lt;/i&gt;</p>"
        );
    }

    #[test]
    fn builtin_classic_layout_loads() {
        let dir = crate::builtin_layouts::get("classic").unwrap();
        let layout = Layout::from_builtin(dir).unwrap();

        assert!(layout.has_project_template);
        assert!(layout.has_not_found_template);
        assert!(matches!(layout.static_source, StaticSource::Builtin(_)));
    }
}
