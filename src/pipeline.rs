use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;
use tera::{Context, Function, Value};

use crate::appearance::{self, FileStore, ThemeController, ThemePreference};
use crate::assets::{self, ImageManifest};
use crate::builtin_layouts;
use crate::carousel::{Carousel, Step};
use crate::config::Site;
use crate::error::{Error, Result};
use crate::i18n;
use crate::layout::{Layout, StaticSource, templates};
use crate::minify;
use crate::portfolio::{Portfolio, Profile, Project};

/// Mapping from original asset path to hashed output path.
/// e.g., "style.css" -> "/static/style-abc12345.css"
pub type AssetManifest = HashMap<String, String>;

/// Version injected at build time.
const VERSION: &str = env!("GIT_VERSION");

/// Name of the not-found page in the output directory.
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Site context passed to all templates.
#[derive(Debug, Clone, Serialize)]
struct SiteContext {
    domain: String,
    title: String,
    version: &'static str,
    language: String,
    year: i32,
}

/// Theme state baked into every page; the page script takes over at runtime.
#[derive(Debug, Clone, Serialize)]
struct AppearanceContext {
    preference: ThemePreference,
    root_class: String,
    storage_key: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct CarouselContext {
    /// Pre-formatted so whole numbers render without a trailing ".0"
    swipe_threshold: String,
    key_next: &'static str,
    key_prev: &'static str,
}

/// Profile with derived links.
#[derive(Debug, Serialize)]
struct ProfileContext<'a> {
    #[serde(flatten)]
    profile: &'a Profile,
    whatsapp_url: Option<String>,
}

/// Image reference with its card variant when one was generated.
#[derive(Debug, Clone, Serialize)]
struct ImageView {
    src: String,
    card: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Project with pre-computed paths for templates.
#[derive(Debug, Serialize)]
struct ProjectView<'a> {
    #[serde(flatten)]
    project: &'a Project,
    url: String,
    external_href: Option<&'a str>,
    cover: Option<ImageView>,
    gallery: Vec<ImageView>,
}

/// The pipeline combines configuration, layout, and portfolio data to build a site.
#[derive(Debug)]
pub struct Pipeline {
    pub config: Site,

    pub layout: Layout,

    pub portfolio: Portfolio,

    /// Site directory (where site.toml lives)
    pub site_dir: PathBuf,

    /// Theme applied to the root of every rendered page
    pub appearance: ThemePreference,

    /// `class` attribute of `<html>` for the resolved theme
    root_class: String,
}

impl Pipeline {
    /// Load all components for site generation.
    pub fn load(site_dir: PathBuf, config: Site) -> Result<Self> {
        let layout_name = config.layout.name();
        let local_layout_path = site_dir.join(layout_name);

        // Try local directory first, then built-in layouts
        let layout = if local_layout_path.is_dir() {
            tracing::debug!(layout = %local_layout_path.display(), "loading local layout");
            Layout::load(&local_layout_path)?
        } else if let Some(builtin) = builtin_layouts::get(layout_name) {
            tracing::debug!(layout = %layout_name, "loading built-in layout");
            Layout::from_builtin(builtin)?
        } else {
            tracing::error!(
                layout = %layout_name,
                builtin = ?builtin_layouts::names(),
                "unknown layout"
            );
            return Err(Error::LayoutNotFound {
                name: layout_name.to_string(),
            });
        };

        let data_path = site_dir.join(&config.data);
        tracing::debug!(data = %data_path.display(), "loading portfolio");
        let portfolio = Portfolio::load(&data_path)?;

        let store = FileStore::open(FileStore::in_site(&site_dir));
        let theme = ThemeController::init(store, appearance::system_preference());
        let appearance = theme.preference();
        let root_class = theme.root().class_attr();

        tracing::info!(
            projects = portfolio.projects.len(),
            skills = portfolio.skills.len(),
            experience = portfolio.experience.len(),
            theme = %appearance,
            "pipeline loaded"
        );

        Ok(Self {
            config,
            layout,
            portfolio,
            site_dir,
            appearance,
            root_class,
        })
    }

    pub fn output_dir(&self) -> PathBuf {
        self.site_dir.join(&self.config.build)
    }

    /// Build the site to the output directory.
    pub fn build(&mut self) -> Result<()> {
        let output_dir = self.output_dir();
        let public_dir = self.site_dir.join(&self.config.public);

        tracing::info!(output = %output_dir.display(), "building site");

        // Track all files we generate for cleanup of stale files
        let mut expected: HashSet<PathBuf> = HashSet::new();

        // Don't wipe the output directory: image variants are cached there
        fs::create_dir_all(&output_dir)?;

        let copied = assets::copy_public(&public_dir, &output_dir, &mut expected)?;
        tracing::info!(copied, "public files mirrored");

        let images_dir = output_dir.join("images");
        let (images, stats) = assets::process_project_images(
            &self.portfolio,
            &public_dir,
            &images_dir,
            &mut expected,
        )?;
        tracing::info!(
            total = stats.total,
            cached = stats.cached,
            generated = stats.generated,
            external = stats.external,
            "project images processed"
        );

        let asset_manifest = self.copy_static(&output_dir, &mut expected)?;
        self.layout
            .templates
            .register_function("static", make_static_function(asset_manifest));

        let base = self.base_context();

        self.render_index(&base, &images, &output_dir, &mut expected)?;

        if self.layout.has_project_template {
            self.render_projects(&base, &images, &output_dir, &mut expected)?;
        }

        if self.layout.has_not_found_template {
            self.render_not_found(&base, &output_dir, &mut expected)?;
        }

        let removed = cleanup_stale_files(&output_dir, &expected)?;
        if removed > 0 {
            tracing::info!(removed, "cleaned up stale files");
        }

        Ok(())
    }

    /// Copy static assets from the layout to output, returning the asset manifest.
    fn copy_static(
        &self,
        output_dir: &Path,
        expected: &mut HashSet<PathBuf>,
    ) -> Result<AssetManifest> {
        let dest = output_dir.join("static");
        let should_minify = self.config.minify;
        let mut manifest = AssetManifest::new();

        match &self.layout.static_source {
            StaticSource::Directory(dir) => {
                copy_dir_with_hashing(dir, &dest, "", expected, should_minify, &mut manifest)?;
                tracing::debug!(
                    from = %dir.display(),
                    to = %dest.display(),
                    minify = should_minify,
                    assets = manifest.len(),
                    "copied static assets"
                );
            }
            StaticSource::Builtin(embedded_dir) => {
                fs::create_dir_all(&dest)?;
                for file in embedded_dir.files() {
                    let Some(name) = file.path().file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    if name.starts_with('.') {
                        continue;
                    }

                    let contents = minify::asset(name, file.contents(), should_minify)?;
                    let hashed_name = hash_filename(name, &contents);
                    let file_path = dest.join(&hashed_name);

                    fs::write(&file_path, contents)?;
                    expected.insert(file_path);
                    manifest.insert(name.to_string(), format!("/static/{}", hashed_name));
                }
                tracing::debug!(
                    to = %dest.display(),
                    minify = should_minify,
                    assets = manifest.len(),
                    "copied embedded static assets"
                );
            }
            StaticSource::None => {}
        }

        Ok(manifest)
    }

    /// Context shared by every page.
    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteContext {
                domain: self.config.domain.clone(),
                title: self
                    .config
                    .title
                    .clone()
                    .unwrap_or_else(|| self.portfolio.profile.name.clone()),
                version: VERSION,
                language: self.config.language.clone(),
                year: chrono::Local::now().year(),
            },
        );
        context.insert("t", &i18n::translations(&self.config.language));
        context.insert(
            "settings",
            &self.layout.settings(self.config.layout.settings()),
        );
        context.insert(
            "appearance",
            &AppearanceContext {
                preference: self.appearance,
                root_class: self.root_class.clone(),
                storage_key: appearance::STORAGE_KEY,
            },
        );
        context.insert(
            "carousel",
            &CarouselContext {
                swipe_threshold: self.config.carousel.swipe_threshold.to_string(),
                key_next: Step::Next.key().dom_name(),
                key_prev: Step::Prev.key().dom_name(),
            },
        );
        context.insert(
            "profile",
            &ProfileContext {
                profile: &self.portfolio.profile,
                whatsapp_url: self.portfolio.profile.whatsapp_url(),
            },
        );
        context.insert("skills", &self.portfolio.skills);
        context.insert("experience", &self.portfolio.experience);

        context
    }

    fn project_view<'a>(&self, project: &'a Project, images: &ImageManifest) -> ProjectView<'a> {
        let gallery: Vec<ImageView> = project
            .images
            .iter()
            .map(|src| image_view(src, images))
            .collect();

        ProjectView {
            project,
            url: project.page_path(),
            external_href: project.external_href(),
            cover: project.cover().map(|src| image_view(src, images)),
            gallery,
        }
    }

    fn render_index(
        &self,
        base: &Context,
        images: &ImageManifest,
        output_dir: &Path,
        expected: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let carousel = Carousel::with_threshold(
            self.portfolio.projects.len(),
            self.config.carousel.swipe_threshold,
        )
        .ok_or_else(|| Error::NoProjects {
            path: self.config.data.clone(),
        })?;

        let projects: Vec<_> = self
            .portfolio
            .projects
            .iter()
            .map(|p| self.project_view(p, images))
            .collect();

        let mut context = base.clone();
        context.insert("projects", &projects);
        context.insert("slides", &carousel.slides());

        let dest = output_dir.join("index.html");
        self.render_page(templates::INDEX, &context, &dest, expected)?;

        tracing::debug!(path = %dest.display(), slides = carousel.count(), "rendered index");

        Ok(())
    }

    /// Render one page per reachable slug, linked to its carousel neighbours.
    fn render_projects(
        &self,
        base: &Context,
        images: &ImageManifest,
        output_dir: &Path,
        expected: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let projects = &self.portfolio.projects;
        let Some(mut carousel) = Carousel::new(projects.len()) else {
            return Ok(());
        };

        for (i, project) in projects.iter().enumerate() {
            if !is_single_segment(&project.slug) {
                tracing::warn!(slug = %project.slug, "slug is not a single path segment, skipping page");
                continue;
            }

            // Only the first project with a slug is reachable through lookup
            if !self
                .portfolio
                .lookup(&project.slug)
                .project()
                .is_some_and(|found| std::ptr::eq(found, project))
            {
                continue;
            }

            carousel.jump_to(i);
            let prev = &projects[carousel.prev()];
            carousel.jump_to(i);
            let next = &projects[carousel.next()];

            let mut context = base.clone();
            context.insert("project", &self.project_view(project, images));
            context.insert("position", &(i + 1));
            context.insert("total", &projects.len());
            if projects.len() > 1 {
                context.insert("prev_project", &self.project_view(prev, images));
                context.insert("next_project", &self.project_view(next, images));
            }

            let dest = output_dir
                .join("project")
                .join(&project.slug)
                .join("index.html");
            self.render_page(templates::PROJECT, &context, &dest, expected)?;

            tracing::trace!(slug = %project.slug, path = %dest.display(), "rendered project");
        }

        tracing::debug!(projects = projects.len(), "rendered project pages");

        Ok(())
    }

    fn render_not_found(
        &self,
        base: &Context,
        output_dir: &Path,
        expected: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let dest = output_dir.join(NOT_FOUND_PAGE);
        self.render_page(templates::NOT_FOUND, base, &dest, expected)?;
        tracing::debug!(path = %dest.display(), "rendered not-found page");
        Ok(())
    }

    fn render_page(
        &self,
        template: &str,
        context: &Context,
        dest: &Path,
        expected: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let mut html = self.layout.templates.render(template, context)?;
        if self.config.minify {
            html = minify::html(&html)?;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, html)?;
        expected.insert(dest.to_path_buf());

        Ok(())
    }
}

fn image_view(src: &str, images: &ImageManifest) -> ImageView {
    match images.get(src) {
        Some(variant) => ImageView {
            src: variant.src.clone(),
            card: variant.card.clone(),
            width: Some(variant.width),
            height: Some(variant.height),
        },
        None => ImageView {
            src: src.to_string(),
            card: src.to_string(),
            width: None,
            height: None,
        },
    }
}

/// Whether `slug` can be used as exactly one directory name.
fn is_single_segment(slug: &str) -> bool {
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Remove files from output directory that aren't in the expected set.
fn cleanup_stale_files(output_dir: &Path, expected: &HashSet<PathBuf>) -> Result<usize> {
    let mut removed = 0;
    cleanup_recursive(output_dir, expected, &mut removed)?;
    Ok(removed)
}

fn cleanup_recursive(dir: &Path, expected: &HashSet<PathBuf>, removed: &mut usize) -> Result<()> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<std::result::Result<_, _>>()?;

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            cleanup_recursive(&path, expected, removed)?;

            if fs::read_dir(&path)?.next().is_none() {
                fs::remove_dir(&path)?;
                tracing::debug!(path = %path.display(), "removed empty directory");
            }
        } else if !expected.contains(&path) {
            fs::remove_file(&path)?;
            tracing::debug!(path = %path.display(), "removed stale file");
            *removed += 1;
        }
    }

    Ok(())
}

/// Recursively copy a directory with content-hashed filenames.
fn copy_dir_with_hashing(
    src: &Path,
    dest: &Path,
    relative_path: &str,
    expected: &mut HashSet<PathBuf>,
    should_minify: bool,
    manifest: &mut AssetManifest,
) -> Result<()> {
    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        if name.starts_with('.') {
            continue;
        }

        let entry_relative = if relative_path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", relative_path, name)
        };

        if src_path.is_dir() {
            copy_dir_with_hashing(
                &src_path,
                &dest.join(name),
                &entry_relative,
                expected,
                should_minify,
                manifest,
            )?;
        } else {
            let contents = fs::read(&src_path)?;
            let output = minify::asset(name, &contents, should_minify)?;
            let hashed_name = hash_filename(name, &output);
            let dest_path = dest.join(&hashed_name);

            fs::write(&dest_path, output)?;
            expected.insert(dest_path);

            let hashed_relative = if relative_path.is_empty() {
                format!("/static/{}", hashed_name)
            } else {
                format!("/static/{}/{}", relative_path, hashed_name)
            };
            manifest.insert(entry_relative, hashed_relative);
        }
    }

    Ok(())
}

/// Generate a hashed filename: stem-hash.ext
fn hash_filename(name: &str, contents: &[u8]) -> String {
    let hash = blake3::hash(contents);
    let hash_hex = &hash.to_hex()[..8];

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, hash_hex, ext),
        _ => format!("{}-{}", name, hash_hex),
    }
}

/// Create the Tera `static` function that resolves asset paths.
fn make_static_function(manifest: AssetManifest) -> impl Function {
    let manifest = Arc::new(manifest);

    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let path = args
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| tera::Error::msg("static() requires a 'path' argument"))?;

        match manifest.get(path) {
            Some(hashed_path) => Ok(Value::String(hashed_path.clone())),
            None => Err(tera::Error::msg(format!(
                "static asset not found: '{}'. Available: {:?}",
                path,
                manifest.keys().collect::<BTreeSet<_>>()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PORTFOLIO: &str = r#"
        skills = ["Branding"]

        [profile]
        name = "José Enrique Scott"
        phone = "+507 6006-2740"
        location = "Panamá"

        [[experience]]
        title = "Diseñador Gráfico"
        company = "IDAAN"

        [[projects]]
        title = "Campaña institucional (IDAAN)"
        tags = ["Branding"]
        note = "Antes/Después"
        images = ["/screenshots/one.png", "https://cdn.example.com/two.jpg"]

        [[projects]]
        title = "Identidad & marca"
        slug = "identidad"
        href = "https://behance.net/x"

        [[projects]]
        title = "Catálogo"
    "#;

    fn create_site(config: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("site.toml"), config).unwrap();
        fs::write(dir.path().join("portfolio.toml"), PORTFOLIO).unwrap();

        let shots = dir.path().join("public/screenshots");
        fs::create_dir_all(&shots).unwrap();
        image::RgbImage::from_pixel(8, 6, image::Rgb([10, 20, 30]))
            .save_with_format(shots.join("one.png"), image::ImageFormat::Png)
            .unwrap();
        fs::write(dir.path().join("public/cv.pdf"), b"%PDF-1.4").unwrap();

        dir
    }

    fn build_site(dir: &Path) -> Pipeline {
        let site = Site::load(&dir.join("site.toml")).unwrap();
        let mut pipeline = Pipeline::load(dir.to_path_buf(), site).unwrap();
        pipeline.build().unwrap();
        pipeline
    }

    #[test]
    fn builds_every_page_with_builtin_layout() {
        let dir = create_site("domain = \"example.com\"\nminify = false\n");
        build_site(dir.path());

        let dist = dir.path().join("dist");
        assert!(dist.join("index.html").is_file());
        assert!(dist.join("project/campana-institucional-idaan/index.html").is_file());
        assert!(dist.join("project/identidad/index.html").is_file());
        assert!(dist.join("project/catalogo/index.html").is_file());
        assert!(dist.join(NOT_FOUND_PAGE).is_file());
        assert!(dist.join("cv.pdf").is_file());
        assert!(dist.join("screenshots/one.png").is_file());

        let index = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(index.contains("José Enrique Scott"));
        assert!(index.contains("https://wa.me/50760062740"));
        assert!(index.contains("data-swipe-threshold=\"60\""));
        assert!(index.contains("/images/screenshots/one-"));
        // Autoescaping applies to data from portfolio.toml
        assert!(index.contains("Identidad &amp; marca"));
    }

    #[test]
    fn project_page_links_neighbours_and_home() {
        let dir = create_site("domain = \"example.com\"\nminify = false\n");
        build_site(dir.path());

        let page =
            fs::read_to_string(dir.path().join("dist/project/identidad/index.html")).unwrap();
        assert!(page.contains("https://behance.net/x"));
        assert!(page.contains("/project/campana-institucional-idaan/"));
        assert!(page.contains("/project/catalogo/"));

        // Placeholder href is not rendered as an external link
        let first = fs::read_to_string(
            dir.path()
                .join("dist/project/campana-institucional-idaan/index.html"),
        )
        .unwrap();
        assert!(!first.contains("href=\"#\" target"));
    }

    #[test]
    fn not_found_page_is_translated() {
        let dir = create_site("domain = \"example.com\"\nminify = false\nlanguage = \"es\"\n");
        build_site(dir.path());

        let page = fs::read_to_string(dir.path().join("dist").join(NOT_FOUND_PAGE)).unwrap();
        assert!(page.contains("Proyecto no encontrado"));
        assert!(page.contains("href=\"/\""));
    }

    #[test]
    fn stored_dark_preference_marks_root() {
        let dir = create_site("domain = \"example.com\"\nminify = false\n");
        let mut store = FileStore::open(FileStore::in_site(dir.path()));
        appearance::PreferenceStore::set(&mut store, appearance::STORAGE_KEY, "dark").unwrap();

        let pipeline = build_site(dir.path());
        assert_eq!(pipeline.appearance, ThemePreference::Dark);

        let index = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert!(index.contains("<html lang=\"en\" class=\"dark\""));
    }

    #[test]
    fn minified_build_renders() {
        let dir = create_site("domain = \"example.com\"\n");
        build_site(dir.path());

        let index = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert!(index.contains("José Enrique Scott"));
    }

    /// Contents of the emitted static asset whose hashed name starts with `stem`.
    fn built_static(dist: &Path, stem: &str) -> String {
        let prefix = format!("{stem}-");
        let entry = fs::read_dir(dist.join("static"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .find(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .unwrap_or_else(|| panic!("no static asset named {stem}-*"));
        fs::read_to_string(entry).unwrap()
    }

    #[test]
    fn carousel_keys_are_bound_page_wide() {
        let dir = create_site("domain = \"example.com\"\nminify = false\n");
        build_site(dir.path());
        let dist = dir.path().join("dist");

        let index = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(index.contains("data-key-next=\"ArrowRight\""));
        assert!(index.contains("data-key-prev=\"ArrowLeft\""));

        let script = built_static(&dist, "carousel");
        assert!(script.contains("document.addEventListener(\"keydown\""));
        assert!(!script.contains("carousel.addEventListener(\"keydown\""));
        assert!(script.contains("getAttribute(\"data-key-next\")"));
    }

    #[test]
    fn carousel_script_reads_exclusive_swipe_threshold() {
        let dir = create_site(
            "domain = \"example.com\"\nminify = false\n\n[carousel]\nswipe_threshold = 45.0\n",
        );
        build_site(dir.path());
        let dist = dir.path().join("dist");

        let index = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(index.contains("data-swipe-threshold=\"45\""));

        let script = built_static(&dist, "carousel");
        assert!(script.contains("getAttribute(\"data-swipe-threshold\")"));
        assert!(script.contains("Math.abs(delta) > threshold"));
    }

    #[test]
    fn carousel_starts_from_slide_hash() {
        let dir = create_site("domain = \"example.com\"\nminify = false\n");
        build_site(dir.path());
        let dist = dir.path().join("dist");

        let index = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(index.contains("id=\"slide-1\""));

        let script = built_static(&dist, "carousel");
        assert!(script.contains("var index = initialIndex(slides);"));
        assert!(script.contains("window.location.hash"));
        assert!(script.contains("history.replaceState"));

        // :target only drives the slides until the script has taken over
        let css = built_static(&dist, "style");
        assert!(css.contains(".carousel:not(.is-enhanced) .slide:target"));
    }

    #[test]
    fn theme_script_prefers_stored_then_os_then_light() {
        let dir = create_site("domain = \"example.com\"\nminify = false\n");
        build_site(dir.path());

        let script = built_static(&dir.path().join("dist"), "theme");
        assert!(script.contains("var current = stored() || system() || baked();"));
        assert!(script.contains("matches ? \"dark\" : \"light\""));
    }

    #[test]
    fn header_has_mobile_menu() {
        let dir = create_site("domain = \"example.com\"\nminify = false\nlanguage = \"es\"\n");
        build_site(dir.path());
        let dist = dir.path().join("dist");

        let index = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(index.contains("data-menu-toggle"));
        assert!(index.contains("aria-controls=\"site-nav\""));
        assert!(index.contains("id=\"site-nav\""));
        assert!(index.contains("/static/menu-"));

        let script = built_static(&dist, "menu");
        assert!(script.contains("aria-expanded"));
        assert!(script.contains("\"scroll\""));
    }

    #[test]
    fn rebuild_removes_stale_files() {
        let dir = create_site("domain = \"example.com\"\nminify = false\n");
        build_site(dir.path());

        let stale = dir.path().join("dist/project/old-slug/index.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        build_site(dir.path());
        assert!(!stale.exists());
        assert!(!dir.path().join("dist/project/old-slug").exists());
    }

    #[test]
    fn unknown_layout_fails() {
        let dir = create_site("domain = \"example.com\"\nlayout = \"nope\"\n");
        let site = Site::load(&dir.path().join("site.toml")).unwrap();

        let err = Pipeline::load(dir.path().to_path_buf(), site).unwrap_err();
        assert!(matches!(err, Error::LayoutNotFound { .. }));
    }

    #[test]
    fn local_layout_takes_precedence() {
        let dir = create_site("domain = \"example.com\"\nminify = false\nlayout = \"mine\"\n");
        let templates = dir.path().join("mine/templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(
            templates.join("index.html"),
            "{% for s in slides %}[{{ s.prev }}<{{ s.index }}>{{ s.next }}]{% endfor %}",
        )
        .unwrap();

        build_site(dir.path());

        let index = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(index, "[2<0>1][0<1>2][1<2>0]");
        assert!(!dir.path().join("dist/project").exists());
    }

    #[test_case("identidad" => true)]
    #[test_case("with space" => true)]
    #[test_case("a/b" => false)]
    #[test_case(".." => false)]
    #[test_case("" => false)]
    fn single_segment(slug: &str) -> bool {
        is_single_segment(slug)
    }

    #[test]
    fn hashed_filenames() {
        let name = hash_filename("style.css", b"body{}");
        assert!(name.starts_with("style-"));
        assert!(name.ends_with(".css"));
        assert_eq!(name.len(), "style-".len() + 8 + ".css".len());

        assert!(hash_filename("LICENSE", b"x").starts_with("LICENSE-"));
    }
}
