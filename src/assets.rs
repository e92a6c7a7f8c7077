//! Public files and project image variants.
//!
//! The public directory is mirrored into the output as-is (CV, screenshots,
//! brand icons). Raster project images that live there additionally get a
//! card-sized WebP used by the carousel and gallery grids:
//! - BLAKE3 content hash for cache-busting
//! - Card variant (1200px WebP, lossy)
//!
//! Variants are generated in parallel and skipped when a file with the same
//! content hash already exists.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::DynamicImage;
use image::imageops::FilterType;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::portfolio::Portfolio;
use crate::util::url_encode_path;

const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const CARD_SIZE: u32 = 1200;
const CARD_QUALITY: f32 = 82.0;

/// Stats from processing project images.
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total: usize,
    pub cached: usize,
    pub generated: usize,
    /// Images referenced by a project that are remote or not in public/
    pub external: usize,
}

/// Card variant of a project image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageVariant {
    /// Site URL of the original, as written in the data file
    pub src: String,
    /// Site URL of the WebP card
    pub card: String,
    pub width: u32,
    pub height: u32,
}

/// Maps image URLs from the data file to their processed variants.
pub type ImageManifest = HashMap<String, ImageVariant>;

/// Mirror `public_dir` into `output_dir`, skipping hidden entries.
///
/// Files whose destination already has identical content are left alone so
/// their timestamps stay stable across rebuilds. Returns the number of files
/// written.
pub fn copy_public(
    public_dir: &Path,
    output_dir: &Path,
    expected: &mut HashSet<PathBuf>,
) -> Result<usize> {
    if !public_dir.is_dir() {
        tracing::debug!(path = %public_dir.display(), "no public directory");
        return Ok(0);
    }

    let mut written = 0;

    let walker = WalkDir::new(public_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| Error::Other(format!("walking public dir: {}", e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(public_dir)
            .map_err(|e| Error::Other(e.to_string()))?;
        let dest = output_dir.join(relative);

        let contents = fs::read(entry.path())?;
        if !same_contents(&dest, &contents) {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &contents)?;
            written += 1;
            tracing::trace!(path = %relative.display(), "copied public file");
        }

        expected.insert(dest);
    }

    Ok(written)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

fn same_contents(dest: &Path, contents: &[u8]) -> bool {
    match fs::metadata(dest) {
        Ok(meta) if meta.len() == contents.len() as u64 => {
            fs::read(dest).is_ok_and(|existing| existing == contents)
        }
        _ => false,
    }
}

/// A project image that resolved to a raster file inside public/.
struct LocalImage {
    src: String,
    source: PathBuf,
    /// Directory of the image relative to public/ (e.g. "screenshots")
    relative_dir: PathBuf,
    stem: String,
}

/// Resolve a site URL like `/screenshots/a.jpg` to a raster file in `public_dir`.
fn resolve_local(src: &str, public_dir: &Path) -> Option<LocalImage> {
    let relative = src.strip_prefix('/')?;
    if relative.contains("://") || relative.split('/').any(|seg| seg == "..") {
        return None;
    }

    let relative = Path::new(relative);
    let extension = relative.extension()?.to_str()?.to_lowercase();
    if !RASTER_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }

    let source = public_dir.join(relative);
    if !source.is_file() {
        return None;
    }

    Some(LocalImage {
        src: src.to_string(),
        stem: relative.file_stem()?.to_str()?.to_string(),
        relative_dir: relative.parent().map(Path::to_path_buf).unwrap_or_default(),
        source,
    })
}

/// Generate card variants for every local raster image used by a project.
///
/// Files are written directly into `images_dir` and recorded in `expected`.
pub fn process_project_images(
    portfolio: &Portfolio,
    public_dir: &Path,
    images_dir: &Path,
    expected: &mut HashSet<PathBuf>,
) -> Result<(ImageManifest, ProcessingStats)> {
    let referenced: BTreeSet<&str> = portfolio
        .projects
        .iter()
        .flat_map(|p| p.images.iter().map(String::as_str))
        .collect();

    let (local, external): (Vec<_>, Vec<_>) = referenced
        .iter()
        .map(|src| (*src, resolve_local(src, public_dir)))
        .partition(|(_, local)| local.is_some());

    for (src, _) in &external {
        tracing::debug!(src, "image not in public dir, left as-is");
    }

    let local: Vec<LocalImage> = local.into_iter().filter_map(|(_, l)| l).collect();

    let cached = AtomicUsize::new(0);
    let generated = AtomicUsize::new(0);

    let results: Vec<(ImageVariant, PathBuf)> = local
        .par_iter()
        .map(|image| -> Result<(ImageVariant, PathBuf)> {
            let (variant, path, fresh) = process_image(image, images_dir)?;
            if fresh {
                generated.fetch_add(1, Ordering::Relaxed);
            } else {
                cached.fetch_add(1, Ordering::Relaxed);
            }
            Ok((variant, path))
        })
        .collect::<Result<_>>()?;

    let mut manifest = ImageManifest::new();
    for (variant, path) in results {
        expected.insert(path);
        manifest.insert(variant.src.clone(), variant);
    }

    let stats = ProcessingStats {
        total: referenced.len(),
        cached: cached.into_inner(),
        generated: generated.into_inner(),
        external: external.len(),
    };

    Ok((manifest, stats))
}

/// Hash, measure and (if needed) encode one image. Returns the variant, its
/// output path and whether it was freshly written.
fn process_image(image: &LocalImage, images_dir: &Path) -> Result<(ImageVariant, PathBuf, bool)> {
    let data = fs::read(&image.source)?;
    let hash = &blake3::hash(&data).to_hex()[..8];

    let reader = image::ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|e| Error::Image(image::ImageError::IoError(e)))?;
    let (width, height) = reader.into_dimensions()?;

    let file_name = format!("{}-{}-card.webp", image.stem, hash);
    let out_dir = images_dir.join(&image.relative_dir);
    let out_path = out_dir.join(&file_name);

    let relative_url = if image.relative_dir.as_os_str().is_empty() {
        file_name.clone()
    } else {
        format!("{}/{}", image.relative_dir.display(), file_name)
    };

    let variant = ImageVariant {
        src: image.src.clone(),
        card: format!("/images/{}", url_encode_path(&relative_url)),
        width,
        height,
    };

    if out_path.exists() {
        tracing::debug!(src = %image.src, %hash, "cached");
        return Ok((variant, out_path, false));
    }

    tracing::debug!(src = %image.src, %hash, width, height, "generating card");

    let decoded = image::load_from_memory(&data)?;
    let webp = generate_variant(&decoded, CARD_SIZE, CARD_QUALITY);
    fs::create_dir_all(&out_dir)?;
    fs::write(&out_path, webp)?;

    Ok((variant, out_path, true))
}

/// Generate a resized WebP variant of the image.
fn generate_variant(img: &DynamicImage, max_size: u32, quality: f32) -> Vec<u8> {
    // Resize if larger than max_size (preserve aspect ratio)
    let resized = if img.width() > max_size || img.height() > max_size {
        img.resize(max_size, max_size, FilterType::Lanczos3)
    } else {
        img.clone()
    };

    let rgba = resized.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    encoder.encode(quality).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn write_png(path: &Path, width: u32, height: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 90]));
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    fn portfolio_with_images(images: &[&str]) -> Portfolio {
        let list = images
            .iter()
            .map(|i| format!("\"{}\"", i))
            .collect::<Vec<_>>()
            .join(", ");
        Portfolio::parse(&format!(
            "[profile]\nname = \"x\"\n\n[[projects]]\ntitle = \"One\"\nimages = [{}]\n",
            list
        ))
        .unwrap()
    }

    #[test]
    fn copy_public_mirrors_tree_and_skips_hidden() {
        let site = tempfile::tempdir().unwrap();
        let public = site.path().join("public");
        let out = site.path().join("dist");
        fs::create_dir_all(public.join("cv")).unwrap();
        fs::write(public.join("cv/resume.pdf"), b"%PDF").unwrap();
        fs::write(public.join(".DS_Store"), b"junk").unwrap();

        let mut expected = HashSet::new();
        let written = copy_public(&public, &out, &mut expected).unwrap();

        assert_eq!(written, 1);
        assert!(out.join("cv/resume.pdf").is_file());
        assert!(!out.join(".DS_Store").exists());
        assert!(expected.contains(&out.join("cv/resume.pdf")));

        // Second run leaves identical files alone
        let written = copy_public(&public, &out, &mut expected).unwrap();
        assert_eq!(written, 0);
    }

    #[test]
    fn copy_public_without_directory() {
        let site = tempfile::tempdir().unwrap();
        let mut expected = HashSet::new();

        let written =
            copy_public(&site.path().join("missing"), site.path(), &mut expected).unwrap();

        assert_eq!(written, 0);
        assert!(expected.is_empty());
    }

    #[test]
    fn resolve_local_rejects_remote_and_traversal() {
        let site = tempfile::tempdir().unwrap();
        write_png(&site.path().join("shots/a.png"), 4, 4);

        assert!(resolve_local("/shots/a.png", site.path()).is_some());
        assert!(resolve_local("https://cdn.example.com/a.png", site.path()).is_none());
        assert!(resolve_local("/../a.png", site.path()).is_none());
        assert!(resolve_local("/shots/missing.png", site.path()).is_none());
        assert!(resolve_local("/shots/a.gif", site.path()).is_none());
    }

    #[test]
    fn generates_and_caches_card_variants() {
        let site = tempfile::tempdir().unwrap();
        let public = site.path().join("public");
        let images = site.path().join("dist/images");
        write_png(&public.join("screenshots/big.png"), 2400, 1200);

        let portfolio =
            portfolio_with_images(&["/screenshots/big.png", "https://cdn.example.com/x.jpg"]);

        let mut expected = HashSet::new();
        let (manifest, stats) =
            process_project_images(&portfolio, &public, &images, &mut expected).unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.generated, 1);
        assert_eq!(stats.external, 1);

        let variant = &manifest["/screenshots/big.png"];
        assert_eq!((variant.width, variant.height), (2400, 1200));
        assert!(variant.card.starts_with("/images/screenshots/big-"));
        assert!(variant.card.ends_with("-card.webp"));
        assert_eq!(expected.len(), 1);

        let card = image::open(expected.iter().next().unwrap()).unwrap();
        assert_eq!(card.width(), CARD_SIZE);

        let mut expected = HashSet::new();
        let (_, stats) =
            process_project_images(&portfolio, &public, &images, &mut expected).unwrap();
        assert_eq!(stats.cached, 1);
        assert_eq!(stats.generated, 0);
    }
}
