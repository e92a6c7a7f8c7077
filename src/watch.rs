//! File system watcher for automatic rebuilds.
//!
//! Watches site.toml, the portfolio data file, the public directory and a
//! local layout, and rebuilds after a quiet period so that a burst of saves
//! triggers a single build.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::time::Duration;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::{LayoutConfig, Site};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::portfolio::Portfolio;
use crate::serve::SharedPortfolio;

/// Build once, then watch for changes and rebuild automatically.
///
/// This function blocks forever.
pub fn watch(
    site_dir: PathBuf,
    config_path: PathBuf,
    layout_override: Option<String>,
    debounce_secs: u64,
) -> Result<()> {
    tracing::info!("performing initial build");
    if let Err(e) = do_build(&site_dir, &config_path, layout_override.as_deref()) {
        tracing::error!(error = %e, "initial build failed");
    }

    watch_and_rebuild(
        site_dir,
        config_path,
        layout_override,
        Duration::from_secs(debounce_secs),
        None,
    )
}

/// Watch for file changes and rebuild automatically.
///
/// This function blocks forever. Unlike `watch()`, it does not perform an
/// initial build. After each successful rebuild the freshly loaded portfolio
/// is published to `shared`, if given.
pub fn watch_and_rebuild(
    site_dir: PathBuf,
    config_path: PathBuf,
    layout_override: Option<String>,
    debounce: Duration,
    shared: Option<SharedPortfolio>,
) -> Result<()> {
    let site = Site::load(&config_path)?;

    // Canonicalize output_dir so it matches absolute paths from notify events
    let output_dir = site_dir
        .join(&site.build)
        .canonicalize()
        .unwrap_or_else(|_| site_dir.join(&site.build));

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        Config::default(),
    )?;

    for (path, mode) in watch_targets(&site_dir, &config_path, &site, layout_override.as_deref()) {
        tracing::info!(path = %path.display(), "watching");
        watcher.watch(&path, mode)?;
    }

    tracing::info!(
        debounce_secs = debounce.as_secs(),
        "watch mode active, press Ctrl+C to stop"
    );
    tracing::debug!(output_dir = %output_dir.display(), "output directory for filtering");

    let mut needs_rebuild = false;

    loop {
        match rx.recv_timeout(debounce) {
            Ok(event) => {
                let _span = tracing::debug_span!(
                    "file_event",
                    kind = ?event.kind,
                    paths = ?event.paths,
                )
                .entered();

                if should_ignore_event(&event, &output_dir) {
                    tracing::debug!("ignoring event (filtered)");
                    continue;
                }

                if !needs_rebuild {
                    tracing::info!(
                        "change detected, waiting {}s for more changes...",
                        debounce.as_secs()
                    );
                }
                needs_rebuild = true;
            }
            Err(RecvTimeoutError::Timeout) => {
                if needs_rebuild {
                    tracing::info!("rebuilding site...");

                    match do_build(&site_dir, &config_path, layout_override.as_deref()) {
                        Ok(portfolio) => {
                            if let Some(shared) = &shared {
                                *shared.write().unwrap_or_else(|e| e.into_inner()) = portfolio;
                            }
                            tracing::info!("build complete");
                        }
                        Err(e) => tracing::error!(error = %e, "build failed"),
                    }

                    needs_rebuild = false;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("watcher disconnected, stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Paths to watch for a site, skipping any that do not exist.
fn watch_targets(
    site_dir: &Path,
    config_path: &Path,
    site: &Site,
    layout_override: Option<&str>,
) -> Vec<(PathBuf, RecursiveMode)> {
    let layout_name = layout_override.unwrap_or(site.layout.name());

    let candidates = [
        (config_path.to_path_buf(), RecursiveMode::NonRecursive),
        (site_dir.join(&site.data), RecursiveMode::NonRecursive),
        (site_dir.join(&site.public), RecursiveMode::Recursive),
        (site_dir.join(layout_name), RecursiveMode::Recursive),
    ];

    candidates
        .into_iter()
        .filter(|(path, _)| path.exists())
        .collect()
}

/// Perform a single build of the site, returning the portfolio it rendered.
pub fn do_build(
    site_dir: &Path,
    config_path: &Path,
    layout_override: Option<&str>,
) -> Result<Portfolio> {
    // Reload config each time in case it changed
    let mut site = Site::load(config_path)?;

    if let Some(layout_name) = layout_override {
        site.layout = LayoutConfig::Name(layout_name.to_string());
    }

    let mut pipeline = Pipeline::load(site_dir.to_path_buf(), site)?;
    pipeline.build()?;

    Ok(pipeline.portfolio)
}

/// Check if an event should be ignored.
pub fn should_ignore_event(event: &notify::Event, output_dir: &Path) -> bool {
    use notify::EventKind;

    // Only care about create, modify, and remove events
    match &event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        other => {
            tracing::trace!(kind = ?other, "ignoring: non-content event");
            return true;
        }
    }

    for path in &event.paths {
        if path.starts_with(output_dir) {
            tracing::trace!(path = %path.display(), "ignoring: in output directory");
            return true;
        }

        // Editor swap files, .DS_Store
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.starts_with('.')
        {
            tracing::trace!(path = %path.display(), "ignoring: hidden file");
            return true;
        }
    }

    false
}
