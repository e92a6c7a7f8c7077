mod appearance;
mod assets;
mod builtin_layouts;
mod carousel;
mod config;
mod error;
mod i18n;
mod layout;
mod minify;
mod pipeline;
mod portfolio;
mod routes;
mod serve;
mod util;
mod watch;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::Level;

use crate::appearance::{FileStore, ThemeController, ThemePreference};

const VERSION: &str = env!("GIT_VERSION");

#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = VERSION)]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
struct Args {
    /// Site directory (contains site.toml, portfolio data and public files)
    #[arg(short = 'C', long, default_value = ".", global = true)]
    directory: PathBuf,

    /// Path to site configuration file (relative to site directory)
    #[arg(short, long, default_value = "site.toml", global = true)]
    config: PathBuf,

    /// Logging verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Override layout (for testing)
    #[arg(short, long, global = true)]
    layout: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the site (default if no command specified)
    Build,

    /// Build and serve the site locally
    Serve {
        /// Port to serve on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Debounce delay in seconds for file watching
        #[arg(long, default_value = "5")]
        debounce: u64,

        /// Disable automatic rebuild on file changes
        #[arg(long)]
        no_watch: bool,
    },

    /// Watch for changes and rebuild automatically
    Watch {
        /// Debounce delay in seconds
        #[arg(long, default_value = "5")]
        debounce: u64,
    },

    /// Delete the output directory
    Clean,

    /// Show or change the stored light/dark preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeAction {
    /// Switch between light and dark
    Toggle,

    /// Store an explicit preference
    Set {
        /// `light` or `dark`
        value: ThemePreference,
    },
}

impl Args {
    fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        }
    }

    fn config_path(&self) -> PathBuf {
        self.directory.join(&self.config)
    }
}

fn init_tracing(level: Level) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    #[cfg(distribute)]
    {
        fmt().json().with_env_filter(filter).init();
    }

    #[cfg(not(distribute))]
    {
        fmt().pretty().with_env_filter(filter).init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing(args.log_level());

    tracing::debug!(?args, "parsed arguments");

    let config_path = args.config_path();

    match args.command {
        // Watch handles its own config loading (for hot-reload support)
        Some(Command::Watch { debounce }) => {
            watch::watch(args.directory, config_path, args.layout, debounce)?;
        }
        // Theme only touches the preference store, no site.toml needed
        Some(Command::Theme { action }) => {
            let store = FileStore::open(FileStore::in_site(&args.directory));
            let mut controller = ThemeController::init(store, appearance::system_preference());

            match action {
                Some(ThemeAction::Toggle) => {
                    controller.toggle();
                }
                Some(ThemeAction::Set { value }) => {
                    controller.set(value);
                }
                None => {}
            }

            println!("{}", controller.preference());
        }
        Some(Command::Clean) => {
            let site = config::Site::load(&config_path)?;
            let output_dir = args.directory.join(&site.build);
            if output_dir.exists() {
                std::fs::remove_dir_all(&output_dir)?;
                tracing::info!(path = %output_dir.display(), "cleaned output directory");
            } else {
                tracing::info!(path = %output_dir.display(), "output directory does not exist");
            }
        }
        Some(Command::Serve {
            port,
            debounce,
            no_watch,
        }) => {
            let mut pipeline = load_pipeline(&args.directory, &config_path, args.layout.as_deref())?;
            pipeline.build()?;

            let output_dir = pipeline.output_dir();
            let shared = Arc::new(RwLock::new(pipeline.portfolio));

            if !no_watch {
                let watch_dir = args.directory.clone();
                let watch_config = config_path.clone();
                let watch_layout = args.layout.clone();
                let watch_shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    if let Err(e) = watch::watch_and_rebuild(
                        watch_dir,
                        watch_config,
                        watch_layout,
                        Duration::from_secs(debounce),
                        Some(watch_shared),
                    ) {
                        tracing::error!(error = %e, "watcher stopped");
                    }
                });
            }

            serve::serve(&output_dir, shared, port)?;
        }
        Some(Command::Build) | None => {
            let mut pipeline = load_pipeline(&args.directory, &config_path, args.layout.as_deref())?;
            pipeline.build()?;
            tracing::info!("build complete");
        }
    }

    Ok(())
}

fn load_pipeline(
    site_dir: &std::path::Path,
    config_path: &std::path::Path,
    layout_override: Option<&str>,
) -> error::Result<pipeline::Pipeline> {
    tracing::info!(path = %config_path.display(), "loading site config");
    let mut site = config::Site::load(config_path)?;

    // Override layout if specified via CLI
    if let Some(layout_name) = layout_override {
        tracing::info!(layout = %layout_name, "overriding layout from CLI");
        site.layout = config::LayoutConfig::Name(layout_name.to_string());
    }

    tracing::info!(
        domain = %site.domain,
        layout = %site.layout,
        data = %site.data.display(),
        build = %site.build.display(),
        "site configured"
    );

    pipeline::Pipeline::load(site_dir.to_path_buf(), site)
}
