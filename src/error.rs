use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("layout missing required template: index.html")]
    MissingIndexTemplate,

    #[error("layout not found: {name} (not a local directory or built-in layout)")]
    LayoutNotFound { name: String },

    #[error("no projects found in {}", path.display())]
    NoProjects { path: PathBuf },

    #[error("invalid theme preference: {value} (expected \"light\" or \"dark\")")]
    InvalidThemePreference { value: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
