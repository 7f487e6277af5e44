use std::path::PathBuf;

use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// An image asset failed to fetch or decode.
#[derive(Debug, Error)]
#[error("failed to load image {}", path.display())]
pub struct AssetError {
    pub path: PathBuf,
    #[source]
    pub source: Source,
}

impl AssetError {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<Source>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// The bundle fetch failed.
#[derive(Debug, Error)]
#[error("bundle download failed: {reason}")]
pub struct DownloadError {
    pub reason: String,
    #[source]
    pub source: Option<Source>,
}

impl DownloadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn with_source(reason: impl Into<String>, source: impl Into<Source>) -> Self {
        Self {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }
}

/// The engine runtime failed to start.
#[derive(Debug, Error)]
#[error("engine startup failed: {reason}")]
pub struct StartupError {
    pub reason: String,
    #[source]
    pub source: Option<Source>,
}

impl StartupError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn with_source(reason: impl Into<String>, source: impl Into<Source>) -> Self {
        Self {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }
}

/// Everything that can abort the load sequence. Graphics failures are raised
/// synchronously while building the screen; the stage errors flow out of
/// [`crate::Loader::load`]. Nothing is retried.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("graphics initialisation failed: {0}")]
    Graphics(anyhow::Error),
}
