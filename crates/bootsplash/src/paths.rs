use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories_next::ProjectDirs;

/// Platform directories the loader writes into. Only the cache tree is used;
/// the loader keeps no configuration or state of its own.
pub struct AppPaths {
    cache_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "bootsplash", "bootsplash")
            .context("unable to determine platform cache directories")?;
        Ok(Self {
            cache_dir: dirs.cache_dir().to_path_buf(),
        })
    }

    /// Where downloaded bundles land.
    pub fn bundle_dir(&self) -> PathBuf {
        self.cache_dir.join("bundles")
    }

    pub fn ensure(&self) -> Result<()> {
        let bundle_dir = self.bundle_dir();
        fs::create_dir_all(&bundle_dir)
            .with_context(|| format!("creating {}", bundle_dir.display()))
    }
}
