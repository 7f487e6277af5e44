//! Host platform primitives consumed by the loader, modeled as
//! constructor-injected capabilities instead of ambient globals.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{AssetError, DownloadError, StartupError};

/// Decodes splash images. `Sync` because both images are requested
/// concurrently from scoped threads.
pub trait AssetSource: Send + Sync {
    fn load_image(&self, path: &Path) -> Result<RgbaImage, AssetError>;
}

/// Fetches the engine bundle, reporting progress on the host's 0-100 scale,
/// and returns where the bundle landed on disk.
pub trait BundleFetcher {
    fn fetch(
        &mut self,
        name: &str,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<PathBuf, DownloadError>;
}

/// Starts the engine runtime. The call is long-running and opaque; the loader
/// neither polls nor renders while it is in flight.
pub trait EngineRuntime {
    fn start(&mut self, launch: &EngineLaunch) -> Result<(), StartupError>;
}

/// Fills a buffer with randomness. The loader only uses this to seed the
/// engine instance; it never consumes randomness itself.
pub trait RandomSource {
    fn fill(&mut self, buffer: &mut [u8]);
}

/// The full capability bundle handed to [`crate::Loader`] at construction.
pub struct Capabilities {
    pub assets: Box<dyn AssetSource>,
    pub bundle: Box<dyn BundleFetcher>,
    pub engine: Box<dyn EngineRuntime>,
    pub random: Box<dyn RandomSource>,
}

/// What to download and how to start the engine afterwards.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// Bundle name handed to the fetcher.
    pub bundle_name: String,
    /// Engine executable, resolved relative to the bundle location by the
    /// runtime implementation.
    pub executable: PathBuf,
    /// Fixed runtime arguments.
    pub args: Vec<String>,
}

impl Default for LaunchPlan {
    fn default() -> Self {
        Self {
            bundle_name: "engine".to_string(),
            executable: PathBuf::from("engine/godot"),
            args: vec!["--audio-driver".to_string(), "ScriptProcessor".to_string()],
        }
    }
}

/// Everything the engine runtime needs to take over.
#[derive(Debug, Clone)]
pub struct EngineLaunch {
    pub executable: PathBuf,
    pub bundle: PathBuf,
    pub args: Vec<String>,
    /// Random per-boot seed generated through the injected [`RandomSource`].
    pub instance_seed: [u8; 16],
}
