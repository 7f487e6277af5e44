//! Bootstrap loader for a compiled engine runtime.
//!
//! The crate glues the splash theme, CPU compositor, and GPU presenter
//! together and drives the staged acquisition sequence:
//!
//! ```text
//!   SplashConfig ──▶ LoadingScreen ──▶ compositor::Surface ──▶ presenter
//!                         ▲
//!   Capabilities ──▶ Loader::load ── images ─▶ bundle ─▶ engine ─▶ clean
//! ```
//!
//! `Loader` owns the state machine (image loading, bundle download with
//! progress events, engine hand-off, teardown), while `LoadingScreen` owns
//! the composition surface, cached layout, and the presenter. Host platform
//! primitives (image decode, bundle fetch, engine start, randomness) are
//! constructor-injected through the [`Capabilities`] bundle so tests can
//! substitute them wholesale.

mod capabilities;
mod error;
mod loader;
mod screen;

pub use capabilities::{
    AssetSource, BundleFetcher, Capabilities, EngineLaunch, EngineRuntime, LaunchPlan,
    RandomSource,
};
pub use error::{AssetError, DownloadError, LoaderError, StartupError};
pub use loader::Loader;
pub use screen::{compute_layout, Layout, LoadingScreen, SplashScreen};
