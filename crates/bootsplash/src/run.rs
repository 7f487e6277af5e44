use std::fs;

use anyhow::{Context, Result};
use loader::{Capabilities, LaunchPlan, Loader, LoadingScreen};
use presenter::BlitPresenter;
use splashconfig::{SplashConfig, SplashOverrides};
use tracing_subscriber::EnvFilter;
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use crate::cli::Cli;
use crate::paths::AppPaths;
use crate::platform::{DiskAssets, HttpBundleFetcher, OsRandom, ProcessEngine};
use crate::window::{PumpedPresenter, WinitPump};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::discover()?;
    paths.ensure()?;
    let config = load_config(&cli)?;

    let event_loop = EventLoop::new().context("creating event loop")?;
    let (width, height) = cli.size;
    let window = WindowBuilder::new()
        .with_title("bootsplash")
        .with_inner_size(LogicalSize::new(width, height))
        .with_resizable(false)
        .build(&event_loop)
        .context("creating splash window")?;
    let scale = window.scale_factor() as f32;
    let pixel_size = window.inner_size();
    tracing::debug!(
        width = pixel_size.width,
        height = pixel_size.height,
        scale,
        "splash window created"
    );

    let presenter = BlitPresenter::new(
        &window,
        (pixel_size.width.max(1), pixel_size.height.max(1)),
    )?;
    // The loader blocks this thread, so the event loop is pumped around each
    // present rather than run continuously.
    let presenter = PumpedPresenter::new(presenter, Some(window), WinitPump::new(event_loop));
    let screen = LoadingScreen::new(
        presenter,
        config.clone(),
        (
            pixel_size.width as f32 / scale,
            pixel_size.height as f32 / scale,
        ),
        scale,
    );

    let caps = Capabilities {
        assets: Box::new(DiskAssets),
        bundle: Box::new(HttpBundleFetcher::new(
            cli.bundle_url.clone(),
            paths.bundle_dir(),
        )?),
        engine: Box::new(ProcessEngine),
        random: Box::new(OsRandom),
    };
    let plan = LaunchPlan {
        bundle_name: cli.bundle.clone(),
        executable: cli.executable.clone(),
        args: if cli.engine_args.is_empty() {
            LaunchPlan::default().args
        } else {
            cli.engine_args.clone()
        },
    };

    let mut loader = Loader::new(config, plan, caps, screen);
    loader.load()?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SplashConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            SplashConfig::from_toml_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => SplashConfig::resolve(SplashOverrides::default()),
    };
    if let Some(logo) = cli.logo.clone() {
        config.logo = logo;
    }
    if let Some(background) = cli.background.clone() {
        config.background = background;
    }
    Ok(config)
}
