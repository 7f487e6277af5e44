//! The staged acquisition sequence: splash images, engine bundle, engine
//! hand-off, teardown.

use std::thread;
use std::time::{Duration, Instant};

use splashconfig::SplashConfig;

use crate::capabilities::{Capabilities, EngineLaunch, LaunchPlan};
use crate::error::LoaderError;
use crate::screen::SplashScreen;

/// Drives the whole bootstrap. Stages run strictly in order and nothing is
/// retried; the first failing stage aborts the sequence. Teardown runs on
/// both the success and the failure path.
pub struct Loader<S: SplashScreen> {
    config: SplashConfig,
    plan: LaunchPlan,
    caps: Capabilities,
    screen: Option<S>,
    progress: f32,
}

impl<S: SplashScreen> Loader<S> {
    pub fn new(config: SplashConfig, plan: LaunchPlan, caps: Capabilities, screen: S) -> Self {
        Self {
            config,
            plan,
            caps,
            screen: Some(screen),
            progress: 0.0,
        }
    }

    /// Runs the full sequence: first frame, splash images, bundle download
    /// with progress presentation, engine start. The screen is torn down
    /// before this returns, whatever the outcome.
    pub fn load(&mut self) -> Result<(), LoaderError> {
        let outcome = self.run_stages();
        if let Err(err) = &outcome {
            tracing::error!(error = %err, "bootstrap aborted");
        }
        self.clean();
        outcome
    }

    /// Releases the screen and everything behind it. Safe to call more than
    /// once; [`load`](Self::load) already calls it.
    pub fn clean(&mut self) {
        if let Some(mut screen) = self.screen.take() {
            screen.clean();
        }
    }

    fn run_stages(&mut self) -> Result<(), LoaderError> {
        let first_start = self.config.text.first_start.clone();
        self.present(&first_start)?;

        self.acquire_images()?;
        // Historical progress step carried over from the original sequence;
        // the first download event overwrites it before it is ever shown.
        self.progress += 1.0;

        let bundle = self.download_bundle()?;
        tracing::info!(bundle = %bundle.display(), "bundle ready");

        self.progress = 1.0;
        let init = self.config.text.init.clone();
        self.present(&init)?;

        let mut seed = [0u8; 16];
        self.caps.random.fill(&mut seed);
        let launch = EngineLaunch {
            executable: self.plan.executable.clone(),
            bundle,
            args: self.plan.args.clone(),
            instance_seed: seed,
        };
        tracing::info!(executable = %launch.executable.display(), "starting engine runtime");
        self.caps.engine.start(&launch)?;
        Ok(())
    }

    /// Decodes both splash images concurrently and hands them to the screen.
    fn acquire_images(&mut self) -> Result<(), LoaderError> {
        let assets = self.caps.assets.as_ref();
        let background_path = self.config.background.clone();
        let logo_path = self.config.logo.clone();
        let (background, logo) = thread::scope(|scope| {
            let background = scope.spawn(|| assets.load_image(&background_path));
            let logo = scope.spawn(|| assets.load_image(&logo_path));
            (
                background.join().expect("image loader thread panicked"),
                logo.join().expect("image loader thread panicked"),
            )
        });
        let (background, logo) = (background?, logo?);
        if let Some(screen) = self.screen.as_mut() {
            screen.attach_images(background, logo);
        }
        Ok(())
    }

    /// Fetches the bundle, mapping each host progress event to a presented
    /// frame. The label cycles through the downloading variants on a wall
    /// clock interval, independent of progress.
    fn download_bundle(&mut self) -> Result<std::path::PathBuf, LoaderError> {
        let started = Instant::now();
        let mut present_error: Option<anyhow::Error> = None;

        let Self {
            config,
            plan,
            caps,
            screen,
            progress,
        } = self;
        let variants = &config.text.downloading;
        let interval = config.text.rotate_interval;

        let bundle = caps.bundle.fetch(&plan.bundle_name, &mut |percent| {
            *progress = percent.min(100) as f32 / 100.0;
            let label = if variants.is_empty() {
                config.text.first_start.as_str()
            } else {
                variants[rotation_index(started.elapsed(), interval, variants.len())].as_str()
            };
            if let (Some(screen), None) = (screen.as_mut(), present_error.as_ref()) {
                if let Err(err) = screen.update(*progress, label) {
                    present_error = Some(err);
                }
            }
        })?;

        if let Some(err) = present_error {
            return Err(LoaderError::Graphics(err));
        }
        Ok(bundle)
    }

    fn present(&mut self, text: &str) -> Result<(), LoaderError> {
        if let Some(screen) = self.screen.as_mut() {
            screen
                .update(self.progress, text)
                .map_err(LoaderError::Graphics)?;
        }
        Ok(())
    }
}

/// Which downloading variant to show after `elapsed` wall time: one step per
/// full interval, wrapping around the variant list.
fn rotation_index(elapsed: Duration, interval: Duration, variants: usize) -> usize {
    let interval_ms = interval.as_millis().max(1);
    (elapsed.as_millis() / interval_ms) as usize % variants
}
