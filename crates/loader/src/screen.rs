//! The loading screen: composition surface, cached layout, and the GPU
//! presenter, driven by the orchestrator on every progress event.

use std::fs;

use compositor::{Color, LabelFont, Rect, Surface};
use image::RgbaImage;
use presenter::FramePresenter;
use splashconfig::{BarConfig, Rgba, SplashConfig};

/// Vertical gap between the progress bar and the icon, in logical units.
const BAR_ICON_GAP: f32 = 30.0;

/// Fixed element positions, computed once at screen construction. Window-size
/// changes during loading are deliberately not reflected; the loader is
/// short-lived and full-screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub bar_x: f32,
    pub bar_y: f32,
    pub icon_x: f32,
    pub icon_y: f32,
}

/// Computes element positions from the theme and the logical window size:
/// bar and icon horizontally centered, icon anchored to the bottom edge, bar
/// sitting a fixed gap above it.
pub fn compute_layout(config: &SplashConfig, width: f32, height: f32) -> Layout {
    let icon_y = height - config.icon.bottom - config.icon.height;
    Layout {
        bar_x: (width - config.bar.width) / 2.0,
        bar_y: icon_y - BAR_ICON_GAP - config.bar.height,
        icon_x: (width - config.icon.width) / 2.0,
        icon_y,
    }
}

/// Inner fill width for a given progress, never negative and never wider
/// than the bar interior at full progress.
fn fill_width(bar: &BarConfig, progress: f32) -> f32 {
    ((bar.width - 2.0 * bar.padding) * progress).max(0.0)
}

/// Seam between the orchestrator and the rendered splash. Production code
/// uses [`LoadingScreen`]; orchestrator tests substitute a recording fake.
pub trait SplashScreen {
    /// Hands over both decoded images once the image stage resolved.
    fn attach_images(&mut self, background: RgbaImage, logo: RgbaImage);

    /// Fully recomposes and presents the splash. Idempotent: identical
    /// arguments produce identical output.
    fn update(&mut self, progress: f32, text: &str) -> anyhow::Result<()>;

    /// Releases images, the composition surface, and the presenter. A second
    /// call is a no-op.
    fn clean(&mut self);
}

pub struct LoadingScreen<P: FramePresenter> {
    config: SplashConfig,
    layout: Layout,
    font: Option<LabelFont>,
    warned_no_font: bool,
    surface: Option<Surface>,
    presenter: Option<P>,
    background: Option<RgbaImage>,
    logo: Option<RgbaImage>,
}

impl<P: FramePresenter> LoadingScreen<P> {
    /// Builds the screen against an already-initialized presenter. The
    /// composition surface is allocated at `logical * scale` pixels with all
    /// drawing in logical coordinates.
    pub fn new(presenter: P, config: SplashConfig, logical_size: (f32, f32), scale: f32) -> Self {
        let layout = compute_layout(&config, logical_size.0, logical_size.1);
        let font = load_font(&config);
        Self {
            config,
            layout,
            font,
            warned_no_font: false,
            surface: Some(Surface::new(logical_size.0, logical_size.1, scale)),
            presenter: Some(presenter),
            background: None,
            logo: None,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn compose(&mut self, progress: f32, text: &str) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let (width, _height) = surface.logical_size();
        surface.clear();

        if let Some(background) = self.background.as_ref() {
            surface.blit_cover(background);
        }

        let bar = &self.config.bar;
        let layout = &self.layout;
        surface.fill_rounded_rect(
            Rect::new(layout.bar_x, layout.bar_y, bar.width, bar.height),
            bar.corner_radius,
            convert(bar.background),
        );
        if progress > 0.0 {
            surface.fill_rounded_rect(
                Rect::new(
                    layout.bar_x + bar.padding,
                    layout.bar_y + bar.padding,
                    fill_width(bar, progress),
                    bar.height - 2.0 * bar.padding,
                ),
                bar.corner_radius - bar.padding,
                convert(bar.fill),
            );
        }

        let style = &self.config.text.style;
        match self.font.as_ref() {
            Some(font) => font.draw_centered(
                surface,
                text,
                style.font_size,
                convert(style.color),
                width / 2.0,
                layout.bar_y + bar.height / 2.0,
            ),
            None => {
                if !self.warned_no_font {
                    tracing::warn!("no label font configured; skipping progress text");
                    self.warned_no_font = true;
                }
            }
        }

        if self.config.icon.visible {
            if let Some(logo) = self.logo.as_ref() {
                surface.blit_scaled(
                    logo,
                    Rect::new(
                        layout.icon_x,
                        layout.icon_y,
                        self.config.icon.width,
                        self.config.icon.height,
                    ),
                );
            }
        }
    }
}

fn convert(color: Rgba) -> Color {
    Color::rgba(color.r, color.g, color.b, color.a)
}

fn load_font(config: &SplashConfig) -> Option<LabelFont> {
    let path = config.text.style.font.as_ref()?;
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read label font");
            return None;
        }
    };
    match LabelFont::from_bytes(&bytes) {
        Ok(font) => Some(font),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to parse label font");
            None
        }
    }
}

impl<P: FramePresenter> SplashScreen for LoadingScreen<P> {
    fn attach_images(&mut self, background: RgbaImage, logo: RgbaImage) {
        self.background = Some(background);
        self.logo = Some(logo);
    }

    fn update(&mut self, progress: f32, text: &str) -> anyhow::Result<()> {
        self.compose(progress, text);
        if let (Some(surface), Some(presenter)) = (self.surface.as_ref(), self.presenter.as_mut())
        {
            presenter.present(surface.pixels())?;
        }
        Ok(())
    }

    fn clean(&mut self) {
        self.background = None;
        self.logo = None;
        if let Some(mut surface) = self.surface.take() {
            surface.clear();
        }
        if let Some(mut presenter) = self.presenter.take() {
            presenter.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct NullPresenter {
        frames: Rc<RefCell<Vec<Vec<u8>>>>,
        releases: Rc<RefCell<u32>>,
    }

    impl FramePresenter for NullPresenter {
        fn present(&mut self, pixels: &[u8]) -> anyhow::Result<()> {
            self.frames.borrow_mut().push(pixels.to_vec());
            Ok(())
        }

        fn release(&mut self) {
            *self.releases.borrow_mut() += 1;
        }
    }

    fn screen_with_recorder() -> (
        LoadingScreen<NullPresenter>,
        Rc<RefCell<Vec<Vec<u8>>>>,
        Rc<RefCell<u32>>,
    ) {
        let presenter = NullPresenter::default();
        let frames = presenter.frames.clone();
        let releases = presenter.releases.clone();
        let screen = LoadingScreen::new(presenter, SplashConfig::default(), (320.0, 240.0), 1.0);
        (screen, frames, releases)
    }

    #[test]
    fn layout_matches_reference_formula() {
        let config = SplashConfig::default();
        let layout = compute_layout(&config, 375.0, 812.0);
        assert_eq!(layout.bar_x, (375.0 - 240.0) / 2.0);
        assert_eq!(layout.bar_y, 812.0 - 20.0 - 30.0 - 30.0 - 25.0);
        assert_eq!(layout.icon_x, (375.0 - 74.0) / 2.0);
        assert_eq!(layout.icon_y, 812.0 - 20.0 - 30.0);
    }

    #[test]
    fn fill_width_stays_inside_the_bar() {
        let bar = splashconfig::BarConfig::default();
        let interior = bar.width - 2.0 * bar.padding;
        assert_eq!(fill_width(&bar, 0.0), 0.0);
        assert_eq!(fill_width(&bar, -0.5), 0.0);
        assert_eq!(fill_width(&bar, 1.0), interior);
        assert!((fill_width(&bar, 0.5) - interior / 2.0).abs() < 1e-4);
    }

    #[test]
    fn update_is_idempotent() {
        let (mut screen, frames, _releases) = screen_with_recorder();
        screen.attach_images(
            RgbaImage::from_pixel(8, 8, image::Rgba([20, 40, 80, 255])),
            RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255])),
        );
        screen.update(0.4, "Loading resources").unwrap();
        screen.update(0.4, "Loading resources").unwrap();
        let frames = frames.borrow();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], frames[1]);
    }

    #[test]
    fn zero_progress_skips_fill() {
        let (mut screen, frames, _releases) = screen_with_recorder();
        screen.update(0.0, "").unwrap();
        screen.update(0.5, "").unwrap();
        let frames = frames.borrow();
        // A visible fill changes the composition.
        assert_ne!(frames[0], frames[1]);
    }

    #[test]
    fn clean_twice_releases_once() {
        let (mut screen, _frames, releases) = screen_with_recorder();
        screen.update(0.2, "x").unwrap();
        screen.clean();
        screen.clean();
        assert_eq!(*releases.borrow(), 1);
        // Updates after clean are inert rather than panicking.
        screen.update(0.9, "y").unwrap();
    }

    #[test]
    fn hidden_icon_is_not_drawn() {
        let mut config = SplashConfig::default();
        config.icon.visible = false;
        let presenter = NullPresenter::default();
        let frames = presenter.frames.clone();
        let mut hidden = LoadingScreen::new(presenter, config, (320.0, 240.0), 1.0);

        let (mut visible, visible_frames, _releases) = screen_with_recorder();
        let background = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]));
        let logo = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        hidden.attach_images(background.clone(), logo.clone());
        visible.attach_images(background, logo);

        hidden.update(0.0, "").unwrap();
        visible.update(0.0, "").unwrap();
        assert_ne!(frames.borrow()[0], visible_frames.borrow()[0]);
    }
}
