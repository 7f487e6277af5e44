//! Offscreen 2D composition surface for the loading screen.
//!
//! The surface is a plain RGBA8 pixel buffer sized `logical * scale` so high
//! density displays get crisp output while callers keep drawing in logical
//! coordinates. Every frame of the progress UI is composed here on the CPU
//! (background, rounded progress bar, label, icon) and then handed to the GPU
//! presenter as raw texel data.
//!
//! Drawing is deterministic: composing the same inputs twice produces
//! bit-identical buffers, which the presenter relies on and the tests assert.

use image::RgbaImage;

mod color;
mod text;

pub use color::Color;
pub use text::LabelFont;

/// Axis-aligned rectangle in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Clamps a corner radius so the arcs of a rounded rectangle never
/// self-intersect, matching canvas `arcTo` behaviour on thin bars.
pub fn clamp_radius(radius: f32, width: f32, height: f32) -> f32 {
    radius.min(width / 2.0).min(height / 2.0).max(0.0)
}

/// Computes the draw rectangle that covers `window` completely while
/// preserving the aspect ratio of an `image_width` x `image_height` source,
/// centered on the window. Width-first fit, falling back to height-first when
/// the resulting height would leave uncovered rows.
pub fn cover_rect(
    image_width: f32,
    image_height: f32,
    window_width: f32,
    window_height: f32,
) -> Rect {
    let ratio = image_width / image_height;
    let mut draw_width = window_width;
    let mut draw_height = draw_width / ratio;
    if draw_height < window_height {
        draw_height = window_height;
        draw_width = draw_height * ratio;
    }
    Rect::new(
        (window_width - draw_width) / 2.0,
        (window_height - draw_height) / 2.0,
        draw_width,
        draw_height,
    )
}

/// Offscreen composition surface with device-pixel-ratio scaling baked in.
pub struct Surface {
    logical_width: f32,
    logical_height: f32,
    scale: f32,
    pixel_width: u32,
    pixel_height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(logical_width: f32, logical_height: f32, scale: f32) -> Self {
        let pixel_width = (logical_width * scale).round().max(1.0) as u32;
        let pixel_height = (logical_height * scale).round().max(1.0) as u32;
        Self {
            logical_width,
            logical_height,
            scale,
            pixel_width,
            pixel_height,
            pixels: vec![0; (pixel_width * pixel_height * 4) as usize],
        }
    }

    pub fn logical_size(&self) -> (f32, f32) {
        (self.logical_width, self.logical_height)
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Raw RGBA8 texel data, rows top to bottom.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Resets every texel to opaque black.
    pub fn clear(&mut self) {
        for texel in self.pixels.chunks_exact_mut(4) {
            texel.copy_from_slice(&[0, 0, 0, 255]);
        }
    }

    /// Fills a rounded rectangle, blending over existing content.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        let radius = clamp_radius(radius, rect.width, rect.height);
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = self.device_bounds(&rect);
        for py in y0..y1 {
            for px in x0..x1 {
                let lx = (px as f32 + 0.5) / self.scale;
                let ly = (py as f32 + 0.5) / self.scale;
                if rounded_rect_contains(&rect, radius, lx, ly) {
                    self.blend_texel(px, py, color);
                }
            }
        }
    }

    /// Draws `image` scaled to cover the whole surface, centered, aspect
    /// ratio preserved.
    pub fn blit_cover(&mut self, image: &RgbaImage) {
        let dest = cover_rect(
            image.width() as f32,
            image.height() as f32,
            self.logical_width,
            self.logical_height,
        );
        self.blit_scaled(image, dest);
    }

    /// Draws `image` scaled into `dest`, clipped to the surface.
    pub fn blit_scaled(&mut self, image: &RgbaImage, dest: Rect) {
        if dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = self.device_bounds(&dest);
        let src_width = image.width() as f32;
        let src_height = image.height() as f32;
        for py in y0..y1 {
            for px in x0..x1 {
                let lx = (px as f32 + 0.5) / self.scale;
                let ly = (py as f32 + 0.5) / self.scale;
                let u = ((lx - dest.x) / dest.width * src_width - 0.5)
                    .clamp(0.0, src_width - 1.0);
                let v = ((ly - dest.y) / dest.height * src_height - 0.5)
                    .clamp(0.0, src_height - 1.0);
                let sample = sample_bilinear(image, u, v);
                self.blend_texel(px, py, sample);
            }
        }
    }

    /// Multiplies a coverage value into `color` and blends it at a device
    /// pixel. Used by the text rasterizer.
    pub(crate) fn blend_coverage(&mut self, px: i64, py: i64, color: Color, coverage: f32) {
        if px < 0 || py < 0 || px >= self.pixel_width as i64 || py >= self.pixel_height as i64 {
            return;
        }
        let mut faded = color;
        faded.a *= coverage;
        self.blend_texel(px as u32, py as u32, faded);
    }

    fn device_bounds(&self, rect: &Rect) -> (u32, u32, u32, u32) {
        let x0 = (rect.x * self.scale).floor().max(0.0) as u32;
        let y0 = (rect.y * self.scale).floor().max(0.0) as u32;
        let x1 = (((rect.x + rect.width) * self.scale).ceil() as i64)
            .clamp(0, self.pixel_width as i64) as u32;
        let y1 = (((rect.y + rect.height) * self.scale).ceil() as i64)
            .clamp(0, self.pixel_height as i64) as u32;
        (x0, y0, x1, y1)
    }

    fn blend_texel(&mut self, px: u32, py: u32, color: Color) {
        let index = ((py * self.pixel_width + px) * 4) as usize;
        let texel = &mut self.pixels[index..index + 4];
        let alpha = color.a.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let blend = |src: f32, dst: u8| -> u8 {
            let dst = dst as f32 / 255.0;
            ((src * alpha + dst * (1.0 - alpha)) * 255.0).round() as u8
        };
        texel[0] = blend(color.r, texel[0]);
        texel[1] = blend(color.g, texel[1]);
        texel[2] = blend(color.b, texel[2]);
        let dst_a = texel[3] as f32 / 255.0;
        texel[3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
    }
}

fn rounded_rect_contains(rect: &Rect, radius: f32, x: f32, y: f32) -> bool {
    if x < rect.x || y < rect.y || x > rect.x + rect.width || y > rect.y + rect.height {
        return false;
    }
    if radius <= 0.0 {
        return true;
    }
    let cx = x.clamp(rect.x + radius, rect.x + rect.width - radius);
    let cy = y.clamp(rect.y + radius, rect.y + rect.height - radius);
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= radius * radius
}

fn sample_bilinear(image: &RgbaImage, u: f32, v: f32) -> Color {
    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;

    let texel = |x: u32, y: u32| -> [f32; 4] {
        let p = image.get_pixel(x, y).0;
        [
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
            p[3] as f32 / 255.0,
        ]
    };

    let top = lerp4(texel(x0, y0), texel(x1, y0), fx);
    let bottom = lerp4(texel(x0, y1), texel(x1, y1), fx);
    let out = lerp4(top, bottom, fy);
    Color::rgba(out[0], out[1], out[2], out[3])
}

fn lerp4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba(rgba))
    }

    #[test]
    fn radius_clamps_to_half_extent() {
        assert_eq!(clamp_radius(20.0, 240.0, 25.0), 12.5);
        assert_eq!(clamp_radius(5.0, 240.0, 25.0), 5.0);
        assert_eq!(clamp_radius(100.0, 10.0, 400.0), 5.0);
        assert_eq!(clamp_radius(-3.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn cover_rect_covers_window_and_preserves_ratio() {
        let cases = [
            (100.0, 50.0, 320.0, 240.0),
            (50.0, 100.0, 320.0, 240.0),
            (640.0, 480.0, 1920.0, 1080.0),
            (1000.0, 1000.0, 375.0, 812.0),
        ];
        for (iw, ih, ww, wh) in cases {
            let rect = cover_rect(iw, ih, ww, wh);
            assert!(rect.width >= ww - 1e-3 && rect.height >= wh - 1e-3);
            assert!(rect.x <= 1e-3 && rect.y <= 1e-3);
            assert!(rect.x + rect.width >= ww - 1e-3);
            assert!(rect.y + rect.height >= wh - 1e-3);
            let ratio = rect.width / rect.height;
            assert!((ratio - iw / ih).abs() < 1e-3, "ratio distorted: {ratio}");
        }
    }

    #[test]
    fn compose_is_bit_identical_for_identical_input() {
        let draw = || {
            let mut surface = Surface::new(120.0, 80.0, 2.0);
            surface.clear();
            surface.blit_cover(&solid_image(30, 20, [10, 60, 200, 255]));
            surface.fill_rounded_rect(
                Rect::new(10.0, 50.0, 100.0, 12.0),
                20.0,
                Color::rgba(0.0, 0.0, 0.0, 0.5),
            );
            surface.fill_rounded_rect(
                Rect::new(12.0, 52.0, 48.0, 8.0),
                18.0,
                Color::rgb(0.3, 0.7, 0.3),
            );
            surface.pixels().to_vec()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn rounded_rect_leaves_corner_pixels_untouched() {
        let mut surface = Surface::new(40.0, 40.0, 1.0);
        surface.clear();
        surface.fill_rounded_rect(Rect::new(0.0, 0.0, 40.0, 40.0), 10.0, Color::WHITE);
        let pixels = surface.pixels();
        // Corner texel lies outside the arc, center inside.
        assert_eq!(&pixels[0..3], &[0, 0, 0]);
        let center = ((20 * 40 + 20) * 4) as usize;
        assert_eq!(&pixels[center..center + 3], &[255, 255, 255]);
    }

    #[test]
    fn zero_width_fill_draws_nothing() {
        let mut surface = Surface::new(20.0, 20.0, 1.0);
        surface.clear();
        let before = surface.pixels().to_vec();
        surface.fill_rounded_rect(Rect::new(5.0, 5.0, 0.0, 10.0), 4.0, Color::WHITE);
        assert_eq!(surface.pixels(), before.as_slice());
    }

    #[test]
    fn blit_cover_fills_every_texel() {
        let mut surface = Surface::new(64.0, 48.0, 1.0);
        surface.clear();
        surface.blit_cover(&solid_image(16, 32, [200, 10, 10, 255]));
        for texel in surface.pixels().chunks_exact(4) {
            assert_eq!(texel, &[200, 10, 10, 255]);
        }
    }

    #[test]
    fn scale_factor_grows_backing_store() {
        let surface = Surface::new(100.0, 50.0, 3.0);
        assert_eq!(surface.pixel_size(), (300, 150));
        assert_eq!(surface.logical_size(), (100.0, 50.0));
    }
}
