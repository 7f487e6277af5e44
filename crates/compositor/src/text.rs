//! CPU label rasterization with fontdue, per fontdue's baseline/bearing
//! conventions. Glyphs are rasterized at device resolution so scaled surfaces
//! stay sharp.

use crate::{Color, Surface};

#[derive(Debug, thiserror::Error)]
#[error("failed to load label font: {0}")]
pub struct FontError(String);

/// A loaded face used for the progress label.
pub struct LabelFont {
    font: fontdue::Font,
}

impl LabelFont {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|err| FontError(err.to_string()))?;
        Ok(Self { font })
    }

    /// Advance width of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|ch| self.font.metrics(ch, size).advance_width)
            .sum()
    }

    /// Rasterizes `text` centered on `(center_x, center_y)` in logical
    /// coordinates, blending glyph coverage into the surface.
    pub fn draw_centered(
        &self,
        surface: &mut Surface,
        text: &str,
        size: f32,
        color: Color,
        center_x: f32,
        center_y: f32,
    ) {
        let scale = surface.scale();
        let px_size = size * scale;
        let total_width = self.measure(text, px_size);
        let baseline = match self.font.horizontal_line_metrics(px_size) {
            Some(line) => center_y * scale + (line.ascent + line.descent) / 2.0,
            None => center_y * scale + px_size / 2.0,
        };

        let mut pen_x = center_x * scale - total_width / 2.0;
        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, px_size);
            let left = (pen_x + metrics.xmin as f32).round() as i64;
            let top = (baseline - (metrics.ymin + metrics.height as i32) as f32).round() as i64;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let value = coverage[row * metrics.width + col];
                    if value == 0 {
                        continue;
                    }
                    surface.blend_coverage(
                        left + col as i64,
                        top + row as i64,
                        color,
                        value as f32 / 255.0,
                    );
                }
            }
            pen_x += metrics.advance_width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_font_bytes() {
        assert!(LabelFont::from_bytes(&[0, 1, 2, 3]).is_err());
    }
}
