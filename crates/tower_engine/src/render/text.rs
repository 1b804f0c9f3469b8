//! Text layout
//!
//! Turns a string into one quad per glyph. Glyph metrics come from the font
//! and are scaled from the font's raster size to the requested size.

use crate::foundation::collections::TextureHandle;
use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::resources::Font;

/// Placement of one glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Character drawn
    pub character: char,
    /// Bitmap
    pub texture: TextureHandle,
    /// Bottom-left corner in pixels
    pub position: Vec2,
    /// Size in pixels
    pub size: Vec2,
}

impl GlyphQuad {
    /// Translate x scale matrix mapping the unit quad onto the glyph
    pub fn model_matrix(&self) -> Mat4 {
        let center = self.position + self.size * 0.5;
        Mat4::new_translation(&Vec3::new(center.x, center.y, 0.0))
            * Mat4::new_nonuniform_scaling(&Vec3::new(self.size.x, self.size.y, 1.0))
    }
}

/// Lay out `text` starting at `origin` with glyphs `font_size` pixels tall
///
/// `'\n'` returns to the origin's X and moves down by the font size.
/// Characters missing from the font are skipped.
#[allow(clippy::cast_precision_loss)]
pub fn layout_text(font: &Font, text: &str, origin: Vec2, font_size: f32) -> Vec<GlyphQuad> {
    let scale = if font.size == 0 { 1.0 } else { font_size / font.size as f32 };
    let mut pen = origin;
    let mut quads = Vec::with_capacity(text.len());

    for character in text.chars() {
        if character == '\n' {
            pen.x = origin.x;
            pen.y -= font_size;
            continue;
        }
        let Some(glyph) = font.glyph(character) else {
            continue;
        };
        let size = glyph.size * scale;
        let position = Vec2::new(
            pen.x + glyph.bearing.x * scale,
            pen.y - (glyph.size.y - glyph.bearing.y) * scale,
        );
        if size.x > 0.0 && size.y > 0.0 {
            quads.push(GlyphQuad {
                character,
                texture: glyph.texture,
                position,
                size,
            });
        }
        pen.x += glyph.advance * scale;
    }
    quads
}

/// Width and height of the laid out text's bounding box
pub fn measure_text(font: &Font, text: &str, font_size: f32) -> Vec2 {
    let quads = layout_text(font, text, Vec2::zeros(), font_size);
    let (mut min, mut max) = (Vec2::zeros(), Vec2::zeros());
    for quad in &quads {
        min = min.inf(&quad.position);
        max = max.sup(&(quad.position + quad.size));
    }
    max - min
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{PlaceholderLoader, ResourceManager};
    use approx::assert_relative_eq;

    fn font(resources: &mut ResourceManager) -> Font {
        let handle = resources.get_or_load_font("arial.ttf", 10).unwrap();
        resources.font(handle).unwrap().clone()
    }

    #[test]
    fn test_advance_and_newline() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let font = font(&mut resources);
        let quads = layout_text(&font, "ab\nc", Vec2::new(100.0, 50.0), 20.0);
        assert_eq!(quads.len(), 3);
        // placeholder glyphs advance 0.6 x size, scaled x2
        assert_relative_eq!(quads[0].position.x, 100.0);
        assert_relative_eq!(quads[1].position.x, 112.0);
        assert_relative_eq!(quads[2].position.x, 100.0);
        assert_relative_eq!(quads[2].position.y, quads[0].position.y - 20.0);
        assert_relative_eq!(quads[0].size, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_missing_glyphs_are_skipped() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let font = font(&mut resources);
        let quads = layout_text(&font, "a\u{e9}b", Vec2::zeros(), 10.0);
        // the accented character is not in the font
        assert_eq!(quads.len(), 2);
        assert_relative_eq!(quads[1].position.x, 6.0);
    }

    #[test]
    fn test_model_matrix_maps_unit_quad() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let font = font(&mut resources);
        let quad = layout_text(&font, "x", Vec2::new(10.0, 10.0), 10.0)[0];
        let corner = quad.model_matrix().transform_point(&nalgebra::Point3::new(-0.5, -0.5, 0.0));
        assert_relative_eq!(corner.x, quad.position.x, epsilon = 1e-5);
        assert_relative_eq!(corner.y, quad.position.y, epsilon = 1e-5);
    }

    #[test]
    fn test_measure_single_line() {
        let mut resources = ResourceManager::new(PlaceholderLoader);
        let font = font(&mut resources);
        let size = measure_text(&font, "aa", 10.0);
        assert_relative_eq!(size.x, 11.0);
        assert_relative_eq!(size.y, 10.0);
    }
}
