//! Glyph measurement and drawing over the font catalog fallback chain.

use crate::fonts::FontCatalog;
use crate::wrap::char_width;
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::RgbImage;
use std::collections::HashMap;

/// Measures and draws single lines of text at a fixed pixel size.
///
/// Lives for one job; the per-character face lookup is cached here rather
/// than in the shared catalog.
pub struct TextRenderer<'a> {
    catalog: &'a FontCatalog,
    font_px: f32,
    scale: PxScale,
    faces: HashMap<char, Option<&'a FontVec>>,
}

impl<'a> TextRenderer<'a> {
    pub fn new(catalog: &'a FontCatalog, font_px: f32) -> Self {
        Self {
            catalog,
            font_px,
            scale: PxScale::from(font_px),
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, c: char) -> Option<&'a FontVec> {
        let catalog = self.catalog;
        *self.faces.entry(c).or_insert_with(|| catalog.face_for(c))
    }

    /// Horizontal advance of `c` in pixels.
    pub fn advance(&mut self, c: char) -> f32 {
        match self.face(c) {
            Some(face) => face.as_scaled(self.scale).h_advance(face.glyph_id(c)),
            None => self.placeholder_advance(c),
        }
    }

    fn placeholder_advance(&self, c: char) -> f32 {
        match char_width(c) {
            0 => 0.0,
            2 => self.font_px,
            _ if c.is_whitespace() => self.font_px * 0.3,
            _ => self.font_px * 0.6,
        }
    }

    /// Width of a single line in pixels.
    pub fn measure(&mut self, line: &str) -> f32 {
        line.chars().map(|c| self.advance(c)).sum()
    }

    /// Ascent (positive) and descent (negative) used to place baselines.
    pub fn vertical_metrics(&self) -> (f32, f32) {
        match self.catalog.primary_face() {
            Some(face) => {
                let scaled = face.as_scaled(self.scale);
                (scaled.ascent(), scaled.descent())
            }
            None => (self.font_px * 0.8, -self.font_px * 0.2),
        }
    }

    /// Draw `line` starting at `x` with its baseline at `baseline`.
    pub fn draw_line(&mut self, canvas: &mut RgbImage, x: f32, baseline: f32, line: &str, rgb: [u8; 3]) {
        let mut cursor = x;
        for c in line.chars() {
            let advance = self.advance(c);
            if !c.is_whitespace() {
                match self.face(c) {
                    Some(face) => self.draw_glyph(canvas, face, c, cursor, baseline, rgb),
                    None => self.draw_placeholder(canvas, cursor, baseline, advance, rgb),
                }
            }
            cursor += advance;
        }
    }

    fn draw_glyph(&self, canvas: &mut RgbImage, face: &FontVec, c: char, x: f32, baseline: f32, rgb: [u8; 3]) {
        let glyph = face
            .glyph_id(c)
            .with_scale_and_position(self.scale, point(x, baseline));
        if let Some(outlined) = face.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                blend_pixel(canvas, px, py, rgb, coverage);
            });
        }
    }

    // No face covers this character: draw a solid box in its advance.
    fn draw_placeholder(&self, canvas: &mut RgbImage, x: f32, baseline: f32, advance: f32, rgb: [u8; 3]) {
        if advance <= 0.0 {
            return;
        }
        let left = (x + advance * 0.1).round() as i64;
        let right = (x + advance * 0.9).round() as i64;
        let top = (baseline - self.font_px * 0.7).round() as i64;
        let bottom = baseline.round() as i64;
        for py in top..bottom {
            for px in left..right {
                blend_pixel(canvas, px, py, rgb, 1.0);
            }
        }
    }
}

/// Blend `rgb` over the pixel at (`x`, `y`) with the given coverage; out-of-canvas writes are dropped.
pub fn blend_pixel(canvas: &mut RgbImage, x: i64, y: i64, rgb: [u8; 3], coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(rgb) {
        let blended = *dst as f32 + (src as f32 - *dst as f32) * alpha;
        *dst = blended.round() as u8;
    }
}
