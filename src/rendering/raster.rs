//! Rasterizer: executes paint commands onto an RGB canvas.

use crate::rendering::paint::{PaintCommand, WHITE};
use crate::rendering::text::TextRenderer;
use image::{Rgb, RgbImage};

/// Draw `commands` in order onto a fresh white canvas of the given size.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand], text: &mut TextRenderer<'_>) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, Rgb(WHITE));
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgb } => {
                fill_rect(&mut canvas, *x as i64, *y as i64, *width as i64, *height as i64, *rgb);
            }
            PaintCommand::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                rgb,
            } => stroke_rect(&mut canvas, *x, *y, *width, *height, *line_width, *rgb),
            PaintCommand::Text { x, y, text: line, rgb } => {
                text.draw_line(&mut canvas, *x, *y, line, *rgb);
            }
        }
    }
    canvas
}

/// Fill a rectangle, clipped to the canvas.
pub fn fill_rect(canvas: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, rgb: [u8; 3]) {
    let x0 = x.clamp(0, canvas.width() as i64) as u32;
    let y0 = y.clamp(0, canvas.height() as i64) as u32;
    let x1 = (x + width).clamp(0, canvas.width() as i64) as u32;
    let y1 = (y + height).clamp(0, canvas.height() as i64) as u32;
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, Rgb(rgb));
        }
    }
}

fn stroke_rect(canvas: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, line_width: u32, rgb: [u8; 3]) {
    let (x, y, w, h, lw) = (x as i64, y as i64, width as i64, height as i64, line_width as i64);
    let half = lw / 2;
    fill_rect(canvas, x - half, y - half, w + lw, lw, rgb);
    fill_rect(canvas, x - half, y + h - half, w + lw, lw, rgb);
    fill_rect(canvas, x - half, y - half, lw, h + lw, rgb);
    fill_rect(canvas, x + w - half, y - half, lw, h + lw, rgb);
}
