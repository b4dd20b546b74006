//! Content bounding box detection, aspect-ratio clamping and PNG encoding.

use crate::error::RenderFailure;
use image::{imageops, ImageFormat, RgbImage};
use serde::Serialize;
use std::io::Cursor;

/// A sub-rectangle of the canvas. `right` and `lower` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropWindow {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl CropWindow {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.lower - self.upper
    }
}

/// Tight box around every pixel whose red channel is below `threshold`.
pub fn content_bounds(canvas: &RgbImage, threshold: u8) -> Option<CropWindow> {
    let mut bounds: Option<CropWindow> = None;
    for (x, y, pixel) in canvas.enumerate_pixels() {
        if pixel.0[0] >= threshold {
            continue;
        }
        let b = bounds.get_or_insert(CropWindow {
            left: x,
            upper: y,
            right: x + 1,
            lower: y + 1,
        });
        b.left = b.left.min(x);
        b.right = b.right.max(x + 1);
        b.upper = b.upper.min(y);
        b.lower = b.lower.max(y + 1);
    }
    bounds
}

/// Cropping policy for one canvas.
#[derive(Debug, Clone, Copy)]
pub struct Cropper {
    pub margin: u32,
    pub max_aspect_ratio: u32,
    pub threshold: u8,
}

impl Cropper {
    /// Compute the final crop window: content box, plus margin, with the
    /// short side stretched around its midpoint until the ratio limit holds.
    pub fn window(&self, canvas: &RgbImage) -> Result<CropWindow, RenderFailure> {
        let (canvas_w, canvas_h) = canvas.dimensions();
        let content = content_bounds(canvas, self.threshold).ok_or(RenderFailure::BoundaryNotFound)?;

        let mut window = CropWindow {
            left: content.left.saturating_sub(self.margin),
            upper: content.upper.saturating_sub(self.margin),
            right: content.right.saturating_add(self.margin).min(canvas_w),
            lower: content.lower.saturating_add(self.margin).min(canvas_h),
        };

        let ratio = self.max_aspect_ratio.max(1);
        let (width, height) = (window.width(), window.height());
        if width as u64 > height as u64 * ratio as u64 {
            let (upper, lower) = stretch(window.upper, window.lower, width.div_ceil(ratio), canvas_h);
            window.upper = upper;
            window.lower = lower;
        } else if height as u64 > width as u64 * ratio as u64 {
            let (left, right) = stretch(window.left, window.right, height.div_ceil(ratio), canvas_w);
            window.left = left;
            window.right = right;
        }
        Ok(window)
    }
}

/// Grow `start..end` to `len` around its midpoint, sliding it back inside `0..extent`.
fn stretch(start: u32, end: u32, len: u32, extent: u32) -> (u32, u32) {
    let len = len.min(extent);
    let middle = (start + end) / 2;
    let begin = middle.saturating_sub(len / 2).min(extent - len);
    (begin, begin + len)
}

/// Crop `canvas` to `window` and encode it as PNG.
pub fn encode_png(canvas: &RgbImage, window: CropWindow) -> Result<Vec<u8>, RenderFailure> {
    let cropped = imageops::crop_imm(canvas, window.left, window.upper, window.width(), window.height()).to_image();
    let mut buf = Cursor::new(Vec::new());
    cropped.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
