//! Paint command list for a laid-out table

use crate::rendering::layout::{CanvasPlan, CellKind, Metrics, TableLayout};
use crate::rendering::text::TextRenderer;

pub const BLACK: [u8; 3] = [0, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];
pub const LABEL_FILL: [u8; 3] = [238, 238, 238];

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgb: [u8; 3],
    },
    /// Outline centered on the rectangle's edges
    StrokeRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        line_width: u32,
        rgb: [u8; 3],
    },
    /// One line of text; `y` is the baseline
    Text {
        x: f32,
        y: f32,
        text: String,
        rgb: [u8; 3],
    },
}

/// Emit fills, then outlines, then text for every cell, offset by the canvas origin.
///
/// Text lines are centered horizontally; the block of lines is centered
/// vertically in its cell.
pub fn paint_table(
    layout: &TableLayout,
    plan: &CanvasPlan,
    metrics: &Metrics,
    text: &mut TextRenderer<'_>,
) -> Vec<PaintCommand> {
    let mut fills = Vec::with_capacity(layout.cells.len());
    let mut strokes = Vec::with_capacity(layout.cells.len());
    let mut glyphs = Vec::new();
    let (ascent, descent) = text.vertical_metrics();

    for cell in &layout.cells {
        let x = plan.origin_x + cell.rect.x;
        let y = plan.origin_y + cell.rect.y;
        let fill = match cell.kind {
            CellKind::Data => WHITE,
            CellKind::ColumnLabel | CellKind::RowLabel => LABEL_FILL,
        };
        fills.push(PaintCommand::SolidRect {
            x,
            y,
            width: cell.rect.width,
            height: cell.rect.height,
            rgb: fill,
        });
        strokes.push(PaintCommand::StrokeRect {
            x,
            y,
            width: cell.rect.width,
            height: cell.rect.height,
            line_width: metrics.line_width,
            rgb: BLACK,
        });

        let block = metrics.line_height * cell.lines.len() as f32;
        let top = y as f32 + (cell.rect.height as f32 - block) / 2.0;
        let baseline_offset = (metrics.line_height - (ascent - descent)) / 2.0 + ascent;
        for (i, line) in cell.lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let width = text.measure(line);
            glyphs.push(PaintCommand::Text {
                x: x as f32 + (cell.rect.width as f32 - width) / 2.0,
                y: top + i as f32 * metrics.line_height + baseline_offset,
                text: line.clone(),
                rgb: BLACK,
            });
        }
    }

    fills.extend(strokes);
    fills.extend(glyphs);
    fills
}
