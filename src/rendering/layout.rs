//! Table layout: track sizes from wrapped cell text, cell rectangles, and the
//! canvas the table is drawn on.

use crate::grid::TableGrid;
use crate::rendering::text::TextRenderer;
use crate::{RenderConfig, RenderFailure};

/// Each wrapped line beyond the first adds this fraction of the base height.
const LINE_FACTOR: f32 = 0.75;
/// Fixed share of the base height, so one line gives exactly the base height.
const BASE_FACTOR: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Data,
    ColumnLabel,
    RowLabel,
}

/// A positioned cell. `rect` is relative to the table's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub rect: Rect,
    pub lines: Vec<String>,
    pub kind: CellKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub column_widths: Vec<u32>,
    pub row_heights: Vec<u32>,
    pub cells: Vec<LayoutCell>,
}

impl TableLayout {
    pub fn width(&self) -> u32 {
        self.column_widths.iter().sum()
    }

    pub fn height(&self) -> u32 {
        self.row_heights.iter().sum()
    }
}

/// Canvas size and where the table's top-left corner lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPlan {
    pub width: u32,
    pub height: u32,
    pub origin_x: i32,
    pub origin_y: i32,
}

/// Pixel sizes derived from the config at its DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub font_px: f32,
    pub line_height: f32,
    pub base_height: f32,
    pub padding_x: f32,
    pub line_width: u32,
}

impl Metrics {
    pub fn from_config(config: &RenderConfig) -> Self {
        let px_per_pt = config.dpi / 72.0;
        let font_px = config.font_size_pt * px_per_pt;
        let line_height = font_px * config.line_spacing;
        Self {
            font_px,
            line_height,
            base_height: line_height / LINE_FACTOR,
            padding_x: config.cell_padding_pt * px_per_pt,
            line_width: ((config.line_width_pt * px_per_pt).round() as u32).max(1),
        }
    }
}

/// Height a cell with `line_count` wrapped lines needs.
pub fn required_height(base_height: f32, line_count: usize) -> f32 {
    base_height * (line_count as f32 * LINE_FACTOR + BASE_FACTOR)
}

pub struct LayoutEngine<'a> {
    config: &'a RenderConfig,
    metrics: Metrics,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            metrics: Metrics::from_config(config),
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Size every track and position every cell of a wrapped grid.
    ///
    /// Columns auto-fit their widest line; rows take the tallest cell. A header
    /// row is added for column labels and a leading column for row labels.
    pub fn layout(&self, grid: &TableGrid, text: &mut TextRenderer<'_>) -> TableLayout {
        let header = usize::from(!grid.column_labels().is_empty());
        let label_col = usize::from(!grid.row_labels().is_empty());
        let n_rows = grid.max_rows() + header;
        let n_cols = grid.max_columns() + label_col;

        let mut placed: Vec<(usize, usize, CellKind, &str)> = Vec::with_capacity(n_rows * n_cols);
        for (j, label) in grid.column_labels().iter().enumerate() {
            placed.push((0, j + label_col, CellKind::ColumnLabel, label.as_str()));
        }
        for (i, label) in grid.row_labels().iter().enumerate() {
            placed.push((i + header, 0, CellKind::RowLabel, label.as_str()));
        }
        for (i, row) in grid.cells().iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                placed.push((i + header, j + label_col, CellKind::Data, cell.as_str()));
            }
        }

        let mut widths = vec![0f32; n_cols];
        let mut heights = vec![0f32; n_rows];
        let mut cells = Vec::with_capacity(placed.len());
        for (row, col, kind, content) in placed {
            let lines: Vec<String> = content.split('\n').map(str::to_string).collect();
            let widest = lines.iter().map(|l| text.measure(l)).fold(0f32, f32::max);
            widths[col] = widths[col].max(widest + 2.0 * self.metrics.padding_x);
            heights[row] = heights[row].max(required_height(self.metrics.base_height, lines.len()));
            cells.push((row, col, kind, lines));
        }

        let column_widths: Vec<u32> = widths.iter().map(|w| w.ceil().max(1.0) as u32).collect();
        let row_heights: Vec<u32> = heights.iter().map(|h| h.ceil().max(1.0) as u32).collect();
        let x_offsets = offsets(&column_widths);
        let y_offsets = offsets(&row_heights);

        let cells = cells
            .into_iter()
            .map(|(row, col, kind, lines)| LayoutCell {
                rect: Rect {
                    x: x_offsets[col],
                    y: y_offsets[row],
                    width: column_widths[col],
                    height: row_heights[row],
                },
                lines,
                kind,
            })
            .collect();

        TableLayout {
            column_widths,
            row_heights,
            cells,
        }
    }

    /// Pick the canvas for a layout, or reject it as too large.
    ///
    /// The canvas is the table plus the outer margin, widened or heightened so
    /// its own aspect ratio is within the crop limit.
    pub fn plan_canvas(&self, layout: &TableLayout) -> Result<CanvasPlan, RenderFailure> {
        let (table_w, table_h) = (layout.width(), layout.height());
        let margin = self.config.outer_margin_px.saturating_mul(2);
        let need_w = table_w.saturating_add(margin);
        let need_h = table_h.saturating_add(margin);
        let limit = self.config.max_canvas_px;
        if need_w > limit || need_h > limit {
            return Err(RenderFailure::RenderOverflow {
                width: need_w,
                height: need_h,
                limit,
            });
        }

        let ratio = self.config.max_aspect_ratio.max(1);
        let width = need_w.max(need_h.div_ceil(ratio));
        let height = need_h.max(width.div_ceil(ratio));
        Ok(CanvasPlan {
            width,
            height,
            origin_x: ((width - table_w) / 2) as i32,
            origin_y: ((height - table_h) / 2) as i32,
        })
    }
}

fn offsets(sizes: &[u32]) -> Vec<i32> {
    sizes
        .iter()
        .scan(0i32, |acc, &size| {
            let start = *acc;
            *acc += size as i32;
            Some(start)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontCatalog;

    fn grid(html: &str) -> TableGrid {
        TableGrid::from_html(html).unwrap()
    }

    #[test]
    fn single_line_rows_keep_base_height() {
        assert!((required_height(40.0, 1) - 40.0).abs() < 1e-4);
        assert!((required_height(40.0, 2) - 70.0).abs() < 1e-4);
        assert!((required_height(40.0, 3) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn labels_add_tracks() {
        let config = RenderConfig::default();
        let catalog = FontCatalog::empty();
        let engine = LayoutEngine::new(&config);
        let mut text = TextRenderer::new(&catalog, engine.metrics().font_px);
        let g = grid("<table><tr><th>A</th><th>B</th></tr><tr><th>r</th><td>1</td><td>2</td></tr></table>");
        let layout = engine.layout(&g, &mut text);
        assert_eq!(layout.row_heights.len(), 2);
        assert_eq!(layout.column_widths.len(), 3);
        // 2 column labels + 1 row label + 2 data cells, corner left empty
        assert_eq!(layout.cells.len(), 5);
        assert!(layout
            .cells
            .iter()
            .all(|c| !(c.rect.x == 0 && c.rect.y == 0)));
    }

    #[test]
    fn wrapped_cells_grow_their_row() {
        let config = RenderConfig::default();
        let catalog = FontCatalog::empty();
        let engine = LayoutEngine::new(&config);
        let mut text = TextRenderer::new(&catalog, engine.metrics().font_px);
        let g = TableGrid::from_parts(
            vec![],
            vec![],
            vec![
                vec!["one".into(), "a\nb\nc".into()],
                vec!["x".into(), "y".into()],
            ],
        )
        .unwrap();
        let layout = engine.layout(&g, &mut text);
        let base = engine.metrics().base_height;
        assert_eq!(layout.row_heights[0], required_height(base, 3).ceil() as u32);
        assert_eq!(layout.row_heights[1], base.ceil() as u32);
        assert!(layout.column_widths[0] > layout.column_widths[1]);
    }

    #[test]
    fn oversized_tables_overflow() {
        let config = RenderConfig {
            max_canvas_px: 300,
            ..Default::default()
        };
        let catalog = FontCatalog::empty();
        let engine = LayoutEngine::new(&config);
        let mut text = TextRenderer::new(&catalog, engine.metrics().font_px);
        let row: Vec<String> = (0..20).map(|i| format!("cell {}", i)).collect();
        let g = TableGrid::from_parts(vec![], vec![], vec![row]).unwrap();
        let layout = engine.layout(&g, &mut text);
        let err = engine.plan_canvas(&layout).unwrap_err();
        assert!(matches!(err, RenderFailure::RenderOverflow { limit: 300, .. }));
    }

    #[test]
    fn canvas_respects_aspect_limit() {
        let config = RenderConfig::default();
        let engine = LayoutEngine::new(&config);
        let layout = TableLayout {
            column_widths: vec![100; 30],
            row_heights: vec![40],
            cells: vec![],
        };
        let plan = engine.plan_canvas(&layout).unwrap();
        assert_eq!(plan.width, 3100);
        assert_eq!(plan.height, 3100u32.div_ceil(15));
        assert_eq!(plan.origin_x, 50);
        assert!(plan.origin_y >= 50);
    }
}
