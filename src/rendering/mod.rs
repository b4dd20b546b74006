//! Rendering pipeline: grid → wrapped grid → layout → paint → raster → crop

pub mod crop;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod text;

use crate::error::RenderFailure;
use crate::fonts::FontCatalog;
use crate::grid::TableGrid;
use crate::wrap::{wrap_length, wrap_text};
use crate::RenderConfig;
use crop::{CropWindow, Cropper};
use image::RgbImage;
use layout::LayoutEngine;
use log::debug;
use std::sync::Arc;
use text::TextRenderer;

/// A successfully rendered table.
#[derive(Debug, Clone)]
pub struct RenderedTable {
    /// Where the output was cut from the full canvas
    pub window: CropWindow,
    /// Size of the full canvas before cropping
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub png_data: Vec<u8>,
}

impl RenderedTable {
    pub fn width(&self) -> u32 {
        self.window.width()
    }

    pub fn height(&self) -> u32 {
        self.window.height()
    }
}

/// The synchronous table renderer. Not meant to be shared between threads
/// while rendering; the executor gives it to a single worker.
#[derive(Debug, Clone)]
pub struct TablePipeline {
    catalog: Arc<FontCatalog>,
    config: RenderConfig,
}

impl TablePipeline {
    pub fn new(catalog: Arc<FontCatalog>, config: RenderConfig) -> Self {
        Self { catalog, config }
    }

    /// Parse `html` and wrap every cell to the grid's wrap length.
    pub fn wrapped_grid(&self, html: &str) -> Result<TableGrid, RenderFailure> {
        let grid = TableGrid::from_html(html)?;
        let width = wrap_length(grid.max_columns(), self.config.wrap_budget, self.config.min_wrap_length);
        Ok(grid.map_text(|cell| wrap_text(cell, width)))
    }

    /// Lay out and rasterize a wrapped grid. One attempt: an oversized layout
    /// fails with `RenderOverflow`.
    pub fn rasterize(&self, grid: &TableGrid) -> Result<RgbImage, RenderFailure> {
        let engine = LayoutEngine::new(&self.config);
        let mut text = TextRenderer::new(&self.catalog, engine.metrics().font_px);
        let table = engine.layout(grid, &mut text);
        let plan = engine.plan_canvas(&table)?;
        let commands = paint::paint_table(&table, &plan, engine.metrics(), &mut text);
        Ok(raster::rasterize(plan.width, plan.height, &commands, &mut text))
    }

    pub fn cropper(&self) -> Cropper {
        Cropper {
            margin: self.config.crop_margin_px,
            max_aspect_ratio: self.config.max_aspect_ratio,
            threshold: self.config.darkness_threshold,
        }
    }

    /// Run the whole pipeline, reporting why no image was produced.
    pub fn render(&self, html: &str) -> Result<RenderedTable, RenderFailure> {
        let grid = self.wrapped_grid(html)?;
        let canvas = self.rasterize(&grid)?;
        let window = self.cropper().window(&canvas)?;
        let png_data = crop::encode_png(&canvas, window)?;
        Ok(RenderedTable {
            window,
            canvas_width: canvas.width(),
            canvas_height: canvas.height(),
            png_data,
        })
    }

    /// Run the pipeline, logging and discarding any failure.
    pub fn render_png(&self, html: &str) -> Option<Vec<u8>> {
        match self.render(html) {
            Ok(table) => Some(table.png_data),
            Err(failure) => {
                debug!(
                    "Drawing table failed ({}): {} [input: {} bytes]",
                    failure.kind(),
                    failure,
                    html.len()
                );
                None
            }
        }
    }
}
