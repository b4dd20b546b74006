//! tablepix
//!
//! Converts loosely-structured HTML table fragments into a single cropped PNG
//! image, for messaging clients that cannot display HTML tables.
//!
//! # Pipeline
//!
//! - **Grid**: the first `<table>` is flattened into a rectangular grid with
//!   optional row and column labels ([`grid`])
//! - **Wrap**: cell text is wrapped to a CJK-aware width budget ([`wrap`])
//! - **Layout & raster**: rows and columns are sized from the wrapped text and
//!   drawn with the [`FontCatalog`] fallback chain ([`rendering`])
//! - **Crop**: the canvas is trimmed to its content with a bounded aspect
//!   ratio and encoded as PNG ([`rendering::crop`])
//!
//! All rendering runs on one dedicated worker thread ([`RenderExecutor`]).
//! Producing no image is a normal outcome: render calls return `None` and
//! never an error.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() {
//! let html = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";
//! if let Some(png) = tablepix::convert_table_to_png(html).await {
//!     std::fs::write("table.png", png).unwrap();
//! }
//! # }
//! ```

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub mod error;
pub use error::{Error, RenderFailure, Result};

pub mod fonts;
pub use fonts::FontCatalog;

pub mod grid;
pub use grid::TableGrid;

pub mod wrap;

// Layout, rasterization and cropping
pub mod rendering;
pub use rendering::{RenderedTable, TablePipeline};

// Single-worker async bridge
pub mod async_api;
pub use async_api::{RenderBackend, RenderExecutor};

/// Rendering policy, fixed when a pipeline or executor is built.
///
/// None of these are exposed on the render call itself; they exist so the
/// process can pick its policy once at startup.
///
/// # Examples
///
/// ```
/// let cfg = tablepix::RenderConfig::default();
/// assert_eq!(cfg.max_aspect_ratio, 15);
/// assert_eq!(cfg.wrap_budget, 85);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Raster resolution in dots per inch
    pub dpi: f32,
    /// Cell font size in points
    pub font_size_pt: f32,
    /// Horizontal padding inside each cell, in points
    pub cell_padding_pt: f32,
    /// Cell border width in points
    pub line_width_pt: f32,
    /// Line height as a multiple of the font size
    pub line_spacing: f32,
    /// Blank space around the table on the canvas, in pixels
    pub outer_margin_px: u32,
    /// Largest canvas side in pixels; bigger tables are rejected
    pub max_canvas_px: u32,
    /// Characters per row shared between columns when wrapping
    pub wrap_budget: usize,
    /// Lower bound for the per-cell wrap length
    pub min_wrap_length: usize,
    /// Margin kept around the detected content when cropping, in pixels
    pub crop_margin_px: u32,
    /// Largest allowed width:height (and height:width) of the output
    pub max_aspect_ratio: u32,
    /// Red channel values below this count as content when cropping
    pub darkness_threshold: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 200.0,
            font_size_pt: 10.0,
            cell_padding_pt: 4.0,
            line_width_pt: 1.0,
            line_spacing: 1.2,
            outer_margin_px: 50,
            max_canvas_px: 4000,
            wrap_budget: 85,
            min_wrap_length: 10,
            crop_margin_px: 15,
            max_aspect_ratio: 15,
            darkness_threshold: 128,
        }
    }
}

impl RenderConfig {
    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: RenderConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make layout or cropping meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.dpi > 0.0 && self.font_size_pt > 0.0 && self.line_spacing > 0.0) {
            return Err(Error::ConfigError(
                "dpi, font_size_pt and line_spacing must be positive".into(),
            ));
        }
        if self.max_aspect_ratio == 0 || self.max_canvas_px == 0 {
            return Err(Error::ConfigError(
                "max_aspect_ratio and max_canvas_px must be non-zero".into(),
            ));
        }
        if self.min_wrap_length == 0 {
            return Err(Error::ConfigError("min_wrap_length must be non-zero".into()));
        }
        Ok(())
    }
}

static GLOBAL_EXECUTOR: OnceLock<Option<RenderExecutor>> = OnceLock::new();

/// Build the process-wide executor with `config`.
///
/// The system font scan starts on the worker thread right away, so calling
/// this at startup keeps it off the path of the first render. Fails if the
/// executor already exists.
pub fn init(config: RenderConfig) -> Result<()> {
    config.validate()?;
    let executor = RenderExecutor::with_system_fonts(config)?;
    GLOBAL_EXECUTOR
        .set(Some(executor))
        .map_err(|_| Error::InitializationError("renderer already initialized".into()))
}

/// Render the first table of `html` to PNG bytes on the process-wide executor.
///
/// Returns `None` whenever no image can be produced.
pub async fn convert_table_to_png(html: &str) -> Option<Vec<u8>> {
    let executor = GLOBAL_EXECUTOR.get_or_init(|| {
        match RenderExecutor::with_system_fonts(RenderConfig::default()) {
            Ok(executor) => Some(executor),
            Err(e) => {
                warn!("Table renderer unavailable: {}", e);
                None
            }
        }
    });
    match executor {
        Some(executor) => executor.submit(html).await,
        None => None,
    }
}
