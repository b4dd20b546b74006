//! Error types for the table renderer

use thiserror::Error;

/// Result type alias for construction and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up the renderer.
///
/// These never come out of a render call: a job that cannot produce an image
/// reports a [`RenderFailure`] internally and resolves to `None`.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to start the render worker
    #[error("Renderer initialization failed: {0}")]
    InitializationError(String),

    /// Invalid or unreadable configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The render worker has stopped
    #[error("Render worker unavailable: {0}")]
    WorkerUnavailable(String),
}

/// Why a single render job produced no image.
///
/// Failures are deterministic for a given input and font catalog, so callers
/// should fall back to another representation instead of retrying.
#[derive(Error, Debug)]
pub enum RenderFailure {
    /// The input contains no `<table>` element
    #[error("no <table> element found")]
    NoTableFound,

    /// The table has neither labels nor data cells
    #[error("table has no labels and no data cells")]
    EmptyTable,

    /// A computed grid dimension is zero
    #[error("degenerate table dimensions: {rows} rows x {columns} columns")]
    DegenerateDimensions { rows: usize, columns: usize },

    /// The laid-out table does not fit within the canvas bound
    #[error("table layout {width}x{height}px exceeds the {limit}px canvas bound")]
    RenderOverflow { width: u32, height: u32, limit: u32 },

    /// The rasterized canvas has no pixel darker than the threshold
    #[error("failed to find the table boundaries")]
    BoundaryNotFound,

    /// PNG encoding of the cropped canvas failed
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl RenderFailure {
    /// Short stable name of the failure kind, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderFailure::NoTableFound => "NoTableFound",
            RenderFailure::EmptyTable => "EmptyTable",
            RenderFailure::DegenerateDimensions { .. } => "DegenerateDimensions",
            RenderFailure::RenderOverflow { .. } => "RenderOverflow",
            RenderFailure::BoundaryNotFound => "BoundaryNotFound",
            RenderFailure::Encode(_) => "Encode",
        }
    }
}
