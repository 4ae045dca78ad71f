use thiserror::Error;

/// Errors surfaced by the detection pipeline
///
/// Input errors stop a run before any stage executes. Fit errors are
/// stage-local: the pipeline abandons the current candidate and moves on.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EdError {
    /// Raster with zero width or height
    #[error("image has zero area ({width}x{height})")]
    EmptyImage {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },
    /// Pixel buffer length disagrees with the declared dimensions
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSizeMismatch {
        /// `width * height`
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },
    /// Gradient planes do not match the raster they belong to
    #[error("gradient field is {field_width}x{field_height}, image is {image_width}x{image_height}")]
    DimensionMismatch {
        /// Gradient field width
        field_width: usize,
        /// Gradient field height
        field_height: usize,
        /// Raster width
        image_width: usize,
        /// Raster height
        image_height: usize,
    },
    /// Rejected configuration value
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// A fit was requested on too small a point set
    #[error("{shape} fit needs at least {needed} points, got {actual}")]
    TooFewPoints {
        /// Model being fitted
        shape: &'static str,
        /// Minimum point count
        needed: usize,
        /// Supplied point count
        actual: usize,
    },
    /// The normal equations of a fit are singular
    #[error("degenerate {shape} fit")]
    DegenerateFit {
        /// Model being fitted
        shape: &'static str,
    },
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, EdError>;
