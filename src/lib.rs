//! Edge Drawing - parameter-free detection of edge segments, lines, arcs,
//! circles and ellipses in grayscale images
//!
//! The pipeline smooths the raster, computes a gradient field, links anchors
//! into one-pixel-wide chains, keeps the chains that pass an a-contrario
//! test and then fits lines, arcs and conics to them.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Tunable pipeline parameters and their environment overrides
pub mod config;
/// Detection stages (anchors, linking, validation, fitting, merging)
pub mod detector;
/// Error type shared by every entry point
pub mod error;
/// Core data structures (GrayImage, EdgeSegment, Line, Circle, etc.)
pub mod models;
/// Stage orchestration and run statistics
pub mod pipeline;
/// Image IO, synthetic scenes and overlays
pub mod tools;
/// Utility functions (smoothing, gradients, angles, NFA arithmetic)
pub mod utils;

pub use config::EdParams;
pub use error::{EdError, Result};
pub use models::{Arc, Circle, EdgeSegment, Ellipse, GrayImage, Line, Point};
pub use pipeline::{Detection, PipelineMode, PipelineStats};

use log::{debug, warn};

use utils::filters::gaussian_blur;
use utils::gradient::GradientField;

/// Detect segments, lines, arcs, circles and ellipses in a grayscale buffer
///
/// # Arguments
/// * `image` - Raw grayscale bytes (1 byte per pixel, row-major)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
pub fn detect(image: &[u8], width: usize, height: usize) -> Result<Detection> {
    Detector::default().detect(image, width, height)
}

/// Detect only edge segments and lines
pub fn detect_lines(image: &[u8], width: usize, height: usize) -> Result<Vec<Line>> {
    Detector::default().detect_lines(image, width, height)
}

/// Full detection with explicit parameters
pub fn detect_with_params(image: &[u8], width: usize, height: usize, params: &EdParams) -> Result<Detection> {
    Detector::with_params(params.clone()).detect(image, width, height)
}

/// Full detection on an externally computed gradient field
///
/// `smoothed` is the raster the field was computed from; circle and ellipse
/// validation samples it directly.
pub fn detect_from_gradient(smoothed: &GrayImage, field: &GradientField, params: &EdParams) -> Result<Detection> {
    params.validate()?;
    if field.width() != smoothed.width() || field.height() != smoothed.height() {
        return Err(EdError::DimensionMismatch {
            field_width: field.width(),
            field_height: field.height(),
            image_width: smoothed.width(),
            image_height: smoothed.height(),
        });
    }
    Ok(pipeline::run(smoothed, field, params, PipelineMode::Full))
}

/// Reusable detector holding one parameter set
#[derive(Debug, Clone, Default)]
pub struct Detector {
    params: EdParams,
}

impl Detector {
    /// Detector with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector with the given parameters
    pub fn with_params(params: EdParams) -> Self {
        Self { params }
    }

    /// Parameters in use
    pub fn params(&self) -> &EdParams {
        &self.params
    }

    /// Full detection on a raw grayscale buffer
    pub fn detect(&self, image: &[u8], width: usize, height: usize) -> Result<Detection> {
        let gray = GrayImage::from_slice(image, width, height)?;
        self.detect_image(&gray)
    }

    /// Segments and lines only
    pub fn detect_lines(&self, image: &[u8], width: usize, height: usize) -> Result<Vec<Line>> {
        let gray = GrayImage::from_slice(image, width, height)?;
        let (smoothed, field) = self.prepare(&gray)?;
        Ok(pipeline::run(&smoothed, &field, &self.params, PipelineMode::LinesOnly).lines)
    }

    /// Full detection on an owned raster
    pub fn detect_image(&self, gray: &GrayImage) -> Result<Detection> {
        let (smoothed, field) = self.prepare(gray)?;
        Ok(pipeline::run(&smoothed, &field, &self.params, PipelineMode::Full))
    }

    fn prepare(&self, gray: &GrayImage) -> Result<(GrayImage, GradientField)> {
        self.params.validate()?;
        if gray.width() < 3 || gray.height() < 3 {
            warn!("{}x{} raster has no interior pixels", gray.width(), gray.height());
        }
        let smoothed = match &self.params.smoothing {
            Some(kernel) => gaussian_blur(gray, kernel),
            None => gray.clone(),
        };
        let field = GradientField::compute(&smoothed, self.params.operator, self.params.magnitude_threshold);
        debug!(
            "prepared {}x{} raster ({:?}, threshold {:.2})",
            gray.width(),
            gray.height(),
            self.params.operator,
            self.params.magnitude_threshold
        );
        Ok((smoothed, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_is_an_error() {
        assert!(matches!(detect(&[], 0, 0), Err(EdError::EmptyImage { .. })));
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        assert!(matches!(
            detect(&[0u8; 10], 4, 4),
            Err(EdError::BufferSizeMismatch { expected: 16, actual: 10 })
        ));
    }

    #[test]
    fn test_blank_image_detects_nothing() {
        let detection = detect(&vec![128u8; 64 * 48], 64, 48).unwrap();
        assert!(detection.segments.is_empty());
        assert!(detection.lines.is_empty());
        assert!(detection.circles.is_empty());
        assert!(detection.ellipses.is_empty());
        assert_eq!(detection.stats.anchors, 0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = EdParams {
            anchor_stride: 0,
            ..EdParams::default()
        };
        let detector = Detector::with_params(params);
        assert!(matches!(
            detector.detect(&vec![0u8; 100], 10, 10),
            Err(EdError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_gradient_dimensions_checked() {
        let gray = GrayImage::new(10, 10, vec![0; 100]).unwrap();
        let other = GrayImage::new(12, 10, vec![0; 120]).unwrap();
        let field = GradientField::compute(&other, Default::default(), 1.0);
        assert!(matches!(
            detect_from_gradient(&gray, &field, &EdParams::default()),
            Err(EdError::DimensionMismatch { .. })
        ));
    }
}
