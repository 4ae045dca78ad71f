use std::f64::consts::PI;

use crate::error::{EdError, Result};
use crate::utils::filters::GaussianKernel;
use crate::utils::gradient::{DEFAULT_MAGNITUDE_THRESHOLD, GradientOperator};

fn parse_env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

fn parse_env_operator(name: &str, default: GradientOperator) -> GradientOperator {
    match std::env::var(name).ok().as_deref().map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("sobel") => GradientOperator::Sobel,
        Some(v) if v.eq_ignore_ascii_case("prewitt") => GradientOperator::Prewitt,
        _ => default,
    }
}

/// Tunable parameters of the detection pipeline
///
/// Defaults are the parameter-free EDPF/EDCircles settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EdParams {
    /// Smoothing applied before gradients, `None` to skip
    pub smoothing: Option<GaussianKernel>,
    /// Derivative operator
    pub operator: GradientOperator,
    /// Magnitudes below this are treated as zero
    pub magnitude_threshold: f32,
    /// Margin by which an anchor must beat its perpendicular neighbours
    pub anchor_threshold: f32,
    /// Grid spacing of the anchor scan
    pub anchor_stride: usize,
    /// Maximum mean perpendicular error of a line, in pixels
    pub line_fit_max_error: f64,
    /// Angular tolerance of gradient alignment tests, in radians
    pub alignment_tolerance: f64,
    /// Chance probability of alignment under the tolerance
    pub alignment_precision: f64,
    /// Smallest turn between consecutive lines of an arc, in degrees
    pub min_turn_degrees: f64,
    /// Largest turn between consecutive lines of an arc, in degrees
    pub max_turn_degrees: f64,
    /// Compatibility radius ratio of the circle merge pass
    pub circle_merge_ratio: f64,
    /// Compatibility radius ratio of the ellipse merge pass
    pub ellipse_merge_ratio: f64,
    /// Maximum fitting error of a circle or ellipse
    pub shape_fit_max_error: f64,
    /// Fraction of the circumference an arc must cover to be promoted
    pub promote_coverage: f64,
    /// Process segments on the rayon pool
    pub parallel: bool,
}

impl Default for EdParams {
    fn default() -> Self {
        Self {
            smoothing: Some(GaussianKernel::default()),
            operator: GradientOperator::Sobel,
            magnitude_threshold: DEFAULT_MAGNITUDE_THRESHOLD,
            anchor_threshold: 0.0,
            anchor_stride: 1,
            line_fit_max_error: 1.0,
            alignment_tolerance: PI / 8.0,
            alignment_precision: 0.125,
            min_turn_degrees: 6.0,
            max_turn_degrees: 60.0,
            circle_merge_ratio: 0.25,
            ellipse_merge_ratio: 0.5,
            shape_fit_max_error: 1.5,
            promote_coverage: 0.5,
            parallel: true,
        }
    }
}

impl EdParams {
    /// Defaults overridden by `ED_*` environment variables
    pub fn from_env() -> Self {
        let base = Self::default();
        let smoothing = base.smoothing.map(|k| GaussianKernel {
            sigma: parse_env_f64("ED_GAUSSIAN_SIGMA", k.sigma),
            ..k
        });
        Self {
            smoothing: smoothing.filter(|k| k.sigma > 0.0),
            operator: parse_env_operator("ED_OPERATOR", base.operator),
            magnitude_threshold: parse_env_f64("ED_MAGNITUDE_THRESHOLD", base.magnitude_threshold as f64)
                as f32,
            anchor_threshold: parse_env_f64("ED_ANCHOR_THRESHOLD", base.anchor_threshold as f64) as f32,
            anchor_stride: parse_env_usize("ED_ANCHOR_STRIDE", base.anchor_stride),
            parallel: parse_env_bool_u8("ED_PARALLEL", base.parallel),
            ..base
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.anchor_stride == 0 {
            return Err(EdError::InvalidParams("anchor stride must be at least 1".into()));
        }
        if let Some(k) = &self.smoothing {
            if k.size % 2 == 0 || k.sigma <= 0.0 {
                return Err(EdError::InvalidParams(format!(
                    "gaussian kernel needs an odd size and positive sigma, got {} / {}",
                    k.size, k.sigma
                )));
            }
        }
        if !(self.alignment_precision > 0.0 && self.alignment_precision < 1.0) {
            return Err(EdError::InvalidParams(format!(
                "alignment precision must lie in (0, 1), got {}",
                self.alignment_precision
            )));
        }
        if self.min_turn_degrees > self.max_turn_degrees {
            return Err(EdError::InvalidParams(format!(
                "turn bounds are inverted: {} > {}",
                self.min_turn_degrees, self.max_turn_degrees
            )));
        }
        if self.line_fit_max_error <= 0.0 || self.shape_fit_max_error <= 0.0 {
            return Err(EdError::InvalidParams("fitting error ceilings must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = EdParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.anchor_stride, 1);
        assert!((params.magnitude_threshold - 8.0 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_zero_stride_rejected() {
        let params = EdParams {
            anchor_stride: 0,
            ..EdParams::default()
        };
        assert!(matches!(params.validate(), Err(EdError::InvalidParams(_))));
    }

    #[test]
    fn test_even_kernel_rejected() {
        let params = EdParams {
            smoothing: Some(GaussianKernel { size: 4, sigma: 1.0 }),
            ..EdParams::default()
        };
        assert!(params.validate().is_err());
    }
}
