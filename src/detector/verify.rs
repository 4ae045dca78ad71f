use crate::config::EdParams;
use crate::models::{Circle, Ellipse, GrayImage, Point, Position};
use crate::utils::geometry::gradient_aligned_with_normal;
use crate::utils::nfa::ln_binomial_tail;

/// Final gradient-alignment NFA test for circles and ellipses
///
/// The boundary is sampled every degree. At each sampled pixel the image
/// gradient from a 2x2 forward difference is compared with the shape's
/// normal; either orientation counts.
pub struct PrimitiveValidator<'a> {
    image: &'a GrayImage,
    tolerance: f64,
    precision: f64,
    ln_tests: f64,
}

impl<'a> PrimitiveValidator<'a> {
    /// Validator over the smoothed raster the gradients were computed from
    pub fn new(image: &'a GrayImage, params: &EdParams) -> Self {
        let side = ((image.width() * image.height()) as f64).sqrt();
        Self {
            image,
            tolerance: params.alignment_tolerance,
            precision: params.alignment_precision,
            ln_tests: 5.0 * side.ln(),
        }
    }

    /// Accept or reject a circle
    pub fn accepts_circle(&self, circle: &Circle) -> bool {
        self.ln_nfa(|deg| (circle.point_at(deg), circle.normal_angle_at(deg))) <= 0.0
    }

    /// Accept or reject an ellipse
    pub fn accepts_ellipse(&self, ellipse: &Ellipse) -> bool {
        self.ln_nfa(|deg| (ellipse.point_at(deg), ellipse.normal_angle_at(deg))) <= 0.0
    }

    /// `ln NFA` of a boundary given as point and normal per degree
    pub fn ln_nfa(&self, boundary: impl Fn(f64) -> (Point, f64)) -> f64 {
        let (total, aligned) = self.count_aligned(boundary);
        if total == 0 {
            return f64::INFINITY;
        }
        self.ln_tests + ln_binomial_tail(total, aligned, self.precision)
    }

    fn count_aligned(&self, boundary: impl Fn(f64) -> (Point, f64)) -> (u64, u64) {
        let mut first: Option<Position> = None;
        let mut last: Option<Position> = None;
        let (mut total, mut aligned) = (0u64, 0u64);
        for deg in 0..360 {
            let (point, normal) = boundary(deg as f64);
            let pos = point.round();
            // The sweep is cyclic: the tail may land back on the first pixel
            if last == Some(pos) || (deg > 0 && first == Some(pos)) {
                continue;
            }
            first.get_or_insert(pos);
            last = Some(pos);
            let Some((gx, gy)) = self.forward_gradient(pos) else {
                continue;
            };
            total += 1;
            if gradient_aligned_with_normal(gx, gy, normal, self.tolerance) {
                aligned += 1;
            }
        }
        (total, aligned)
    }

    /// 2x2 forward-difference gradient; `None` when the block leaves the image
    fn forward_gradient(&self, pos: Position) -> Option<(f64, f64)> {
        let i00 = self.image.get(pos)? as f64;
        let i10 = self.image.get(pos.offset(1, 0))? as f64;
        let i01 = self.image.get(pos.offset(0, 1))? as f64;
        let i11 = self.image.get(pos.offset(1, 1))? as f64;
        Some((
            (i10 + i11 - i00 - i01) / 2.0,
            (i01 + i11 - i00 - i10) / 2.0,
        ))
    }
}
