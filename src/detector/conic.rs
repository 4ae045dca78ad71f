//! Algebraic circle and ellipse fitting
//!
//! Both fitters are pure: a point set goes in, parameters and the mean
//! residual come out.

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};

use crate::error::{EdError, Result};
use crate::models::{Circle, Ellipse, Point};

const CIRCLE_MIN_POINTS: usize = 3;
const ELLIPSE_MIN_POINTS: usize = 6;

/// Kåsa circle fit from centroid-relative moments
pub fn fit_circle(points: &[Point]) -> Result<Circle> {
    let n = points.len();
    if n < CIRCLE_MIN_POINTS {
        return Err(EdError::TooFewPoints {
            shape: "circle",
            needed: CIRCLE_MIN_POINTS,
            actual: n,
        });
    }
    let nf = n as f64;
    let mx = points.iter().map(|p| p.x).sum::<f64>() / nf;
    let my = points.iter().map(|p| p.y).sum::<f64>() / nf;

    let (mut suu, mut svv, mut suv) = (0.0, 0.0, 0.0);
    let (mut suuu, mut svvv, mut suvv, mut svuu) = (0.0, 0.0, 0.0, 0.0);
    for p in points {
        let (u, v) = (p.x - mx, p.y - my);
        suu += u * u;
        svv += v * v;
        suv += u * v;
        suuu += u * u * u;
        svvv += v * v * v;
        suvv += u * v * v;
        svuu += v * u * u;
    }

    let det = suu * svv - suv * suv;
    if det.abs() <= f64::EPSILON * (suu * svv).max(1.0) {
        return Err(EdError::DegenerateFit { shape: "circle" });
    }
    let rhs_u = (suuu + suvv) / 2.0;
    let rhs_v = (svvv + svuu) / 2.0;
    let uc = (svv * rhs_u - suv * rhs_v) / det;
    let vc = (suu * rhs_v - suv * rhs_u) / det;

    let radius = (uc * uc + vc * vc + (suu + svv) / nf).sqrt();
    let center = Point::new(uc + mx, vc + my);
    let mut circle = Circle::new(center, radius, 0.0);
    circle.fitting_error = points.iter().map(|p| circle.radial_distance(*p)).sum::<f64>() / nf;
    Ok(circle)
}

/// Fitzgibbon direct least-squares ellipse fit
pub fn fit_ellipse(points: &[Point]) -> Result<Ellipse> {
    let n = points.len();
    if n < ELLIPSE_MIN_POINTS {
        return Err(EdError::TooFewPoints {
            shape: "ellipse",
            needed: ELLIPSE_MIN_POINTS,
            actual: n,
        });
    }
    let degenerate = || EdError::DegenerateFit { shape: "ellipse" };

    // Centroid at the origin, mean distance √2
    let nf = n as f64;
    let mx = points.iter().map(|p| p.x).sum::<f64>() / nf;
    let my = points.iter().map(|p| p.y).sum::<f64>() / nf;
    let spread = points
        .iter()
        .map(|p| ((p.x - mx).powi(2) + (p.y - my).powi(2)).sqrt())
        .sum::<f64>()
        / nf;
    let scale = if spread > 1e-12 { std::f64::consts::SQRT_2 / spread } else { 1.0 };

    let mut scatter = Matrix6::<f64>::zeros();
    for p in points {
        let (x, y) = ((p.x - mx) * scale, (p.y - my) * scale);
        let row = Vector6::new(x * x, x * y, y * y, x, y, 1.0);
        scatter += row * row.transpose();
    }

    let s11: Matrix3<f64> = scatter.fixed_view::<3, 3>(0, 0).into_owned();
    let s12: Matrix3<f64> = scatter.fixed_view::<3, 3>(0, 3).into_owned();
    let s22: Matrix3<f64> = scatter.fixed_view::<3, 3>(3, 3).into_owned();
    let s22_inv = s22.try_inverse().ok_or_else(degenerate)?;

    // 4ac - b² = 1 constraint
    let c1_inv = Matrix3::new(0.0, 0.0, 0.5, 0.0, -1.0, 0.0, 0.5, 0.0, 0.0);
    let reduced = s11 - s12 * s22_inv * s12.transpose();
    let system = c1_inv * reduced;

    let quadratic = elliptic_eigenvector(&system).ok_or_else(degenerate)?;
    let linear = -s22_inv * s12.transpose() * quadratic;

    let coefficients = denormalize(
        [quadratic[0], quadratic[1], quadratic[2], linear[0], linear[1], linear[2]],
        mx,
        my,
        scale,
    );
    let ellipse = Ellipse::from_coefficients(coefficients).ok_or_else(degenerate)?;
    let error = points.iter().map(|p| ellipse.radial_distance(*p)).sum::<f64>() / nf;
    Ok(ellipse.with_fitting_error(error))
}

/// Undo `x' = s(x - mx)`, `y' = s(y - my)` on conic coefficients
fn denormalize(c: [f64; 6], mx: f64, my: f64, s: f64) -> [f64; 6] {
    let [a, b, cc, d, e, f] = c;
    let s2 = s * s;
    [
        a * s2,
        b * s2,
        cc * s2,
        -2.0 * a * s2 * mx - b * s2 * my + d * s,
        -b * s2 * mx - 2.0 * cc * s2 * my + e * s,
        a * s2 * mx * mx + b * s2 * mx * my + cc * s2 * my * my - d * s * mx - e * s * my + f,
    ]
}

/// Eigenvector of `system` satisfying `4 v0 v2 - v1² > 0`, smallest |λ| first
fn elliptic_eigenvector(system: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let a = system;
    let trace = a.trace();
    let minors = a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)] + a[(0, 0)] * a[(2, 2)]
        - a[(0, 2)] * a[(2, 0)]
        + a[(1, 1)] * a[(2, 2)]
        - a[(1, 2)] * a[(2, 1)];
    let det = a.determinant();

    cubic_roots(-trace, minors, -det)
        .into_iter()
        .filter_map(|ev| {
            let v = null_vector(&(system - Matrix3::identity() * ev))?;
            (4.0 * v[0] * v[2] - v[1] * v[1] > 0.0).then_some((ev.abs(), v))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, v)| v)
}

/// Largest row of the adjugate; proportional to the null vector of a rank-2 matrix
fn null_vector(m: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let rows = [
        m.row(1).transpose().cross(&m.row(2).transpose()),
        m.row(2).transpose().cross(&m.row(0).transpose()),
        m.row(0).transpose().cross(&m.row(1).transpose()),
    ];
    let best = rows
        .iter()
        .max_by(|a, b| a.norm_squared().total_cmp(&b.norm_squared()))?;
    let norm = best.norm();
    (norm > 1e-15).then(|| best / norm)
}

/// Real roots of `x³ + b x² + c x + d`
fn cubic_roots(b: f64, c: f64, d: f64) -> Vec<f64> {
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let shift = -b / 3.0;
    let disc = -4.0 * p * p * p - 27.0 * q * q;

    if disc >= 0.0 {
        let r = (-p / 3.0).max(0.0).sqrt();
        let cos_arg = if r < 1e-15 {
            0.0
        } else {
            (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0)
        };
        let theta = cos_arg.acos();
        (0..3)
            .map(|k| 2.0 * r * ((theta + 2.0 * std::f64::consts::PI * k as f64) / 3.0).cos() + shift)
            .collect()
    } else {
        let root = (q * q / 4.0 + p * p * p / 27.0).sqrt();
        vec![(-q / 2.0 + root).cbrt() + (-q / 2.0 - root).cbrt() + shift]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_points(cx: f64, cy: f64, r: f64, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                Point::new(cx + r * t.cos(), cy + r * t.sin())
            })
            .collect()
    }

    #[test]
    fn test_circle_round_trip() {
        let c = fit_circle(&circle_points(50.0, 50.0, 30.0, 72)).unwrap();
        assert!((c.center.x - 50.0).abs() < 1e-9);
        assert!((c.center.y - 50.0).abs() < 1e-9);
        assert!((c.radius - 30.0).abs() < 1e-9);
        assert!(c.fitting_error < 1e-9);
    }

    #[test]
    fn test_circle_from_partial_arc() {
        let pts: Vec<Point> = circle_points(50.0, 50.0, 30.0, 360).into_iter().take(90).collect();
        let c = fit_circle(&pts).unwrap();
        assert!((c.center.x - 50.0).abs() < 1e-6);
        assert!((c.radius - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_circle_degenerate_inputs() {
        let collinear: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 2.0 * i as f64)).collect();
        assert_eq!(fit_circle(&collinear), Err(EdError::DegenerateFit { shape: "circle" }));
        assert!(matches!(
            fit_circle(&collinear[..2]),
            Err(EdError::TooFewPoints { needed: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_ellipse_round_trip() {
        let truth = Ellipse::from_geometry(Point::new(40.0, 40.0), 20.0, 10.0, 30f64.to_radians());
        let pts: Vec<Point> = (0..72).map(|i| truth.point_at(i as f64 * 5.0)).collect();
        let e = fit_ellipse(&pts).unwrap();
        assert!((e.center().x - 40.0).abs() < 1e-6);
        assert!((e.center().y - 40.0).abs() < 1e-6);
        assert!((e.semi_major() - 20.0).abs() < 1e-6);
        assert!((e.semi_minor() - 10.0).abs() < 1e-6);
        assert!((e.angle() - 30f64.to_radians()).abs() < 1e-6);
        assert!(e.fitting_error() < 1e-6);
    }

    #[test]
    fn test_ellipse_fit_of_circle() {
        let e = fit_ellipse(&circle_points(10.0, -4.0, 7.0, 40)).unwrap();
        assert!((e.semi_major() - 7.0).abs() < 1e-6);
        assert!((e.semi_minor() - 7.0).abs() < 1e-6);
        assert!((e.center().y + 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_ellipse_needs_six_points() {
        let pts = circle_points(0.0, 0.0, 5.0, 5);
        assert!(matches!(
            fit_ellipse(&pts),
            Err(EdError::TooFewPoints { needed: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_cubic_roots() {
        // (x - 1)(x - 2)(x - 3)
        let mut roots = cubic_roots(-6.0, 11.0, -6.0);
        roots.sort_by(f64::total_cmp);
        assert_eq!(roots.len(), 3);
        for (r, want) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((r - want).abs() < 1e-9);
        }
    }
}
