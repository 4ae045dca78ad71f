use std::f64::consts::{FRAC_PI_2, PI};

use super::Point;

/// Ellipse stored both as an implicit conic and as geometric parameters
///
/// The conic is `a x² + b xy + c y² + d x + e y + f = 0`. `angle` is the
/// direction of the major axis, normalized to (-π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    coefficients: [f64; 6],
    center: Point,
    semi_major: f64,
    semi_minor: f64,
    angle: f64,
    fitting_error: f64,
}

fn normalize_half_turn(mut angle: f64) -> f64 {
    while angle > FRAC_PI_2 {
        angle -= PI;
    }
    while angle <= -FRAC_PI_2 {
        angle += PI;
    }
    angle
}

impl Ellipse {
    /// Build from geometric parameters. Axes are swapped if given minor first.
    pub fn from_geometry(center: Point, semi_major: f64, semi_minor: f64, angle: f64) -> Self {
        let (major, minor, angle) = if semi_minor > semi_major {
            (semi_minor, semi_major, angle + FRAC_PI_2)
        } else {
            (semi_major, semi_minor, angle)
        };
        let angle = normalize_half_turn(angle);
        let (s, c) = angle.sin_cos();
        let (ia, ib) = (1.0 / (major * major), 1.0 / (minor * minor));
        let ca = c * c * ia + s * s * ib;
        let cb = 2.0 * c * s * (ia - ib);
        let cc = s * s * ia + c * c * ib;
        let cd = -2.0 * ca * center.x - cb * center.y;
        let ce = -cb * center.x - 2.0 * cc * center.y;
        let cf = ca * center.x * center.x + cb * center.x * center.y + cc * center.y * center.y - 1.0;
        Self {
            coefficients: [ca, cb, cc, cd, ce, cf],
            center,
            semi_major: major,
            semi_minor: minor,
            angle,
            fitting_error: 0.0,
        }
    }

    /// Derive the geometry of a conic. `None` unless it is a real ellipse.
    pub fn from_coefficients(coefficients: [f64; 6]) -> Option<Self> {
        let sign = if coefficients[0] + coefficients[2] < 0.0 { -1.0 } else { 1.0 };
        let [a, b, c, d, e, f] = coefficients.map(|v| v * sign);

        let denom = 4.0 * a * c - b * b;
        if !(denom > 0.0) {
            return None;
        }
        let cx = (b * e - 2.0 * c * d) / denom;
        let cy = (b * d - 2.0 * a * e) / denom;
        let at_center = a * cx * cx + b * cx * cy + c * cy * cy + d * cx + e * cy + f;

        let root = ((a - c) * (a - c) + b * b).sqrt();
        let large = (a + c + root) / 2.0;
        let small = (a + c - root) / 2.0;
        if !(small > 0.0) || !(at_center < 0.0) {
            return None;
        }
        let semi_major = (-at_center / small).sqrt();
        let semi_minor = (-at_center / large).sqrt();
        if !semi_major.is_finite() || !semi_minor.is_finite() {
            return None;
        }
        // The larger eigenvalue's axis is the minor one; the major is perpendicular.
        let angle = normalize_half_turn(0.5 * b.atan2(a - c) + FRAC_PI_2);

        Some(Self {
            coefficients,
            center: Point::new(cx, cy),
            semi_major,
            semi_minor,
            angle,
            fitting_error: 0.0,
        })
    }

    /// Same ellipse carrying a fitting error
    pub fn with_fitting_error(mut self, fitting_error: f64) -> Self {
        self.fitting_error = fitting_error;
        self
    }

    /// Conic coefficients `[a, b, c, d, e, f]`
    pub fn coefficients(&self) -> [f64; 6] {
        self.coefficients
    }

    /// Center
    pub fn center(&self) -> Point {
        self.center
    }

    /// Semi-major axis length
    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    /// Semi-minor axis length
    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// Major axis direction in radians
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Mean radial residual of the fitted points
    pub fn fitting_error(&self) -> f64 {
        self.fitting_error
    }

    /// Perimeter approximation `2π·√((a²+b²)/2)`
    pub fn circumference(&self) -> f64 {
        let (a, b) = (self.semi_major, self.semi_minor);
        2.0 * PI * ((a * a + b * b) / 2.0).sqrt()
    }

    /// Boundary point at parametric angle `degrees`
    pub fn point_at(&self, degrees: f64) -> Point {
        let t = degrees.to_radians();
        let (u, v) = (self.semi_major * t.cos(), self.semi_minor * t.sin());
        let (s, c) = self.angle.sin_cos();
        Point::new(self.center.x + u * c - v * s, self.center.y + u * s + v * c)
    }

    /// Outward normal direction at parametric angle `degrees`
    pub fn normal_angle_at(&self, degrees: f64) -> f64 {
        let t = degrees.to_radians();
        (t.sin() / self.semi_minor).atan2(t.cos() / self.semi_major) + self.angle
    }

    /// Distance from `p` to the boundary point along its radial direction,
    /// measured in the ellipse-aligned frame
    pub fn radial_distance(&self, p: Point) -> f64 {
        let (s, c) = self.angle.sin_cos();
        let (dx, dy) = (p.x - self.center.x, p.y - self.center.y);
        let u = dx * c + dy * s;
        let v = -dx * s + dy * c;
        let t = (v / self.semi_minor).atan2(u / self.semi_major);
        let (iu, iv) = (self.semi_major * t.cos(), self.semi_minor * t.sin());
        ((u - iu).powi(2) + (v - iv).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_round_trip() {
        let e = Ellipse::from_geometry(Point::new(40.0, 40.0), 20.0, 10.0, 30f64.to_radians());
        let back = Ellipse::from_coefficients(e.coefficients()).unwrap();
        assert!((back.center().x - 40.0).abs() < 1e-9);
        assert!((back.center().y - 40.0).abs() < 1e-9);
        assert!((back.semi_major() - 20.0).abs() < 1e-9);
        assert!((back.semi_minor() - 10.0).abs() < 1e-9);
        assert!((back.angle() - 30f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_negated_conic_is_same_ellipse() {
        let e = Ellipse::from_geometry(Point::new(5.0, -3.0), 8.0, 2.0, -1.0);
        let neg = Ellipse::from_coefficients(e.coefficients().map(|v| -v)).unwrap();
        assert!((neg.semi_major() - 8.0).abs() < 1e-9);
        assert!((neg.angle() - e.angle()).abs() < 1e-9);
    }

    #[test]
    fn test_hyperbola_rejected() {
        // x² - y² - 1 = 0
        assert!(Ellipse::from_coefficients([1.0, 0.0, -1.0, 0.0, 0.0, -1.0]).is_none());
    }

    #[test]
    fn test_boundary_points_have_zero_residual() {
        let e = Ellipse::from_geometry(Point::new(0.0, 0.0), 6.0, 3.0, 0.4);
        for deg in (0..360).step_by(15) {
            assert!(e.radial_distance(e.point_at(deg as f64)) < 1e-9);
        }
        let outside = Point::new(8.0 * 0.4f64.cos(), 8.0 * 0.4f64.sin());
        assert!((e.radial_distance(outside) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_swapped_axes() {
        let e = Ellipse::from_geometry(Point::new(0.0, 0.0), 3.0, 6.0, 0.0);
        assert_eq!(e.semi_major(), 6.0);
        assert!((e.angle() - FRAC_PI_2).abs() < 1e-12);
    }
}
