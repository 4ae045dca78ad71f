use std::f64::consts::PI;

use super::Point;

/// Circle fitted to a set of edge pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center
    pub center: Point,
    /// Radius in pixels
    pub radius: f64,
    /// Mean absolute radial residual of the fitted points
    pub fitting_error: f64,
}

impl Circle {
    /// Create a circle
    pub fn new(center: Point, radius: f64, fitting_error: f64) -> Self {
        Self {
            center,
            radius,
            fitting_error,
        }
    }

    /// Perimeter
    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    /// Boundary point at `degrees`, measured from +x towards +y
    pub fn point_at(&self, degrees: f64) -> Point {
        let t = degrees.to_radians();
        Point::new(
            self.center.x + self.radius * t.cos(),
            self.center.y + self.radius * t.sin(),
        )
    }

    /// Direction of the outward normal at the boundary point for `degrees`
    pub fn normal_angle_at(&self, degrees: f64) -> f64 {
        degrees.to_radians()
    }

    /// Absolute distance of `p` from the boundary
    pub fn radial_distance(&self, p: Point) -> f64 {
        (self.center.distance(&p) - self.radius).abs()
    }
}
