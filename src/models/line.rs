use super::{EdgeSegment, Point};

/// Regression model of a straight line
///
/// The independent axis is whichever spreads the points more, so steep lines
/// are fitted as `x = slope * y + intercept` instead of blowing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineModel {
    /// `y = slope * x + intercept`
    ByX {
        /// dy/dx
        slope: f64,
        /// y at x = 0
        intercept: f64,
    },
    /// `x = slope * y + intercept`
    ByY {
        /// dx/dy
        slope: f64,
        /// x at y = 0
        intercept: f64,
    },
}

impl LineModel {
    /// Perpendicular distance from `p` to the line
    pub fn distance_to(&self, p: Point) -> f64 {
        match *self {
            LineModel::ByX { slope, intercept } => {
                (slope * p.x - p.y + intercept).abs() / (slope * slope + 1.0).sqrt()
            }
            LineModel::ByY { slope, intercept } => {
                (slope * p.y - p.x + intercept).abs() / (slope * slope + 1.0).sqrt()
            }
        }
    }

    /// Direction angle in radians, defined modulo π
    pub fn angle(&self) -> f64 {
        match *self {
            LineModel::ByX { slope, .. } => slope.atan(),
            LineModel::ByY { slope, .. } => 1.0f64.atan2(slope),
        }
    }

    /// Orthogonal projection of `p` onto the line
    pub fn project(&self, p: Point) -> Point {
        let (dx, dy, origin) = match *self {
            LineModel::ByX { slope, intercept } => (1.0, slope, Point::new(0.0, intercept)),
            LineModel::ByY { slope, intercept } => (slope, 1.0, Point::new(intercept, 0.0)),
        };
        let norm = dx * dx + dy * dy;
        let t = ((p.x - origin.x) * dx + (p.y - origin.y) * dy) / norm;
        Point::new(origin.x + t * dx, origin.y + t * dy)
    }
}

/// Straight piece of an edge segment
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    model: LineModel,
    segment: EdgeSegment,
    fitting_error: f64,
    length: f64,
}

impl Line {
    /// Assemble a line from a fitted model and the pixels it was fitted to
    pub fn new(model: LineModel, segment: EdgeSegment, fitting_error: f64) -> Self {
        let length = match (segment.front(), segment.back()) {
            (Some(a), Some(b)) => a.position.to_point().distance(&b.position.to_point()),
            _ => 0.0,
        };
        Self {
            model,
            segment,
            fitting_error,
            length,
        }
    }

    /// Regression model
    pub fn model(&self) -> LineModel {
        self.model
    }

    /// Pixels the line was fitted to
    pub fn segment(&self) -> &EdgeSegment {
        &self.segment
    }

    /// Mean perpendicular distance of the pixels to the line
    pub fn fitting_error(&self) -> f64 {
        self.fitting_error
    }

    /// Distance between the first and last pixel
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Direction angle, modulo π
    pub fn angle(&self) -> f64 {
        self.model.angle()
    }

    /// First pixel of the chain
    pub fn begin(&self) -> Point {
        self.segment
            .front()
            .map(|e| e.position.to_point())
            .unwrap_or_default()
    }

    /// Last pixel of the chain
    pub fn end(&self) -> Point {
        self.segment
            .back()
            .map(|e| e.position.to_point())
            .unwrap_or_default()
    }

    /// Endpoints projected onto the fitted line, for rendering
    pub fn endpoints(&self) -> (Point, Point) {
        (self.model.project(self.begin()), self.model.project(self.end()))
    }

    /// Vector from the first to the last pixel, following chain order
    pub fn direction(&self) -> (f64, f64) {
        let (b, e) = (self.begin(), self.end());
        (e.x - b.x, e.y - b.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_by_x() {
        let model = LineModel::ByX {
            slope: 0.0,
            intercept: 2.0,
        };
        assert!((model.distance_to(Point::new(7.0, 5.0)) - 3.0).abs() < 1e-12);
        assert!(model.angle().abs() < 1e-12);
    }

    #[test]
    fn test_distance_by_y() {
        let model = LineModel::ByY {
            slope: 0.0,
            intercept: 4.0,
        };
        assert!((model.distance_to(Point::new(1.0, 9.0)) - 3.0).abs() < 1e-12);
        assert!((model.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_projection() {
        let model = LineModel::ByX {
            slope: 1.0,
            intercept: 0.0,
        };
        let p = model.project(Point::new(2.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12);
    }
}
