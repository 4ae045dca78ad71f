/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Nearest pixel position
    pub fn round(&self) -> Position {
        Position::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// Integer pixel position within a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Position {
    /// Create a new pixel position
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position shifted by (dx, dy)
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// True when both coordinates differ by at most one
    pub fn touches(&self, other: &Position) -> bool {
        (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }

    /// Pixel center as a floating point
    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_position_touches() {
        let p = Position::new(5, 5);
        assert!(p.touches(&Position::new(6, 4)));
        assert!(p.touches(&p));
        assert!(!p.touches(&Position::new(7, 5)));
        assert_eq!(Point::new(4.6, 2.4).round(), Position::new(5, 2));
    }
}
