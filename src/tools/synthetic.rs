//! Antialiased synthetic scenes for tests, benches and the CLI

use crate::error::Result;
use crate::models::{Ellipse, GrayImage, Point};

/// Shade each pixel by the fraction of it covered by the shape
fn shade(width: usize, height: usize, background: u8, foreground: u8, coverage: impl Fn(f64, f64) -> f64) -> Result<GrayImage> {
    let (bg, fg) = (background as f64, foreground as f64);
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let c = coverage(x as f64, y as f64).clamp(0.0, 1.0);
            data.push((bg + (fg - bg) * c).round() as u8);
        }
    }
    GrayImage::new(width, height, data)
}

/// Filled disk
pub fn render_disk(
    width: usize,
    height: usize,
    center: Point,
    radius: f64,
    background: u8,
    foreground: u8,
) -> Result<GrayImage> {
    shade(width, height, background, foreground, |x, y| {
        radius - center.distance(&Point::new(x, y)) + 0.5
    })
}

/// Filled ellipse
pub fn render_ellipse(width: usize, height: usize, ellipse: &Ellipse, background: u8, foreground: u8) -> Result<GrayImage> {
    let (a, b) = (ellipse.semi_major(), ellipse.semi_minor());
    let (s, c) = ellipse.angle().sin_cos();
    let center = ellipse.center();
    shade(width, height, background, foreground, |x, y| {
        let (dx, dy) = (x - center.x, y - center.y);
        let u = dx * c + dy * s;
        let v = -dx * s + dy * c;
        let r = ((u / a).powi(2) + (v / b).powi(2)).sqrt();
        let grad = ((u / (a * a)).powi(2) + (v / (b * b)).powi(2)).sqrt();
        if grad == 0.0 {
            return 1.0;
        }
        // First-order signed distance to the boundary
        let d = (r - 1.0) * r / grad;
        0.5 - d
    })
}

/// Half-plane split by the line through `from` and `to`
///
/// Pixels where `(to - from) × (p - from)` is positive get `foreground`.
pub fn render_step_edge(
    width: usize,
    height: usize,
    from: Point,
    to: Point,
    background: u8,
    foreground: u8,
) -> Result<GrayImage> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let norm = dx.hypot(dy).max(f64::EPSILON);
    shade(width, height, background, foreground, |x, y| {
        let d = (dx * (y - from.y) - dy * (x - from.x)) / norm;
        0.5 + d
    })
}

/// Straight bar of `half_width` from `from` to `to` with flat ends
pub fn render_bar(
    width: usize,
    height: usize,
    from: Point,
    to: Point,
    half_width: f64,
    background: u8,
    foreground: u8,
) -> Result<GrayImage> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let norm = dx.hypot(dy).max(f64::EPSILON);
    let (ux, uy) = (dx / norm, dy / norm);
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    shade(width, height, background, foreground, |x, y| {
        let (px, py) = (x - mid.x, y - mid.y);
        let along = (px * ux + py * uy).abs();
        let across = (px * uy - py * ux).abs();
        (half_width + 0.5 - across).min(norm / 2.0 + 0.5 - along)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    #[test]
    fn test_disk_inside_outside() {
        let img = render_disk(40, 40, Point::new(20.0, 20.0), 10.0, 10, 210).unwrap();
        assert_eq!(img.get(Position::new(20, 20)), Some(210));
        assert_eq!(img.get(Position::new(2, 2)), Some(10));
        // Boundary pixel is half covered
        assert_eq!(img.get(Position::new(30, 20)), Some(110));
    }

    #[test]
    fn test_ellipse_axes() {
        let e = Ellipse::from_geometry(Point::new(30.0, 30.0), 20.0, 8.0, 0.0);
        let img = render_ellipse(60, 60, &e, 0, 200).unwrap();
        assert_eq!(img.get(Position::new(45, 30)), Some(200));
        assert_eq!(img.get(Position::new(30, 45)), Some(0));
        assert_eq!(img.get(Position::new(50, 30)), Some(100));
    }

    #[test]
    fn test_step_edge_sides() {
        let img = render_step_edge(20, 20, Point::new(0.0, 10.0), Point::new(19.0, 10.0), 0, 200).unwrap();
        assert_eq!(img.get(Position::new(5, 15)), Some(200));
        assert_eq!(img.get(Position::new(5, 5)), Some(0));
        assert_eq!(img.get(Position::new(5, 10)), Some(100));
    }

    #[test]
    fn test_bar_has_flat_ends() {
        let img = render_bar(40, 20, Point::new(5.0, 10.0), Point::new(35.0, 10.0), 2.0, 0, 200).unwrap();
        assert_eq!(img.get(Position::new(20, 10)), Some(200));
        assert_eq!(img.get(Position::new(20, 11)), Some(200));
        assert_eq!(img.get(Position::new(20, 12)), Some(100));
        assert_eq!(img.get(Position::new(20, 15)), Some(0));
        assert_eq!(img.get(Position::new(2, 10)), Some(0));
        assert_eq!(img.get(Position::new(5, 10)), Some(100));
    }
}
