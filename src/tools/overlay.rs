//! Draw detections over the source raster for inspection

use image::{Rgb, RgbImage};

use crate::models::{GrayImage, Point};
use crate::pipeline::Detection;

const SEGMENT: Rgb<u8> = Rgb([0, 160, 255]);
const LINE: Rgb<u8> = Rgb([255, 40, 40]);
const ARC: Rgb<u8> = Rgb([255, 220, 0]);
const CIRCLE: Rgb<u8> = Rgb([0, 255, 80]);
const ELLIPSE: Rgb<u8> = Rgb([255, 0, 255]);

fn put(canvas: &mut RgbImage, p: Point, color: Rgb<u8>) {
    let pos = p.round();
    if pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < canvas.width() && (pos.y as u32) < canvas.height() {
        canvas.put_pixel(pos.x as u32, pos.y as u32, color);
    }
}

fn draw_segment(canvas: &mut RgbImage, a: Point, b: Point, color: Rgb<u8>) {
    let steps = a.distance(&b).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        put(canvas, Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t), color);
    }
}

fn draw_curve(canvas: &mut RgbImage, curve: impl Fn(f64) -> Point, color: Rgb<u8>) {
    for i in 0..720 {
        put(canvas, curve(i as f64 / 2.0), color);
    }
}

/// Gray background with segments, lines, arcs, circles and ellipses on top
pub fn render_overlay(gray: &GrayImage, detection: &Detection) -> RgbImage {
    let mut canvas = RgbImage::from_fn(gray.width() as u32, gray.height() as u32, |x, y| {
        let v = gray.as_bytes()[y as usize * gray.width() + x as usize] / 2;
        Rgb([v, v, v])
    });

    for segment in &detection.segments {
        for p in segment.points() {
            put(&mut canvas, p, SEGMENT);
        }
    }
    for line in &detection.lines {
        let (a, b) = line.endpoints();
        draw_segment(&mut canvas, a, b, LINE);
    }
    for arc in &detection.arcs {
        for p in arc.points() {
            put(&mut canvas, p, ARC);
        }
    }
    for circle in &detection.circles {
        draw_curve(&mut canvas, |deg| circle.point_at(deg), CIRCLE);
    }
    for ellipse in &detection.ellipses {
        draw_curve(&mut canvas, |deg| ellipse.point_at(deg), ELLIPSE);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Circle;

    #[test]
    fn test_circle_is_drawn() {
        let gray = GrayImage::new(40, 40, vec![100; 1600]).unwrap();
        let detection = Detection {
            circles: vec![Circle::new(Point::new(20.0, 20.0), 10.0, 0.0)],
            ..Detection::default()
        };
        let canvas = render_overlay(&gray, &detection);
        assert_eq!(*canvas.get_pixel(30, 20), CIRCLE);
        assert_eq!(*canvas.get_pixel(20, 20), Rgb([50, 50, 50]));
    }
}
