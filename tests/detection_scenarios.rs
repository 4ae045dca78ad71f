//! End-to-end detection scenarios on synthetic scenes
//!
//! Each scene has a known ground truth, so the tests check geometry rather
//! than exact pixel output.

use edge_drawing::models::Ellipse;
use edge_drawing::tools::synthetic::{render_bar, render_disk, render_ellipse, render_step_edge};
use edge_drawing::utils::filters::gaussian_blur;
use edge_drawing::utils::gradient::GradientField;
use edge_drawing::{Detection, Detector, EdError, EdParams, GrayImage, Point, detect, detect_from_gradient, detect_lines};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn disk_scene_with_radius(radius: f64) -> GrayImage {
    render_disk(200, 200, Point::new(100.0, 100.0), radius, 40, 200).expect("disk scene")
}

fn disk_scene() -> GrayImage {
    disk_scene_with_radius(40.0)
}

fn assert_same_detection(a: &Detection, b: &Detection) {
    assert_eq!(a.segments, b.segments);
    assert_eq!(a.lines, b.lines);
    assert_eq!(a.arcs, b.arcs);
    assert_eq!(a.circles, b.circles);
    assert_eq!(a.ellipses, b.ellipses);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn test_disk_yields_one_circle() {
    init_logger();
    let gray = disk_scene();
    let detection = detect(gray.as_bytes(), gray.width(), gray.height()).expect("detection failed");

    assert_eq!(detection.circles.len(), 1, "circles: {:?}", detection.circles);
    assert!(detection.ellipses.is_empty());
    let circle = detection.circles[0];
    assert!(circle.center.distance(&Point::new(100.0, 100.0)) < 1.0, "center {:?}", circle.center);
    assert!((circle.radius - 40.0).abs() < 1.0, "radius {}", circle.radius);
    assert!(circle.fitting_error <= 1.5);
    assert!(!detection.segments.is_empty());
}

#[test]
fn test_diagonal_step_yields_one_line() {
    init_logger();
    let (from, to) = (Point::new(1.0, 30.0), Point::new(140.0, 85.0));
    let gray = render_step_edge(142, 120, from, to, 40, 200).expect("step scene");
    let detection = detect(gray.as_bytes(), gray.width(), gray.height()).expect("detection failed");

    assert_eq!(detection.lines.len(), 1, "lines: {}", detection.lines.len());
    assert!(detection.arcs.is_empty());
    assert!(detection.circles.is_empty());
    assert!(detection.ellipses.is_empty());

    let line = &detection.lines[0];
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let norm = dx.hypot(dy);
    for p in line.segment().points() {
        let off = (dx * (p.y - from.y) - dy * (p.x - from.x)).abs() / norm;
        assert!(off <= 1.5, "pixel {p:?} is {off:.2} px off the edge");
    }
    let (a, b) = line.endpoints();
    assert!(a.x.min(b.x) < 6.0 && a.x.max(b.x) > 135.0, "endpoints {a:?} {b:?}");
    assert!(line.fitting_error() <= 1.0);
}

#[test]
fn test_bright_bar_yields_one_line_per_flank() {
    init_logger();
    // A bar has two parallel edges, each traced as its own line
    let (from, to) = (Point::new(25.0, 40.0), Point::new(155.0, 115.0));
    let gray = render_bar(180, 160, from, to, 3.0, 40, 200).expect("bar scene");
    let detection = detect(gray.as_bytes(), gray.width(), gray.height()).expect("detection failed");

    let bar_angle = (to.y - from.y).atan2(to.x - from.x);
    let flanks = detection
        .lines
        .iter()
        .filter(|line| {
            let (a, b) = line.endpoints();
            let diff = ((b.y - a.y).atan2(b.x - a.x) - bar_angle).rem_euclid(std::f64::consts::PI);
            let diff = diff.min(std::f64::consts::PI - diff);
            line.length() > 100.0 && diff.to_degrees() < 3.0
        })
        .count();
    assert!(flanks >= 2, "{} lines, {flanks} along the bar", detection.lines.len());
    assert!(detection.circles.is_empty());
}

#[test]
fn test_lines_only_entry_point() {
    init_logger();
    let gray = render_step_edge(142, 120, Point::new(1.0, 30.0), Point::new(140.0, 85.0), 40, 200)
        .expect("step scene");
    let lines = detect_lines(gray.as_bytes(), gray.width(), gray.height()).expect("detection failed");
    let full = detect(gray.as_bytes(), gray.width(), gray.height()).expect("detection failed");
    assert_eq!(lines, full.lines);
}

#[test]
fn test_tilted_ellipse_yields_one_ellipse() {
    init_logger();
    let truth = Ellipse::from_geometry(Point::new(100.0, 100.0), 60.0, 35.0, 0.3);
    let gray = render_ellipse(200, 200, &truth, 40, 200).expect("ellipse scene");
    let detection = detect(gray.as_bytes(), gray.width(), gray.height()).expect("detection failed");

    assert!(detection.circles.is_empty(), "circles: {:?}", detection.circles);
    assert!(!detection.ellipses.is_empty());
    let found = detection
        .ellipses
        .iter()
        .find(|e| e.center().distance(&truth.center()) < 2.0)
        .expect("no ellipse near the true center");
    assert!((found.semi_major() - 60.0).abs() < 2.0, "a = {}", found.semi_major());
    assert!((found.semi_minor() - 35.0).abs() < 2.0, "b = {}", found.semi_minor());
}

#[test]
fn test_occluded_disk_merges_arcs_into_one_circle() {
    init_logger();
    // A background-colored bar cuts the disk into two caps, so no closed
    // chain follows the circle and the caps must be merged as arcs
    let disk = disk_scene_with_radius(50.0);
    let mut data = disk.as_bytes().to_vec();
    for y in 95..105 {
        data[y * 200..(y + 1) * 200].fill(40);
    }
    let gray = GrayImage::new(200, 200, data).expect("occluded scene");
    let detection = detect(gray.as_bytes(), gray.width(), gray.height()).expect("detection failed");

    assert_eq!(detection.stats.closed_shapes, 0);
    assert!(detection.stats.arc_candidates >= 2);
    assert_eq!(detection.circles.len(), 1, "circles: {:?}", detection.circles);
    let circle = detection.circles[0];
    assert!(circle.center.distance(&Point::new(100.0, 100.0)) < 1.0, "center {:?}", circle.center);
    assert!((circle.radius - 50.0).abs() < 1.0, "radius {}", circle.radius);
}

#[test]
fn test_blank_image_yields_nothing() {
    init_logger();
    let detection = detect(&vec![90u8; 160 * 120], 160, 120).expect("detection failed");
    assert!(detection.segments.is_empty());
    assert!(detection.lines.is_empty());
    assert!(detection.arcs.is_empty());
    assert!(detection.circles.is_empty());
    assert!(detection.ellipses.is_empty());
}

#[test]
fn test_invalid_input_is_reported() {
    init_logger();
    assert!(matches!(detect(&[], 0, 10), Err(EdError::EmptyImage { width: 0, height: 10 })));
    assert!(matches!(
        detect(&[0u8; 99], 10, 10),
        Err(EdError::BufferSizeMismatch { expected: 100, actual: 99 })
    ));
}

#[test]
fn test_parallel_matches_sequential() {
    init_logger();
    let gray = disk_scene();
    let sequential = Detector::with_params(EdParams {
        parallel: false,
        ..EdParams::default()
    });
    let parallel = Detector::with_params(EdParams {
        parallel: true,
        ..EdParams::default()
    });
    let a = sequential.detect_image(&gray).expect("sequential run failed");
    let b = parallel.detect_image(&gray).expect("parallel run failed");
    assert_same_detection(&a, &b);
}

#[test]
fn test_external_gradient_matches_internal() {
    init_logger();
    let gray = disk_scene();
    let params = EdParams::default();
    let smoothed = match &params.smoothing {
        Some(kernel) => gaussian_blur(&gray, kernel),
        None => gray.clone(),
    };
    let field = GradientField::compute(&smoothed, params.operator, params.magnitude_threshold);
    let external = detect_from_gradient(&smoothed, &field, &params).expect("detection failed");
    let internal = Detector::with_params(params).detect_image(&gray).expect("detection failed");
    assert_same_detection(&external, &internal);
}

#[test]
fn test_image_crate_buffer_round_trip() {
    init_logger();
    // Raw buffers from the image crate feed straight into detection
    let gray = disk_scene();
    let buffer = image::GrayImage::from_raw(gray.width() as u32, gray.height() as u32, gray.as_bytes().to_vec())
        .expect("buffer size");
    let detection = detect(buffer.as_raw(), buffer.width() as usize, buffer.height() as usize)
        .expect("detection failed");
    assert_eq!(detection.circles.len(), 1);
}
