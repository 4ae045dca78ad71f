use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use crate::config::EdParams;
use crate::detector::anchors::AnchorExtractor;
use crate::detector::arcs::ArcCandidateBuilder;
use crate::detector::linking::link_anchors;
use crate::detector::lines::LineFitter;
use crate::detector::merge::{ArcMerger, MergeShape, Shape};
use crate::detector::validation::SegmentValidator;
use crate::detector::verify::PrimitiveValidator;
use crate::models::{Arc, Circle, EdgeSegment, Ellipse, GrayImage, Line, Point};
use crate::utils::gradient::GradientField;

/// How far down the pipeline a run goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Segments and lines only
    LinesOnly,
    /// Segments, lines, arcs, circles and ellipses
    Full,
}

/// Counters collected during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Anchors found on the grid
    pub anchors: usize,
    /// Chains produced by linking
    pub raw_segments: usize,
    /// Pixels claimed by linking
    pub edge_pixels: usize,
    /// Meaningful chains after validation
    pub valid_segments: usize,
    /// Lines accepted by the alignment test
    pub lines: usize,
    /// Lines rejected by the alignment test
    pub lines_rejected: usize,
    /// Arc candidates built from line runs
    pub arc_candidates: usize,
    /// Closed segments fitted directly as a circle or ellipse
    pub closed_shapes: usize,
    /// Circles submitted to the final test
    pub circle_candidates: usize,
    /// Ellipses submitted to the final test
    pub ellipse_candidates: usize,
    /// Circles rejected by the final test
    pub circles_rejected: usize,
    /// Ellipses rejected by the final test
    pub ellipses_rejected: usize,
}

/// Everything one run produces
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Validated edge segments in linking order
    pub segments: Vec<EdgeSegment>,
    /// Accepted lines
    pub lines: Vec<Line>,
    /// Arcs that were never promoted
    pub arcs: Vec<Arc>,
    /// Accepted circles
    pub circles: Vec<Circle>,
    /// Accepted ellipses
    pub ellipses: Vec<Ellipse>,
    /// Run counters
    pub stats: PipelineStats,
}

/// Anchors, linking and validation; returns the meaningful segments
pub(crate) fn extract_segments(field: &GradientField, params: &EdParams, stats: &mut PipelineStats) -> Vec<EdgeSegment> {
    let start = Instant::now();
    let mut anchors = AnchorExtractor::extract(field, params.anchor_threshold, params.anchor_stride);
    AnchorExtractor::sort(&mut anchors);
    stats.anchors = anchors.len();

    let (raw, edge_map) = link_anchors(field, &anchors);
    stats.raw_segments = raw.len();
    stats.edge_pixels = edge_map.claimed_count();

    let validator = SegmentValidator::new(field, &raw);
    let segments = validator.validate_all(&raw);
    stats.valid_segments = segments.len();
    debug!(
        "segments: {} anchors, {} raw, {} valid in {:.2} ms",
        stats.anchors,
        stats.raw_segments,
        stats.valid_segments,
        start.elapsed().as_secs_f64() * 1000.0
    );
    segments
}

struct SegmentOutput {
    lines: Vec<Line>,
    rejected: usize,
    arcs: Vec<Arc>,
    closed: Option<Shape>,
}

/// Fit a closed chain directly as a circle, falling back to an ellipse
fn closed_shape(segment: &EdgeSegment, min_length: usize, merger: &ArcMerger) -> Option<Shape> {
    if !segment.is_closed() || segment.len() < min_length {
        return None;
    }
    let points: Vec<Point> = segment.points().collect();
    let length = segment.polyline_length();
    for kind in [MergeShape::Circle, MergeShape::Ellipse] {
        match Shape::fit(kind, &points) {
            Ok(shape) if merger.promotes(&shape, length) => return Some(shape),
            Ok(_) => {}
            Err(err) => debug!("closed segment of {} pixels: {err}", segment.len()),
        }
    }
    None
}

fn process_segment(
    segment: &EdgeSegment,
    fitter: &LineFitter<'_>,
    builder: &ArcCandidateBuilder,
    merger: &ArcMerger,
    mode: PipelineMode,
) -> SegmentOutput {
    let (lines, rejected) = fitter.extract(segment);
    if mode == PipelineMode::LinesOnly {
        return SegmentOutput {
            lines,
            rejected,
            arcs: Vec::new(),
            closed: None,
        };
    }
    let closed = closed_shape(segment, fitter.min_length(), merger);
    let arcs = if closed.is_some() {
        Vec::new()
    } else {
        builder.build(&lines)
    };
    SegmentOutput {
        lines,
        rejected,
        arcs,
        closed,
    }
}

/// Run every stage on a smoothed raster and its gradient field
pub(crate) fn run(image: &GrayImage, field: &GradientField, params: &EdParams, mode: PipelineMode) -> Detection {
    let mut stats = PipelineStats::default();
    let segments = extract_segments(field, params, &mut stats);

    let start = Instant::now();
    let fitter = LineFitter::new(field, params);
    let builder = ArcCandidateBuilder::new(params);
    let merger = ArcMerger::new(params);
    let outputs: Vec<SegmentOutput> = if params.parallel {
        segments
            .par_iter()
            .map(|s| process_segment(s, &fitter, &builder, &merger, mode))
            .collect()
    } else {
        segments
            .iter()
            .map(|s| process_segment(s, &fitter, &builder, &merger, mode))
            .collect()
    };

    let mut lines = Vec::new();
    let mut arcs = Vec::new();
    let mut shapes = Vec::new();
    for out in outputs {
        stats.lines_rejected += out.rejected;
        lines.extend(out.lines);
        arcs.extend(out.arcs);
        shapes.extend(out.closed);
    }
    stats.lines = lines.len();
    stats.arc_candidates = arcs.len();
    stats.closed_shapes = shapes.len();
    debug!(
        "lines: {} accepted, {} rejected, {} arc candidates in {:.2} ms",
        stats.lines,
        stats.lines_rejected,
        stats.arc_candidates,
        start.elapsed().as_secs_f64() * 1000.0
    );

    if mode == PipelineMode::LinesOnly {
        return Detection {
            segments,
            lines,
            stats,
            ..Detection::default()
        };
    }

    let start = Instant::now();
    let outcome = merger.merge(arcs);
    let mut circle_candidates = outcome.circles;
    let mut ellipse_candidates = outcome.ellipses;
    for shape in shapes {
        match shape {
            Shape::Circle(c) => circle_candidates.push(c),
            Shape::Ellipse(e) => ellipse_candidates.push(e),
        }
    }
    stats.circle_candidates = circle_candidates.len();
    stats.ellipse_candidates = ellipse_candidates.len();

    let validator = PrimitiveValidator::new(image, params);
    let circles: Vec<Circle> = circle_candidates
        .into_iter()
        .filter(|c| validator.accepts_circle(c))
        .collect();
    let ellipses: Vec<Ellipse> = ellipse_candidates
        .into_iter()
        .filter(|e| validator.accepts_ellipse(e))
        .collect();
    stats.circles_rejected = stats.circle_candidates - circles.len();
    stats.ellipses_rejected = stats.ellipse_candidates - ellipses.len();
    if stats.circles_rejected + stats.ellipses_rejected > 0 {
        debug!(
            "final test rejected {} circles and {} ellipses",
            stats.circles_rejected, stats.ellipses_rejected
        );
    }
    debug!(
        "shapes: {} circles, {} ellipses, {} arcs in {:.2} ms",
        circles.len(),
        ellipses.len(),
        outcome.arcs.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    Detection {
        segments,
        lines,
        arcs: outcome.arcs,
        circles,
        ellipses,
        stats,
    }
}
