//! Greedy arc merging and promotion to circles and ellipses
//!
//! Each pass keeps a worklist of arcs ordered by length. The longest arc
//! absorbs nearby arcs whose fitted circles agree with its own, as long as
//! the refitted shape stays within the error ceiling. An arc covering more
//! than the configured fraction of its shape's circumference is promoted.

use log::debug;

use crate::config::EdParams;
use crate::detector::conic::{fit_circle, fit_ellipse};
use crate::error::Result;
use crate::models::{Arc, Circle, Ellipse, Line, Point};

/// Shape a merge pass promotes arcs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeShape {
    /// Circle pass
    Circle,
    /// Ellipse pass
    Ellipse,
}

/// Closed primitive found by fitting or merging
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Full circle
    Circle(Circle),
    /// Full ellipse
    Ellipse(Ellipse),
}

impl Shape {
    /// Fit `kind` to `points`
    pub fn fit(kind: MergeShape, points: &[Point]) -> Result<Shape> {
        match kind {
            MergeShape::Circle => fit_circle(points).map(Shape::Circle),
            MergeShape::Ellipse => fit_ellipse(points).map(Shape::Ellipse),
        }
    }

    /// Mean fitting residual
    pub fn fitting_error(&self) -> f64 {
        match self {
            Shape::Circle(c) => c.fitting_error,
            Shape::Ellipse(e) => e.fitting_error(),
        }
    }

    /// Perimeter
    pub fn circumference(&self) -> f64 {
        match self {
            Shape::Circle(c) => c.circumference(),
            Shape::Ellipse(e) => e.circumference(),
        }
    }
}

/// Result of both merge passes
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Arcs promoted to circles
    pub circles: Vec<Circle>,
    /// Arcs promoted to ellipses
    pub ellipses: Vec<Ellipse>,
    /// Arcs, merged or not, that were never promoted
    pub arcs: Vec<Arc>,
}

/// Two-pass greedy merger
#[derive(Debug, Clone, Copy)]
pub struct ArcMerger {
    circle_ratio: f64,
    ellipse_ratio: f64,
    max_error: f64,
    coverage: f64,
}

impl ArcMerger {
    /// Merger configured from `params`
    pub fn new(params: &EdParams) -> Self {
        Self {
            circle_ratio: params.circle_merge_ratio,
            ellipse_ratio: params.ellipse_merge_ratio,
            max_error: params.shape_fit_max_error,
            coverage: params.promote_coverage,
        }
    }

    /// Run the circle pass, then the ellipse pass on what is left
    pub fn merge(&self, arcs: Vec<Arc>) -> MergeOutcome {
        let input = arcs.len();
        let (circles, rest) = self.pass(arcs, MergeShape::Circle);
        let (ellipses, arcs) = self.pass(rest, MergeShape::Ellipse);
        let circles: Vec<Circle> = circles
            .into_iter()
            .filter_map(|s| match s {
                Shape::Circle(c) => Some(c),
                Shape::Ellipse(_) => None,
            })
            .collect();
        let ellipses: Vec<Ellipse> = ellipses
            .into_iter()
            .filter_map(|s| match s {
                Shape::Ellipse(e) => Some(e),
                Shape::Circle(_) => None,
            })
            .collect();
        debug!(
            "merge: {input} arcs -> {} circles, {} ellipses, {} arcs",
            circles.len(),
            ellipses.len(),
            arcs.len()
        );
        MergeOutcome {
            circles,
            ellipses,
            arcs,
        }
    }

    /// Whether `shape` fitted to an arc of `length` qualifies for promotion
    pub fn promotes(&self, shape: &Shape, length: f64) -> bool {
        shape.fitting_error() <= self.max_error && length > self.coverage * shape.circumference()
    }

    /// One greedy pass; returns promoted shapes and unpromoted arcs
    pub fn pass(&self, arcs: Vec<Arc>, kind: MergeShape) -> (Vec<Shape>, Vec<Arc>) {
        let ratio = match kind {
            MergeShape::Circle => self.circle_ratio,
            MergeShape::Ellipse => self.ellipse_ratio,
        };
        let mut worklist = arcs;
        let mut promoted = Vec::new();
        let mut finished = Vec::new();

        loop {
            // Ascending by length so the longest arc pops first
            worklist.sort_by(|a, b| a.length().total_cmp(&b.length()));
            let Some(target) = worklist.pop() else { break };

            let reference = *target.circle();
            let threshold = reference.radius * ratio;
            let (mut bucket, rest): (Vec<Arc>, Vec<Arc>) = std::mem::take(&mut worklist)
                .into_iter()
                .partition(|a| {
                    a.circle().center.distance(&reference.center) <= threshold
                        && (a.circle().radius - reference.radius).abs() <= threshold
                });
            worklist = rest;
            bucket.sort_by(|a, b| a.endpoint_gap(&target).total_cmp(&b.endpoint_gap(&target)));

            let mut lines: Vec<Line> = target.lines().to_vec();
            let mut absorbed = 0usize;
            for candidate in bucket {
                let mut trial = lines.clone();
                trial.extend_from_slice(candidate.lines());
                let points: Vec<Point> = trial.iter().flat_map(|l| l.segment().points()).collect();
                match Shape::fit(kind, &points) {
                    Ok(shape) if shape.fitting_error() <= self.max_error => {
                        lines = trial;
                        absorbed += 1;
                    }
                    _ => worklist.push(candidate),
                }
            }

            let merged = if absorbed == 0 {
                target
            } else {
                let points: Vec<Point> = lines.iter().flat_map(|l| l.segment().points()).collect();
                match fit_circle(&points) {
                    Ok(circle) => Arc::new(lines, circle),
                    Err(_) => target,
                }
            };

            let points: Vec<Point> = merged.points().collect();
            match Shape::fit(kind, &points) {
                Ok(shape) if self.promotes(&shape, merged.length()) => promoted.push(shape),
                _ if absorbed > 0 => worklist.push(merged),
                _ => finished.push(merged),
            }
        }
        (promoted, finished)
    }
}
