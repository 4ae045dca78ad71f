//! Line extraction from validated edge segments
//!
//! A window of `Lmin` pixels slides along the chain until a total least
//! squares fit has mean error below the ceiling. It is then grown pixel by
//! pixel while each new pixel stays close to the line, refitted, and
//! emitted. Every emitted line must also pass a gradient alignment NFA test.

use log::{debug, warn};

use crate::config::EdParams;
use crate::error::{EdError, Result};
use crate::models::{EdgeSegment, Line, LineModel};
use crate::utils::geometry::gradient_aligned_with_line;
use crate::utils::gradient::GradientField;
use crate::utils::nfa::ln_binomial_tail;

/// `round(-4 · ln(√(W·H)) / ln(1/8))`, the shortest meaningful line
pub fn min_line_length(width: usize, height: usize) -> usize {
    let n = ((width * height) as f64).sqrt();
    let len = (-4.0 * n.ln() / 0.125f64.ln()).round();
    (len.max(2.0)) as usize
}

/// Total least squares fit of `segment`
///
/// The independent axis is the one with the larger spread. The error is the
/// mean perpendicular distance of the pixels to the fitted line.
pub fn fit_line(segment: &EdgeSegment) -> Result<Line> {
    let n = segment.len();
    if n < 2 {
        return Err(EdError::TooFewPoints {
            shape: "line",
            needed: 2,
            actual: n,
        });
    }
    let nf = n as f64;
    let (mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for p in segment.points() {
        sx += p.x;
        sy += p.y;
        sxx += p.x * p.x;
        syy += p.y * p.y;
        sxy += p.x * p.y;
    }
    let dx = nf * sxx - sx * sx;
    let dy = nf * syy - sy * sy;
    if dx <= 0.0 && dy <= 0.0 {
        return Err(EdError::DegenerateFit { shape: "line" });
    }

    let model = if dx >= dy {
        LineModel::ByX {
            slope: (nf * sxy - sx * sy) / dx,
            intercept: (sxx * sy - sx * sxy) / dx,
        }
    } else {
        LineModel::ByY {
            slope: (nf * sxy - sx * sy) / dy,
            intercept: (syy * sx - sy * sxy) / dy,
        }
    };
    let error = segment.points().map(|p| model.distance_to(p)).sum::<f64>() / nf;
    Ok(Line::new(model, segment.clone(), error))
}

/// Sliding-window line extraction and alignment validation
pub struct LineFitter<'a> {
    field: &'a GradientField,
    min_length: usize,
    max_error: f64,
    tolerance: f64,
    precision: f64,
    ln_tests: f64,
}

impl<'a> LineFitter<'a> {
    /// Fitter for the image described by `field`
    pub fn new(field: &'a GradientField, params: &EdParams) -> Self {
        let area = (field.width() * field.height()) as f64;
        Self {
            field,
            min_length: min_line_length(field.width(), field.height()),
            max_error: params.line_fit_max_error,
            tolerance: params.alignment_tolerance,
            precision: params.alignment_precision,
            ln_tests: 2.0 * area.ln(),
        }
    }

    /// Minimum seed window length
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Cut `segment` into lines without the alignment test
    pub fn fit_segment(&self, segment: &EdgeSegment) -> Vec<Line> {
        match self.fit_segment_inner(segment) {
            Ok(lines) => lines,
            Err(err) => {
                warn!("abandoning segment of {} pixels: {err}", segment.len());
                Vec::new()
            }
        }
    }

    fn fit_segment_inner(&self, segment: &EdgeSegment) -> Result<Vec<Line>> {
        let total = segment.len();
        let mut lines = Vec::new();
        let mut next = 0;

        while total - next >= self.min_length {
            let mut window = segment.slice(next..next + self.min_length);
            next += self.min_length;
            let mut line = fit_line(&window)?;

            while line.fitting_error() > self.max_error && next < total {
                window.pop_front();
                if let Some(&edgel) = segment.get(next) {
                    window.push_back(edgel);
                }
                next += 1;
                line = fit_line(&window)?;
            }
            if line.fitting_error() > self.max_error {
                break;
            }

            let model = line.model();
            while let Some(&edgel) = segment.get(next) {
                if model.distance_to(edgel.position.to_point()) > self.max_error {
                    break;
                }
                window.push_back(edgel);
                next += 1;
            }
            lines.push(fit_line(&window)?);
        }
        Ok(lines)
    }

    /// `ln NFA` of the gradient alignment of `line`
    pub fn ln_nfa(&self, line: &Line) -> f64 {
        let angle = line.angle();
        let total = line.segment().len() as u64;
        let aligned = line
            .segment()
            .iter()
            .filter(|e| {
                let (gx, gy) = self.field.gradient_at(e.position);
                gradient_aligned_with_line(gx as f64, gy as f64, angle, self.tolerance)
            })
            .count() as u64;
        self.ln_tests + ln_binomial_tail(total, aligned, self.precision)
    }

    /// Whether the pixels' gradients back the line up (`NFA <= 1`)
    pub fn is_valid(&self, line: &Line) -> bool {
        self.ln_nfa(line) <= 0.0
    }

    /// Lines of `segment` that pass the alignment test, plus the rejected count
    pub fn extract(&self, segment: &EdgeSegment) -> (Vec<Line>, usize) {
        let fitted = self.fit_segment(segment);
        let before = fitted.len();
        let lines: Vec<Line> = fitted.into_iter().filter(|l| self.is_valid(l)).collect();
        let rejected = before - lines.len();
        if rejected > 0 {
            debug!("lines: {rejected} of {before} rejected by alignment test");
        }
        (lines, rejected)
    }
}
