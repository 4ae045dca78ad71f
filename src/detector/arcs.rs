use log::debug;

use crate::config::EdParams;
use crate::detector::conic::fit_circle;
use crate::models::{Arc, Line, Point};
use crate::utils::geometry::turn_between;

/// Groups consecutive lines of one segment into arc candidates
#[derive(Debug, Clone, Copy)]
pub struct ArcCandidateBuilder {
    min_turn: f64,
    max_turn: f64,
}

/// Shortest run of lines that can form an arc
pub const MIN_ARC_LINES: usize = 3;

impl ArcCandidateBuilder {
    /// Builder with the turn bounds of `params`
    pub fn new(params: &EdParams) -> Self {
        Self {
            min_turn: params.min_turn_degrees,
            max_turn: params.max_turn_degrees,
        }
    }

    /// Index ranges of maximal runs turning consistently within bounds
    pub fn runs(&self, lines: &[Line]) -> Vec<std::ops::Range<usize>> {
        let mut runs = Vec::new();
        if lines.len() < MIN_ARC_LINES {
            return runs;
        }
        let turns: Vec<(f64, i8)> = lines
            .windows(2)
            .map(|pair| turn_between(pair[0].direction(), pair[1].direction()))
            .collect();
        let within = |(deg, _): (f64, i8)| deg >= self.min_turn && deg <= self.max_turn;

        let mut i = 0;
        while i + 1 < lines.len() {
            // Extend the run while turn i..j stays within bounds with one sign
            let mut j = i;
            let mut sign = 0i8;
            while j + 1 < lines.len() {
                let turn = turns[j];
                if !within(turn) || (sign != 0 && turn.1 != sign) {
                    break;
                }
                sign = turn.1;
                j += 1;
            }
            if j + 1 - i >= MIN_ARC_LINES {
                runs.push(i..j + 1);
                i = j + 1;
            } else if j > i {
                i = j;
            } else {
                i += 1;
            }
        }
        runs
    }

    /// Arc candidates of one segment's lines, each with its fitted circle
    pub fn build(&self, lines: &[Line]) -> Vec<Arc> {
        let arcs: Vec<Arc> = self
            .runs(lines)
            .into_iter()
            .filter_map(|range| {
                let run = lines[range].to_vec();
                let points: Vec<Point> = run.iter().flat_map(|l| l.segment().points()).collect();
                match fit_circle(&points) {
                    Ok(circle) => Some(Arc::new(run, circle)),
                    Err(err) => {
                        debug!("arc candidate dropped: {err}");
                        None
                    }
                }
            })
            .collect();
        arcs
    }
}
