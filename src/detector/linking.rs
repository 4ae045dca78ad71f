//! Edge linking ("smart routing")
//!
//! Starting at each anchor, strongest first, the linker walks the gradient
//! ridge in both directions. At every step it looks at the three pixels ahead
//! (two diagonals and straight) and moves to the strongest. The walk turns
//! when the orientation class of the new pixel changes, which lets a chain
//! follow curves through 90 degrees.

use log::debug;

use crate::models::{EdgeMap, EdgeSegment, Edgel, Position};
use crate::utils::gradient::{EdgeOrientation, GradientField};

/// Direction of travel along the ridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aim {
    Left,
    Right,
    Up,
    Down,
}

/// Which end of the chain a walk extends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainEnd {
    Front,
    Back,
}

impl Aim {
    /// Orientation class the aim travels along
    fn class(self) -> EdgeOrientation {
        match self {
            Aim::Left | Aim::Right => EdgeOrientation::Horizontal,
            Aim::Up | Aim::Down => EdgeOrientation::Vertical,
        }
    }

    /// Candidate offsets: side, straight, side
    fn candidates(self) -> [(i32, i32); 3] {
        match self {
            Aim::Left => [(-1, -1), (-1, 0), (-1, 1)],
            Aim::Right => [(1, -1), (1, 0), (1, 1)],
            Aim::Up => [(-1, -1), (0, -1), (1, -1)],
            Aim::Down => [(-1, 1), (0, 1), (1, 1)],
        }
    }
}

/// Chain builder owning the claimed-pixel map of one image
pub struct EdgeLinker<'a> {
    field: &'a GradientField,
    edge_map: EdgeMap,
}

impl<'a> EdgeLinker<'a> {
    /// Linker over `field` with nothing claimed yet
    pub fn new(field: &'a GradientField) -> Self {
        Self {
            field,
            edge_map: EdgeMap::new(field.width(), field.height()),
        }
    }

    /// Claimed pixels so far
    pub fn edge_map(&self) -> &EdgeMap {
        &self.edge_map
    }

    /// Consume the linker, keeping the claimed-pixel map
    pub fn into_edge_map(self) -> EdgeMap {
        self.edge_map
    }

    /// Trace a chain from every anchor that is still unclaimed
    ///
    /// `anchors` must already be sorted; earlier anchors win contested pixels.
    pub fn link(&mut self, anchors: &[Edgel]) -> Vec<EdgeSegment> {
        let mut segments = Vec::new();
        for anchor in anchors {
            if let Some(segment) = self.trace_from(anchor.position) {
                segments.push(segment);
            }
        }
        debug!(
            "linking: {} anchors -> {} segments, {} edge pixels",
            anchors.len(),
            segments.len(),
            self.edge_map.claimed_count()
        );
        segments
    }

    /// Build the chain through one anchor. `None` when it is already claimed
    /// or carries no gradient.
    pub fn trace_from(&mut self, anchor: Position) -> Option<EdgeSegment> {
        let magnitude = self.field.magnitude_at(anchor);
        if magnitude <= 0.0 || !self.edge_map.claim(anchor) {
            return None;
        }
        let mut segment = EdgeSegment::starting_at(Edgel::new(anchor, magnitude));
        let (backward, forward) = match self.field.orientation_at(anchor) {
            EdgeOrientation::Horizontal => (Aim::Left, Aim::Right),
            EdgeOrientation::Vertical => (Aim::Up, Aim::Down),
        };
        self.walk(anchor, backward, &mut segment, ChainEnd::Front);
        self.walk(anchor, forward, &mut segment, ChainEnd::Back);
        Some(segment)
    }

    fn walk(&mut self, start: Position, aim: Aim, segment: &mut EdgeSegment, end: ChainEnd) {
        let mut current = start;
        let mut aim = aim;
        while let Some(next) = self.step(current, aim) {
            if !self.edge_map.claim(next) {
                break;
            }
            let edgel = Edgel::new(next, self.field.magnitude_at(next));
            match end {
                ChainEnd::Front => segment.push_front(edgel),
                ChainEnd::Back => segment.push_back(edgel),
            }
            let class = self.field.orientation_at(next);
            if class != aim.class() {
                aim = self.turn(current, next, class);
            }
            current = next;
        }
    }

    /// Pick the next pixel for `aim`, or `None` when the walk must stop
    fn step(&self, current: Position, aim: Aim) -> Option<Position> {
        let [side_a, straight, side_b] = aim.candidates().map(|(dx, dy)| current.offset(dx, dy));
        let [ma, ms, mb] = [side_a, straight, side_b].map(|p| self.field.magnitude_at(p));
        let best = if ma > ms && ma > mb {
            side_a
        } else if mb > ms && mb > ma {
            side_b
        } else {
            straight
        };
        let usable = self.field.contains(best)
            && self.field.magnitude_at(best) > 0.0
            && !self.edge_map.is_claimed(best);
        usable.then_some(best)
    }

    /// New aim after stepping from `prev` onto `next`, whose class is `class`
    fn turn(&self, prev: Position, next: Position, class: EdgeOrientation) -> Aim {
        let (dx, dy) = (next.x - prev.x, next.y - prev.y);
        match class {
            EdgeOrientation::Vertical => {
                if dy > 0 {
                    Aim::Down
                } else if dy < 0 {
                    Aim::Up
                } else if self.field.magnitude_at(next.offset(0, -1))
                    > self.field.magnitude_at(next.offset(0, 1))
                {
                    Aim::Up
                } else {
                    Aim::Down
                }
            }
            EdgeOrientation::Horizontal => {
                if dx > 0 {
                    Aim::Right
                } else if dx < 0 {
                    Aim::Left
                } else if self.field.magnitude_at(next.offset(-1, 0))
                    > self.field.magnitude_at(next.offset(1, 0))
                {
                    Aim::Left
                } else {
                    Aim::Right
                }
            }
        }
    }
}

/// Link sorted anchors into segments, returning the claimed-pixel map too
pub fn link_anchors(field: &GradientField, anchors: &[Edgel]) -> (Vec<EdgeSegment>, EdgeMap) {
    let mut linker = EdgeLinker::new(field);
    let segments = linker.link(anchors);
    (segments, linker.into_edge_map())
}
