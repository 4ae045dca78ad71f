use std::collections::VecDeque;
use std::ops::Range;

use super::{Point, Position};

/// Pixel position paired with its gradient magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edgel {
    /// Pixel position
    pub position: Position,
    /// Gradient magnitude at the pixel
    pub magnitude: f32,
}

impl Edgel {
    /// Create a new edgel
    pub fn new(position: Position, magnitude: f32) -> Self {
        Self {
            position,
            magnitude,
        }
    }
}

/// Ordered chain of edgels traced along one gradient ridge
///
/// Double-ended so the linker can grow it in both directions and the line
/// fitter can slide a window over it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSegment {
    edgels: VecDeque<Edgel>,
}

impl EdgeSegment {
    /// Empty segment
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment holding a single edgel
    pub fn starting_at(edgel: Edgel) -> Self {
        let mut edgels = VecDeque::with_capacity(64);
        edgels.push_back(edgel);
        Self { edgels }
    }

    /// Number of edgels
    pub fn len(&self) -> usize {
        self.edgels.len()
    }

    /// True for a segment without edgels
    pub fn is_empty(&self) -> bool {
        self.edgels.is_empty()
    }

    /// Prepend an edgel
    pub fn push_front(&mut self, edgel: Edgel) {
        self.edgels.push_front(edgel);
    }

    /// Append an edgel
    pub fn push_back(&mut self, edgel: Edgel) {
        self.edgels.push_back(edgel);
    }

    /// Remove the first edgel
    pub fn pop_front(&mut self) -> Option<Edgel> {
        self.edgels.pop_front()
    }

    /// Remove the last edgel
    pub fn pop_back(&mut self) -> Option<Edgel> {
        self.edgels.pop_back()
    }

    /// First edgel
    pub fn front(&self) -> Option<&Edgel> {
        self.edgels.front()
    }

    /// Last edgel
    pub fn back(&self) -> Option<&Edgel> {
        self.edgels.back()
    }

    /// Edgel at `index`
    pub fn get(&self, index: usize) -> Option<&Edgel> {
        self.edgels.get(index)
    }

    /// Iterate over the edgels in chain order
    pub fn iter(&self) -> impl Iterator<Item = &Edgel> + '_ {
        self.edgels.iter()
    }

    /// Iterate over pixel centers as floating points
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.edgels.iter().map(|e| e.position.to_point())
    }

    /// Copy of the edgels in `range`
    pub fn slice(&self, range: Range<usize>) -> EdgeSegment {
        EdgeSegment {
            edgels: self.edgels.range(range).copied().collect(),
        }
    }

    /// Index of the weakest edgel within `range`, first one on ties
    pub fn weakest_in(&self, range: Range<usize>) -> Option<usize> {
        let start = range.start;
        self.edgels
            .range(range)
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, e)| match best {
                Some((_, m)) if m <= e.magnitude => best,
                _ => Some((start + i, e.magnitude)),
            })
            .map(|(i, _)| i)
    }

    /// Smallest magnitude within `range`
    pub fn min_magnitude_in(&self, range: Range<usize>) -> Option<f32> {
        self.weakest_in(range).map(|i| self.edgels[i].magnitude)
    }

    /// Whether the chain loops back on itself
    pub fn is_closed(&self) -> bool {
        match (self.front(), self.back()) {
            (Some(first), Some(last)) if self.len() >= 3 => first.position.touches(&last.position),
            _ => false,
        }
    }

    /// Sum of distances between consecutive pixels
    pub fn polyline_length(&self) -> f64 {
        self.edgels
            .iter()
            .zip(self.edgels.iter().skip(1))
            .map(|(a, b)| a.position.to_point().distance(&b.position.to_point()))
            .sum()
    }
}

impl FromIterator<Edgel> for EdgeSegment {
    fn from_iter<I: IntoIterator<Item = Edgel>>(iter: I) -> Self {
        Self {
            edgels: iter.into_iter().collect(),
        }
    }
}
