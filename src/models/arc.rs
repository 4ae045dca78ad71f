use super::{Circle, Line, Point};

/// Run of consecutive lines bending consistently, with its fitted circle
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    lines: Vec<Line>,
    circle: Circle,
    length: f64,
}

impl Arc {
    /// Create an arc from its lines and the circle fitted to their pixels
    pub fn new(lines: Vec<Line>, circle: Circle) -> Self {
        let length = lines.iter().map(Line::length).sum();
        Self {
            lines,
            circle,
            length,
        }
    }

    /// Constituent lines in order
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Take ownership of the constituent lines
    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    /// Circle fitted to all pixels of the arc
    pub fn circle(&self) -> &Circle {
        &self.circle
    }

    /// Sum of the line lengths
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Start of the first line
    pub fn begin(&self) -> Point {
        self.lines.first().map(Line::begin).unwrap_or_default()
    }

    /// End of the last line
    pub fn end(&self) -> Point {
        self.lines.last().map(Line::end).unwrap_or_default()
    }

    /// Every pixel of every line, in order
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.lines.iter().flat_map(|l| l.segment().points())
    }

    /// Smallest distance between an endpoint of `self` and one of `other`
    pub fn endpoint_gap(&self, other: &Arc) -> f64 {
        let mine = [self.begin(), self.end()];
        let theirs = [other.begin(), other.end()];
        mine.iter()
            .flat_map(|a| theirs.iter().map(move |b| a.distance(b)))
            .fold(f64::INFINITY, f64::min)
    }
}
