use crate::models::{Edgel, Position};
use crate::utils::gradient::{EdgeOrientation, GradientField};

/// Seed pixel selection on a fixed-stride grid
pub struct AnchorExtractor;

impl AnchorExtractor {
    /// Emit every grid pixel that is a magnitude maximum across its edge
    ///
    /// Horizontal edges are compared with the pixels above and below,
    /// vertical edges with the pixels left and right. The grid starts at
    /// `max(1, stride / 2)` so border pixels are never visited.
    pub fn extract(field: &GradientField, threshold: f32, stride: usize) -> Vec<Edgel> {
        let stride = stride.max(1);
        let start = (stride / 2).max(1);
        let (width, height) = (field.width(), field.height());
        let mut anchors = Vec::new();
        if width < 3 || height < 3 {
            return anchors;
        }

        for y in (start..height - 1).step_by(stride) {
            for x in (start..width - 1).step_by(stride) {
                let pos = Position::new(x as i32, y as i32);
                let m = field.magnitude_at(pos);
                if m <= 0.0 {
                    continue;
                }
                let (a, b) = match field.orientation_at(pos) {
                    EdgeOrientation::Horizontal => (pos.offset(0, -1), pos.offset(0, 1)),
                    EdgeOrientation::Vertical => (pos.offset(-1, 0), pos.offset(1, 0)),
                };
                if m - field.magnitude_at(a) > threshold && m - field.magnitude_at(b) > threshold {
                    anchors.push(Edgel::new(pos, m));
                }
            }
        }
        anchors
    }

    /// Order anchors strongest first; ties keep raster order
    pub fn sort(anchors: &mut [Edgel]) {
        anchors.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    }
}
