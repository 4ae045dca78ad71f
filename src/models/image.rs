use crate::error::{EdError, Result};

use super::Position;

/// Owned 8-bit grayscale raster in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImage {
    /// Wrap a pixel buffer, checking it against the declared dimensions
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EdError::EmptyImage { width, height });
        }
        if data.len() != width * height {
            return Err(EdError::BufferSizeMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Copy a borrowed buffer into a new image
    pub fn from_slice(data: &[u8], width: usize, height: usize) -> Result<Self> {
        Self::new(width, height, data.to_vec())
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw pixels
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Intensity at (x, y), `None` outside the raster
    pub fn get(&self, pos: Position) -> Option<u8> {
        if !self.contains(pos) {
            return None;
        }
        Some(self.data[pos.y as usize * self.width + pos.x as usize])
    }

    /// Whether the position lies inside the raster
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_dimensions() {
        assert_eq!(
            GrayImage::new(0, 4, vec![]),
            Err(EdError::EmptyImage { width: 0, height: 4 })
        );
        assert_eq!(
            GrayImage::new(2, 2, vec![0; 3]),
            Err(EdError::BufferSizeMismatch { expected: 4, actual: 3 })
        );
    }

    #[test]
    fn test_pixel_access() {
        let img = GrayImage::new(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.get(Position::new(2, 1)), Some(6));
        assert_eq!(img.get(Position::new(3, 0)), None);
        assert_eq!(img.get(Position::new(0, -1)), None);
    }
}
