use super::Position;

/// Compact bit grid recording which pixels already belong to a chain
#[derive(Debug, Clone)]
pub struct EdgeMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
    claimed: usize,
}

impl EdgeMap {
    /// Create an empty map with the given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
            claimed: 0,
        }
    }

    /// Map width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of claimed pixels
    pub fn claimed_count(&self) -> usize {
        self.claimed
    }

    fn bit(&self, pos: Position) -> Option<(usize, u8)> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height {
            return None;
        }
        let index = pos.y as usize * self.width + pos.x as usize;
        Some((index / 8, 1 << (index % 8)))
    }

    /// Whether the pixel is claimed. Out-of-bounds positions are never claimed.
    pub fn is_claimed(&self, pos: Position) -> bool {
        self.bit(pos)
            .map(|(byte, mask)| self.data[byte] & mask != 0)
            .unwrap_or(false)
    }

    /// Claim a pixel. Returns false when it was already claimed or lies outside the map.
    pub fn claim(&mut self, pos: Position) -> bool {
        match self.bit(pos) {
            Some((byte, mask)) if self.data[byte] & mask == 0 => {
                self.data[byte] |= mask;
                self.claimed += 1;
                true
            }
            _ => false,
        }
    }

    /// Iterate over every claimed position in raster order
    pub fn claimed_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| {
                let pos = Position::new(x as i32, y as i32);
                self.is_claimed(pos).then_some(pos)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let mut map = EdgeMap::new(8, 8);
        assert_eq!(map.width(), 8);
        assert_eq!(map.height(), 8);

        let p = Position::new(3, 4);
        assert!(map.claim(p));
        assert!(map.is_claimed(p));
        assert!(!map.claim(p));
        assert!(!map.is_claimed(Position::new(3, 3)));
        assert_eq!(map.claimed_count(), 1);
        assert_eq!(map.claimed_positions().collect::<Vec<_>>(), vec![p]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut map = EdgeMap::new(8, 8);
        assert!(!map.claim(Position::new(10, 10)));
        assert!(!map.claim(Position::new(-1, 0)));
        assert!(!map.is_claimed(Position::new(10, 10)));
        assert_eq!(map.claimed_count(), 0);
    }
}
