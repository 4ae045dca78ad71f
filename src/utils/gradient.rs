//! Gradient field consumed by the edge drawing stages
//!
//! A 3x3 Sobel or Prewitt pair gives `gx`/`gy` per pixel. Magnitudes below
//! the threshold are zeroed, and the one-pixel border is always zero so
//! chains never reach the raster edge. Each pixel is classified as a
//! horizontal or vertical edge from the dominant derivative.

use rayon::prelude::*;

use crate::error::{EdError, Result};
use crate::models::{GrayImage, Position};

type Kernel3 = [[i32; 3]; 3];

const SOBEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];
const PREWITT_X: Kernel3 = [[-1, 0, 1], [-1, 0, 1], [-1, 0, 1]];
const PREWITT_Y: Kernel3 = [[-1, -1, -1], [0, 0, 0], [1, 1, 1]];

/// Default magnitude threshold, `8·√2`
pub const DEFAULT_MAGNITUDE_THRESHOLD: f32 = 11.313_708;

/// 3x3 derivative operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientOperator {
    /// Sobel kernels
    #[default]
    Sobel,
    /// Prewitt kernels
    Prewitt,
}

impl GradientOperator {
    fn kernels(self) -> (&'static Kernel3, &'static Kernel3) {
        match self {
            GradientOperator::Sobel => (&SOBEL_X, &SOBEL_Y),
            GradientOperator::Prewitt => (&PREWITT_X, &PREWITT_Y),
        }
    }
}

/// Local edge direction class of a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOrientation {
    /// Edge runs left to right (`|gx| < |gy|`)
    Horizontal,
    /// Edge runs top to bottom (`|gx| >= |gy|`)
    Vertical,
}

impl EdgeOrientation {
    fn classify(gx: f32, gy: f32) -> Self {
        if gx.abs() >= gy.abs() {
            EdgeOrientation::Vertical
        } else {
            EdgeOrientation::Horizontal
        }
    }
}

/// Per-pixel derivatives, magnitude and orientation class
#[derive(Debug, Clone)]
pub struct GradientField {
    width: usize,
    height: usize,
    gx: Vec<f32>,
    gy: Vec<f32>,
    magnitude: Vec<f32>,
    orientation: Vec<EdgeOrientation>,
}

impl GradientField {
    /// Convolve `image` with `operator` and build the field
    pub fn compute(image: &GrayImage, operator: GradientOperator, magnitude_threshold: f32) -> Self {
        let (width, height) = (image.width(), image.height());
        let (kx, ky) = operator.kernels();
        let src = image.as_bytes();
        let mut gx = vec![0f32; width * height];
        let mut gy = vec![0f32; width * height];

        if width >= 3 && height >= 3 {
            gx.par_chunks_mut(width)
                .zip(gy.par_chunks_mut(width))
                .enumerate()
                .filter(|(y, _)| *y >= 1 && *y + 1 < height)
                .for_each(|(y, (row_x, row_y))| {
                    for x in 1..width - 1 {
                        let (mut sx, mut sy) = (0i32, 0i32);
                        for (j, (kx_row, ky_row)) in kx.iter().zip(ky.iter()).enumerate() {
                            let base = (y + j - 1) * width + x - 1;
                            for i in 0..3 {
                                let v = src[base + i] as i32;
                                sx += kx_row[i] * v;
                                sy += ky_row[i] * v;
                            }
                        }
                        row_x[x] = sx as f32;
                        row_y[x] = sy as f32;
                    }
                });
        }

        Self::assemble(width, height, gx, gy, magnitude_threshold)
    }

    /// Build a field from externally computed derivative planes
    pub fn from_gradients(
        width: usize,
        height: usize,
        gx: Vec<f32>,
        gy: Vec<f32>,
        magnitude_threshold: f32,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EdError::EmptyImage { width, height });
        }
        for plane in [&gx, &gy] {
            if plane.len() != width * height {
                return Err(EdError::BufferSizeMismatch {
                    expected: width * height,
                    actual: plane.len(),
                });
            }
        }
        Ok(Self::assemble(width, height, gx, gy, magnitude_threshold))
    }

    fn assemble(width: usize, height: usize, mut gx: Vec<f32>, mut gy: Vec<f32>, threshold: f32) -> Self {
        let mut magnitude = vec![0f32; width * height];
        let mut orientation = vec![EdgeOrientation::Vertical; width * height];
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                let m = (gx[i] * gx[i] + gy[i] * gy[i]).sqrt();
                if border || m < threshold {
                    gx[i] = 0.0;
                    gy[i] = 0.0;
                    continue;
                }
                magnitude[i] = m;
                orientation[i] = EdgeOrientation::classify(gx[i], gy[i]);
            }
        }
        Self {
            width,
            height,
            gx,
            gy,
            magnitude,
            orientation,
        }
    }

    /// Field width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `pos` lies inside the field
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Magnitude at `pos`, zero outside the field
    pub fn magnitude_at(&self, pos: Position) -> f32 {
        self.index(pos).map(|i| self.magnitude[i]).unwrap_or(0.0)
    }

    /// Orientation class at `pos`
    pub fn orientation_at(&self, pos: Position) -> EdgeOrientation {
        self.index(pos)
            .map(|i| self.orientation[i])
            .unwrap_or(EdgeOrientation::Vertical)
    }

    /// `(gx, gy)` at `pos`, zero outside the field or below threshold
    pub fn gradient_at(&self, pos: Position) -> (f32, f32) {
        self.index(pos)
            .map(|i| (self.gx[i], self.gy[i]))
            .unwrap_or((0.0, 0.0))
    }

    /// All magnitudes in raster order
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitude
    }
}
