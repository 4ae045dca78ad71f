//! Gaussian smoothing applied before gradient computation
//!
//! The kernel is separable: one horizontal and one vertical pass with
//! clamp-to-edge borders. Rows are processed in parallel.

use rayon::prelude::*;

use crate::models::GrayImage;

/// Square Gaussian kernel description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    /// Kernel width in pixels (odd)
    pub size: usize,
    /// Standard deviation
    pub sigma: f64,
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self {
            size: 5,
            sigma: 1.0,
        }
    }
}

impl GaussianKernel {
    /// Normalized 1D weights
    pub fn weights(&self) -> Vec<f32> {
        let radius = (self.size / 2) as i64;
        let denom = 2.0 * self.sigma * self.sigma;
        let raw: Vec<f64> = (-radius..=radius)
            .map(|i| (-((i * i) as f64) / denom).exp())
            .collect();
        let sum: f64 = raw.iter().sum();
        raw.iter().map(|w| (w / sum) as f32).collect()
    }
}

/// Blur `image` with `kernel`, returning a new image of the same size
pub fn gaussian_blur(image: &GrayImage, kernel: &GaussianKernel) -> GrayImage {
    let (width, height) = (image.width(), image.height());
    let weights = kernel.weights();
    let radius = (weights.len() / 2) as isize;
    let src = image.as_bytes();

    let clamp = |v: isize, max: usize| v.clamp(0, max as isize - 1) as usize;

    let mut horizontal = vec![0f32; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let line = &src[y * width..(y + 1) * width];
            for (x, out) in row.iter_mut().enumerate() {
                *out = weights
                    .iter()
                    .enumerate()
                    .map(|(k, w)| w * line[clamp(x as isize + k as isize - radius, width)] as f32)
                    .sum();
            }
        });

    let mut blurred = vec![0u8; width * height];
    blurred
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let value: f32 = weights
                    .iter()
                    .enumerate()
                    .map(|(k, w)| {
                        w * horizontal[clamp(y as isize + k as isize - radius, height) * width + x]
                    })
                    .sum();
                *out = value.round().clamp(0.0, 255.0) as u8;
            }
        });

    // Dimensions are unchanged, so the buffer always matches.
    GrayImage::new(width, height, blurred).unwrap_or_else(|_| image.clone())
}
