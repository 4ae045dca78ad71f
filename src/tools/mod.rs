//! Developer tooling shared by the CLI, benches and tests

pub mod overlay;
pub mod synthetic;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use image::GenericImageView;
use thiserror::Error;

use crate::error::EdError;
use crate::models::GrayImage;
use crate::pipeline::Detection;

/// Failure to bring an image file into the pipeline
#[derive(Debug, Error)]
pub enum LoadError {
    /// Decoding or file access failed
    #[error("failed to read image: {0}")]
    Image(#[from] image::ImageError),
    /// The decoded raster was unusable
    #[error(transparent)]
    Raster(#[from] EdError),
}

fn max_dim_from_env() -> Option<u32> {
    match env::var("ED_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load any supported image file as 8-bit grayscale
///
/// Images larger than `ED_MAX_DIM` on their long side are downscaled first.
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<GrayImage, LoadError> {
    let img = image::open(path)?;
    let img = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => {
            img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
        }
        _ => img,
    };
    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    Ok(GrayImage::new(width as usize, height as usize, luma.into_raw())?)
}

/// Write a grayscale raster to disk; the format follows the extension
pub fn save_gray<P: AsRef<Path>>(path: P, gray: &GrayImage) -> Result<(), image::ImageError> {
    image::save_buffer(
        path,
        gray.as_bytes(),
        gray.width() as u32,
        gray.height() as u32,
        image::ColorType::L8,
    )
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Primitive counts accumulated over many detections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionTotals {
    /// Images processed
    pub images: usize,
    /// Validated edge segments
    pub segments: usize,
    /// Lines
    pub lines: usize,
    /// Unpromoted arcs
    pub arcs: usize,
    /// Circles
    pub circles: usize,
    /// Ellipses
    pub ellipses: usize,
}

impl DetectionTotals {
    /// Add one image's results
    pub fn add(&mut self, detection: &Detection) {
        self.images += 1;
        self.segments += detection.segments.len();
        self.lines += detection.lines.len();
        self.arcs += detection.arcs.len();
        self.circles += detection.circles.len();
        self.ellipses += detection.ellipses.len();
    }
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("ED_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("benches/images"))
}

/// Default bench limit from environment variables.
///
/// Returns `None` (full dataset) when `ED_BENCH_LIMIT` is unset or set to `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    match env::var("ED_BENCH_LIMIT") {
        Ok(value) => value
            .parse::<usize>()
            .ok()
            .and_then(|v| if v == 0 { None } else { Some(v) }),
        Err(_) => None,
    }
}

/// Iterate dataset image paths in sorted order with an optional limit.
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "bmp" | "pgm") {
                    images.push(path);
                }
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("edge_drawing_tools_{nanos}_{sequence}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn test_grayscale_stats() {
        let stats = grayscale_stats(&[10, 20, 30]);
        assert_eq!((stats.min, stats.max, stats.avg), (10, 30, 20));
        assert_eq!(grayscale_stats(&[]).avg, 0);
    }

    #[test]
    fn test_save_then_load_png() {
        let dir = temp_dir();
        let path = dir.join("ramp.png");
        let data: Vec<u8> = (0..64u8).map(|v| v * 4).collect();
        let gray = GrayImage::new(8, 8, data).unwrap();
        save_gray(&path, &gray).unwrap();
        let loaded = load_gray(&path).unwrap();
        assert_eq!(loaded, gray);

        let listed: Vec<PathBuf> = dataset_iter(&dir, None).collect();
        assert_eq!(listed, vec![path]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            load_gray("/nonexistent/edge_drawing.png"),
            Err(LoadError::Image(_))
        ));
    }
}
