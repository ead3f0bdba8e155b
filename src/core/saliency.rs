//! Saliency estimation: a per-pixel importance map (0..=255) with the same
//! dimensions as the source image.
//!
//! Two strategies, picked once when the estimator is built:
//! - objectness: paint the top-scoring boxes of an [`ObjectnessDetector`] into a
//!   zeroed accumulator,
//! - edge gradient: Sobel magnitude of a blurred grayscale copy, min-max stretched.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GrayImage};
use imageproc::filter::separable_filter_equal;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::core::params::SaliencyParams;
use crate::error::Result;
use crate::types::CropRect;

/// 5-tap binomial kernel, the fixed-size Gaussian used for `ksize = 5`.
const GAUSSIAN_5: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Importance map indexed `[row, col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyMap {
    values: Array2<u8>,
}

impl SaliencyMap {
    pub fn from_array(values: Array2<u8>) -> Self {
        Self { values }
    }

    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            values: Array2::zeros((height as usize, width as usize)),
        }
    }

    pub fn values(&self) -> &Array2<u8> {
        &self.values
    }

    pub fn width(&self) -> u32 {
        self.values.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.values.nrows() as u32
    }

    /// Mean importance inside `rect` by direct summation; `None` if it leaves the map.
    pub fn mean(&self, rect: &CropRect) -> Option<f64> {
        if !rect.fits_within(self.width(), self.height()) {
            return None;
        }
        let (x0, y0) = (rect.x as usize, rect.y as usize);
        let window = self.values.slice(ndarray::s![
            y0..y0 + rect.height as usize,
            x0..x0 + rect.width as usize
        ]);
        let total: u64 = window.iter().map(|&v| v as u64).sum();
        Some(total as f64 / rect.area() as f64)
    }

    pub fn to_image(&self) -> GrayImage {
        let (rows, cols) = self.values.dim();
        GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
            image::Luma([self.values[[y as usize, x as usize]]])
        })
    }
}

/// Axis-aligned detector proposal; `x1`/`y1` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub score: f64,
}

/// A pretrained region-proposal model.
pub trait ObjectnessDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Proposals in any order; the estimator ranks them by score.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<ScoredBox>>;
}

pub enum SaliencyStrategy {
    Objectness(Box<dyn ObjectnessDetector>),
    EdgeGradient,
}

impl fmt::Debug for SaliencyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaliencyStrategy::Objectness(d) => write!(f, "Objectness({})", d.name()),
            SaliencyStrategy::EdgeGradient => write!(f, "EdgeGradient"),
        }
    }
}

#[derive(Debug)]
pub struct SaliencyEstimator {
    strategy: SaliencyStrategy,
    params: SaliencyParams,
}

impl SaliencyEstimator {
    /// Uses the objectness detector when `params.detector_assets` exists and a detector
    /// backend is compiled in; otherwise falls back to edge gradients for good.
    pub fn from_params(params: SaliencyParams) -> Self {
        let assets = params.detector_assets.clone();
        match load_detector(&assets) {
            Some(detector) => {
                info!(
                    "Objectness detector '{}' loaded from {:?}",
                    detector.name(),
                    assets
                );
                Self::with_detector(detector, params)
            }
            None => {
                info!(
                    "Objectness assets not usable at {:?}. Using edge-gradient saliency",
                    assets
                );
                Self {
                    strategy: SaliencyStrategy::EdgeGradient,
                    params,
                }
            }
        }
    }

    pub fn from_assets(path: impl AsRef<Path>) -> Self {
        Self::from_params(SaliencyParams {
            detector_assets: path.as_ref().to_path_buf(),
            ..SaliencyParams::default()
        })
    }

    pub fn with_detector(detector: Box<dyn ObjectnessDetector>, params: SaliencyParams) -> Self {
        Self {
            strategy: SaliencyStrategy::Objectness(detector),
            params,
        }
    }

    pub fn gradient() -> Self {
        Self {
            strategy: SaliencyStrategy::EdgeGradient,
            params: SaliencyParams::default(),
        }
    }

    pub fn strategy(&self) -> &SaliencyStrategy {
        &self.strategy
    }

    /// Map for `image` with the configured strategy.
    ///
    /// A detector that errors or succeeds with zero boxes falls back to the edge-gradient
    /// map for this image; an empty detection never produces an all-zero map.
    pub fn estimate(&self, image: &DynamicImage) -> SaliencyMap {
        let start = Instant::now();
        if let SaliencyStrategy::Objectness(detector) = &self.strategy {
            match detector.detect(image) {
                Ok(boxes) if !boxes.is_empty() => {
                    let map = paint_boxes(
                        image.width(),
                        image.height(),
                        boxes,
                        self.params.top_boxes,
                        self.params.box_weight,
                    );
                    info!(
                        "Objectness saliency map generated in {:.2?}",
                        start.elapsed()
                    );
                    return map;
                }
                Ok(_) => debug!("Detector '{}' proposed no boxes", detector.name()),
                Err(e) => warn!("Detector '{}' failed: {}", detector.name(), e),
            }
        }

        let map = edge_gradient_saliency(image);
        info!("Gradient saliency map generated in {:.2?}", start.elapsed());
        map
    }
}

/// Adds `weight` to every pixel of the `top` best boxes with wrapping u8 arithmetic,
/// so a pixel covered by six boxes at +50 ends at 44, not 255.
// NOTE: wrapping matches the established output; saturating is probably what was meant.
pub fn paint_boxes(
    width: u32,
    height: u32,
    mut boxes: Vec<ScoredBox>,
    top: usize,
    weight: u8,
) -> SaliencyMap {
    boxes.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut map = SaliencyMap::zeros(width, height);
    for b in boxes.iter().take(top) {
        let x0 = b.x0.clamp(0, width as i32) as usize;
        let x1 = b.x1.clamp(0, width as i32) as usize;
        let y0 = b.y0.clamp(0, height as i32) as usize;
        let y1 = b.y1.clamp(0, height as i32) as usize;
        if x0 >= x1 || y0 >= y1 {
            continue;
        }
        map.values
            .slice_mut(ndarray::s![y0..y1, x0..x1])
            .mapv_inplace(|v| v.wrapping_add(weight));
    }
    map
}

/// Grayscale, 5x5 Gaussian, 3x3 Sobel magnitude, then min-max stretch to 0..=255.
pub fn edge_gradient_saliency(image: &DynamicImage) -> SaliencyMap {
    let gray = image.to_luma8();
    let blurred: GrayImage = separable_filter_equal(&gray, &GAUSSIAN_5[..]);
    let gx = horizontal_sobel(&blurred);
    let gy = vertical_sobel(&blurred);

    let (width, height) = gray.dimensions();
    let magnitude = Array2::from_shape_fn((height as usize, width as usize), |(r, c)| {
        let dx = gx.get_pixel(c as u32, r as u32)[0] as f64;
        let dy = gy.get_pixel(c as u32, r as u32)[0] as f64;
        (dx * dx + dy * dy).sqrt()
    });

    SaliencyMap::from_array(normalize_min_max(&magnitude))
}

/// Linear stretch so min -> 0 and max -> 255; a flat input maps to all zeros.
pub fn normalize_min_max(values: &Array2<f64>) -> Array2<u8> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return Array2::zeros(values.dim());
    }
    values.mapv(|v| (((v - min) / range) * 255.0).clamp(0.0, 255.0) as u8)
}

#[cfg(feature = "seeta")]
fn load_detector(assets: &Path) -> Option<Box<dyn ObjectnessDetector>> {
    if !assets.exists() {
        return None;
    }
    match crate::io::detector::SeetaObjectness::load(assets) {
        Ok(detector) => Some(Box::new(detector)),
        Err(e) => {
            warn!("Failed to load detector assets {:?}: {}", assets, e);
            None
        }
    }
}

#[cfg(not(feature = "seeta"))]
fn load_detector(assets: &Path) -> Option<Box<dyn ObjectnessDetector>> {
    if assets.exists() {
        warn!(
            "Detector assets found at {:?} but no detector backend is compiled in (enable the `seeta` feature)",
            assets
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, RgbImage};

    struct FixedBoxes(Vec<ScoredBox>);

    impl ObjectnessDetector for FixedBoxes {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&self, _image: &DynamicImage) -> Result<Vec<ScoredBox>> {
            Ok(self.0.clone())
        }
    }

    fn bx(x0: i32, y0: i32, x1: i32, y1: i32, score: f64) -> ScoredBox {
        ScoredBox {
            x0,
            y0,
            x1,
            y1,
            score,
        }
    }

    #[test]
    fn overlapping_boxes_accumulate_with_wraparound() {
        // Six full-frame boxes: 6 * 50 = 300 = 44 (mod 256).
        let boxes = (0..6).map(|i| bx(0, 0, 4, 4, i as f64)).collect();
        let map = paint_boxes(4, 4, boxes, 10, 50);
        assert!(map.values().iter().all(|&v| v == 44));
    }

    #[test]
    fn only_top_scoring_boxes_are_painted() {
        let mut boxes: Vec<ScoredBox> = (0..12).map(|i| bx(i, 0, i + 1, 1, i as f64)).collect();
        boxes.reverse();
        let map = paint_boxes(12, 1, boxes, 10, 50);
        // Columns 0 and 1 hold the two lowest scores.
        assert_eq!(map.values()[[0, 0]], 0);
        assert_eq!(map.values()[[0, 1]], 0);
        for col in 2..12 {
            assert_eq!(map.values()[[0, col]], 50);
        }
    }

    #[test]
    fn boxes_are_clipped_to_the_image() {
        let map = paint_boxes(5, 5, vec![bx(-3, 3, 9, 20, 1.0)], 10, 50);
        assert_eq!(map.values()[[2, 0]], 0);
        assert_eq!(map.values()[[3, 0]], 50);
        assert_eq!(map.values()[[4, 4]], 50);
    }

    #[test]
    fn detector_strategy_paints_boxes() {
        let detector = FixedBoxes(vec![bx(1, 1, 3, 3, 0.9)]);
        let estimator = SaliencyEstimator::with_detector(Box::new(detector), SaliencyParams::default());
        let image = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        let map = estimator.estimate(&image);
        assert_eq!(map.values()[[1, 1]], 50);
        assert_eq!(map.values()[[0, 0]], 0);
    }

    #[test]
    fn empty_detection_falls_back_to_gradient() {
        let estimator =
            SaliencyEstimator::with_detector(Box::new(FixedBoxes(vec![])), SaliencyParams::default());
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([90])));
        let map = estimator.estimate(&image);
        assert!(map.values().iter().all(|&v| v == 0));
    }

    #[test]
    fn missing_assets_select_gradient() {
        let estimator = SaliencyEstimator::from_assets("/definitely/not/here/objectness");
        assert!(matches!(estimator.strategy(), SaliencyStrategy::EdgeGradient));
    }

    #[test]
    fn gradient_map_has_image_dimensions_and_full_range() {
        let mut img = RgbImage::new(40, 30);
        for (x, _y, p) in img.enumerate_pixels_mut() {
            *p = if x < 20 { image::Rgb([10, 10, 10]) } else { image::Rgb([240, 240, 240]) };
        }
        let map = edge_gradient_saliency(&DynamicImage::ImageRgb8(img));
        assert_eq!((map.width(), map.height()), (40, 30));
        assert_eq!(map.values().iter().copied().max(), Some(255));
        assert_eq!(map.values().iter().copied().min(), Some(0));
        // The step edge is the salient part.
        assert!(map.values()[[15, 20]] > map.values()[[15, 2]]);
    }

    #[test]
    fn flat_input_normalizes_to_zero() {
        let flat = Array2::from_elem((3, 3), 7.5);
        assert!(normalize_min_max(&flat).iter().all(|&v| v == 0));
    }

    #[test]
    fn mean_over_window() {
        let map = SaliencyMap::from_array(Array2::from_shape_fn((2, 4), |(_, c)| c as u8 * 10));
        assert_eq!(map.mean(&CropRect::new(1, 0, 2, 2)), Some(15.0));
        assert_eq!(map.mean(&CropRect::new(3, 0, 2, 2)), None);
    }
}
