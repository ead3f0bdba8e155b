//! Composition heuristic: how close a window's center sits to its own
//! rule-of-thirds and golden-ratio points.

/// Golden ratio, (1 + sqrt 5) / 2.
pub const PHI: f64 = 1.618_033_988_749_895;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionScorer;

impl CompositionScorer {
    pub fn new() -> Self {
        Self
    }

    /// The eight balance points of a `width`×`height` window, relative to its own origin.
    pub fn key_points(width: f64, height: f64) -> [(f64, f64); 8] {
        let (gx, gy) = (width / PHI, height / PHI);
        [
            (width / 3.0, height / 3.0),
            (2.0 * width / 3.0, height / 3.0),
            (width / 3.0, 2.0 * height / 3.0),
            (2.0 * width / 3.0, 2.0 * height / 3.0),
            (gx, gy),
            (width - gx, gy),
            (gx, height - gy),
            (width - gx, height - gy),
        ]
    }

    /// Score in [0, 1]: `1 - d_min / (diagonal / 2)` where `d_min` is the distance from
    /// the window center to its nearest key point.
    ///
    /// Center and key points share the window's frame, so two windows of the same size
    /// score the same wherever they sit.
    pub fn score(&self, _x: u32, _y: u32, width: u32, height: u32) -> f64 {
        if width == 0 || height == 0 {
            return 0.0;
        }
        let (w, h) = (width as f64, height as f64);
        // The window offset cancels out: key points are not placed in the image frame.
        let center = (w / 2.0, h / 2.0);

        let nearest = Self::key_points(w, h)
            .iter()
            .map(|&(kx, ky)| ((center.0 - kx).powi(2) + (center.1 - ky).powi(2)).sqrt())
            .fold(f64::INFINITY, f64::min);
        let half_diagonal = (w * w + h * h).sqrt() / 2.0;

        (1.0 - nearest / half_diagonal).clamp(0.0, 1.0)
    }
}
