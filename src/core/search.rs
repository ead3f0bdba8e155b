//! Multi-scale, multi-position crop search.
//!
//! For every requested aspect ratio the engine walks a coarse grid of window sizes and
//! top-left corners, scores each window from the integral table and the composition
//! scorer, and keeps the first best-scoring one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::time::Instant;

use tracing::{debug, info};

use crate::core::composition::CompositionScorer;
use crate::core::integral::IntegralTable;
use crate::core::params::CropParams;
use crate::error::{Error, Result};
use crate::types::{AspectRatio, CropCandidate, CropRect, Progress, RatioWinner};

/// Absorbs representation error in `size * scale` before flooring: `90.0 * 0.7` is
/// `62.99999999999999`, which plain truncation turns into 62; the exact product floors to 63.
const FLOOR_EPSILON: f64 = 1e-9;

/// Receives `(current, total)` notifications while a search runs. Must not block.
pub trait ProgressSink {
    fn report(&self, current: u32, total: u32);
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _current: u32, _total: u32) {}
}

impl<F> ProgressSink for F
where
    F: Fn(u32, u32),
{
    fn report(&self, current: u32, total: u32) {
        self(current, total)
    }
}

/// Bounded channel: a full or disconnected receiver just drops the update.
impl ProgressSink for SyncSender<Progress> {
    fn report(&self, current: u32, total: u32) {
        let _ = self.try_send(Progress { current, total });
    }
}

/// Cooperative cancellation, checked between candidate evaluations.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct CropSearchEngine {
    params: CropParams,
    cancel: Option<CancelFlag>,
}

/// Running state shared by all ratios of one search.
struct RunState<'a> {
    evaluated: u64,
    estimated_total: u64,
    progress: &'a dyn ProgressSink,
}

impl CropSearchEngine {
    pub fn new(params: CropParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            cancel: None,
        })
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn params(&self) -> &CropParams {
        &self.params
    }

    /// Window size at `scale` for an image of `width`×`height`, or `None` when the
    /// scale is rejected.
    pub fn window_size(
        &self,
        width: u32,
        height: u32,
        ratio: AspectRatio,
        scale: f64,
    ) -> Option<(u32, u32)> {
        let target = ratio.value();
        let mut crop_w = (width as f64 * scale + FLOOR_EPSILON).floor() as i64;
        let mut crop_h = (crop_w as f64 / target).floor() as i64;

        if crop_h > height as i64 {
            crop_h = height as i64;
            crop_w = (crop_h as f64 * target).floor() as i64;
        }

        if crop_w <= 0 || crop_h <= 0 || crop_w > width as i64 || crop_h > height as i64 {
            return None;
        }
        Some((crop_w as u32, crop_h as u32))
    }

    /// Inclusive corner ranges `(x_min, x_max, y_min, y_max)` for a window, after the
    /// edge margins; `None` when either range is empty.
    pub fn corner_bounds(
        &self,
        width: u32,
        height: u32,
        crop_w: u32,
        crop_h: u32,
    ) -> Option<(u32, u32, u32, u32)> {
        let margin_x = (crop_w as f64 * self.params.edge_margin).floor() as i64;
        let margin_y = (crop_h as f64 * self.params.edge_margin).floor() as i64;

        let x_max = width as i64 - crop_w as i64 - margin_x;
        let y_max = height as i64 - crop_h as i64 - margin_y;
        if x_max < margin_x || y_max < margin_y {
            return None;
        }
        Some((margin_x as u32, x_max as u32, margin_y as u32, y_max as u32))
    }

    /// Every window the search evaluates for `ratio`, in scale, row, column order.
    pub fn candidate_windows(&self, width: u32, height: u32, ratio: AspectRatio) -> Vec<CropRect> {
        let stride = self.params.stride as usize;
        let mut windows = Vec::new();

        for scale in self.params.scales() {
            let Some((crop_w, crop_h)) = self.window_size(width, height, ratio, scale) else {
                debug!("{ratio}: scale {scale:.2} rejected for {width}x{height}");
                continue;
            };
            let Some((x_min, x_max, y_min, y_max)) =
                self.corner_bounds(width, height, crop_w, crop_h)
            else {
                debug!("{ratio}: no corners left for {crop_w}x{crop_h} window");
                continue;
            };

            for y in (y_min..=y_max).step_by(stride) {
                for x in (x_min..=x_max).step_by(stride) {
                    windows.push(CropRect::new(x, y, crop_w, crop_h));
                }
            }
        }
        windows
    }

    /// Rough candidate count for a whole run, used to turn counts into percentages.
    pub fn estimated_total(&self, width: u32, height: u32, ratio_count: usize) -> u64 {
        let stride = self.params.stride as u64;
        let per_scale = (height as u64 / stride + 1) * (width as u64 / stride + 1);
        (ratio_count as u64 * self.params.scale_count as u64 * per_scale).max(1)
    }

    /// Best window per ratio, in `ratios` order. Ratios without a single valid window
    /// are left out.
    pub fn search(
        &self,
        table: &IntegralTable,
        scorer: &CompositionScorer,
        ratios: &[AspectRatio],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<RatioWinner>> {
        let start = Instant::now();
        let (width, height) = (table.width(), table.height());
        let mut state = RunState {
            evaluated: 0,
            estimated_total: self.estimated_total(width, height, ratios.len()),
            progress,
        };

        let mut winners = Vec::with_capacity(ratios.len());
        for &ratio in ratios {
            info!("Processing aspect ratio {}...", ratio);
            match self.best_for_ratio(table, scorer, ratio, &mut state)? {
                Some(candidate) => {
                    info!(
                        "Best crop for aspect ratio {}: {} with score {:.2}",
                        ratio, candidate.rect, candidate.score
                    );
                    winners.push(RatioWinner {
                        aspect_ratio: ratio,
                        candidate,
                    });
                }
                None => info!("No valid crop window for aspect ratio {}", ratio),
            }
        }

        info!(
            "Optimal crops found in {:.2?} ({} candidates)",
            start.elapsed(),
            state.evaluated
        );
        Ok(winners)
    }

    fn best_for_ratio(
        &self,
        table: &IntegralTable,
        scorer: &CompositionScorer,
        ratio: AspectRatio,
        state: &mut RunState<'_>,
    ) -> Result<Option<CropCandidate>> {
        let mut best: Option<CropCandidate> = None;

        for rect in self.candidate_windows(table.width(), table.height(), ratio) {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                return Err(Error::Cancelled {
                    evaluated: state.evaluated,
                });
            }

            let score = self.combined_score(table, scorer, &rect);
            // Strict comparison: on ties the earliest window wins.
            if best.is_none_or(|b| score > b.score) {
                best = Some(CropCandidate { rect, score });
            }

            state.evaluated += 1;
            if state.evaluated % self.params.progress_interval == 0 {
                let percent = (state.evaluated * 100 / state.estimated_total).min(100) as u32;
                state.progress.report(percent, 100);
            }
        }
        Ok(best)
    }

    /// `saliency_weight * mean saliency + composition_weight * composition`.
    pub fn combined_score(
        &self,
        table: &IntegralTable,
        scorer: &CompositionScorer,
        rect: &CropRect,
    ) -> f64 {
        let saliency =
            table.rect_sum(rect.x, rect.y, rect.width, rect.height) as f64 / rect.area() as f64;
        let composition = scorer.score(rect.x, rect.y, rect.width, rect.height);
        self.params.saliency_weight * saliency + self.params.composition_weight * composition
    }
}
