//! Objectness detector backed by a SeetaFace model file (`rustface`).
//!
//! The model is validated once at load time; a fresh detector is built per call
//! because `rustface` detectors are stateful and not `Sync`.
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use crate::core::saliency::{ObjectnessDetector, ScoredBox};
use crate::error::{Error, Result};

/// Detector tuning, mirroring the knobs `rustface` exposes.
#[derive(Clone, Debug)]
pub struct SeetaConfig {
    pub min_face_size: u32,
    pub score_thresh: f64,
    pub pyramid_scale_factor: f32,
    pub slide_window_step: (u32, u32),
}

impl Default for SeetaConfig {
    fn default() -> Self {
        Self {
            min_face_size: 20,
            score_thresh: 2.0,
            pyramid_scale_factor: 0.8,
            slide_window_step: (4, 4),
        }
    }
}

#[derive(Debug)]
pub struct SeetaObjectness {
    model_path: PathBuf,
    config: SeetaConfig,
}

impl SeetaObjectness {
    /// `assets` is either the model file or a directory containing `seeta_fd_frontal_v1.0.bin`.
    pub fn load(assets: &Path) -> Result<Self> {
        Self::load_with_config(assets, SeetaConfig::default())
    }

    pub fn load_with_config(assets: &Path, config: SeetaConfig) -> Result<Self> {
        let model_path = if assets.is_dir() {
            assets.join("seeta_fd_frontal_v1.0.bin")
        } else {
            assets.to_path_buf()
        };
        let detector = Self { model_path, config };
        // Fail early on a missing or corrupt model.
        detector.build()?;
        Ok(detector)
    }

    fn build(&self) -> Result<Box<dyn rustface::Detector>> {
        let path = self.model_path.to_string_lossy();
        let mut detector = rustface::create_detector(&path).map_err(|e| {
            Error::Detector(format!("Failed to load model from {}: {}", path, e))
        })?;
        detector.set_min_face_size(self.config.min_face_size);
        detector.set_score_thresh(self.config.score_thresh);
        detector.set_pyramid_scale_factor(self.config.pyramid_scale_factor);
        detector.set_slide_window_step(self.config.slide_window_step.0, self.config.slide_window_step.1);
        Ok(detector)
    }
}

impl ObjectnessDetector for SeetaObjectness {
    fn name(&self) -> &str {
        "seeta"
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<ScoredBox>> {
        let mut detector = self.build()?;
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        let raw = gray.into_raw();
        let faces = detector.detect(&rustface::ImageData::new(&raw, width, height));
        debug!("Seeta detector proposed {} boxes", faces.len());

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                ScoredBox {
                    x0: bbox.x(),
                    y0: bbox.y(),
                    x1: bbox.x() + bbox.width() as i32,
                    y1: bbox.y() + bbox.height() as i32,
                    score: face.score(),
                }
            })
            .collect())
    }
}
