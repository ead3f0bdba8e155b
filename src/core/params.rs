use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::AspectRatio;

/// Crop search parameters suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropParams {
    /// Ratios to search, in output order
    pub aspect_ratios: Vec<AspectRatio>,
    /// Smallest crop width as a fraction of the image width
    pub scale_min: f64,
    /// Largest crop width as a fraction of the image width
    pub scale_max: f64,
    /// Number of evenly spaced scales over [scale_min, scale_max]
    pub scale_count: usize,
    /// Step in pixels between candidate corners on both axes
    pub stride: u32,
    /// Fraction of the crop's own size excluded along each image edge
    pub edge_margin: f64,
    pub saliency_weight: f64,
    pub composition_weight: f64,
    /// Emit a progress notification every N evaluated candidates
    pub progress_interval: u64,
}

impl Default for CropParams {
    fn default() -> Self {
        Self {
            aspect_ratios: AspectRatio::DEFAULTS.to_vec(),
            scale_min: 0.5,
            scale_max: 1.0,
            scale_count: 6,
            stride: 40,
            edge_margin: 0.125,
            saliency_weight: 0.7,
            composition_weight: 0.3,
            progress_interval: 100,
        }
    }
}

impl CropParams {
    pub fn validate(&self) -> Result<()> {
        if self.scale_count == 0 {
            return Err(Error::invalid("scale_count", self.scale_count));
        }
        if !(self.scale_min > 0.0 && self.scale_min <= 1.0) {
            return Err(Error::invalid("scale_min", self.scale_min));
        }
        if !(self.scale_max >= self.scale_min && self.scale_max <= 1.0) {
            return Err(Error::invalid("scale_max", self.scale_max));
        }
        if self.stride == 0 {
            return Err(Error::invalid("stride", self.stride));
        }
        if !(0.0..0.5).contains(&self.edge_margin) {
            return Err(Error::invalid("edge_margin", self.edge_margin));
        }
        if self.saliency_weight < 0.0 || !self.saliency_weight.is_finite() {
            return Err(Error::invalid("saliency_weight", self.saliency_weight));
        }
        if self.composition_weight < 0.0 || !self.composition_weight.is_finite() {
            return Err(Error::invalid("composition_weight", self.composition_weight));
        }
        if self.progress_interval == 0 {
            return Err(Error::invalid("progress_interval", self.progress_interval));
        }
        Ok(())
    }

    /// Scales evenly spaced over `[scale_min, scale_max]`, both ends included.
    pub fn scales(&self) -> Vec<f64> {
        if self.scale_count == 1 {
            return vec![self.scale_min];
        }
        let step = (self.scale_max - self.scale_min) / (self.scale_count - 1) as f64;
        (0..self.scale_count)
            .map(|i| self.scale_min + step * i as f64)
            .collect()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let params: CropParams =
            serde_json::from_str(s).map_err(|e| Error::invalid("config", e))?;
        params.validate()?;
        Ok(params)
    }
}

/// Saliency estimation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaliencyParams {
    /// Objectness detector asset bundle; fallback is used when it does not exist
    pub detector_assets: PathBuf,
    /// Number of highest-scoring detector boxes painted into the map
    pub top_boxes: usize,
    /// Value added (mod 256) to each pixel inside a detector box
    pub box_weight: u8,
}

impl Default for SaliencyParams {
    fn default() -> Self {
        Self {
            detector_assets: PathBuf::from("objectness_trained_model"),
            top_boxes: 10,
            box_weight: 50,
        }
    }
}
