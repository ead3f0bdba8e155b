//! Shared types used across salcrop.
//! Includes `AspectRatio`, `CropRect`, `CropCandidate`, `CropResult`, the pipeline's
//! `CropOutcome`, and the `Progress` tuple sent to progress sinks.
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Target width-to-height ratio, e.g. `16:9`.
///
/// Serialized as a two-element array `[numerator, denominator]`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct AspectRatio {
    numerator: u32,
    denominator: u32,
}

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio::from_parts(1, 1);
    pub const PORTRAIT_4_5: AspectRatio = AspectRatio::from_parts(4, 5);
    pub const WIDE_16_9: AspectRatio = AspectRatio::from_parts(16, 9);
    pub const TALL_9_16: AspectRatio = AspectRatio::from_parts(9, 16);

    /// The ratios searched when nothing else is configured, in output order.
    pub const DEFAULTS: [AspectRatio; 4] = [
        Self::SQUARE,
        Self::PORTRAIT_4_5,
        Self::WIDE_16_9,
        Self::TALL_9_16,
    ];

    const fn from_parts(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Both components must be positive.
    pub fn new(numerator: u32, denominator: u32) -> crate::Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(Error::invalid(
                "aspect_ratio",
                format!("{numerator}:{denominator}"),
            ));
        }
        Ok(Self::from_parts(numerator, denominator))
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    pub fn value(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    /// Accepts `W:H`, `W/H` or `WxH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s
            .split_once([':', '/', 'x'])
            .ok_or_else(|| Error::invalid("aspect_ratio", s))?;
        let num = num
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::invalid("aspect_ratio", s))?;
        let den = den
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::invalid("aspect_ratio", s))?;
        AspectRatio::new(num, den)
    }
}

impl TryFrom<[u32; 2]> for AspectRatio {
    type Error = Error;

    fn try_from(value: [u32; 2]) -> Result<Self, Self::Error> {
        AspectRatio::new(value[0], value[1])
    }
}

impl From<AspectRatio> for [u32; 2] {
    fn from(value: AspectRatio) -> Self {
        [value.numerator, value.denominator]
    }
}

/// A crop window in source-image pixel coordinates.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rect is non-empty and lies inside a `width`×`height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn intersects(&self, other: &CropRect) -> bool {
        let (ax1, ay1) = (self.x as u64 + self.width as u64, self.y as u64 + self.height as u64);
        let (bx1, by1) = (
            other.x as u64 + other.width as u64,
            other.y as u64 + other.height as u64,
        );
        (self.x as u64) < bx1 && (other.x as u64) < ax1 && (self.y as u64) < by1 && (other.y as u64) < ay1
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// A scored window produced during the search.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CropCandidate {
    pub rect: CropRect,
    pub score: f64,
}

/// Best candidate found for one requested aspect ratio.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RatioWinner {
    pub aspect_ratio: AspectRatio,
    pub candidate: CropCandidate,
}

/// An accepted crop, optionally persisted to disk.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CropResult {
    pub aspect_ratio: AspectRatio,
    pub rect: CropRect,
    pub score: f64,
    /// `None` when the crop was not written (or the write failed).
    pub path: Option<PathBuf>,
}

/// Everything a single pipeline run hands back to its caller.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct CropOutcome {
    pub source: PathBuf,
    pub saliency_map_path: Option<PathBuf>,
    pub crops: Vec<CropResult>,
}

impl CropOutcome {
    pub fn empty(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            saliency_map_path: None,
            crops: Vec::new(),
        }
    }

    /// `(path, rect)` pairs for every crop that was written.
    pub fn saved_crops(&self) -> Vec<(PathBuf, CropRect)> {
        self.crops
            .iter()
            .filter_map(|c| c.path.clone().map(|p| (p, c.rect)))
            .collect()
    }
}

/// Progress notification: `current` out of `total`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ratio_separators() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::WIDE_16_9);
        assert_eq!("4/5".parse::<AspectRatio>().unwrap(), AspectRatio::PORTRAIT_4_5);
        assert_eq!(" 9 x 16 ".parse::<AspectRatio>().unwrap(), AspectRatio::TALL_9_16);
    }

    #[test]
    fn rejects_zero_and_garbage_ratios() {
        assert!("0:1".parse::<AspectRatio>().is_err());
        assert!("3:0".parse::<AspectRatio>().is_err());
        assert!("square".parse::<AspectRatio>().is_err());
        assert!(AspectRatio::try_from([1, 0]).is_err());
    }

    #[test]
    fn rect_bounds_and_intersection() {
        let r = CropRect::new(10, 10, 20, 20);
        assert!(r.fits_within(30, 30));
        assert!(!r.fits_within(29, 30));
        assert!(!CropRect::new(0, 0, 0, 5).fits_within(10, 10));

        assert!(r.intersects(&CropRect::new(29, 29, 5, 5)));
        assert!(!r.intersects(&CropRect::new(30, 10, 5, 5)));
    }
}
