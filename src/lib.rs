#![doc = r#"
salcrop — saliency-guided crop selection.

Given an image, this crate estimates a per-pixel importance ("saliency") map, builds a
summed-area table over it, and searches a coarse grid of window sizes and positions for
the best crop at each requested aspect ratio. A window's score blends its mean saliency
with a rule-of-thirds / golden-ratio composition heuristic. The winning crops and the
saliency map are written beside the source image.

It powers the `salcrop` CLI and can be embedded in your own Rust applications.

Quick start: crop a file
------------------------
```rust,no_run
use std::path::Path;
use salcrop::{CropParams, CropPipeline, NoProgress, SaliencyParams};

fn main() -> salcrop::Result<()> {
    let pipeline = CropPipeline::new(CropParams::default(), SaliencyParams::default())?;
    let outcome = pipeline.generate_crops(Path::new("/photos/beach.jpg"), &NoProgress)?;

    // /photos/beach_saliency_map.jpg and /photos/beach_crop_<i>_<x>_<y>_<w>x<h>.jpg
    for crop in &outcome.crops {
        println!("{} -> {} ({:?})", crop.aspect_ratio, crop.rect, crop.path);
    }
    Ok(())
}
```

Analyze in memory
-----------------
```rust
use image::{DynamicImage, GrayImage, Luma};
use salcrop::{AspectRatio, CropParams, CropPipeline, NoProgress, SaliencyParams};

fn main() -> salcrop::Result<()> {
    let mut img = GrayImage::from_pixel(200, 200, Luma([20]));
    for y in 80..120 {
        for x in 80..120 {
            img.put_pixel(x, y, Luma([250]));
        }
    }

    let params = CropParams {
        aspect_ratios: vec![AspectRatio::SQUARE],
        ..CropParams::default()
    };
    let pipeline = CropPipeline::new(params, SaliencyParams::default())?;
    let analysis = pipeline.analyze(&DynamicImage::ImageLuma8(img), &NoProgress)?;
    assert_eq!(analysis.winners.len(), 1);
    Ok(())
}
```

Progress
--------
Anything implementing [`ProgressSink`] receives `(percent, 100)` every
`CropParams::progress_interval` evaluated windows: closures `Fn(u32, u32)`, a bounded
`std::sync::mpsc::SyncSender<Progress>` (updates are dropped when it is full), or
[`NoProgress`].

Error handling
--------------
All public functions return `salcrop::Result<T>`. An unreadable source is not an error
for [`CropPipeline::generate_crops`]: it returns an empty [`CropOutcome`]. Failed output
writes are logged and leave the crop's `path` empty.

Feature flags
-------------
- `seeta`: objectness saliency from a SeetaFace model bundle via `rustface`. Without it,
  or when the bundle is missing, the edge-gradient estimator is used.

Useful modules
--------------
- [`api`] — high-level entry points and batch helpers.
- [`core`] — saliency, integral table, composition scoring, crop search.
- [`io`] — codec seam, output naming, JPEG and JSON writers.
- [`types`] — shared types (`AspectRatio`, `CropRect`, `CropResult`, ...).
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::{CropParams, SaliencyParams};
pub use error::{Error, Result};
pub use types::{
    AspectRatio, CropCandidate, CropOutcome, CropRect, CropResult, Progress, RatioWinner,
};

// Analysis primitives
pub use crate::core::composition::CompositionScorer;
pub use crate::core::integral::IntegralTable;
pub use crate::core::saliency::{
    ObjectnessDetector, SaliencyEstimator, SaliencyMap, SaliencyStrategy, ScoredBox,
};
pub use crate::core::search::{CancelFlag, CropSearchEngine, NoProgress, ProgressSink};

// I/O seam
pub use io::codec::{FsImageCodec, ImageCodec};

// High-level API re-exports
pub use api::{
    Analysis, BatchReport, CropPipeline, ResultAssembler, iterate_images, process_directory,
};
