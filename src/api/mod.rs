//! High-level, ergonomic library API: run the whole crop pipeline on a file, analyze an
//! in-memory image, crop a file by a rect, and batch helpers for directories. Prefer these
//! entrypoints over the low-level `core` modules when integrating salcrop.
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, ImageFormat};
use tracing::{info, warn};

use crate::core::composition::CompositionScorer;
use crate::core::integral::IntegralTable;
use crate::core::params::{CropParams, SaliencyParams};
use crate::core::saliency::{SaliencyEstimator, SaliencyMap};
use crate::core::search::{CancelFlag, CropSearchEngine, ProgressSink};
use crate::error::{Error, Result};
use crate::io::codec::{FsImageCodec, ImageCodec};
use crate::types::{CropOutcome, CropRect, RatioWinner};

pub mod assemble;
pub use assemble::ResultAssembler;

/// Result of in-memory analysis (no disk I/O)
#[derive(Debug, Clone)]
pub struct Analysis {
    pub saliency: SaliencyMap,
    pub winners: Vec<RatioWinner>,
}

/// Saliency estimation, crop search and persistence wired together.
///
/// The estimator strategy is fixed at construction; one pipeline can serve any number of
/// images, sequentially or from several threads.
#[derive(Debug)]
pub struct CropPipeline<C: ImageCodec = FsImageCodec> {
    estimator: SaliencyEstimator,
    engine: CropSearchEngine,
    scorer: CompositionScorer,
    codec: C,
}

impl CropPipeline<FsImageCodec> {
    pub fn new(params: CropParams, saliency: SaliencyParams) -> Result<Self> {
        Self::with_parts(
            SaliencyEstimator::from_params(saliency),
            params,
            FsImageCodec::default(),
        )
    }
}

impl<C: ImageCodec> CropPipeline<C> {
    pub fn with_parts(estimator: SaliencyEstimator, params: CropParams, codec: C) -> Result<Self> {
        Ok(Self {
            estimator,
            engine: CropSearchEngine::new(params)?,
            scorer: CompositionScorer::new(),
            codec,
        })
    }

    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.engine = self.engine.with_cancel(flag);
        self
    }

    pub fn params(&self) -> &CropParams {
        self.engine.params()
    }

    pub fn estimator(&self) -> &SaliencyEstimator {
        &self.estimator
    }

    /// Saliency map and per-ratio winners for an already decoded image.
    pub fn analyze(&self, image: &DynamicImage, progress: &dyn ProgressSink) -> Result<Analysis> {
        let saliency = self.estimator.estimate(image);
        let table = IntegralTable::build(&saliency);
        let winners = self.engine.search(
            &table,
            &self.scorer,
            &self.engine.params().aspect_ratios,
            progress,
        )?;
        Ok(Analysis { saliency, winners })
    }

    /// Like [`generate_crops`](Self::generate_crops) but reports a decode failure as an error.
    pub fn try_generate_crops(
        &self,
        source: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<CropOutcome> {
        let start = Instant::now();
        info!("Starting to process image: {:?}", source);

        let image = self.codec.decode(source)?;
        self.crop_decoded(source, &image, progress, start)
    }

    /// Full pipeline for one file: outputs land beside `source`.
    ///
    /// Any decode failure, whatever the codec reports, yields an empty outcome rather
    /// than an error; only failures after decoding (a cancelled search) are `Err`.
    pub fn generate_crops(
        &self,
        source: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<CropOutcome> {
        let start = Instant::now();
        info!("Starting to process image: {:?}", source);

        match self.codec.decode(source) {
            Ok(image) => self.crop_decoded(source, &image, progress, start),
            Err(e) => {
                warn!("Error: Unable to read image at {:?}: {}", source, e);
                Ok(CropOutcome::empty(source))
            }
        }
    }

    fn crop_decoded(
        &self,
        source: &Path,
        image: &DynamicImage,
        progress: &dyn ProgressSink,
        start: Instant,
    ) -> Result<CropOutcome> {
        info!("Image loaded: {}x{}", image.width(), image.height());

        let analysis = self.analyze(image, progress)?;
        let outcome = ResultAssembler::new(&self.codec).assemble(
            source,
            image,
            &analysis.saliency,
            analysis.winners,
        );

        info!("Image processing completed in {:.2?}", start.elapsed());
        Ok(outcome)
    }

    /// Decode `source` and return the `rect` window of it.
    pub fn apply_crop(&self, source: &Path, rect: &CropRect) -> Result<DynamicImage> {
        let image = self.codec.decode(source)?;
        if !rect.fits_within(image.width(), image.height()) {
            return Err(Error::invalid("crop", rect));
        }
        Ok(image.crop_imm(rect.x, rect.y, rect.width, rect.height))
    }
}

/// Batch processing report
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub outcomes: Vec<CropOutcome>,
}

/// True for files this crate wrote itself, so re-running a batch does not crop its own output.
fn is_generated_output(path: &Path) -> bool {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.ends_with("_saliency_map") || stem.contains("_crop_")
}

/// Return the image files directly inside `input_dir`, sorted by path
pub fn iterate_images(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && ImageFormat::from_path(&path).is_ok() && !is_generated_output(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

/// Process every image in `input_dir` with `pipeline`.
/// If `continue_on_error` is true, errors are counted in the report and processing continues;
/// otherwise, the first error is returned.
pub fn process_directory<C: ImageCodec>(
    pipeline: &CropPipeline<C>,
    input_dir: &Path,
    progress: &dyn ProgressSink,
    continue_on_error: bool,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for path in iterate_images(input_dir)? {
        match pipeline.try_generate_crops(&path, progress) {
            Ok(outcome) if outcome.crops.is_empty() => {
                info!("No crops produced for {:?}", path);
                report.skipped += 1;
                report.outcomes.push(outcome);
            }
            Ok(outcome) => {
                report.processed += 1;
                report.outcomes.push(outcome);
            }
            Err(e @ Error::Cancelled { .. }) => return Err(e),
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
