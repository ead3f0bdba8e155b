use std::fs;
use std::path::Path;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use salcrop::io::writers::sidecar::write_outcome_sidecar;
use salcrop::{
    CropOutcome, CropParams, CropPipeline, FsImageCodec, SaliencyEstimator, SaliencyParams,
    process_directory,
};

use super::args::CliArgs;
use super::errors::AppError;

fn load_params(args: &CliArgs) -> Result<CropParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            CropParams::from_json_str(&text).map_err(|e| AppError::InvalidConfig {
                path: path.clone(),
                reason: e.to_string(),
            })?
        }
        None => CropParams::default(),
    };

    // Flags override the config file
    if !args.ratios.is_empty() {
        params.aspect_ratios = args.ratios.clone();
    }
    if let Some(stride) = args.stride {
        params.stride = stride;
    }
    params.validate()?;
    Ok(params)
}

fn build_pipeline(args: &CliArgs) -> Result<CropPipeline<FsImageCodec>, AppError> {
    let params = load_params(args)?;
    info!(
        "Searching ratios [{}] with stride {}",
        params
            .aspect_ratios
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        params.stride
    );

    let estimator = SaliencyEstimator::from_params(SaliencyParams {
        detector_assets: args.assets.clone(),
        ..SaliencyParams::default()
    });
    let codec = FsImageCodec {
        jpeg_quality: args.quality,
    };
    Ok(CropPipeline::with_parts(estimator, params, codec)?)
}

fn report_outcome(outcome: &CropOutcome, sidecar: bool) -> Result<(), AppError> {
    if let Some(path) = &outcome.saliency_map_path {
        info!("Saliency map: {:?}", path);
    }
    for (i, crop) in outcome.crops.iter().enumerate() {
        info!(
            "Crop {} [{}]: {} at ({},{}) -> {:?}",
            i + 1,
            crop.aspect_ratio,
            crop.rect,
            crop.rect.x,
            crop.rect.y,
            crop.path
        );
    }
    if sidecar {
        write_outcome_sidecar(outcome)?;
    }
    Ok(())
}

fn process_single_file(
    pipeline: &CropPipeline<FsImageCodec>,
    input: &Path,
    args: &CliArgs,
) -> Result<(), AppError> {
    let progress = |current: u32, total: u32| debug!("Progress: {}/{}", current, total);
    let outcome = pipeline.generate_crops(input, &progress)?;
    report_outcome(&outcome, args.sidecar)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let pipeline = build_pipeline(&args)?;
    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.clone().ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        let progress = |current: u32, total: u32| debug!("Progress: {}/{}", current, total);
        let report = process_directory(&pipeline, &input_dir, &progress, args.batch)?;

        for outcome in &report.outcomes {
            report_outcome(outcome, args.sidecar)?;
        }
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report.outcomes)?);
        }

        info!("Batch processing complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.clone().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        process_single_file(&pipeline, &input, &args)?;
        info!("Successfully processed: {:?}", input);
    }

    Ok(())
}
