use clap::Parser;
use std::path::PathBuf;

use salcrop::AspectRatio;

#[derive(Parser, Debug)]
#[command(name = "salcrop", version, about = "Saliency-guided crop selection")]
pub struct CliArgs {
    /// Input image (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory of images (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// JSON file with crop search parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Target aspect ratio as W:H; repeat for several (default: 1:1 4:5 16:9 9:16)
    #[arg(short, long = "ratio")]
    pub ratios: Vec<AspectRatio>,

    /// Step in pixels between candidate windows
    #[arg(long)]
    pub stride: Option<u32>,

    /// Objectness detector asset bundle; edge-gradient saliency is used when missing
    #[arg(long, default_value = "objectness_trained_model")]
    pub assets: PathBuf,

    /// JPEG quality for crops (1-100)
    #[arg(long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Print the outcome as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write a `<stem>_crops.json` sidecar next to each input
    #[arg(long, default_value_t = false)]
    pub sidecar: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue with other files when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_ratio_flags_keep_order() {
        let args = CliArgs::try_parse_from([
            "salcrop", "-i", "a.png", "-r", "16:9", "--ratio", "1:1", "--stride", "8",
        ])
        .unwrap();
        assert_eq!(args.ratios, vec![AspectRatio::WIDE_16_9, AspectRatio::SQUARE]);
        assert_eq!(args.stride, Some(8));
        assert_eq!(args.quality, 95);
    }

    #[test]
    fn bad_ratio_is_a_parse_error() {
        assert!(CliArgs::try_parse_from(["salcrop", "-r", "16:0"]).is_err());
        assert!(CliArgs::try_parse_from(["salcrop", "--quality", "0"]).is_err());
    }
}
