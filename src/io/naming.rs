//! Output path conventions. Downstream tools match on these names, so the formats
//! are fixed: `<stem>_saliency_map<ext>` and `<stem>_crop_<i>_<x>_<y>_<w>x<h>.jpg`.
use std::path::{Path, PathBuf};

use crate::types::CropRect;

fn stem_of(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn dir_of(source: &Path) -> &Path {
    source.parent().unwrap_or(Path::new(""))
}

/// Saliency map beside the source, keeping the source extension.
pub fn saliency_map_path(source: &Path) -> PathBuf {
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    dir_of(source).join(format!("{}_saliency_map{}", stem_of(source), ext))
}

/// Crop `index` (1-based position in the result list), always JPEG.
pub fn crop_path(source: &Path, index: usize, rect: &CropRect) -> PathBuf {
    dir_of(source).join(format!(
        "{}_crop_{}_{}_{}_{}x{}.jpg",
        stem_of(source),
        index,
        rect.x,
        rect.y,
        rect.width,
        rect.height
    ))
}
