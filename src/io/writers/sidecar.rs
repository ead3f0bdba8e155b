use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::CropOutcome;

/// `<dir>/<stem>_crops.json` next to the source image.
pub fn sidecar_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_crops.json"))
}

/// Write the outcome of a run as pretty JSON beside its source.
pub fn write_outcome_sidecar(outcome: &CropOutcome) -> Result<PathBuf> {
    let path = sidecar_path(&outcome.source);
    let json_string = serde_json::to_string_pretty(outcome).map_err(Error::external)?;
    std::fs::write(&path, json_string)?;

    info!("Created crop sidecar: {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AspectRatio, CropRect, CropResult};

    #[test]
    fn sidecar_round_trips_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = CropOutcome {
            source: dir.path().join("beach.png"),
            saliency_map_path: Some(dir.path().join("beach_saliency_map.png")),
            crops: vec![CropResult {
                aspect_ratio: AspectRatio::WIDE_16_9,
                rect: CropRect::new(4, 8, 160, 90),
                score: 12.5,
                path: None,
            }],
        };

        let path = write_outcome_sidecar(&outcome).unwrap();
        assert_eq!(path, dir.path().join("beach_crops.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        let back: CropOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(back, outcome);
        assert!(text.contains("\"aspect_ratio\": [\n"));
    }
}
