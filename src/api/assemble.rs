use std::path::Path;

use image::DynamicImage;
use tracing::{info, warn};

use crate::core::saliency::SaliencyMap;
use crate::io::codec::ImageCodec;
use crate::io::naming::{crop_path, saliency_map_path};
use crate::types::{CropOutcome, CropResult, RatioWinner};

/// Turns search winners into `CropResult`s and hands every output to the codec.
///
/// Write failures are logged and leave the affected path empty; the rects stay valid.
pub struct ResultAssembler<'a, C: ImageCodec + ?Sized> {
    codec: &'a C,
}

impl<'a, C: ImageCodec + ?Sized> ResultAssembler<'a, C> {
    pub fn new(codec: &'a C) -> Self {
        Self { codec }
    }

    pub fn assemble(
        &self,
        source: &Path,
        image: &DynamicImage,
        map: &SaliencyMap,
        winners: Vec<RatioWinner>,
    ) -> CropOutcome {
        let saliency_map_path = self.persist_saliency_map(source, map);

        let crops = winners
            .into_iter()
            .enumerate()
            .map(|(i, winner)| {
                let rect = winner.candidate.rect;
                let path = crop_path(source, i + 1, &rect);
                let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
                let path = match self.codec.encode(&cropped, &path) {
                    Ok(()) => {
                        info!("Saved crop {} to {:?}", i + 1, path);
                        Some(path)
                    }
                    Err(e) => {
                        warn!("Failed to save crop {} to {:?}: {}", i + 1, path, e);
                        None
                    }
                };
                CropResult {
                    aspect_ratio: winner.aspect_ratio,
                    rect,
                    score: winner.candidate.score,
                    path,
                }
            })
            .collect();

        CropOutcome {
            source: source.to_path_buf(),
            saliency_map_path,
            crops,
        }
    }

    fn persist_saliency_map(&self, source: &Path, map: &SaliencyMap) -> Option<std::path::PathBuf> {
        let path = saliency_map_path(source);
        match self
            .codec
            .encode(&DynamicImage::ImageLuma8(map.to_image()), &path)
        {
            Ok(()) => {
                info!("Saliency map saved as {:?}", path);
                Some(path)
            }
            Err(e) => {
                warn!("Failed to save saliency map to {:?}: {}", path, e);
                None
            }
        }
    }
}
