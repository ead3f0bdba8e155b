//! Image decode/encode seam. The pipeline only talks to `ImageCodec`; the default
//! `FsImageCodec` reads through `image` and writes JPEGs through `jpeg-encoder`.
use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::Result;
use crate::io::writers::jpeg::{write_gray_jpeg, write_rgb_jpeg};

pub trait ImageCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage>;

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<()>;
}

/// Filesystem codec; JPEG quality applies to `.jpg`/`.jpeg` outputs.
#[derive(Debug, Clone, Copy)]
pub struct FsImageCodec {
    pub jpeg_quality: u8,
}

impl Default for FsImageCodec {
    fn default() -> Self {
        Self { jpeg_quality: 95 }
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

impl ImageCodec for FsImageCodec {
    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        let image = image::open(path)?;
        debug!(
            "Decoded {:?}: {}x{} {:?}",
            path,
            image.width(),
            image.height(),
            image.color()
        );
        Ok(image)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        if !is_jpeg(path) {
            image.save(path)?;
            return Ok(());
        }
        match image {
            DynamicImage::ImageLuma8(gray) => {
                write_gray_jpeg(path, gray.width(), gray.height(), gray.as_raw(), self.jpeg_quality)
            }
            other => {
                let rgb = other.to_rgb8();
                write_rgb_jpeg(path, rgb.width(), rgb.height(), rgb.as_raw(), self.jpeg_quality)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn jpeg_and_png_outputs_decode_back() {
        let dir = tempfile::tempdir().unwrap();
        let codec = FsImageCodec::default();

        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(24, 12, Rgb([200, 40, 10])));
        let jpg = dir.path().join("out.JPG");
        codec.encode(&rgb, &jpg).unwrap();
        assert_eq!(codec.decode(&jpg).unwrap().width(), 24);

        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(5, 7, Luma([77])));
        let png = dir.path().join("out.png");
        codec.encode(&gray, &png).unwrap();
        let back = codec.decode(&png).unwrap();
        assert_eq!(back.to_luma8().get_pixel(4, 6)[0], 77);
    }

    #[test]
    fn decoding_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"this is not an image").unwrap();
        assert!(FsImageCodec::default().decode(&path).is_err());
    }
}
