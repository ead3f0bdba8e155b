use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// Uniform dark background with one bright square block.
pub fn bright_block_gray(
    width: u32,
    height: u32,
    block_x: u32,
    block_y: u32,
    block: u32,
) -> DynamicImage {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = GrayImage::from_pixel(width, height, Luma([20]));
    for y in block_y..(block_y + block).min(height) {
        for x in block_x..(block_x + block).min(width) {
            img.put_pixel(x, y, Luma([250]));
        }
    }
    DynamicImage::ImageLuma8(img)
}

/// Deterministic textured color image: smooth gradients plus a few hard edges.
pub fn textured_rgb(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let stripe = if (x / 17 + y / 23) % 3 == 0 { 120 } else { 0 };
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            stripe,
        ])
    });
    DynamicImage::ImageRgb8(img)
}
