use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Error, Result};

fn encoder_dims(cols: u32, rows: u32) -> Result<(u16, u16)> {
    let w = u16::try_from(cols).map_err(|_| Error::invalid("jpeg_width", cols))?;
    let h = u16::try_from(rows).map_err(|_| Error::invalid("jpeg_height", rows))?;
    Ok((w, h))
}

pub fn write_gray_jpeg(output: &Path, cols: u32, rows: u32, data: &[u8], quality: u8) -> Result<()> {
    let (w, h) = encoder_dims(cols, rows)?;
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality);
    encoder.encode(data, w, h, ColorType::Luma)?;
    Ok(())
}

pub fn write_rgb_jpeg(output: &Path, cols: u32, rows: u32, rgb_data: &[u8], quality: u8) -> Result<()> {
    let (w, h) = encoder_dims(cols, rows)?;
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality);
    encoder.encode(rgb_data, w, h, ColorType::Rgb)?;
    Ok(())
}
