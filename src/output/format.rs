use std::fs;
use std::path::Path;

use anyhow::Result;
use image::buffer::ConvertBuffer;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageResult, RgbImage, RgbaImage};
use log::debug;

use crate::atlas::Atlas;
use crate::cli::CompressionLevel;
use crate::error::SheetError;

/// Write the sheet image to `path` as PNG.
///
/// `opaque` drops the alpha channel (RGB8 output); `compress` runs the
/// encoded file through oxipng at the given level.
pub fn save_atlas_image(
    atlas: &Atlas,
    path: &Path,
    opaque: bool,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    let encoded = encode_png(&atlas.image, opaque).map_err(|e| SheetError::ImageSave {
        path: path.to_path_buf(),
        source: e,
    })?;

    let bytes = match compress {
        None => encoded,
        Some(level) => {
            let optimized = optimize_png(&encoded, level).map_err(|e| SheetError::PngCompress {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            debug!(
                "Compressed {}: {} -> {} bytes",
                path.display(),
                encoded.len(),
                optimized.len()
            );
            optimized
        }
    };

    fs::write(path, bytes).map_err(|e| SheetError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

fn encode_png(image: &RgbaImage, opaque: bool) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    let (width, height) = image.dimensions();
    if opaque {
        let rgb: RgbImage = image.convert();
        encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
    } else {
        encoder.write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)?;
    }
    Ok(bytes)
}

fn optimize_png(png: &[u8], level: CompressionLevel) -> Result<Vec<u8>, oxipng::PngError> {
    let options = match level {
        CompressionLevel::Level(preset) => oxipng::Options::from_preset(preset),
        CompressionLevel::Max => oxipng::Options::max_compression(),
    };
    oxipng::optimize_from_memory(png, &options)
}
