use std::path::PathBuf;

use anyhow::Result;
use asefile::AsepriteFile;
use image::RgbaImage;
use log::{debug, info};

use super::{Layer, LayerSource, content_bounds};
use crate::error::SheetError;

/// Visible layers of one frame of an Aseprite document.
///
/// Each layer is cropped to the bounds of its painted pixels, so layers keep
/// their own size instead of the document canvas size. Hidden layers and
/// layers with nothing painted in the frame are skipped.
#[derive(Debug, Clone)]
pub struct AsepriteSource {
    path: PathBuf,
    frame: u32,
}

impl AsepriteSource {
    pub fn new(path: PathBuf, frame: u32) -> Self {
        Self { path, frame }
    }
}

impl LayerSource for AsepriteSource {
    fn load_layers(&self) -> Result<Vec<Layer>> {
        if !self.path.exists() {
            return Err(SheetError::InputNotFound(self.path.clone()).into());
        }

        let ase = AsepriteFile::read_file(&self.path).map_err(|e| SheetError::DocumentLoad {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if self.frame >= ase.num_frames() {
            return Err(SheetError::InvalidParameter {
                name: "frame",
                reason: format!(
                    "document has {} frame(s), requested frame {}",
                    ase.num_frames(),
                    self.frame
                ),
            }
            .into());
        }

        let mut layers = Vec::new();
        for layer in ase.layers() {
            if !layer.is_visible() {
                debug!("Skipping hidden layer '{}'", layer.name());
                continue;
            }

            let cel = layer.frame(self.frame).image();
            // Rebuild through raw bytes so the buffer type is ours
            let (width, height) = (cel.width(), cel.height());
            let Some(image) = RgbaImage::from_raw(width, height, cel.into_raw()) else {
                continue;
            };

            let Some(bounds) = content_bounds(&image) else {
                debug!("Skipping empty layer '{}'", layer.name());
                continue;
            };

            let cropped =
                image::imageops::crop_imm(&image, bounds.x, bounds.y, bounds.width, bounds.height)
                    .to_image();
            layers.push(Layer::new(layer.name(), cropped));
        }

        info!(
            "Loaded {} visible layers from {} (frame {})",
            layers.len(),
            self.path.display(),
            self.frame
        );

        Ok(layers)
    }
}
