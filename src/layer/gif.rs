use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;
use log::info;

use super::{Layer, LayerSource, trim_layer};
use crate::error::SheetError;

/// Every frame of an animated GIF as one layer, in playback order.
///
/// Frames are fully composed by the decoder, so each one is the full GIF
/// canvas unless trimming is enabled.
#[derive(Debug, Clone)]
pub struct GifFrameSource {
    path: PathBuf,
    trim: bool,
}

impl GifFrameSource {
    pub fn new(path: PathBuf, trim: bool) -> Self {
        Self { path, trim }
    }
}

impl LayerSource for GifFrameSource {
    fn load_layers(&self) -> Result<Vec<Layer>> {
        if !self.path.exists() {
            return Err(SheetError::InputNotFound(self.path.clone()).into());
        }

        let frames = decode_frames(&self.path)?;
        info!(
            "Loaded {} frames from {}",
            frames.len(),
            self.path.display()
        );

        let layers = frames
            .into_iter()
            .enumerate()
            .map(|(i, frame)| {
                let image = if self.trim {
                    trim_layer(&frame)
                } else {
                    frame
                };
                Layer::new(format!("frame_{:03}", i), image)
            })
            .collect();

        Ok(layers)
    }
}

fn decode_frames(path: &Path) -> Result<Vec<image::RgbaImage>, SheetError> {
    let load_error = |source: image::ImageError| SheetError::ImageLoad {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| load_error(e.into()))?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(load_error)?;
    let frames = decoder.into_frames().collect_frames().map_err(load_error)?;

    Ok(frames.into_iter().map(image::Frame::into_buffer).collect())
}
