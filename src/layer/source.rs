use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::ValueEnum;

use super::{AsepriteSource, GifFrameSource, ImageFileSource, Layer};

/// Supplies the ordered, already-filtered layers to pack.
///
/// Decoding and visibility decisions belong to the implementation; the packer
/// composites whatever sequence it is handed, in that order.
pub trait LayerSource {
    fn load_layers(&self) -> Result<Vec<Layer>>;
}

/// Where layers come from
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// Aseprite for a single .aseprite/.ase input, GIF frames for a single
    /// .gif input, image files otherwise
    #[default]
    #[value(name = "auto")]
    Auto,
    /// One layer per image file (directories are searched recursively)
    #[value(name = "images")]
    Images,
    /// Visible layers of an Aseprite document
    #[value(name = "aseprite")]
    Aseprite,
    /// Frames of an animated GIF
    #[value(name = "gif")]
    Gif,
}

impl SourceKind {
    /// Replace `Auto` with the concrete kind implied by the inputs
    pub fn resolve(self, inputs: &[PathBuf]) -> SourceKind {
        if self != SourceKind::Auto {
            return self;
        }

        let [single] = inputs else {
            return SourceKind::Images;
        };

        match lowercase_extension(single).as_deref() {
            Some("aseprite" | "ase") => SourceKind::Aseprite,
            Some("gif") => SourceKind::Gif,
            _ => SourceKind::Images,
        }
    }
}

/// Options shared by every layer source
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Document frame to read layers from (Aseprite only)
    pub frame: u32,
    /// Crop transparent borders from each layer (files and GIF frames)
    pub trim: bool,
    /// Directory sprite names are made relative to for individual file inputs
    pub base_dir: Option<PathBuf>,
}

/// Build the layer source for `kind`.
///
/// Document sources read the first input only.
pub fn open_source(
    kind: SourceKind,
    inputs: &[PathBuf],
    options: &SourceOptions,
) -> Box<dyn LayerSource> {
    let first = || inputs.first().cloned().unwrap_or_default();

    match kind.resolve(inputs) {
        SourceKind::Aseprite => Box::new(AsepriteSource::new(first(), options.frame)),
        SourceKind::Gif => Box::new(GifFrameSource::new(first(), options.trim)),
        SourceKind::Images | SourceKind::Auto => Box::new(ImageFileSource::new(
            inputs.to_vec(),
            options.base_dir.clone(),
            options.trim,
        )),
    }
}

pub(crate) fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}
