use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageReader;
use log::info;
use rayon::prelude::*;

use super::{Layer, LayerSource, trim_layer};
use crate::error::SheetError;
use crate::layer::source::lowercase_extension;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tga"];

/// One layer per image file.
///
/// Files keep the order they were given in; directories contribute their
/// images recursively, sorted by path.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    inputs: Vec<PathBuf>,
    base_dir: Option<PathBuf>,
    trim: bool,
}

/// Image path with its base directory for computing relative names
struct ImagePath {
    path: PathBuf,
    base: Option<PathBuf>,
}

impl ImageFileSource {
    /// When `base_dir` is provided, individual file inputs are named by their
    /// path relative to it ("hero/idle.png" rather than "idle.png").
    pub fn new(inputs: Vec<PathBuf>, base_dir: Option<PathBuf>, trim: bool) -> Self {
        Self {
            inputs,
            base_dir,
            trim,
        }
    }
}

impl LayerSource for ImageFileSource {
    fn load_layers(&self) -> Result<Vec<Layer>> {
        let image_paths = collect_image_paths(&self.inputs, self.base_dir.as_deref())?;

        if image_paths.is_empty() {
            return Err(SheetError::EmptyInput.into());
        }

        info!("Loading {} images...", image_paths.len());

        // Indexed parallel collect keeps input order
        image_paths
            .par_iter()
            .map(|img_path| load_single_layer(&img_path.path, img_path.base.as_deref(), self.trim))
            .collect()
    }
}

fn collect_image_paths(inputs: &[PathBuf], base_dir: Option<&Path>) -> Result<Vec<ImagePath>> {
    let mut paths = Vec::new();

    for path in inputs {
        if !path.exists() {
            return Err(SheetError::InputNotFound(path.clone()).into());
        }

        if path.is_file() {
            if is_supported_image(path) {
                paths.push(ImagePath {
                    path: path.clone(),
                    base: base_dir.map(Path::to_path_buf),
                });
            }
        } else if path.is_dir() {
            collect_from_directory(path, path, &mut paths)?;
        }
    }

    Ok(paths)
}

fn collect_from_directory(base: &Path, dir: &Path, paths: &mut Vec<ImagePath>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_file() && is_supported_image(&path) {
            paths.push(ImagePath {
                path,
                base: Some(base.to_path_buf()),
            });
        } else if path.is_dir() {
            collect_from_directory(base, &path, paths)?;
        }
    }

    Ok(())
}

fn is_supported_image(path: &Path) -> bool {
    lowercase_extension(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn load_single_layer(path: &Path, base: Option<&Path>, trim: bool) -> Result<Layer> {
    let image = ImageReader::open(path)
        .map_err(|e| SheetError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| SheetError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .into_rgba8();

    let name = match base {
        Some(base_dir) => path
            .strip_prefix(base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string(),
        None => path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string(),
    };

    let image = if trim { trim_layer(&image) } else { image };

    Ok(Layer::new(name, image))
}
