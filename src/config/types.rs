use serde::{Deserialize, Serialize};

/// PNG compression level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

/// Saved spritesheet settings (`.layersheet` JSON file).
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Input file paths or glob patterns
    pub input: Vec<String>,
    /// Output directory for the spritesheet
    pub output_dir: String,
    /// Base name for output files (NAME.png, NAME.json); derived from the
    /// first input when unset
    pub name: Option<String>,
    /// Layer source: "auto", "images", "aseprite" or "gif"
    pub source: String,
    /// Document frame to take layers from
    pub frame: u32,
    /// Fixed column count; auto (near-square) when unset
    pub columns: Option<u32>,
    /// Gap between cells in pixels
    pub spacing: u32,
    /// Background color: "transparent", "#RRGGBB" or "#RRGGBBAA"
    pub background: String,
    /// How layers are written into cells: "masked", "replace" or "over"
    pub paste_mode: String,
    /// Crop transparent borders from each layer
    pub trim: bool,
    /// PNG compression configuration (optional)
    pub compress: Option<CompressConfig>,
    /// Output RGB instead of RGBA (opaque spritesheet)
    pub opaque: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            version: 1,
            input: Vec::new(),
            output_dir: ".".to_string(),
            name: None,
            source: "auto".to_string(),
            frame: 0,
            columns: None,
            spacing: 0,
            background: "transparent".to_string(),
            paste_mode: "masked".to_string(),
            trim: false,
            compress: None,
            opaque: false,
        }
    }
}
