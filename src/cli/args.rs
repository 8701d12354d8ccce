use clap::{Args, Parser, Subcommand};
use image::Rgba;
use std::path::PathBuf;

use crate::color::parse_color;
use crate::layer::SourceKind;
use crate::packing::PasteMode;

#[derive(Parser, Debug)]
#[command(name = "layersheet")]
#[command(version, about = "Pack image layers into a grid spritesheet", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the spritesheet image only
    Png(CommonArgs),
    /// Write the spritesheet plus JSON cell metadata
    Json(CommonArgs),
    /// Write the spritesheet plus TexturePacker .tpsheet metadata
    Tpsheet(CommonArgs),
}

impl Command {
    pub fn args(&self) -> &CommonArgs {
        match self {
            Command::Png(args) | Command::Json(args) | Command::Tpsheet(args) => args,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Layered document (.aseprite, .gif), image files or directories
    #[arg(required_unless_present = "config")]
    pub input: Vec<PathBuf>,

    /// Load settings from a .layersheet config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the effective settings to a .layersheet config file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Output directory [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base name for output files (NAME.png, NAME.json) [default: <input>_spritesheet]
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Where layers come from [default: auto]
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Document frame to take layers from [default: 0]
    #[arg(long)]
    pub frame: Option<u32>,

    /// Number of columns [default: round(sqrt(layer count))]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub columns: Option<u32>,

    /// Gap between cells in pixels [default: 0]
    #[arg(short, long)]
    pub spacing: Option<u32>,

    /// Background color: transparent, #RRGGBB or #RRGGBBAA [default: transparent]
    #[arg(short, long, value_parser = parse_color)]
    pub background: Option<Rgba<u8>>,

    /// How layer pixels are written into cells [default: masked]
    #[arg(long, value_enum)]
    pub paste: Option<PasteMode>,

    /// Crop transparent borders from image and GIF frame layers
    #[arg(long)]
    pub trim: bool,

    /// Output RGB instead of RGBA (opaque spritesheet)
    #[arg(long)]
    pub opaque: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}
