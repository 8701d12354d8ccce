use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::Rgba;
use log::{debug, info};

use layersheet::atlas::SheetBuilder;
use layersheet::cli::{CliArgs, Command, CommonArgs, CompressionLevel};
use layersheet::color::{TRANSPARENT, format_color, parse_color};
use layersheet::config::{CompressConfig, LoadedConfig, SheetConfig, make_relative, save_config};
use layersheet::layer::{SourceKind, SourceOptions, open_source};
use layersheet::output::{save_atlas_image, sheet_png_filename, write_json, write_tpsheet};
use layersheet::packing::PasteMode;

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();
    let args = cli.command.args();

    let merged = merge_config_with_args(args)?;

    env_logger::Builder::new()
        .filter_level(if merged.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    info!("layersheet v{}", env!("CARGO_PKG_VERSION"));

    if let Some(config_path) = &args.save_config {
        let config = merged.to_config(config_path)?;
        save_config(&config, config_path)?;
        info!("Saved settings to {}", config_path.display());
    }

    if !merged.output.exists() {
        fs::create_dir_all(&merged.output)?;
    }

    let source = open_source(
        merged.source,
        &merged.input,
        &SourceOptions {
            frame: merged.frame,
            trim: merged.trim,
            base_dir: merged.base_dir.clone(),
        },
    );
    let layers = source.load_layers()?;
    info!("Loaded {} layers", layers.len());

    let atlas = SheetBuilder::new()
        .columns(merged.columns)
        .spacing(merged.spacing)
        .background(merged.background)
        .paste_mode(merged.paste_mode)
        .build_with_observer(&layers, &mut |index: usize, total: usize| {
            debug!("Placed layer {}/{}", index + 1, total);
        })?;

    let image_path = merged.output.join(sheet_png_filename(&merged.name));
    save_atlas_image(&atlas, &image_path, merged.opaque, merged.compress)?;
    info!(
        "Saved {} ({}x{})",
        image_path.display(),
        atlas.width,
        atlas.height
    );

    match &cli.command {
        Command::Png(_) => {}
        Command::Json(_) => {
            write_json(&atlas, &merged.output, &merged.name)?;
            info!("Generated {}.json", merged.name);
        }
        Command::Tpsheet(_) => {
            write_tpsheet(&atlas, &merged.output, &merged.name)?;
            info!("Generated {}.tpsheet", merged.name);
        }
    }

    info!("Done!");

    Ok(())
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    input: Vec<PathBuf>,
    output: PathBuf,
    name: String,
    source: SourceKind,
    frame: u32,
    columns: Option<u32>,
    spacing: u32,
    background: Rgba<u8>,
    paste_mode: PasteMode,
    trim: bool,
    opaque: bool,
    verbose: bool,
    compress: Option<CompressionLevel>,
    /// Config directory; file inputs from a config are named relative to it
    base_dir: Option<PathBuf>,
}

impl MergedConfig {
    /// Settings as a config file stored at `config_path`, with paths made
    /// relative to its directory
    fn to_config(&self, config_path: &Path) -> Result<SheetConfig> {
        let config_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let base = std::path::absolute(config_dir)
            .with_context(|| format!("failed to resolve {}", config_dir.display()))?;

        let relative = |path: &Path| -> Result<String> {
            let absolute = std::path::absolute(path)
                .with_context(|| format!("failed to resolve {}", path.display()))?;
            Ok(make_relative(&absolute, &base))
        };

        Ok(SheetConfig {
            input: self
                .input
                .iter()
                .map(|p| relative(p))
                .collect::<Result<_>>()?,
            output_dir: relative(&self.output)?,
            name: Some(self.name.clone()),
            source: value_name(self.source),
            frame: self.frame,
            columns: self.columns,
            spacing: self.spacing,
            background: format_color(self.background),
            paste_mode: value_name(self.paste_mode),
            trim: self.trim,
            compress: self.compress.map(|level| match level {
                CompressionLevel::Level(n) => CompressConfig::Level(n),
                CompressionLevel::Max => CompressConfig::Max("max".to_string()),
            }),
            opaque: self.opaque,
            ..SheetConfig::default()
        })
    }
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &CommonArgs) -> Result<MergedConfig> {
    let loaded_config = if let Some(config_path) = &args.config {
        Some(
            LoadedConfig::load(config_path)
                .with_context(|| format!("failed to load config: {}", config_path.display()))?,
        )
    } else {
        None
    };
    let config = loaded_config.as_ref().map(|lc| &lc.config);

    // Inputs: CLI args override config
    let (input, base_dir) = if !args.input.is_empty() {
        (args.input.clone(), None)
    } else if let Some(lc) = &loaded_config {
        let inputs = lc
            .resolve_inputs()
            .context("failed to resolve input files from config")?;
        (inputs, Some(lc.base_dir.clone()))
    } else {
        // clap's required_unless_present makes this unreachable in practice
        (Vec::new(), None)
    };

    let output = args.output.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.resolve_output_dir())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let name = args
        .name
        .clone()
        .or_else(|| config.and_then(|c| c.name.clone()))
        .unwrap_or_else(|| default_name(&input));

    let source = match (args.source, config) {
        (Some(kind), _) => kind,
        (None, Some(c)) => parse_value::<SourceKind>("source", &c.source)?,
        (None, None) => SourceKind::Auto,
    };

    let paste_mode = match (args.paste, config) {
        (Some(mode), _) => mode,
        (None, Some(c)) => parse_value::<PasteMode>("paste_mode", &c.paste_mode)?,
        (None, None) => PasteMode::Masked,
    };

    let background = match (args.background, config) {
        (Some(color), _) => color,
        (None, Some(c)) => parse_color(&c.background)
            .context("invalid background in config file")?,
        (None, None) => TRANSPARENT,
    };

    let frame = args.frame.or(config.map(|c| c.frame)).unwrap_or(0);
    let columns = args.columns.or_else(|| config.and_then(|c| c.columns));
    let spacing = args.spacing.or(config.map(|c| c.spacing)).unwrap_or(0);

    // Boolean flags: CLI presence sets them to true, otherwise use config
    let trim = args.trim || config.is_some_and(|c| c.trim);
    let opaque = args.opaque || config.is_some_and(|c| c.opaque);

    let compress = if args.compress.is_some() {
        args.compress
    } else {
        config.and_then(|c| c.compress.as_ref()).map(|c| match c {
            CompressConfig::Level(n) => CompressionLevel::Level(*n),
            CompressConfig::Max(_) => CompressionLevel::Max,
        })
    };

    Ok(MergedConfig {
        input,
        output,
        name,
        source,
        frame,
        columns,
        spacing,
        background,
        paste_mode,
        trim,
        opaque,
        verbose: args.verbose,
        compress,
        base_dir,
    })
}

/// `<first input stem>_spritesheet`, or `spritesheet` without inputs
fn default_name(inputs: &[PathBuf]) -> String {
    inputs
        .first()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .map(|stem| format!("{}_spritesheet", stem))
        .unwrap_or_else(|| "spritesheet".to_string())
}

fn parse_value<T: ValueEnum>(field: &str, value: &str) -> Result<T> {
    T::from_str(value, true).map_err(|_e| {
        let valid: Vec<String> = T::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        anyhow::anyhow!(
            "unknown {} '{}' in config file. Valid values: {}",
            field,
            value,
            valid.join(", ")
        )
    })
}

fn value_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}
