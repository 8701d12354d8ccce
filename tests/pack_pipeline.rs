use std::fs;

use anyhow::Result;
use image::{Rgba, RgbaImage};

use layersheet::layer::{ImageFileSource, SourceKind, SourceOptions, open_source};
use layersheet::output::{save_atlas_image, write_json};
use layersheet::{Layer, LayerSource, SheetBuilder, SheetError};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// In-memory stand-in for a layered document
struct FixedLayers(Vec<Layer>);

impl LayerSource for FixedLayers {
    fn load_layers(&self) -> Result<Vec<Layer>> {
        Ok(self.0.clone())
    }
}

fn layer(name: &str, width: u32, height: u32, color: [u8; 4]) -> Layer {
    Layer::new(name, RgbaImage::from_pixel(width, height, Rgba(color)))
}

#[test]
fn test_files_to_png_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("layers");
    let output = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();
    fs::create_dir_all(&output).unwrap();

    let sizes = [(8, 8), (4, 6), (2, 2), (6, 3), (5, 5)];
    for (i, (w, h)) in sizes.iter().enumerate() {
        RgbaImage::from_pixel(*w, *h, Rgba([0, 0, 255, 255]))
            .save(input.join(format!("layer_{}.png", i)))
            .unwrap();
    }

    let layers = ImageFileSource::new(vec![input], None, false)
        .load_layers()
        .unwrap();
    let atlas = SheetBuilder::new()
        .spacing(2)
        .background(WHITE)
        .build(&layers)
        .unwrap();

    // 5 layers -> 2 columns x 3 rows of 8x8 cells
    assert_eq!((atlas.grid.columns, atlas.grid.rows), (2, 3));
    assert_eq!((atlas.width, atlas.height), (18, 28));

    let png = output.join("sheet.png");
    save_atlas_image(&atlas, &png, false, None).unwrap();
    write_json(&atlas, &output, "sheet").unwrap();

    let saved = image::open(&png).unwrap().into_rgba8();
    assert_eq!(saved.dimensions(), (18, 28));
    // Spacing column between the two cells keeps the background
    assert_eq!(*saved.get_pixel(8, 0), WHITE);
    // layer_1 (4x6) is centered in cell (1, 0): origin (10, 0) + (2, 1)
    assert_eq!(*saved.get_pixel(12, 1), Rgba([0, 0, 255, 255]));
    assert_eq!(*saved.get_pixel(11, 1), WHITE);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("sheet.json")).unwrap()).unwrap();
    assert_eq!(json["frames"].as_array().unwrap().len(), 5);
    assert_eq!(json["frames"][1]["name"], "layer_1.png");
    assert_eq!(json["frames"][1]["frame"]["x"], 12);
}

#[test]
fn test_custom_source_and_progress() {
    let source = FixedLayers(vec![
        layer("a", 3, 3, [255, 0, 0, 255]),
        layer("b", 3, 1, [0, 255, 0, 255]),
        layer("c", 1, 3, [0, 0, 255, 255]),
    ]);
    let layers = source.load_layers().unwrap();

    let mut progress = Vec::new();
    let atlas = SheetBuilder::new()
        .columns(Some(1))
        .build_with_observer(&layers, &mut |index: usize, total: usize| {
            progress.push(format!("{}/{}", index + 1, total))
        })
        .unwrap();

    assert_eq!(progress, vec!["1/3", "2/3", "3/3"]);
    assert_eq!(atlas.image.dimensions(), (3, 9));
    let origins: Vec<_> = atlas.placements.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(origins, vec![(0, 0), (0, 4), (1, 6)]);
}

#[test]
fn test_empty_source_propagates_error() {
    let layers = FixedLayers(Vec::new()).load_layers().unwrap();
    let err = layersheet::pack(&layers, &SheetBuilder::new()).unwrap_err();

    assert!(matches!(err, SheetError::EmptyInput));
    assert_eq!(err.to_string(), "No layers to pack");
}

#[test]
fn test_auto_source_reads_gif_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blink.gif");
    {
        let file = fs::File::create(&path).unwrap();
        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        let frames = (0..4).map(|_| image::Frame::new(RgbaImage::from_pixel(5, 3, WHITE)));
        encoder.encode_frames(frames).unwrap();
    }

    let source = open_source(SourceKind::Auto, &[path], &SourceOptions::default());
    let layers = source.load_layers().unwrap();
    let atlas = SheetBuilder::new().build(&layers).unwrap();

    assert_eq!(layers.len(), 4);
    assert_eq!((atlas.grid.columns, atlas.grid.rows), (2, 2));
    assert_eq!(atlas.image.dimensions(), (10, 6));
}
