use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::atlas::{Atlas, PlacedLayer};
use crate::error::SheetError;
use crate::output::sheet_png_filename;

#[derive(Serialize)]
struct TpsheetOutput {
    textures: Vec<TpTexture>,
    meta: TpMeta,
}

#[derive(Serialize)]
struct TpTexture {
    image: String,
    size: TpSize,
    sprites: Vec<TpSprite>,
}

#[derive(Serialize)]
struct TpSize {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct TpSprite {
    filename: String,
    region: TpRegion,
    margin: TpMargin,
}

#[derive(Serialize)]
struct TpRegion {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct TpMargin {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct TpMeta {
    app: &'static str,
    version: &'static str,
}

/// Write TexturePacker .tpsheet metadata.
///
/// Margins restore each layer to its full cell size, so importers see every
/// frame with identical dimensions and the same centering as the sheet.
pub fn write_tpsheet(atlas: &Atlas, output_dir: &Path, base_name: &str) -> Result<()> {
    let texture = TpTexture {
        image: sheet_png_filename(base_name),
        size: TpSize {
            w: atlas.width,
            h: atlas.height,
        },
        sprites: atlas
            .placements
            .iter()
            .map(|placed| layer_to_tpsprite(atlas, placed))
            .collect(),
    };

    let output = TpsheetOutput {
        textures: vec![texture],
        meta: TpMeta {
            app: "layersheet",
            version: "1.0",
        },
    };

    let tpsheet_path = output_dir.join(format!("{}.tpsheet", base_name));
    let content = serde_json::to_string_pretty(&output)?;

    fs::write(&tpsheet_path, content).map_err(|e| SheetError::OutputWrite {
        path: tpsheet_path,
        source: e,
    })?;

    Ok(())
}

fn layer_to_tpsprite(atlas: &Atlas, placed: &PlacedLayer) -> TpSprite {
    let cell = atlas
        .cell_rect(placed.index)
        .unwrap_or_else(|| placed.rect());

    TpSprite {
        filename: placed.name.clone(),
        region: TpRegion {
            x: placed.x,
            y: placed.y,
            w: placed.width,
            h: placed.height,
        },
        margin: TpMargin {
            x: placed.x - cell.x,
            y: placed.y - cell.y,
            w: cell.width - placed.width,
            h: cell.height - placed.height,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::SheetBuilder;
    use crate::layer::Layer;
    use image::RgbaImage;

    fn sample_atlas() -> Atlas {
        let layers = vec![
            Layer::new("big.png", RgbaImage::new(32, 32)),
            Layer::new("folder/small.png", RgbaImage::new(28, 29)),
        ];
        SheetBuilder::new()
            .columns(Some(2))
            .spacing(1)
            .build(&layers)
            .unwrap()
    }

    #[test]
    fn test_tpsprite_full_cell_has_no_margin() {
        let atlas = sample_atlas();
        let tp = layer_to_tpsprite(&atlas, &atlas.placements[0]);

        assert_eq!(tp.filename, "big.png");
        assert_eq!((tp.region.x, tp.region.y), (0, 0));
        assert_eq!((tp.region.w, tp.region.h), (32, 32));
        assert_eq!((tp.margin.x, tp.margin.y, tp.margin.w, tp.margin.h), (0, 0, 0, 0));
    }

    #[test]
    fn test_tpsprite_margin_restores_cell() {
        let atlas = sample_atlas();
        let tp = layer_to_tpsprite(&atlas, &atlas.placements[1]);

        assert_eq!(tp.filename, "folder/small.png");
        // Cell starts at 33; offset (32 - 28) / 2 = 2 and (32 - 29) / 2 = 1
        assert_eq!((tp.region.x, tp.region.y), (35, 1));
        assert_eq!(tp.margin.x, 2);
        assert_eq!(tp.margin.y, 1);
        assert_eq!(tp.margin.w, 4); // 32 - 28
        assert_eq!(tp.margin.h, 3); // 32 - 29
    }

    #[test]
    fn test_write_tpsheet_file() {
        let dir = tempfile::tempdir().unwrap();
        write_tpsheet(&sample_atlas(), dir.path(), "sheet").unwrap();

        let text = fs::read_to_string(dir.path().join("sheet.tpsheet")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["textures"][0]["image"], "sheet.png");
        assert_eq!(value["textures"][0]["sprites"].as_array().unwrap().len(), 2);
    }
}
