use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::atlas::{Atlas, PlacedLayer};
use crate::error::SheetError;
use crate::output::sheet_png_filename;
use crate::packing::Rect;

#[derive(Serialize)]
struct JsonOutput {
    meta: Meta,
    grid: JsonGrid,
    frames: Vec<JsonFrame>,
}

#[derive(Serialize)]
struct Meta {
    app: &'static str,
    version: &'static str,
    format: &'static str,
    image: String,
    size: Size,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonGrid {
    columns: u32,
    rows: u32,
    cell_width: u32,
    cell_height: u32,
    spacing: u32,
}

#[derive(Serialize)]
struct Size {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFrame {
    name: String,
    index: usize,
    column: u32,
    row: u32,
    /// Layer content on the sheet
    frame: Frame,
    /// Whole cell the layer is centered in
    cell: Frame,
}

#[derive(Serialize)]
struct Frame {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl From<Rect> for Frame {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.width,
            h: rect.height,
        }
    }
}

/// Write `<base_name>.json` describing the grid and every placed layer
pub fn write_json(atlas: &Atlas, output_dir: &Path, base_name: &str) -> Result<()> {
    let output = JsonOutput {
        meta: Meta {
            app: "layersheet",
            version: env!("CARGO_PKG_VERSION"),
            format: "rgba8888",
            image: sheet_png_filename(base_name),
            size: Size {
                w: atlas.width,
                h: atlas.height,
            },
        },
        grid: JsonGrid {
            columns: atlas.grid.columns,
            rows: atlas.grid.rows,
            cell_width: atlas.grid.cell_width,
            cell_height: atlas.grid.cell_height,
            spacing: atlas.grid.spacing,
        },
        frames: atlas
            .placements
            .iter()
            .map(|placed| layer_to_json(atlas, placed))
            .collect(),
    };

    let json_path = output_dir.join(format!("{}.json", base_name));
    let content = serde_json::to_string_pretty(&output)?;

    fs::write(&json_path, content).map_err(|e| SheetError::OutputWrite {
        path: json_path,
        source: e,
    })?;

    Ok(())
}

fn layer_to_json(atlas: &Atlas, placed: &PlacedLayer) -> JsonFrame {
    let cell = atlas
        .cell_rect(placed.index)
        .unwrap_or_else(|| placed.rect());

    JsonFrame {
        name: placed.name.clone(),
        index: placed.index,
        column: placed.column,
        row: placed.row,
        frame: placed.rect().into(),
        cell: cell.into(),
    }
}
