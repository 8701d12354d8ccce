use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::packing::{Grid, Rect};

/// Where one layer ended up on the spritesheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedLayer {
    /// Layer name as reported by the source
    pub name: String,
    /// Position of the layer in the input sequence
    pub index: usize,
    /// Grid column of the layer's cell
    pub column: u32,
    /// Grid row of the layer's cell
    pub row: u32,
    /// Top-left corner of the layer content (x coordinate)
    pub x: u32,
    /// Top-left corner of the layer content (y coordinate)
    pub y: u32,
    /// Layer width
    pub width: u32,
    /// Layer height
    pub height: u32,
}

impl PlacedLayer {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A finished spritesheet
#[derive(Debug)]
pub struct Atlas {
    /// Spritesheet width
    pub width: u32,
    /// Spritesheet height
    pub height: u32,
    /// Rendered spritesheet
    pub image: RgbaImage,
    /// Grid the layers were laid out on
    pub grid: Grid,
    /// One entry per packed layer, in input order
    pub placements: Vec<PlacedLayer>,
}

impl Atlas {
    /// Allocate a spritesheet for `grid`, filled with `background`
    pub fn new(grid: Grid, background: Rgba<u8>) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            image: RgbaImage::from_pixel(grid.width, grid.height, background),
            grid,
            placements: Vec::new(),
        }
    }

    /// Bounds of the cell holding the layer at `index`
    pub fn cell_rect(&self, index: usize) -> Option<Rect> {
        if index >= self.placements.len() {
            return None;
        }
        u32::try_from(index).ok().map(|i| self.grid.cell_rect(i))
    }
}
