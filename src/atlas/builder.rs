use image::Rgba;
use log::{debug, info};

use super::{Atlas, PlacedLayer};
use crate::error::SheetError;
use crate::layer::Layer;
use crate::packing::{Grid, PasteMode, paste_layer};

/// Receives a callback after each layer is composited
pub trait PlacementObserver {
    /// `index` is the layer's position in the input, `total` the layer count
    fn on_layer_placed(&mut self, index: usize, total: usize);
}

impl<F: FnMut(usize, usize)> PlacementObserver for F {
    fn on_layer_placed(&mut self, index: usize, total: usize) {
        self(index, total)
    }
}

/// Layout parameters for building a spritesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetBuilder {
    /// Fixed column count, or `None` for a near-square grid
    pub columns: Option<u32>,
    /// Gap between adjacent cells in pixels
    pub spacing: u32,
    /// Fill for every pixel no layer covers
    pub background: Rgba<u8>,
    pub paste_mode: PasteMode,
}

impl Default for SheetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetBuilder {
    pub fn new() -> Self {
        Self {
            columns: None,
            spacing: 0,
            background: Rgba([0, 0, 0, 0]),
            paste_mode: PasteMode::Masked,
        }
    }

    pub fn columns(mut self, columns: Option<u32>) -> Self {
        self.columns = columns;
        self
    }

    pub fn spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    pub fn paste_mode(mut self, paste_mode: PasteMode) -> Self {
        self.paste_mode = paste_mode;
        self
    }

    /// Pack `layers` into a spritesheet, one grid cell per layer in input order
    pub fn build(&self, layers: &[Layer]) -> Result<Atlas, SheetError> {
        self.build_with_observer(layers, &mut |_: usize, _: usize| {})
    }

    /// Same as [`SheetBuilder::build`], reporting each composited layer to
    /// `observer`
    pub fn build_with_observer(
        &self,
        layers: &[Layer],
        observer: &mut dyn PlacementObserver,
    ) -> Result<Atlas, SheetError> {
        let sizes: Vec<(u32, u32)> = layers.iter().map(Layer::dimensions).collect();
        let grid = Grid::compute(&sizes, self.columns, self.spacing)?;

        info!(
            "Packing {} layers into {}x{} grid of {}x{} cells ({}x{} px)",
            layers.len(),
            grid.columns,
            grid.rows,
            grid.cell_width,
            grid.cell_height,
            grid.width,
            grid.height
        );

        let mut atlas = Atlas::new(grid, self.background);
        let total = layers.len();

        // Grid::compute guarantees the layer count fits in u32
        for (cell, (index, layer)) in (0u32..).zip(layers.iter().enumerate()) {
            let rect = grid.place(cell, layer.width(), layer.height());
            let (column, row) = grid.cell_position(cell);

            paste_layer(&mut atlas.image, &layer.image, rect.x, rect.y, self.paste_mode);

            debug!(
                "Layer {} '{}' -> cell ({}, {}) at {},{}",
                index, layer.name, column, row, rect.x, rect.y
            );

            atlas.placements.push(PlacedLayer {
                name: layer.name.clone(),
                index,
                column,
                row,
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            });

            observer.on_layer_placed(index, total);
        }

        Ok(atlas)
    }
}

/// Pack `layers` with the given layout parameters
pub fn pack(layers: &[Layer], params: &SheetBuilder) -> Result<Atlas, SheetError> {
    params.build(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packing::Rect;
    use image::RgbaImage;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BACKGROUND: Rgba<u8> = Rgba([10, 20, 30, 40]);

    fn solid(name: &str, width: u32, height: u32, color: Rgba<u8>) -> Layer {
        Layer::new(name, RgbaImage::from_pixel(width, height, color))
    }

    fn mixed_layers() -> Vec<Layer> {
        vec![
            solid("a", 10, 4, RED),
            solid("b", 3, 12, GREEN),
            solid("c", 7, 7, RED),
            solid("d", 1, 1, GREEN),
            solid("e", 8, 5, RED),
        ]
    }

    #[test]
    fn test_dimensions_follow_grid_formula() {
        let layers = mixed_layers();
        for spacing in [0, 1, 5] {
            for columns in [None, Some(1), Some(2), Some(3), Some(7)] {
                let atlas = SheetBuilder::new()
                    .columns(columns)
                    .spacing(spacing)
                    .build(&layers)
                    .unwrap();
                let g = atlas.grid;

                assert_eq!((g.cell_width, g.cell_height), (10, 12));
                assert_eq!(g.width, g.columns * (10 + spacing) - spacing);
                assert_eq!(g.height, g.rows * (12 + spacing) - spacing);
                assert_eq!(atlas.image.dimensions(), (g.width, g.height));
                assert_eq!((atlas.width, atlas.height), (g.width, g.height));
            }
        }
    }

    #[test]
    fn test_auto_columns_used_when_unset() {
        let atlas = SheetBuilder::new().build(&mixed_layers()).unwrap();
        assert_eq!((atlas.grid.columns, atlas.grid.rows), (2, 3));
    }

    #[test]
    fn test_single_column_stacks_vertically() {
        let layers: Vec<_> = (0..4).map(|i| solid(&i.to_string(), 6, 9, RED)).collect();
        let atlas = SheetBuilder::new()
            .columns(Some(1))
            .spacing(0)
            .build(&layers)
            .unwrap();

        assert_eq!(atlas.image.dimensions(), (6, 36));
        for (i, placed) in (0u32..).zip(&atlas.placements) {
            assert_eq!((placed.x, placed.y), (0, i * 9));
            assert_eq!((placed.column, placed.row), (0, i));
        }
    }

    #[test]
    fn test_layers_centered_inside_their_cells() {
        let atlas = SheetBuilder::new()
            .columns(Some(2))
            .spacing(3)
            .build(&mixed_layers())
            .unwrap();

        for (i, placed) in atlas.placements.iter().enumerate() {
            let cell = atlas.cell_rect(i).unwrap();
            let content = placed.rect();
            assert!(cell.contains(&content), "layer {} escapes its cell", i);

            let left = content.x - cell.x;
            let right = cell.right() - content.right();
            let top = content.y - cell.y;
            let bottom = cell.bottom() - content.bottom();
            assert!(right == left || right == left + 1, "layer {}", i);
            assert!(bottom == top || bottom == top + 1, "layer {}", i);
        }
    }

    #[test]
    fn test_cells_never_overlap() {
        let atlas = SheetBuilder::new()
            .spacing(1)
            .build(&mixed_layers())
            .unwrap();

        let cells: Vec<Rect> = (0..atlas.placements.len())
            .map(|i| atlas.cell_rect(i).unwrap())
            .collect();
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn test_layer_pixels_land_at_placement() {
        let layers = vec![solid("r", 2, 2, RED), solid("g", 4, 4, GREEN)];
        let atlas = SheetBuilder::new()
            .columns(Some(2))
            .spacing(1)
            .background(BACKGROUND)
            .build(&layers)
            .unwrap();

        // Cell 4x4; red layer offset (1, 1), green cell starts at x = 5
        assert_eq!(atlas.placements[0].rect(), Rect::new(1, 1, 2, 2));
        assert_eq!(*atlas.image.get_pixel(1, 1), RED);
        assert_eq!(*atlas.image.get_pixel(2, 2), RED);
        assert_eq!(*atlas.image.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*atlas.image.get_pixel(4, 0), BACKGROUND);
        assert_eq!(*atlas.image.get_pixel(5, 0), GREEN);
        assert_eq!(*atlas.image.get_pixel(8, 3), GREEN);
    }

    #[test]
    fn test_uncovered_pixels_equal_background() {
        let atlas = SheetBuilder::new()
            .columns(Some(3))
            .spacing(2)
            .background(BACKGROUND)
            .build(&mixed_layers())
            .unwrap();

        for (x, y, pixel) in atlas.image.enumerate_pixels() {
            let covered = atlas
                .placements
                .iter()
                .any(|p| p.rect().contains_point(x, y));
            if !covered {
                assert_eq!(*pixel, BACKGROUND, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_transparent_layer_pixels_keep_background() {
        let mut image = RgbaImage::new(3, 1);
        image.put_pixel(1, 0, RED);
        let atlas = SheetBuilder::new()
            .background(BACKGROUND)
            .build(&[Layer::new("dot", image)])
            .unwrap();

        assert_eq!(*atlas.image.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*atlas.image.get_pixel(1, 0), RED);
        assert_eq!(*atlas.image.get_pixel(2, 0), BACKGROUND);
    }

    #[test]
    fn test_swapping_layers_swaps_cells() {
        let layers = mixed_layers();
        let mut swapped = layers.clone();
        swapped.swap(1, 3);

        let builder = SheetBuilder::new().columns(Some(2)).spacing(1);
        let original = builder.build(&layers).unwrap();
        let reordered = builder.build(&swapped).unwrap();

        assert_eq!(original.image.dimensions(), reordered.image.dimensions());
        let find = |atlas: &Atlas, name: &str| {
            atlas
                .placements
                .iter()
                .find(|p| p.name == name)
                .cloned()
                .unwrap()
        };
        let cell = |p: PlacedLayer| (p.column, p.row);

        assert_eq!(cell(find(&original, "b")), cell(find(&reordered, "d")));
        assert_eq!(cell(find(&original, "d")), cell(find(&reordered, "b")));
        for name in ["a", "c", "e"] {
            assert_eq!(find(&original, name), find(&reordered, name));
        }
    }

    #[test]
    fn test_huge_spacing_without_neighbours() {
        let atlas = SheetBuilder::new()
            .spacing(u32::MAX)
            .background(BACKGROUND)
            .build(&[solid("only", 10, 10, RED)])
            .unwrap();

        assert_eq!(atlas.image.dimensions(), (10, 10));
        assert_eq!((atlas.placements[0].x, atlas.placements[0].y), (0, 0));
        assert_eq!(*atlas.image.get_pixel(9, 9), RED);
    }

    #[test]
    fn test_packing_is_deterministic() {
        let builder = SheetBuilder::new().spacing(2).background(BACKGROUND);
        let first = builder.build(&mixed_layers()).unwrap();
        let second = pack(&mixed_layers(), &builder).unwrap();

        assert_eq!(first.image.as_raw(), second.image.as_raw());
        assert_eq!(first.placements, second.placements);
    }

    #[test]
    fn test_empty_input_fails_before_observer() {
        let mut calls = 0;
        let err = SheetBuilder::new()
            .build_with_observer(&[], &mut |_: usize, _: usize| calls += 1)
            .unwrap_err();

        assert!(matches!(err, SheetError::EmptyInput));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_zero_columns_rejected() {
        let err = SheetBuilder::new()
            .columns(Some(0))
            .build(&mixed_layers())
            .unwrap_err();
        assert!(matches!(err, SheetError::InvalidParameter { .. }));
    }

    #[test]
    fn test_observer_sees_every_layer_in_order() {
        let mut seen = Vec::new();
        SheetBuilder::new()
            .build_with_observer(&mixed_layers(), &mut |i: usize, total: usize| {
                seen.push((i, total))
            })
            .unwrap();

        assert_eq!(seen, (0..5).map(|i| (i, 5)).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_sized_layer_is_legal() {
        let layers = vec![
            Layer::new("empty", RgbaImage::new(0, 0)),
            solid("r", 4, 2, RED),
        ];
        let atlas = SheetBuilder::new()
            .columns(Some(2))
            .background(BACKGROUND)
            .build(&layers)
            .unwrap();

        assert_eq!(atlas.image.dimensions(), (8, 2));
        assert_eq!(atlas.placements[0].rect(), Rect::new(2, 1, 0, 0));
        assert!((0..4).all(|x| *atlas.image.get_pixel(x, 0) == BACKGROUND));
    }

    #[test]
    fn test_source_layers_not_modified() {
        let layers = mixed_layers();
        let before: Vec<_> = layers.iter().map(|l| l.image.clone()).collect();
        SheetBuilder::new().build(&layers).unwrap();
        for (layer, image) in layers.iter().zip(before) {
            assert_eq!(layer.image, image);
        }
    }
}
