use serde::Serialize;

use super::Rect;
use crate::error::SheetError;

/// Uniform cell grid derived from the sizes of the layers being packed.
///
/// Every cell is as wide as the widest layer and as tall as the tallest one,
/// so no layer is ever scaled or cropped. `spacing` pixels separate adjacent
/// cells but are not added around the outer edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub spacing: u32,
    /// Total canvas width, trailing spacing excluded
    pub width: u32,
    /// Total canvas height, trailing spacing excluded
    pub height: u32,
}

impl Grid {
    /// Compute the grid for layers of the given `(width, height)` sizes.
    ///
    /// Fails before anything is allocated when there are no layers, when an
    /// explicit column count is zero, or when the canvas would not fit in an
    /// image buffer.
    pub fn compute(
        sizes: &[(u32, u32)],
        columns: Option<u32>,
        spacing: u32,
    ) -> Result<Self, SheetError> {
        if sizes.is_empty() {
            return Err(SheetError::EmptyInput);
        }
        if columns == Some(0) {
            return Err(SheetError::InvalidParameter {
                name: "columns",
                reason: "must be at least 1".to_string(),
            });
        }

        let count = u32::try_from(sizes.len()).map_err(|_e| SheetError::InvalidParameter {
            name: "layers",
            reason: format!("too many layers ({})", sizes.len()),
        })?;

        let cell_width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);
        let cell_height = sizes.iter().map(|&(_, h)| h).max().unwrap_or(0);

        let columns = columns.unwrap_or_else(|| auto_columns(count));
        let rows = count.div_ceil(columns);

        let total_width = span(columns, cell_width, spacing);
        let total_height = span(rows, cell_height, spacing);

        let too_large = || SheetError::AtlasTooLarge {
            width: total_width,
            height: total_height,
        };

        let width = u32::try_from(total_width).map_err(|_e| too_large())?;
        let height = u32::try_from(total_height).map_err(|_e| too_large())?;

        // RGBA8 buffer length must be addressable
        total_width
            .checked_mul(total_height)
            .and_then(|px| px.checked_mul(4))
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(too_large)?;

        Ok(Self {
            columns,
            rows,
            cell_width,
            cell_height,
            spacing,
            width,
            height,
        })
    }

    /// Column and row of the cell at `index`, in row-major order
    pub fn cell_position(&self, index: u32) -> (u32, u32) {
        (index % self.columns, index / self.columns)
    }

    /// Bounds of the cell at `index`
    pub fn cell_rect(&self, index: u32) -> Rect {
        let (col, row) = self.cell_position(index);
        Rect::new(
            offset(col, self.cell_width, self.spacing),
            offset(row, self.cell_height, self.spacing),
            self.cell_width,
            self.cell_height,
        )
    }

    /// Where a `width` x `height` layer lands when centered in cell `index`.
    ///
    /// Odd leftovers put the extra pixel on the right/bottom side.
    pub fn place(&self, index: u32, width: u32, height: u32) -> Rect {
        let cell = self.cell_rect(index);
        let offset_x = self.cell_width.saturating_sub(width) / 2;
        let offset_y = self.cell_height.saturating_sub(height) / 2;
        Rect::new(cell.x + offset_x, cell.y + offset_y, width, height)
    }
}

/// Column count for `count` layers when none is given: `round(sqrt(count))`.
///
/// Rounds half up. Evaluated in integers: the result is `c` for
/// `c*(c-1) < count <= c*(c+1)`, so there is no float rounding to depend on.
pub fn auto_columns(count: u32) -> u32 {
    let root = count.isqrt();
    if u64::from(count) > u64::from(root) * (u64::from(root) + 1) {
        root + 1
    } else {
        root.max(1)
    }
}

fn span(cells: u32, cell_size: u32, spacing: u32) -> u64 {
    u64::from(cells) * (u64::from(cell_size) + u64::from(spacing)) - u64::from(spacing)
}

/// Leading edge of the cell `cells` steps from the origin.
///
/// `cell_size + spacing` may not fit in `u32` even when the canvas does (a
/// single row or column never pays the spacing). For cells inside the grid
/// the result is bounded by the canvas size.
fn offset(cells: u32, cell_size: u32, spacing: u32) -> u32 {
    let edge = u64::from(cells) * (u64::from(cell_size) + u64::from(spacing));
    u32::try_from(edge).unwrap_or(u32::MAX)
}
