mod grid;
mod paste;
mod rect;

pub use grid::{Grid, auto_columns};
pub use paste::{PasteMode, paste_layer};
pub use rect::Rect;
