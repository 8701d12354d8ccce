pub mod atlas;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod layer;
pub mod output;
pub mod packing;

pub use atlas::{Atlas, PlacedLayer, PlacementObserver, SheetBuilder, pack};
pub use error::SheetError;
pub use layer::{Layer, LayerSource, SourceKind};
pub use packing::{Grid, PasteMode};
