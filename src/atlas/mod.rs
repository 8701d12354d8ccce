mod builder;
mod types;

pub use builder::{PlacementObserver, SheetBuilder, pack};
pub use types::{Atlas, PlacedLayer};
