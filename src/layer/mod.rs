mod aseprite;
mod files;
mod gif;
mod layer;
mod source;
mod trimmer;

pub use aseprite::AsepriteSource;
pub use files::ImageFileSource;
pub use gif::GifFrameSource;
pub use layer::Layer;
pub use source::{LayerSource, SourceKind, SourceOptions, open_source};
pub use trimmer::{content_bounds, trim_layer};
