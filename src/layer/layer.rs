use image::RgbaImage;

/// One raster layer to be placed on the spritesheet.
///
/// The pixel buffer defines the layer size, so width and height always agree
/// with the pixel data.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Display name (layer name, file name or frame label)
    pub name: String,
    /// Straight-alpha RGBA pixels
    pub image: RgbaImage,
}

impl Layer {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
