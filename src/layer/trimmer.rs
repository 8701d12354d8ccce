use image::RgbaImage;

use crate::packing::Rect;

/// Bounding box of the non-transparent pixels, or `None` if there are none
pub fn content_bounds(image: &RgbaImage) -> Option<Rect> {
    let (width, height) = image.dimensions();

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crop transparent borders away.
///
/// A fully transparent image becomes 0x0, which still packs as an empty cell.
pub fn trim_layer(image: &RgbaImage) -> RgbaImage {
    match content_bounds(image) {
        Some(bounds) if bounds.width == image.width() && bounds.height == image.height() => {
            image.clone()
        }
        Some(bounds) => {
            image::imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height)
                .to_image()
        }
        None => RgbaImage::new(0, 0),
    }
}
