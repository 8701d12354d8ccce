mod format;
mod json;
mod tpsheet;

pub use format::save_atlas_image;
pub use json::write_json;
pub use tpsheet::write_tpsheet;

/// File name of the spritesheet image for `base_name`
pub fn sheet_png_filename(base_name: &str) -> String {
    format!("{}.png", base_name)
}
