use clap::ValueEnum;
use image::{RgbaImage, imageops};

/// How layer pixels are written into their cell
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PasteMode {
    /// Use the layer's alpha as a paste mask: opaque pixels replace the
    /// background, transparent pixels leave it untouched
    #[default]
    #[value(name = "masked")]
    Masked,
    /// Copy layer pixels verbatim, alpha included
    #[value(name = "replace")]
    Replace,
    /// Alpha-composite the layer over the background
    #[value(name = "over")]
    Over,
}

/// Write `layer` into `canvas` with its top-left corner at (x, y).
///
/// Pixels falling outside the canvas are ignored.
pub fn paste_layer(canvas: &mut RgbaImage, layer: &RgbaImage, x: u32, y: u32, mode: PasteMode) {
    match mode {
        PasteMode::Masked => paste_masked(canvas, layer, x, y),
        PasteMode::Replace => imageops::replace(canvas, layer, i64::from(x), i64::from(y)),
        PasteMode::Over => imageops::overlay(canvas, layer, i64::from(x), i64::from(y)),
    }
}

fn paste_masked(canvas: &mut RgbaImage, layer: &RgbaImage, x: u32, y: u32) {
    for (sx, sy, src) in layer.enumerate_pixels() {
        let mask = src[3];
        if mask == 0 {
            continue;
        }
        let Some(dst) = canvas.get_pixel_mut_checked(x + sx, y + sy) else {
            continue;
        };
        if mask == u8::MAX {
            *dst = *src;
            continue;
        }
        for (d, &s) in dst.0.iter_mut().zip(src.0.iter()) {
            *d = mask_blend(s, *d, mask);
        }
    }
}

/// Interpolate between `dst` and `src` by `mask / 255`, rounding to nearest
fn mask_blend(src: u8, dst: u8, mask: u8) -> u8 {
    let mask = u32::from(mask);
    let value = (u32::from(src) * mask + u32::from(dst) * (255 - mask) + 127) / 255;
    u8::try_from(value).unwrap_or(u8::MAX)
}
