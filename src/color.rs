use image::Rgba;

use crate::error::SheetError;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Parse a background color: `transparent`, `#RRGGBB` or `#RRGGBBAA`.
///
/// The leading `#` is optional. Six-digit colors are fully opaque.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, SheetError> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("transparent") {
        return Ok(TRANSPARENT);
    }

    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SheetError::InvalidColor(s.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_e| SheetError::InvalidColor(s.to_string()))
    };

    let alpha = if hex.len() == 8 { channel(3)? } else { u8::MAX };
    Ok(Rgba([channel(0)?, channel(1)?, channel(2)?, alpha]))
}

/// Inverse of [`parse_color`], used when writing config files
pub fn format_color(color: Rgba<u8>) -> String {
    if color == TRANSPARENT {
        return "transparent".to_string();
    }
    let [r, g, b, a] = color.0;
    if a == u8::MAX {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}
