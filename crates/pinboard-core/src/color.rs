//! Hex color helpers.

use crate::ids::RandomSource;
use peniko::Color;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A random opaque color as `#RRGGBB`.
pub fn random_hex_color(rng: &mut dyn RandomSource) -> String {
    let mut color = String::with_capacity(7);
    color.push('#');
    for _ in 0..6 {
        let idx = ((rng.next_f64() * 16.0) as usize).min(15);
        color.push(HEX_DIGITS[idx] as char);
    }
    color
}

/// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA` or `transparent`.
pub fn parse_hex(value: &str) -> Option<Color> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("transparent") {
        return Some(Color::from_rgba8(0, 0, 0, 0));
    }
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
        }
        6 => Some(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            255,
        )),
        8 => Some(Color::from_rgba8(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => None,
    }
}

/// Format a color as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
pub fn to_hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    if rgba.a == 255 {
        format!("#{:02X}{:02X}{:02X}", rgba.r, rgba.g, rgba.b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", rgba.r, rgba.g, rgba.b, rgba.a)
    }
}
