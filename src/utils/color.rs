// magick/src/utils/color.rs
//! Color strings: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` and a table of names.

use crate::core::{MagickError, Result};
use image::Rgba;

pub fn parse_color(spec: &str) -> Result<Rgba<u8>> {
    let s = spec.trim();
    if s.is_empty() {
        return Err(MagickError::Parse("Empty color".to_string()));
    }

    let parsed = match s.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => lookup_named(s),
    };

    parsed.ok_or_else(|| MagickError::Parse(format!("Unrecognized color: {:?}", spec)))
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let nibbles: Vec<u8> = hex.bytes().filter_map(hex_val).collect();
    match nibbles[..] {
        [r, g, b] => Some(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Some(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r0, g1, g0, b1, b0] => Some(Rgba([r1 << 4 | r0, g1 << 4 | g0, b1 << 4 | b0, 255])),
        [r1, r0, g1, g0, b1, b0, a1, a0] => Some(Rgba([
            r1 << 4 | r0,
            g1 << 4 | g0,
            b1 << 4 | b0,
            a1 << 4 | a0,
        ])),
        _ => None,
    }
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn lookup_named(name: &str) -> Option<Rgba<u8>> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by_key(&lower.as_str(), |&(n, _)| n)
        .ok()
        .map(|idx| Rgba(NAMED_COLORS[idx].1))
}

/// Sorted for binary search.
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("brown", [165, 42, 42, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("gold", [255, 215, 0, 255]),
    ("gray", [190, 190, 190, 255]),
    ("green", [0, 128, 0, 255]),
    ("grey", [190, 190, 190, 255]),
    ("lime", [0, 255, 0, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("none", [0, 0, 0, 0]),
    ("olive", [128, 128, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("pink", [255, 192, 203, 255]),
    ("purple", [128, 0, 128, 255]),
    ("red", [255, 0, 0, 255]),
    ("silver", [192, 192, 192, 255]),
    ("teal", [0, 128, 128, 255]),
    ("transparent", [0, 0, 0, 0]),
    ("white", [255, 255, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
];
