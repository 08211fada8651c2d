use crate::foundation::core::Rgba8;

/// Parse a CSS-style color string.
///
/// Accepted forms: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)` (alpha in
/// `[0, 1]`), and the common CSS named colors.
pub fn parse_color(s: &str) -> Option<Rgba8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    named_color(&lower)
}

/// Parse a color, falling back to black for unrecognized input (a 2D canvas keeps its default
/// fill in that case).
pub(crate) fn resolve_color(s: &str, field: &str) -> Rgba8 {
    match parse_color(s) {
        Some(c) => c,
        None => {
            tracing::warn!(field, value = s, "unrecognized color, using black");
            Rgba8::BLACK
        }
    }
}

fn parse_hex(s: &str) -> Option<Rgba8> {
    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }
    fn byte(pair: &[u8]) -> Option<u8> {
        Some(nibble(pair[0])? * 16 + nibble(pair[1])?)
    }

    let b = s.as_bytes();
    match b.len() {
        3 => {
            let r = nibble(b[0])?;
            let g = nibble(b[1])?;
            let bl = nibble(b[2])?;
            Some(Rgba8::opaque(r * 17, g * 17, bl * 17))
        }
        6 => Some(Rgba8::opaque(byte(&b[0..2])?, byte(&b[2..4])?, byte(&b[4..6])?)),
        8 => Some(Rgba8 {
            r: byte(&b[0..2])?,
            g: byte(&b[2..4])?,
            b: byte(&b[4..6])?,
            a: byte(&b[6..8])?,
        }),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba8> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        let v: f64 = p.parse().ok()?;
        v.is_finite().then(|| v.clamp(0.0, 255.0).round() as u8)
    };
    let a = match parts.get(3) {
        Some(p) => {
            let v: f64 = p.parse().ok()?;
            if !v.is_finite() {
                return None;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Rgba8 {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}

fn named_color(name: &str) -> Option<Rgba8> {
    let c = match name {
        "transparent" => return Some(Rgba8::TRANSPARENT),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "purple" => (128, 0, 128),
        "orange" => (255, 165, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gold" => (255, 215, 0),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "coral" => (255, 127, 80),
        "salmon" => (250, 128, 114),
        "tomato" => (255, 99, 71),
        "skyblue" => (135, 206, 235),
        "lightblue" => (173, 216, 230),
        "steelblue" => (70, 130, 180),
        "darkblue" => (0, 0, 139),
        "darkgreen" => (0, 100, 0),
        "lightgreen" => (144, 238, 144),
        "darkred" => (139, 0, 0),
        "beige" => (245, 245, 220),
        "tan" => (210, 180, 140),
        "khaki" => (240, 230, 140),
        "crimson" => (220, 20, 60),
        "turquoise" => (64, 224, 208),
        _ => return None,
    };
    Some(Rgba8::opaque(c.0, c.1, c.2))
}

#[cfg(test)]
#[path = "../../tests/unit/document/color.rs"]
mod tests;
