use floodmap_shared::PathStyle;

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Parse `#rgb` or `#rrggbb`.
pub fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').filter(|d| d.is_ascii())?;
    match digits.len() {
        6 => {
            let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
            let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
            let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(digits.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some((out[0], out[1], out[2]))
        }
        _ => None,
    }
}

fn with_alpha(hex: &str, alpha: f64) -> String {
    let (r, g, b) = hex_rgb(hex).unwrap_or((0, 0, 0));
    rgba_css(r, g, b, alpha.clamp(0.0, 1.0))
}

pub fn fill_css(style: &PathStyle) -> String {
    with_alpha(style.fill_color, style.fill_opacity)
}

pub fn stroke_css(style: &PathStyle) -> String {
    with_alpha(style.color, style.opacity)
}
