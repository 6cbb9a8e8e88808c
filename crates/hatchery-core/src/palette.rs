//! Deterministic palette derivation.
//!
//! The base hue is a pure function of `(profile_id, score, grid_size)`;
//! the three foreground colors sit at fixed rotations (+40°, +80°) and the
//! background is a dark variant of the base hue. HSL→RGB uses the standard
//! piecewise hue-sector formula with channels truncated toward zero and
//! emitted as two-digit lowercase hex, so every observer prints the same
//! bytes.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub base_hue: u32,
    /// `[base, base+40°, base+80°]`, saturation 70%, lightness 55%.
    pub colors: [String; 3],
    /// Same hue, saturation 30%, lightness 12%.
    pub background: String,
}

pub fn derive(profile_id: u64, score: u64, grid_size: u32) -> Palette {
    let base_hue = ((profile_id.wrapping_mul(37))
        .wrapping_add(score.wrapping_mul(13))
        .wrapping_add(u64::from(grid_size).wrapping_mul(7))
        % 360) as u32;
    Palette {
        base_hue,
        colors: [
            hsl_to_hex(base_hue % 360, 0.70, 0.55),
            hsl_to_hex((base_hue + 40) % 360, 0.70, 0.55),
            hsl_to_hex((base_hue + 80) % 360, 0.70, 0.55),
        ],
        background: hsl_to_hex(base_hue % 360, 0.30, 0.12),
    }
}

/// Standard hue-sector conversion. `h` in degrees, `s`/`l` in `[0, 1]`.
pub fn hsl_to_hex(h: u32, s: f64, l: f64) -> String {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = f64::from(h % 360) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    // Truncation, not rounding: matches the reference renderer byte-for-byte.
    let r = ((r1 + m) * 255.0) as u8;
    let g = ((g1 + m) * 255.0) as u8;
    let b = ((b1 + m) * 255.0) as u8;
    format!("#{r:02x}{g:02x}{b:02x}")
}
