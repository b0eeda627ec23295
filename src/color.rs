// Color conversions between `#RRGGBB` strings and normalized rgb vectors.
//
// The lenient helpers (`hex_to_base10`, `hex_to_vec3`) never fail: malformed input
// produces NaN channels. Validation paths use `parse_hex_color` instead.

use serde::{Deserialize, Serialize};

/// Normalized color, one channel per component in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub [f64; 3]);

impl Rgb {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Rgb([r, g, b])
    }

    pub fn r(&self) -> f64 { self.0[0] }
    pub fn g(&self) -> f64 { self.0[1] }
    pub fn b(&self) -> f64 { self.0[2] }

    pub fn to_hex(&self) -> String {
        vec3_to_hex(*self)
    }

    /// 8-bit channels, saturating.
    pub fn to_bytes(&self) -> [u8; 3] {
        self.0.map(channel_to_byte)
    }
}

impl From<[f64; 3]> for Rgb {
    fn from(v: [f64; 3]) -> Self {
        Rgb(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color must start with '#'")]
    MissingHash,
    #[error("expected 6 hex digits, got {0} characters")]
    InvalidLength(usize),
    #[error("invalid hex digit in {0:?}")]
    InvalidHex(String),
}

/// Either representation a color store can be configured with.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorInput {
    Hex(String),
    Vec3(Rgb),
}

impl ColorInput {
    pub fn to_rgb(&self) -> Rgb {
        match self {
            ColorInput::Hex(hex) => hex_to_vec3(hex),
            ColorInput::Vec3(rgb) => *rgb,
        }
    }
}

impl From<&str> for ColorInput {
    fn from(hex: &str) -> Self {
        ColorInput::Hex(hex.to_string())
    }
}

impl From<String> for ColorInput {
    fn from(hex: String) -> Self {
        ColorInput::Hex(hex)
    }
}

impl From<Rgb> for ColorInput {
    fn from(rgb: Rgb) -> Self {
        ColorInput::Vec3(rgb)
    }
}

impl From<[f64; 3]> for ColorInput {
    fn from(v: [f64; 3]) -> Self {
        ColorInput::Vec3(Rgb(v))
    }
}

/// Parses a run of hex digits and scales it by 1/255. NaN when unparseable.
pub fn hex_to_base10(h: &str) -> f64 {
    u32::from_str_radix(h, 16)
        .map(|v| v as f64 / 255.0)
        .unwrap_or(f64::NAN)
}

/// `#RRGGBB` to normalized channels. Characters past index 7 are ignored and
/// missing or non-hex pairs become NaN.
pub fn hex_to_vec3(h: &str) -> Rgb {
    let pair = |range: std::ops::Range<usize>| h.get(range).map(hex_to_base10).unwrap_or(f64::NAN);
    Rgb([pair(1..3), pair(3..5), pair(5..7)])
}

/// Normalized channels to lowercase `#rrggbb`.
pub fn vec3_to_hex(rgb: Rgb) -> String {
    let [r, g, b] = rgb.to_bytes();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Strict `#` + six hex digits, either case.
pub fn parse_hex_color(s: &str) -> Result<Rgb, ColorError> {
    let digits = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;
    if digits.len() != 6 {
        return Err(ColorError::InvalidLength(digits.chars().count()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(s.to_string()));
    }
    Ok(hex_to_vec3(s))
}

// `as u8` saturates, so out-of-range channels clamp and NaN becomes 0.
fn channel_to_byte(x: f64) -> u8 {
    (x * 255.0).round() as u8
}
