//! Length and color parsing with fixed unit-system constants.

use regex::Regex;
use std::sync::OnceLock;

/// CSS pixels per inch.
pub const PX_PER_INCH: f64 = 96.0;
/// Points per inch.
pub const PT_PER_INCH: f64 = 72.0;
/// Twentieths of a point per inch (word-processor measurement unit).
pub const TWIPS_PER_INCH: f64 = 1440.0;
/// Fixed font-size base for `em`/`rem` and keyword sizes, in pixels.
pub const BASE_FONT_PX: f64 = 16.0;

/// Length unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Px,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
    Em,
    Rem,
    Percent,
    /// Unitless number
    None,
}

/// A parsed CSS length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    /// Numeric part
    pub value: f64,
    /// Unit part
    pub unit: Unit,
}

fn length_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(-?(?:\d+\.?\d*|\.\d+))\s*(px|pt|pc|in|cm|mm|em|rem|%)?$").unwrap()
    })
}

impl Length {
    /// Parse a length such as `12px`, `1.5em`, `50%` or `0`.
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_ascii_lowercase();
        let caps = length_regex().captures(&lower)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let unit = match caps.get(2).map(|m| m.as_str()) {
            Some("px") => Unit::Px,
            Some("pt") => Unit::Pt,
            Some("pc") => Unit::Pc,
            Some("in") => Unit::In,
            Some("cm") => Unit::Cm,
            Some("mm") => Unit::Mm,
            Some("em") => Unit::Em,
            Some("rem") => Unit::Rem,
            Some("%") => Unit::Percent,
            _ => Unit::None,
        };
        Some(Self { value, unit })
    }

    /// Parse a border width, accepting the `thin`/`medium`/`thick` keywords.
    pub fn parse_border_width(input: &str) -> Option<Self> {
        let px = match input.trim().to_ascii_lowercase().as_str() {
            "thin" => 1.0,
            "medium" => 3.0,
            "thick" => 5.0,
            _ => return Self::parse(input),
        };
        Some(Self {
            value: px,
            unit: Unit::Px,
        })
    }

    /// Parse a font size, accepting absolute-size keywords.
    pub fn parse_font_size(input: &str) -> Option<Self> {
        let px = match input.trim().to_ascii_lowercase().as_str() {
            "xx-small" => 9.0,
            "x-small" => 10.0,
            "small" => 13.0,
            "medium" => 16.0,
            "large" => 18.0,
            "x-large" => 24.0,
            "xx-large" => 32.0,
            _ => return Self::parse(input),
        };
        Some(Self {
            value: px,
            unit: Unit::Px,
        })
    }

    /// Check if this length is a percentage.
    pub fn is_percent(&self) -> bool {
        self.unit == Unit::Percent
    }

    /// Convert to inches. Percentages have no absolute size; unitless numbers count as pixels.
    pub fn to_inches(&self) -> Option<f64> {
        let inches = match self.unit {
            Unit::Px | Unit::None => self.value / PX_PER_INCH,
            Unit::Pt => self.value / PT_PER_INCH,
            Unit::Pc => self.value * 12.0 / PT_PER_INCH,
            Unit::In => self.value,
            Unit::Cm => self.value / 2.54,
            Unit::Mm => self.value / 25.4,
            Unit::Em | Unit::Rem => self.value * BASE_FONT_PX / PX_PER_INCH,
            Unit::Percent => return None,
        };
        Some(inches)
    }

    /// Convert to CSS pixels.
    pub fn to_px(&self) -> Option<f64> {
        self.to_inches().map(|i| i * PX_PER_INCH)
    }

    /// Convert to points.
    pub fn to_points(&self) -> Option<f64> {
        self.to_inches().map(|i| i * PT_PER_INCH)
    }

    /// Convert to twips (1/20 pt), rounded.
    pub fn to_twips(&self) -> Option<i64> {
        self.to_inches().map(|i| (i * TWIPS_PER_INCH).round() as i64)
    }

    /// Convert to half-points, rounded (word-processor font sizes).
    pub fn to_half_points(&self) -> Option<i64> {
        self.to_points().map(|pt| (pt * 2.0).round() as i64)
    }

    /// Convert to eighths of a point, rounded (word-processor border widths).
    pub fn to_eighth_points(&self) -> Option<i64> {
        self.to_points().map(|pt| (pt * 8.0).round() as i64)
    }
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb(0, 0, 0)),
    ("silver", Rgb(192, 192, 192)),
    ("gray", Rgb(128, 128, 128)),
    ("grey", Rgb(128, 128, 128)),
    ("white", Rgb(255, 255, 255)),
    ("maroon", Rgb(128, 0, 0)),
    ("red", Rgb(255, 0, 0)),
    ("purple", Rgb(128, 0, 128)),
    ("fuchsia", Rgb(255, 0, 255)),
    ("green", Rgb(0, 128, 0)),
    ("lime", Rgb(0, 255, 0)),
    ("olive", Rgb(128, 128, 0)),
    ("yellow", Rgb(255, 255, 0)),
    ("navy", Rgb(0, 0, 128)),
    ("blue", Rgb(0, 0, 255)),
    ("teal", Rgb(0, 128, 128)),
    ("aqua", Rgb(0, 255, 255)),
    ("orange", Rgb(255, 165, 0)),
];

fn rgb_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*[\d.]+\s*)?\)$")
            .unwrap()
    })
}

impl Rgb {
    /// Parse `#rgb`, `#rrggbb`, `rgb()`/`rgba()` or a basic named color.
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_ascii_lowercase();
        if let Some(hex) = lower.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(caps) = rgb_regex().captures(&lower) {
            let channel = |i: usize| -> Option<u8> {
                caps.get(i)?
                    .as_str()
                    .parse::<u16>()
                    .ok()
                    .map(|v| v.min(255) as u8)
            };
            return Some(Rgb(channel(1)?, channel(2)?, channel(3)?));
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgb)| *rgb)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Rgb(pair(0)?, pair(2)?, pair(4)?))
            }
            _ => None,
        }
    }

    /// Upper-case hex without `#` (e.g. `FF0000`).
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Lower-case CSS hex with `#` (e.g. `#ff0000`).
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}
