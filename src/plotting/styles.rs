use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of intensity tiers, and so colours, in every palette.
pub const PALETTE_SIZE: usize = 5;

/// An opaque sRGB colour, serialized as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').filter(|d| d.is_ascii())?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..=i].repeat(2));
                Some(Self(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Some(Self(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid colour {:?}", value))
    }
}

impl From<Color> for plotters::style::RGBColor {
    fn from(color: Color) -> Self {
        plotters::style::RGBColor(color.0, color.1, color.2)
    }
}

/// Colours for buckets 0 through 4, lightest activity first.
pub type Palette = [Color; PALETTE_SIZE];

pub const LIGHT: Palette = [
    Color::rgb(0xeb, 0xed, 0xf0),
    Color::rgb(0x9b, 0xe9, 0xa8),
    Color::rgb(0x40, 0xc4, 0x63),
    Color::rgb(0x30, 0xa1, 0x4e),
    Color::rgb(0x21, 0x6e, 0x39),
];

pub const DARK: Palette = [
    Color::rgb(0x16, 0x1b, 0x22),
    Color::rgb(0x0e, 0x44, 0x29),
    Color::rgb(0x00, 0x6d, 0x32),
    Color::rgb(0x26, 0xa6, 0x41),
    Color::rgb(0x39, 0xd3, 0x53),
];

pub const NEON: Palette = [
    Color::rgb(0x00, 0xff, 0xff),
    Color::rgb(0x00, 0xff, 0x00),
    Color::rgb(0xff, 0xff, 0x00),
    Color::rgb(0xff, 0x00, 0xff),
    Color::rgb(0xff, 0x00, 0x00),
];

pub const MATRIX: Palette = [
    Color::rgb(0x00, 0x11, 0x00),
    Color::rgb(0x00, 0x33, 0x00),
    Color::rgb(0x00, 0x66, 0x00),
    Color::rgb(0x00, 0xcc, 0x00),
    Color::rgb(0x00, 0xff, 0x00),
];

/// Named palettes available to the renderer.
///
/// Lookups by an unknown name resolve to the table's default palette.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteTable {
    palettes: BTreeMap<String, Palette>,
    default: String,
}

impl PaletteTable {
    pub fn new(default_name: &str, default_palette: Palette) -> Self {
        let mut palettes = BTreeMap::new();
        palettes.insert(default_name.to_string(), default_palette);
        Self {
            palettes,
            default: default_name.to_string(),
        }
    }

    pub fn with_palette(mut self, name: &str, palette: Palette) -> Self {
        self.palettes.insert(name.to_string(), palette);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.palettes.contains_key(name)
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    /// Resolve `name`, returning the name actually used and its colours.
    pub fn resolve<'a>(&'a self, name: &'a str) -> (&'a str, &'a Palette) {
        match self.palettes.get(name) {
            Some(palette) => (name, palette),
            None => (&self.default, &self.palettes[&self.default]),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        Self::new("light", LIGHT)
            .with_palette("dark", DARK)
            .with_palette("neon", NEON)
            .with_palette("matrix", MATRIX)
    }
}

/// Text colours of the heatmap chrome
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatmapTheme {
    pub text_color: Color,
    pub label_color: Color,
}

impl Default for HeatmapTheme {
    fn default() -> Self {
        Self {
            text_color: Color::rgb(0x33, 0x33, 0x33),
            label_color: Color::rgb(0x66, 0x66, 0x66),
        }
    }
}

/// Fixed grid geometry
pub struct GridStyle;

impl GridStyle {
    pub const WEEKS: u32 = 53;
    pub const DAYS: u32 = 7;
    pub const CORNER_RADIUS: f64 = 2.0;
    pub const LEGEND_HEIGHT: f64 = 40.0;
    pub const FOOTER_HEIGHT: f64 = 20.0;
}
