//! Screen coordinate model
//!
//! Points, rectangles, resolutions and color keys shared by the engine
//! capability and the detection stages.

pub mod geometry;

use std::fmt;
use std::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Serialize};

pub use geometry::WindowGeometry;

/// A screen point.
///
/// The engine reports "nothing here" as `(-1, -1)`; that value is also the
/// default, so an unset button position reads as "no actionable location".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The engine's "not found" point
    pub const SENTINEL: Point = Point { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether either coordinate carries the `-1` marker
    pub fn is_sentinel(&self) -> bool {
        self.x == -1 || self.y == -1
    }

    /// Translate by a fixed offset
    pub fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::SENTINEL
    }
}

/// Rectangle in absolute screen coordinates, `(left, top, right, bottom)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A rect with a negative component is the engine's "window not found"
    /// marker; an inverted rect is not a window either.
    pub fn is_valid(&self) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right >= 0
            && self.bottom >= 0
            && self.right >= self.left
            && self.bottom >= self.top
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Resolution of a valid rect
    pub fn resolution(&self) -> Option<Resolution> {
        self.is_valid()
            .then(|| Resolution::new(self.width(), self.height()))
    }
}

/// Window size in pixels, `(width, height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

impl Resolution {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The whole window, `(0, 0)` to `(width, height)`
    pub fn full_region(&self) -> ScreenRect {
        ScreenRect::new(0, 0, self.width, self.height)
    }
}

/// An exact RGB color key, written as six hex digits (`"0000FF"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub Rgb<u8>);

impl HexColor {
    pub const BLUE: HexColor = HexColor::rgb(0x00, 0x00, 0xFF);
    pub const GREEN: HexColor = HexColor::rgb(0x00, 0xFF, 0x00);
    pub const CYAN: HexColor = HexColor::rgb(0x00, 0xFF, 0xFF);
    pub const YELLOW: HexColor = HexColor::rgb(0xFF, 0xFF, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgb([r, g, b]))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0 .0;
        write!(f, "{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('#');
        if s.len() != 6 || !s.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(HexColor::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Binarization mask: pixels matching any listed color survive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorMask(pub Vec<HexColor>);

impl ColorMask {
    pub fn single(color: HexColor) -> Self {
        Self(vec![color])
    }

    pub fn contains(&self, color: Rgb<u8>) -> bool {
        self.0.iter().any(|c| c.0 == color)
    }
}

impl fmt::Display for ColorMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(HexColor::to_string).collect();
        f.write_str(&parts.join("|"))
    }
}

impl FromStr for ColorMask {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let colors = s
            .split('|')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if colors.is_empty() {
            return Err(ColorParseError(s.to_string()));
        }
        Ok(Self(colors))
    }
}

impl TryFrom<String> for ColorMask {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorMask> for String {
    fn from(mask: ColorMask) -> Self {
        mask.to_string()
    }
}

/// A color literal that is not six hex digits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color literal: {0:?}")]
pub struct ColorParseError(pub String);
