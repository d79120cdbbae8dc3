//! Window geometry and calibrated screen regions
//!
//! Every offset in this module is tuned to one known client layout. They
//! are fixed pixel distances from the window's right edge (or from a
//! recognized glyph), not anchors that adapt to a different layout.

use serde::{Deserialize, Serialize};

use super::{Point, Resolution, ScreenRect};

/// Width of the top-right vitals panel captured for bar scanning
pub const VITALS_PANEL_WIDTH: i32 = 203;
/// Height of the top-right vitals panel
pub const VITALS_PANEL_HEIGHT: i32 = 51;
/// Width of the strip along the right edge searched for the battle banner
pub const BATTLE_STRIP_WIDTH: i32 = 200;

/// Geometry of a located game window and the button hot-spots derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// Absolute bounding box
    pub rect: ScreenRect,
    /// Size of the bounding box
    pub resolution: Resolution,
    /// Hot-spot on the hp bar
    pub hp_button: Point,
    /// Hot-spot on the mp bar
    pub mp_button: Point,
    /// Hot-spot on the player hp bar
    pub player_hp_button: Point,
    /// Hot-spot on the player mp bar
    pub player_mp_button: Point,
}

impl WindowGeometry {
    /// Derive geometry from a window's bounding box.
    ///
    /// Returns `None` for the engine's negative "no window" rect.
    pub fn from_rect(rect: ScreenRect) -> Option<Self> {
        let resolution = rect.resolution()?;
        let width = resolution.width;
        Some(Self {
            rect,
            resolution,
            hp_button: Point::new(width - 40, 23),
            mp_button: Point::new(width - 40, 40),
            player_hp_button: Point::new(width - 160, 17),
            player_mp_button: Point::new(width - 160, 30),
        })
    }
}

/// Region searched for the auto-battle banner: the lower half of a strip
/// along the right edge of the window.
pub fn battle_region(resolution: Resolution) -> ScreenRect {
    ScreenRect::new(
        resolution.width - BATTLE_STRIP_WIDTH,
        resolution.height / 2,
        resolution.width,
        resolution.height,
    )
}

/// Top-right panel holding the four vital bars
pub fn vitals_region(resolution: Resolution) -> ScreenRect {
    ScreenRect::new(
        resolution.width - VITALS_PANEL_WIDTH,
        0,
        resolution.width,
        VITALS_PANEL_HEIGHT,
    )
}

/// Rectangle holding the remaining-rounds number, above and left of the
/// recognized label glyph.
pub fn round_count_region(glyph: Point) -> ScreenRect {
    ScreenRect::new(glyph.x - 45, glyph.y - 60, glyph.x + 25, glyph.y - 30)
}

/// Click target for adding auto rounds, relative to the label glyph
pub fn add_rounds_button(glyph: Point) -> Point {
    glyph.offset(4, 10)
}
