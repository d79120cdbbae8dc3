//! Vital bar scanning
//!
//! The top-right panel holds four one-pixel-high bands: hp and mp for the
//! right-hand bars, player hp and mp for the left-hand ones. After
//! posterizing the panel, each band is sampled column by column from its
//! right end. Bars deplete from the right, so the first column showing the
//! fill color is the current fill edge.

use serde::{Deserialize, Serialize};

use super::{degrade, Detection};
use crate::config::settings::VitalSettings;
use crate::engine::{AutomationEngine, EngineError};
use crate::game::VitalReading;
use crate::screen::geometry::{vitals_region, VITALS_PANEL_WIDTH};
use crate::screen::{HexColor, Resolution, ScreenRect};

/// Hp band, in panel coordinates
pub const HP_BAND: ScreenRect =
    ScreenRect::new(VITALS_PANEL_WIDTH - 81, 24, VITALS_PANEL_WIDTH - 4, 24);
/// Mp band
pub const MP_BAND: ScreenRect =
    ScreenRect::new(VITALS_PANEL_WIDTH - 81, 35, VITALS_PANEL_WIDTH - 4, 35);
/// Player hp band
pub const PLAYER_HP_BAND: ScreenRect =
    ScreenRect::new(VITALS_PANEL_WIDTH - 201, 14, VITALS_PANEL_WIDTH - 139, 14);
/// Player mp band
pub const PLAYER_MP_BAND: ScreenRect =
    ScreenRect::new(VITALS_PANEL_WIDTH - 201, 27, VITALS_PANEL_WIDTH - 139, 27);

/// The four vital readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: VitalReading,
    pub mp: VitalReading,
    pub player_hp: VitalReading,
    pub player_mp: VitalReading,
}

/// Capture the vitals panel and read all four bars.
///
/// Misses as a whole when the panel cannot be captured; a single band that
/// shows no fill reads as 0.
pub fn scan_vitals<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    resolution: Resolution,
    settings: &VitalSettings,
) -> Detection<Vitals> {
    degrade("Vitals panel", scan_panel(engine, resolution, settings))
}

fn scan_panel<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    resolution: Resolution,
    settings: &VitalSettings,
) -> Result<Detection<Vitals>, EngineError> {
    engine.capture_pixels(vitals_region(resolution))?;
    engine.posterize(settings.posterize_levels)?;

    let mut read = |band: ScreenRect, color: HexColor| {
        find_color_line(&mut *engine, band, color, settings.zoom).unwrap_or_default()
    };
    Ok(Detection::Found(Vitals {
        hp: read(HP_BAND, settings.hp_color),
        mp: read(MP_BAND, settings.mp_color),
        player_hp: read(PLAYER_HP_BAND, settings.hp_color),
        player_mp: read(PLAYER_MP_BAND, settings.mp_color),
    }))
}

/// Scan one band right to left for `color` and convert the first matching
/// column into a fill percentage.
pub fn find_color_line<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    band: ScreenRect,
    color: HexColor,
    zoom: u8,
) -> Detection<VitalReading> {
    degrade("Vital band", scan_band(engine, band, color, zoom))
}

fn scan_band<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    band: ScreenRect,
    color: HexColor,
    zoom: u8,
) -> Result<Detection<VitalReading>, EngineError> {
    for column in (band.left..=band.right).rev() {
        if engine.pixel_color(column, band.top, zoom)? == color.0 {
            return Ok(fill_percent(column, band).into());
        }
    }
    Ok(Detection::NotFound)
}

/// `floor((column - left) / (right - left) * 100)`; `None` for a zero-width band
pub fn fill_percent(column: i32, band: ScreenRect) -> Option<VitalReading> {
    let span = i64::from(band.right) - i64::from(band.left);
    if span <= 0 {
        return None;
    }
    let offset = i64::from(column) - i64::from(band.left);
    let percent = (offset * 100).div_euclid(span).clamp(0, 100);
    Some(VitalReading::new(percent as u8))
}
