//! Auto-battle detection
//!
//! The auto-battle banner sits in the lower half of a strip along the
//! window's right edge. A bitmap match is tried first; when it misses, the
//! banner text is looked up through the glyph recognizer.

use std::path::Path;

use super::{degrade, Detection};
use crate::config::settings::BattleSettings;
use crate::engine::{AutomationEngine, EngineError, GlyphLibrary};
use crate::screen::geometry::battle_region;
use crate::screen::{Point, Resolution};

/// What showed the auto-battle banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleEvidence {
    /// The banner bitmap matched at this point
    Banner(Point),
    /// The banner text was recognized at this point
    Label(Point),
}

/// Detect whether the client is in an automated battle
pub fn detect_battle<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    resolution: Resolution,
    settings: &BattleSettings,
    template: &Path,
) -> Detection<BattleEvidence> {
    let banner = degrade("Battle banner match", match_banner(engine, resolution, settings, template));
    if let Detection::Found(point) = banner {
        return Detection::Found(BattleEvidence::Banner(point));
    }

    degrade("Battle label text", find_label(engine, resolution, settings))
        .map(BattleEvidence::Label)
}

fn match_banner<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    resolution: Resolution,
    settings: &BattleSettings,
    template: &Path,
) -> Result<Detection<Point>, EngineError> {
    let hit = engine.match_template_image(battle_region(resolution), template, settings.similarity)?;
    Ok(hit.filter(|point| !point.is_sentinel()).into())
}

fn find_label<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    resolution: Resolution,
    settings: &BattleSettings,
) -> Result<Detection<Point>, EngineError> {
    engine.capture_pixels(battle_region(resolution))?;
    engine.select_glyph_library(GlyphLibrary::BattleLabel)?;
    engine.apply_color_mask(&settings.mask)?;
    engine.segment_characters(settings.segmentation)?;
    engine.extract_character_data()?;
    let hit = engine.recognize_text(&settings.label, settings.confidence)?;
    Ok(hit.filter(|point| !point.is_sentinel()).into())
}
