//! Remaining auto-round extraction
//!
//! The auto-battle panel shows a label glyph with the remaining round count
//! printed above and to the left of it. The glyph is located first, then
//! the count is read from a fixed rectangle relative to it.

use serde::{Deserialize, Serialize};

use super::{degrade, Detection};
use crate::config::settings::RoundSettings;
use crate::engine::{AutomationEngine, EngineError, GlyphLibrary};
use crate::screen::geometry::{add_rounds_button, round_count_region};
use crate::screen::{Point, Resolution};

/// Remaining auto rounds and where to click to add more
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundCounter {
    pub remaining: u32,
    pub add_button: Point,
}

/// Read the remaining auto-round counter.
///
/// Misses whenever the panel is not on screen or the count is unreadable.
pub fn extract_rounds<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    resolution: Resolution,
    settings: &RoundSettings,
) -> Detection<RoundCounter> {
    degrade("Round counter", read_counter(engine, resolution, settings))
}

fn read_counter<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    resolution: Resolution,
    settings: &RoundSettings,
) -> Result<Detection<RoundCounter>, EngineError> {
    engine.capture_pixels(resolution.full_region())?;
    engine.apply_color_mask(&settings.mask)?;
    engine.segment_characters(settings.segmentation)?;
    engine.extract_character_data()?;
    engine.select_glyph_library(GlyphLibrary::RoundDigits)?;

    let Some(glyph) = engine
        .recognize_text(&settings.glyph, settings.confidence)?
        .filter(|point| !point.is_sentinel())
    else {
        return Ok(Detection::NotFound);
    };

    engine.crop(round_count_region(glyph))?;
    let text = engine.recognize_numeric_text()?;
    let Some(remaining) = parse_round_count(&text) else {
        log::debug!("Unreadable round count {:?} near {:?}", text, glyph);
        return Ok(Detection::NotFound);
    };

    Ok(Detection::Found(RoundCounter {
        remaining,
        add_button: add_rounds_button(glyph),
    }))
}

/// Parse the OCR reply of the count rectangle
fn parse_round_count(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use crate::screen::ScreenRect;

    const RESOLUTION: Resolution = Resolution::new(1024, 768);

    fn engine_with_glyph(glyph: Point, ocr: &str) -> FakeEngine {
        let mut engine = FakeEngine::new();
        engine.text_matches.insert("自".to_string(), glyph);
        engine.numeric_text = ocr.to_string();
        engine
    }

    #[test]
    fn test_count_read_next_to_glyph() {
        let mut engine = engine_with_glyph(Point::new(500, 300), "42");
        let counter = extract_rounds(&mut engine, RESOLUTION, &RoundSettings::default());

        assert_eq!(
            counter,
            Detection::Found(RoundCounter {
                remaining: 42,
                add_button: Point::new(504, 310),
            })
        );
        let calls = engine.calls();
        assert_eq!(calls.captures(), vec![ScreenRect::new(0, 0, 1024, 768)]);
        assert_eq!(calls.crops(), vec![ScreenRect::new(455, 240, 525, 270)]);
        assert_eq!(calls.masks(), vec!["0000FF|00FF00".to_string()]);
        assert_eq!(calls.selected_libraries(), vec![GlyphLibrary::RoundDigits]);
    }

    #[test]
    fn test_missing_glyph() {
        let mut engine = FakeEngine::new();
        engine.numeric_text = "42".to_string();
        let counter = extract_rounds(&mut engine, RESOLUTION, &RoundSettings::default());
        assert_eq!(counter, Detection::NotFound);
        assert_eq!(counter.unwrap_or_default().add_button, Point::SENTINEL);
        assert_eq!(engine.calls().count("recognize_numeric_text"), 0);
    }

    #[test]
    fn test_sentinel_glyph() {
        let mut engine = engine_with_glyph(Point::new(-1, -1), "42");
        let counter = extract_rounds(&mut engine, RESOLUTION, &RoundSettings::default());
        assert_eq!(counter, Detection::NotFound);
        assert!(engine.calls().crops().is_empty());
    }

    #[test]
    fn test_non_numeric_count() {
        for ocr in ["", "4a", "取消", "-3"] {
            let mut engine = engine_with_glyph(Point::new(500, 300), ocr);
            let counter = extract_rounds(&mut engine, RESOLUTION, &RoundSettings::default());
            assert_eq!(counter, Detection::NotFound, "ocr {:?}", ocr);
        }
    }

    #[test]
    fn test_ocr_failure() {
        let mut engine = engine_with_glyph(Point::new(500, 300), "42");
        engine.fail("recognize_numeric_text");
        let counter = extract_rounds(&mut engine, RESOLUTION, &RoundSettings::default());
        assert_eq!(counter, Detection::NotFound);
    }

    #[test]
    fn test_parse_round_count() {
        assert_eq!(parse_round_count(" 120 \n"), Some(120));
        assert_eq!(parse_round_count("0"), Some(0));
        assert_eq!(parse_round_count("+5"), None);
        assert_eq!(parse_round_count(""), None);
    }
}
