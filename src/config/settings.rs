//! Calibrated detection settings
//!
//! Every threshold, color key and resource the pipeline uses. The defaults
//! are calibrated against one client layout; a JSON file may override any
//! subset of them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{GlyphLibrary, GlyphSource, SegmentParams};
use crate::screen::{ColorMask, HexColor};

/// Main settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Window lookup filters
    pub window: WindowSettings,
    /// Auto-battle detection
    pub battle: BattleSettings,
    /// Remaining-rounds extraction
    pub rounds: RoundSettings,
    /// Vital bar scanning
    pub vitals: VitalSettings,
    /// Template bitmap and glyph libraries
    pub resources: ResourceSettings,
}

impl Settings {
    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Anchor relative resource paths at `dir`
    pub fn resolve_resources(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        };
        anchor(&mut self.resources.battle_template);
        anchor(&mut self.resources.round_digits);
        anchor(&mut self.resources.battle_label);
        self
    }

    /// Glyph libraries to load at session start, in slot order
    pub fn glyph_libraries(&self) -> Vec<(GlyphLibrary, GlyphSource)> {
        let resources = &self.resources;
        vec![
            (
                GlyphLibrary::BattleBanner,
                GlyphSource::Font {
                    face: resources.font_face.clone(),
                    size: resources.font_size,
                    characters: self.battle.label.clone(),
                },
            ),
            (
                GlyphLibrary::RoundDigits,
                GlyphSource::File(resources.round_digits.clone()),
            ),
            (
                GlyphLibrary::BattleLabel,
                GlyphSource::File(resources.battle_label.clone()),
            ),
        ]
    }
}

/// Window title filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Substring of the client's top-level window title
    pub title: String,
    /// Substring of the render surface's child window title
    pub child_title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "大话西游".to_string(),
            child_title: "大话".to_string(),
        }
    }
}

/// Auto-battle detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSettings {
    /// Minimum similarity for the banner bitmap match (0.0-1.0)
    pub similarity: f32,
    /// Banner text looked up when the bitmap does not match
    pub label: String,
    /// Text recognition confidence floor (percent)
    pub confidence: u8,
    /// Binarization colors of the banner text
    pub mask: ColorMask,
    /// Character segmentation parameters
    pub segmentation: SegmentParams,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            similarity: 0.9,
            label: "自动战斗".to_string(),
            confidence: 95,
            mask: ColorMask::single(HexColor::CYAN),
            segmentation: SegmentParams::default(),
        }
    }
}

/// Remaining-rounds extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundSettings {
    /// Label glyph next to the rounds counter
    pub glyph: String,
    /// Text recognition confidence floor (percent)
    pub confidence: u8,
    /// Binarization colors of the counter panel
    pub mask: ColorMask,
    /// Character segmentation parameters
    pub segmentation: SegmentParams,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            glyph: "自".to_string(),
            confidence: 95,
            mask: ColorMask(vec![HexColor::BLUE, HexColor::GREEN]),
            segmentation: SegmentParams::default(),
        }
    }
}

/// Vital bar scanning settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalSettings {
    /// Fill color of the hp bars after posterization
    pub hp_color: HexColor,
    /// Fill color of the mp bars after posterization
    pub mp_color: HexColor,
    /// Posterization levels applied before sampling
    pub posterize_levels: u8,
    /// Zoom level passed to pixel sampling
    pub zoom: u8,
}

impl Default for VitalSettings {
    fn default() -> Self {
        Self {
            hp_color: HexColor::BLUE,
            mp_color: HexColor::YELLOW,
            posterize_levels: 2,
            zoom: 2,
        }
    }
}

/// Detection resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    /// Auto-battle banner bitmap
    pub battle_template: PathBuf,
    /// Glyph library with digits and button captions
    pub round_digits: PathBuf,
    /// Glyph library with the single banner characters
    pub battle_label: PathBuf,
    /// Font the banner glyphs are rendered from
    pub font_face: String,
    /// Font size in points
    pub font_size: u32,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            battle_template: PathBuf::from("zidong.bmp"),
            round_digits: PathBuf::from("zidong.lib"),
            battle_label: PathBuf::from("zdzd.lib"),
            font_face: "宋体".to_string(),
            font_size: 9,
        }
    }
}

/// Settings loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.window.title, "大话西游");
        assert_eq!(settings.window.child_title, "大话");
        assert_eq!(settings.battle.similarity, 0.9);
        assert_eq!(settings.battle.confidence, 95);
        assert_eq!(settings.battle.mask.to_string(), "00FFFF");
        assert_eq!(settings.rounds.mask.to_string(), "0000FF|00FF00");
        assert_eq!(settings.rounds.glyph, "自");
        assert_eq!(settings.vitals.hp_color, HexColor::BLUE);
        assert_eq!(settings.vitals.mp_color, HexColor::YELLOW);
        assert_eq!((settings.vitals.posterize_levels, settings.vitals.zoom), (2, 2));
    }

    #[test]
    fn test_partial_override() {
        let settings = Settings::from_json_str(
            r#"{ "window": { "title": "Westward" }, "vitals": { "hp_color": "FF0000" } }"#,
        )
        .unwrap();
        assert_eq!(settings.window.title, "Westward");
        assert_eq!(settings.window.child_title, "大话");
        assert_eq!(settings.vitals.hp_color, HexColor::rgb(0xFF, 0, 0));
        assert_eq!(settings.vitals.mp_color, HexColor::YELLOW);
    }

    #[test]
    fn test_invalid_color_rejected() {
        let result = Settings::from_json_str(r#"{ "battle": { "mask": "00FF" } }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "rounds": {{ "confidence": 90 }} }}"#).unwrap();
        let settings = Settings::from_json_file(file.path()).unwrap();
        assert_eq!(settings.rounds.confidence, 90);

        let missing = Settings::from_json_file("/nonexistent/settings.json");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_resolve_resources() {
        let mut settings = Settings::default();
        settings.resources.battle_label = PathBuf::from("/opt/glyphs/zdzd.lib");
        let settings = settings.resolve_resources("/srv/scout/lib");
        assert_eq!(
            settings.resources.battle_template,
            PathBuf::from("/srv/scout/lib/zidong.bmp")
        );
        assert_eq!(
            settings.resources.round_digits,
            PathBuf::from("/srv/scout/lib/zidong.lib")
        );
        assert_eq!(settings.resources.battle_label, PathBuf::from("/opt/glyphs/zdzd.lib"));
    }

    #[test]
    fn test_glyph_libraries_in_slot_order() {
        let libraries = Settings::default().glyph_libraries();
        let slots: Vec<u32> = libraries.iter().map(|(library, _)| library.slot()).collect();
        assert_eq!(slots, vec![1, 2, 3]);
        assert_eq!(
            libraries[0].1,
            GlyphSource::Font {
                face: "宋体".to_string(),
                size: 9,
                characters: "自动战斗".to_string(),
            }
        );
    }

    #[test]
    fn test_settings_round_trip_through_json() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"0000FF|00FF00\""));
        assert_eq!(Settings::from_json_str(&json).unwrap(), Settings::default());
    }
}
