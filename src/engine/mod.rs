//! Automation engine capability
//!
//! The proprietary automation engine lives in another process and is
//! reached through a bridge. This module describes the capability the
//! detection pipeline needs from it: window enumeration, pixel capture,
//! filters, template matching, glyph-library text recognition and raw
//! pixel sampling.
//!
//! Every call may be slow and may fail (the window can close between two
//! calls). Callers in [`crate::vision`] turn failures into
//! [`crate::vision::Detection::NotFound`] at the call site.

pub mod screenshot;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;
use std::path::{Path, PathBuf};

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::screen::{ColorMask, Point, ScreenRect};

pub use screenshot::{ScreenshotConnector, ScreenshotEngine};
pub use session::{EngineConnector, EngineSession};

/// Opaque engine-assigned window identifier.
///
/// Only meaningful during the analysis pass that obtained it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub i64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Glyph libraries loaded into the engine at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlyphLibrary {
    /// The auto-battle banner text rendered from a system font
    BattleBanner,
    /// Digits 0-9 plus the cancel/auto button captions
    RoundDigits,
    /// The four individual auto-battle label characters
    BattleLabel,
}

impl GlyphLibrary {
    /// All libraries in slot order
    pub const ALL: [GlyphLibrary; 3] = [
        GlyphLibrary::BattleBanner,
        GlyphLibrary::RoundDigits,
        GlyphLibrary::BattleLabel,
    ];

    /// Engine slot number
    pub fn slot(&self) -> u32 {
        match self {
            GlyphLibrary::BattleBanner => 1,
            GlyphLibrary::RoundDigits => 2,
            GlyphLibrary::BattleLabel => 3,
        }
    }
}

/// Where a glyph library's character data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphSource {
    /// Render the given characters from a system font
    Font {
        face: String,
        size: u32,
        characters: String,
    },
    /// Load a prebuilt glyph library file
    File(PathBuf),
}

/// Character segmentation parameters (scope-aisle widths)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentParams {
    /// Horizontal gap separating two characters
    pub column_gap: u32,
    /// Vertical gap separating two text rows
    pub row_gap: u32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            column_gap: 2,
            row_gap: 1,
        }
    }
}

/// Capability surface of the external automation engine.
///
/// The engine keeps a linked window and a working pixel buffer between
/// calls: `capture_pixels` fills the buffer, filters and `crop` rewrite it,
/// and text recognition and `pixel_color` read from it. Search and capture
/// regions are relative to the linked window; pixel-buffer coordinates are
/// relative to the captured region.
pub trait AutomationEngine {
    /// Top-level windows whose title contains `title`, in engine order
    fn enumerate_windows(&mut self, title: &str) -> Result<Vec<WindowHandle>, EngineError>;

    /// Child windows of `parent` whose title contains `title`, in engine order
    fn enumerate_child_windows(
        &mut self,
        parent: WindowHandle,
        title: &str,
    ) -> Result<Vec<WindowHandle>, EngineError>;

    /// Bind subsequent capture calls to a window
    fn link_capture_context(&mut self, handle: WindowHandle) -> Result<(), EngineError>;

    /// Absolute bounding box of the linked window
    fn window_bounds(&mut self) -> Result<ScreenRect, EngineError>;

    /// Search `region` for a bitmap; `None` when nothing reaches `similarity`
    fn match_template_image(
        &mut self,
        region: ScreenRect,
        image: &Path,
        similarity: f32,
    ) -> Result<Option<Point>, EngineError>;

    /// Load `region` of the linked window into the pixel buffer
    fn capture_pixels(&mut self, region: ScreenRect) -> Result<(), EngineError>;

    /// Binarize the pixel buffer, keeping pixels of the mask colors
    fn apply_color_mask(&mut self, mask: &ColorMask) -> Result<(), EngineError>;

    /// Reduce every channel of the pixel buffer to `levels` values
    fn posterize(&mut self, levels: u8) -> Result<(), EngineError>;

    /// Restrict the pixel buffer to a sub-rectangle
    fn crop(&mut self, region: ScreenRect) -> Result<(), EngineError>;

    /// Split the binarized buffer into character cells
    fn segment_characters(&mut self, params: SegmentParams) -> Result<(), EngineError>;

    /// Compute glyph features for the segmented cells
    fn extract_character_data(&mut self) -> Result<(), EngineError>;

    /// Load a glyph library into its slot
    fn load_glyph_library(
        &mut self,
        library: GlyphLibrary,
        source: &GlyphSource,
    ) -> Result<(), EngineError>;

    /// Make a loaded library the one used by text recognition
    fn select_glyph_library(&mut self, library: GlyphLibrary) -> Result<(), EngineError>;

    /// Locate `label` among the extracted characters at `confidence` percent
    fn recognize_text(&mut self, label: &str, confidence: u8)
        -> Result<Option<Point>, EngineError>;

    /// Read the pixel buffer as text with the engine's generic OCR
    fn recognize_numeric_text(&mut self) -> Result<String, EngineError>;

    /// Color of one pixel-buffer coordinate sampled at a zoom level
    fn pixel_color(&mut self, x: i32, y: i32, zoom: u8) -> Result<Rgb<u8>, EngineError>;

    /// Tear down the bridge. Called once when the session ends.
    fn release(&mut self) {}
}

/// Engine bridge errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to start engine: {0}")]
    Connect(String),
    #[error("Window closed during {0}")]
    WindowClosed(&'static str),
    #[error("No window linked to the capture context")]
    NotLinked,
    #[error("No pixels captured")]
    NothingCaptured,
    #[error("Engine call {op} failed: {message}")]
    Call { op: &'static str, message: String },
    #[error("Failed to load resource {}: {message}", path.display())]
    Resource { path: PathBuf, message: String },
}
