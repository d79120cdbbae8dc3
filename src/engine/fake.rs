//! Scripted engine for tests
//!
//! Simulates window presence, match outcomes, OCR replies and a synthetic
//! pixel grid, and counts every call so tests can assert which stages ran.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;

use image::{Rgb, RgbImage};

use super::{
    AutomationEngine, EngineConnector, EngineError, GlyphLibrary, GlyphSource, SegmentParams,
    WindowHandle,
};
use crate::screen::{ColorMask, Point, ScreenRect};

#[derive(Debug, Default)]
struct CallLogInner {
    counts: HashMap<&'static str, usize>,
    captures: Vec<ScreenRect>,
    crops: Vec<ScreenRect>,
    selected: Vec<GlyphLibrary>,
    loaded: Vec<GlyphLibrary>,
    masks: Vec<String>,
    linked: Option<WindowHandle>,
}

/// Shared view of the calls a [`FakeEngine`] received
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<CallLogInner>>);

impl CallLog {
    pub fn count(&self, op: &str) -> usize {
        self.0.borrow().counts.get(op).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.borrow().counts.values().sum()
    }

    pub fn captures(&self) -> Vec<ScreenRect> {
        self.0.borrow().captures.clone()
    }

    pub fn crops(&self) -> Vec<ScreenRect> {
        self.0.borrow().crops.clone()
    }

    pub fn selected_libraries(&self) -> Vec<GlyphLibrary> {
        self.0.borrow().selected.clone()
    }

    pub fn masks(&self) -> Vec<String> {
        self.0.borrow().masks.clone()
    }

    pub fn linked(&self) -> Option<WindowHandle> {
        self.0.borrow().linked
    }
}

/// Scripted [`AutomationEngine`]
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub windows: Vec<WindowHandle>,
    pub children: HashMap<WindowHandle, Vec<WindowHandle>>,
    pub bounds: ScreenRect,
    pub template_match: Option<Point>,
    pub text_matches: HashMap<String, Point>,
    pub numeric_text: String,
    pub pixels: Option<RgbImage>,
    failing: HashSet<&'static str>,
    calls: CallLog,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that the window resolver finds: decoy + real top-level
    /// window, one matching child, at the given bounds.
    pub fn with_window(bounds: ScreenRect) -> Self {
        let mut engine = Self::new();
        engine.windows = vec![WindowHandle(0x10), WindowHandle(0x20)];
        engine
            .children
            .insert(WindowHandle(0x20), vec![WindowHandle(0x21)]);
        engine.bounds = bounds;
        engine
    }

    /// Make every call to `op` fail
    pub fn fail(&mut self, op: &'static str) {
        self.failing.insert(op);
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    pub fn loaded_libraries(&self) -> Vec<GlyphLibrary> {
        self.calls.0.borrow().loaded.clone()
    }

    fn record(&self, op: &'static str) -> Result<(), EngineError> {
        *self.calls.0.borrow_mut().counts.entry(op).or_insert(0) += 1;
        if self.failing.contains(op) {
            Err(EngineError::WindowClosed(op))
        } else {
            Ok(())
        }
    }
}

impl AutomationEngine for FakeEngine {
    fn enumerate_windows(&mut self, _title: &str) -> Result<Vec<WindowHandle>, EngineError> {
        self.record("enumerate_windows")?;
        Ok(self.windows.clone())
    }

    fn enumerate_child_windows(
        &mut self,
        parent: WindowHandle,
        _title: &str,
    ) -> Result<Vec<WindowHandle>, EngineError> {
        self.record("enumerate_child_windows")?;
        Ok(self.children.get(&parent).cloned().unwrap_or_default())
    }

    fn link_capture_context(&mut self, handle: WindowHandle) -> Result<(), EngineError> {
        self.record("link_capture_context")?;
        self.calls.0.borrow_mut().linked = Some(handle);
        Ok(())
    }

    fn window_bounds(&mut self) -> Result<ScreenRect, EngineError> {
        self.record("window_bounds")?;
        Ok(self.bounds)
    }

    fn match_template_image(
        &mut self,
        _region: ScreenRect,
        _image: &Path,
        _similarity: f32,
    ) -> Result<Option<Point>, EngineError> {
        self.record("match_template_image")?;
        Ok(self.template_match)
    }

    fn capture_pixels(&mut self, region: ScreenRect) -> Result<(), EngineError> {
        self.record("capture_pixels")?;
        self.calls.0.borrow_mut().captures.push(region);
        Ok(())
    }

    fn apply_color_mask(&mut self, mask: &ColorMask) -> Result<(), EngineError> {
        self.record("apply_color_mask")?;
        self.calls.0.borrow_mut().masks.push(mask.to_string());
        Ok(())
    }

    fn posterize(&mut self, _levels: u8) -> Result<(), EngineError> {
        self.record("posterize")
    }

    fn crop(&mut self, region: ScreenRect) -> Result<(), EngineError> {
        self.record("crop")?;
        self.calls.0.borrow_mut().crops.push(region);
        Ok(())
    }

    fn segment_characters(&mut self, _params: SegmentParams) -> Result<(), EngineError> {
        self.record("segment_characters")
    }

    fn extract_character_data(&mut self) -> Result<(), EngineError> {
        self.record("extract_character_data")
    }

    fn load_glyph_library(
        &mut self,
        library: GlyphLibrary,
        _source: &GlyphSource,
    ) -> Result<(), EngineError> {
        self.record("load_glyph_library")?;
        self.calls.0.borrow_mut().loaded.push(library);
        Ok(())
    }

    fn select_glyph_library(&mut self, library: GlyphLibrary) -> Result<(), EngineError> {
        self.record("select_glyph_library")?;
        self.calls.0.borrow_mut().selected.push(library);
        Ok(())
    }

    fn recognize_text(
        &mut self,
        label: &str,
        _confidence: u8,
    ) -> Result<Option<Point>, EngineError> {
        self.record("recognize_text")?;
        Ok(self.text_matches.get(label).copied())
    }

    fn recognize_numeric_text(&mut self) -> Result<String, EngineError> {
        self.record("recognize_numeric_text")?;
        Ok(self.numeric_text.clone())
    }

    fn pixel_color(&mut self, x: i32, y: i32, _zoom: u8) -> Result<Rgb<u8>, EngineError> {
        self.record("pixel_color")?;
        let Some(pixels) = &self.pixels else {
            return Ok(Rgb([0, 0, 0]));
        };
        if x < 0 || y < 0 || x as u32 >= pixels.width() || y as u32 >= pixels.height() {
            return Ok(Rgb([0, 0, 0]));
        }
        Ok(*pixels.get_pixel(x as u32, y as u32))
    }

    fn release(&mut self) {
        let _ = self.record("release");
    }
}

/// Hands out one scripted engine
pub struct FakeConnector {
    engine: RefCell<Option<FakeEngine>>,
}

impl FakeConnector {
    pub fn new(engine: FakeEngine) -> Self {
        Self {
            engine: RefCell::new(Some(engine)),
        }
    }

    /// A connector whose bridge never starts
    pub fn refusing() -> Self {
        Self {
            engine: RefCell::new(None),
        }
    }
}

impl EngineConnector for FakeConnector {
    type Engine = FakeEngine;

    fn connect(&self) -> Result<FakeEngine, EngineError> {
        self.engine
            .borrow_mut()
            .take()
            .ok_or_else(|| EngineError::Connect("bridge process did not start".to_string()))
    }
}
