//! Offline engine over a still screenshot
//!
//! Replays the capability surface against a PNG of the client window so
//! the pipeline can be dry-run without the proprietary engine. Capture,
//! filters, template matching and pixel sampling work on the image; glyph
//! recognition and OCR need the real engine and report no match.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use image::{imageops, GrayImage, Rgb, RgbImage};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

use super::{
    AutomationEngine, EngineConnector, EngineError, GlyphLibrary, GlyphSource, SegmentParams,
    WindowHandle,
};
use crate::screen::{ColorMask, Point, ScreenRect};

/// Background window sharing the client's title
const DECOY_WINDOW: WindowHandle = WindowHandle(0x1001);
/// The client's top-level frame
const FRAME_WINDOW: WindowHandle = WindowHandle(0x1002);
/// The client's render surface
const CANVAS_WINDOW: WindowHandle = WindowHandle(0x1003);

/// Engine backed by one screenshot of the client window
pub struct ScreenshotEngine {
    /// Window contents
    screen: RgbImage,
    /// Absolute position of the window's top-left corner
    origin: Point,
    /// Whether a capture context is linked
    linked: bool,
    /// Working pixel buffer
    buffer: Option<RgbImage>,
    /// Glyph libraries loaded into the session
    libraries: HashSet<GlyphLibrary>,
}

impl ScreenshotEngine {
    /// Create an engine showing `screen` with its top-left corner at `origin`
    pub fn new(screen: RgbImage, origin: Point) -> Self {
        Self {
            screen,
            origin,
            linked: false,
            buffer: None,
            libraries: HashSet::new(),
        }
    }

    /// The working pixel buffer, if something was captured
    pub fn buffer(&self) -> Option<&RgbImage> {
        self.buffer.as_ref()
    }

    fn buffer_mut(&mut self) -> Result<&mut RgbImage, EngineError> {
        self.buffer.as_mut().ok_or(EngineError::NothingCaptured)
    }

    fn require_link(&self) -> Result<(), EngineError> {
        if self.linked {
            Ok(())
        } else {
            Err(EngineError::NotLinked)
        }
    }
}

/// Intersect `region` with a `width`×`height` image, as `(x, y, w, h)`
fn clamp_region(region: ScreenRect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let left = region.left.clamp(0, width as i32);
    let top = region.top.clamp(0, height as i32);
    let right = region.right.clamp(0, width as i32);
    let bottom = region.bottom.clamp(0, height as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

/// Quantize every channel to `levels` evenly spaced values
fn posterize_image(image: &mut RgbImage, levels: u8) {
    let steps = u32::from(levels.max(2)) - 1;
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let bucket = (u32::from(*channel) * steps + 127) / 255;
            *channel = (bucket * 255 / steps) as u8;
        }
    }
}

impl AutomationEngine for ScreenshotEngine {
    fn enumerate_windows(&mut self, _title: &str) -> Result<Vec<WindowHandle>, EngineError> {
        Ok(vec![DECOY_WINDOW, FRAME_WINDOW])
    }

    fn enumerate_child_windows(
        &mut self,
        parent: WindowHandle,
        _title: &str,
    ) -> Result<Vec<WindowHandle>, EngineError> {
        if parent == FRAME_WINDOW {
            Ok(vec![CANVAS_WINDOW])
        } else {
            Ok(Vec::new())
        }
    }

    fn link_capture_context(&mut self, handle: WindowHandle) -> Result<(), EngineError> {
        if ![DECOY_WINDOW, FRAME_WINDOW, CANVAS_WINDOW].contains(&handle) {
            return Err(EngineError::WindowClosed("link_capture_context"));
        }
        self.linked = true;
        Ok(())
    }

    fn window_bounds(&mut self) -> Result<ScreenRect, EngineError> {
        self.require_link()?;
        Ok(ScreenRect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x.saturating_add_unsigned(self.screen.width()),
            self.origin.y.saturating_add_unsigned(self.screen.height()),
        ))
    }

    fn match_template_image(
        &mut self,
        region: ScreenRect,
        image: &Path,
        similarity: f32,
    ) -> Result<Option<Point>, EngineError> {
        self.require_link()?;
        let template: GrayImage = image::open(image)
            .map_err(|e| EngineError::Resource {
                path: image.to_path_buf(),
                message: e.to_string(),
            })?
            .to_luma8();

        let Some((x, y, w, h)) = clamp_region(region, self.screen.width(), self.screen.height())
        else {
            return Ok(None);
        };
        if template.width() > w || template.height() > h || template.width() == 0 {
            return Ok(None);
        }

        let area = imageops::grayscale(&imageops::crop_imm(&self.screen, x, y, w, h).to_image());
        let scores = match_template(&area, &template, MatchTemplateMethod::CrossCorrelationNormalized);
        let extremes = find_extremes(&scores);
        log::trace!(
            "Template {} best score {:.3} at {:?}",
            image.display(),
            extremes.max_value,
            extremes.max_value_location
        );

        if extremes.max_value >= similarity {
            let (mx, my) = extremes.max_value_location;
            Ok(Some(Point::new((x + mx) as i32, (y + my) as i32)))
        } else {
            Ok(None)
        }
    }

    fn capture_pixels(&mut self, region: ScreenRect) -> Result<(), EngineError> {
        self.require_link()?;
        clamp_region(region, self.screen.width(), self.screen.height())
            .ok_or(EngineError::NothingCaptured)?;
        // Buffer coordinates stay relative to the region; pixels outside
        // the screenshot read black.
        let mut buffer = RgbImage::new(region.width() as u32, region.height() as u32);
        imageops::replace(
            &mut buffer,
            &self.screen,
            -i64::from(region.left),
            -i64::from(region.top),
        );
        self.buffer = Some(buffer);
        Ok(())
    }

    fn apply_color_mask(&mut self, mask: &ColorMask) -> Result<(), EngineError> {
        let buffer = self.buffer_mut()?;
        for pixel in buffer.pixels_mut() {
            *pixel = if mask.contains(*pixel) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            };
        }
        Ok(())
    }

    fn posterize(&mut self, levels: u8) -> Result<(), EngineError> {
        posterize_image(self.buffer_mut()?, levels);
        Ok(())
    }

    fn crop(&mut self, region: ScreenRect) -> Result<(), EngineError> {
        let buffer = self.buffer_mut()?;
        let (x, y, w, h) =
            clamp_region(region, buffer.width(), buffer.height()).ok_or(EngineError::NothingCaptured)?;
        let cropped = imageops::crop_imm(&*buffer, x, y, w, h).to_image();
        *buffer = cropped;
        Ok(())
    }

    fn segment_characters(&mut self, _params: SegmentParams) -> Result<(), EngineError> {
        self.buffer_mut().map(|_| ())
    }

    fn extract_character_data(&mut self) -> Result<(), EngineError> {
        self.buffer_mut().map(|_| ())
    }

    fn load_glyph_library(
        &mut self,
        library: GlyphLibrary,
        source: &GlyphSource,
    ) -> Result<(), EngineError> {
        if let GlyphSource::File(path) = source {
            if !path.exists() {
                log::warn!("Glyph library {} not found; text recognition stays empty", path.display());
            }
        }
        self.libraries.insert(library);
        Ok(())
    }

    fn select_glyph_library(&mut self, library: GlyphLibrary) -> Result<(), EngineError> {
        if self.libraries.contains(&library) {
            Ok(())
        } else {
            Err(EngineError::Call {
                op: "select_glyph_library",
                message: format!("slot {} is empty", library.slot()),
            })
        }
    }

    fn recognize_text(
        &mut self,
        label: &str,
        _confidence: u8,
    ) -> Result<Option<Point>, EngineError> {
        self.buffer_mut()?;
        log::trace!("No glyph recognizer for {:?} in screenshot mode", label);
        Ok(None)
    }

    fn recognize_numeric_text(&mut self) -> Result<String, EngineError> {
        self.buffer_mut()?;
        Ok(String::new())
    }

    fn pixel_color(&mut self, x: i32, y: i32, _zoom: u8) -> Result<Rgb<u8>, EngineError> {
        let buffer = self.buffer.as_ref().ok_or(EngineError::NothingCaptured)?;
        if x < 0 || y < 0 || x as u32 >= buffer.width() || y as u32 >= buffer.height() {
            return Err(EngineError::Call {
                op: "pixel_color",
                message: format!("({}, {}) outside the captured buffer", x, y),
            });
        }
        Ok(*buffer.get_pixel(x as u32, y as u32))
    }

    fn release(&mut self) {
        self.linked = false;
        self.buffer = None;
    }
}

/// Opens a [`ScreenshotEngine`] from a PNG file
#[derive(Debug, Clone)]
pub struct ScreenshotConnector {
    path: PathBuf,
    origin: Point,
}

impl ScreenshotConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: Point::new(0, 0),
        }
    }

    /// Place the window's top-left corner at `origin` on the virtual screen
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }
}

impl EngineConnector for ScreenshotConnector {
    type Engine = ScreenshotEngine;

    fn connect(&self) -> Result<ScreenshotEngine, EngineError> {
        let screen = image::open(&self.path)
            .map_err(|e| EngineError::Connect(format!("{}: {}", self.path.display(), e)))?
            .to_rgb8();
        log::debug!(
            "Loaded screenshot {} ({}x{})",
            self.path.display(),
            screen.width(),
            screen.height()
        );
        Ok(ScreenshotEngine::new(screen, self.origin))
    }
}
