//! Game window lookup and geometry

use super::{degrade, Detection};
use crate::config::settings::WindowSettings;
use crate::engine::{AutomationEngine, EngineError, WindowHandle};
use crate::screen::WindowGeometry;

/// Find the client's render surface.
///
/// The picks below follow the engine's enumeration order as observed on
/// the calibrated client: the first top-level match is a background
/// window, the real frame is the second. When the frame has several
/// matching children, the surface is nested under the third one.
pub fn resolve_window<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    settings: &WindowSettings,
) -> Detection<WindowHandle> {
    degrade("Window lookup", search(engine, settings))
}

fn search<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    settings: &WindowSettings,
) -> Result<Detection<WindowHandle>, EngineError> {
    let windows = engine.enumerate_windows(&settings.title)?;
    let Some(&frame) = windows.get(1) else {
        log::debug!("{} top-level windows match {:?}", windows.len(), settings.title);
        return Ok(Detection::NotFound);
    };

    let children = engine.enumerate_child_windows(frame, &settings.child_title)?;
    let candidates = match children.len() {
        0 => return Ok(Detection::NotFound),
        1 => children,
        _ => match children.get(2) {
            Some(&nested) => engine.enumerate_child_windows(nested, &settings.child_title)?,
            None => return Ok(Detection::NotFound),
        },
    };

    Ok(candidates.first().copied().into())
}

/// Link the capture context to `handle` and derive its geometry.
///
/// A negative bounding box means the window vanished or is minimized.
pub fn measure_window<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    handle: WindowHandle,
) -> Detection<WindowGeometry> {
    degrade("Window geometry", measure(engine, handle))
}

fn measure<E: AutomationEngine + ?Sized>(
    engine: &mut E,
    handle: WindowHandle,
) -> Result<Detection<WindowGeometry>, EngineError> {
    engine.link_capture_context(handle)?;
    let rect = engine.window_bounds()?;
    log::debug!("Window {} bounds {:?}", handle, rect);
    Ok(WindowGeometry::from_rect(rect).into())
}
