//! Scoped engine sessions
//!
//! One analysis pass owns one session. The session loads the glyph
//! libraries on open and releases the bridge when dropped, including when
//! a stage unwinds. Sessions are neither `Clone` nor shareable: the
//! engine's linked-window state is not reentrant.

use std::ops::{Deref, DerefMut};

use super::{AutomationEngine, EngineError, GlyphLibrary, GlyphSource};

/// Starts engine instances
pub trait EngineConnector {
    type Engine: AutomationEngine;

    /// Start a fresh engine bridge
    fn connect(&self) -> Result<Self::Engine, EngineError>;
}

/// An open engine bridge, released on drop
pub struct EngineSession<E: AutomationEngine> {
    engine: E,
}

impl<E: AutomationEngine> EngineSession<E> {
    /// Connect and load every glyph library into its slot
    pub fn open<C>(connector: &C, libraries: &[(GlyphLibrary, GlyphSource)]) -> Result<Self, EngineError>
    where
        C: EngineConnector<Engine = E>,
    {
        let mut session = Self::wrap(connector.connect()?);
        for (library, source) in libraries {
            log::debug!("Loading glyph library {:?} into slot {}", library, library.slot());
            session.engine.load_glyph_library(*library, source)?;
        }
        Ok(session)
    }

    /// Take ownership of an already started engine
    pub fn wrap(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: AutomationEngine> Deref for EngineSession<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.engine
    }
}

impl<E: AutomationEngine> DerefMut for EngineSession<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: AutomationEngine> Drop for EngineSession<E> {
    fn drop(&mut self) {
        log::debug!("Releasing engine session");
        self.engine.release();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::engine::fake::{FakeConnector, FakeEngine};

    fn libraries() -> Vec<(GlyphLibrary, GlyphSource)> {
        vec![
            (GlyphLibrary::RoundDigits, GlyphSource::File(PathBuf::from("zidong.lib"))),
            (GlyphLibrary::BattleLabel, GlyphSource::File(PathBuf::from("zdzd.lib"))),
        ]
    }

    #[test]
    fn test_session_loads_libraries_and_releases() {
        let engine = FakeEngine::new();
        let calls = engine.calls();
        {
            let session = EngineSession::open(&FakeConnector::new(engine), &libraries()).unwrap();
            assert_eq!(session.loaded_libraries().len(), 2);
            assert_eq!(calls.count("release"), 0);
        }
        assert_eq!(calls.count("release"), 1);
    }

    #[test]
    fn test_session_released_when_library_load_fails() {
        let mut engine = FakeEngine::new();
        engine.fail("load_glyph_library");
        let calls = engine.calls();

        let result = EngineSession::open(&FakeConnector::new(engine), &libraries());
        assert!(result.is_err());
        assert_eq!(calls.count("release"), 1);
    }

    #[test]
    fn test_session_released_on_unwind() {
        let engine = FakeEngine::new();
        let calls = engine.calls();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _session = EngineSession::wrap(engine);
            panic!("stage failed");
        }));
        assert!(outcome.is_err());
        assert_eq!(calls.count("release"), 1);
    }

    #[test]
    fn test_connect_failure_is_reported() {
        let result = EngineSession::open(&FakeConnector::refusing(), &libraries());
        assert!(matches!(result, Err(EngineError::Connect(_))));
    }
}
