//! Detection stages
//!
//! Each stage derives one piece of game state from the engine: the client
//! window, its geometry, the auto-battle flag, the remaining auto rounds
//! and the vital bars. A stage never fails: engine errors and recognition
//! misses both come back as [`Detection::NotFound`].

pub mod battle;
pub mod rounds;
pub mod vitals;
pub mod window;

use crate::engine::EngineError;

pub use battle::{detect_battle, BattleEvidence};
pub use rounds::{extract_rounds, RoundCounter};
pub use vitals::{find_color_line, scan_vitals, Vitals};
pub use window::{measure_window, resolve_window};

/// Outcome of a detection stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection<T> {
    /// The stage located its target
    Found(T),
    /// Target absent, unreadable, or the engine call failed
    NotFound,
}

impl<T> Detection<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Detection::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Detection::Found(value) => Some(value),
            Detection::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Detection<U> {
        match self {
            Detection::Found(value) => Detection::Found(f(value)),
            Detection::NotFound => Detection::NotFound,
        }
    }

    /// The found value, or the documented default for a miss
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.found().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Detection<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Detection::Found(value),
            None => Detection::NotFound,
        }
    }
}

/// Collapse an engine failure into a miss, logging it
pub(crate) fn degrade<T>(stage: &str, result: Result<Detection<T>, EngineError>) -> Detection<T> {
    result.unwrap_or_else(|e| {
        log::debug!("{} degraded to not-found: {}", stage, e);
        Detection::NotFound
    })
}
