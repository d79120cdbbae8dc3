//! Westward Scout - screen-state inference for the Westward Journey client
//!
//! This library inspects the running game window through an external
//! automation engine and derives a [`GameStateSnapshot`]: whether the
//! window exists, whether an automated battle is running, the four vital
//! bar percentages and the number of auto rounds left.
//!
//! ## Engine
//!
//! The engine is reached through the [`engine::AutomationEngine`]
//! capability. Each analysis pass opens its own [`engine::EngineSession`],
//! which is released when the pass ends.

pub mod config;
pub mod engine;
pub mod game;
pub mod screen;
pub mod vision;

use crate::config::Settings;
use crate::engine::{EngineConnector, EngineSession};
use crate::game::StateAggregator;

pub use crate::game::{GameStateSnapshot, VitalReading};

/// Screen analyzer bound to one engine connector
pub struct Scout<C: EngineConnector> {
    connector: C,
    settings: Settings,
}

impl<C: EngineConnector> Scout<C> {
    /// Create a new Scout with the given connector and settings
    pub fn new(connector: C, settings: Settings) -> Self {
        Self {
            connector,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one analysis pass.
    ///
    /// Never fails: an engine that cannot be started reads the same as an
    /// absent window, `found == false`.
    pub fn analyze(&self) -> GameStateSnapshot {
        let libraries = self.settings.glyph_libraries();
        let mut session = match EngineSession::open(&self.connector, &libraries) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Failed to open engine session: {}", e);
                return GameStateSnapshot::not_found();
            }
        };

        StateAggregator::new(&self.settings).run(&mut *session)
    }
}
