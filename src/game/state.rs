//! Game state snapshot
//!
//! The immutable result of one analysis pass, plus the stages the pass
//! moves through.

use serde::{Deserialize, Serialize};

use crate::screen::{Point, Resolution, ScreenRect};

/// A bar fill percentage in `[0, 100]`; 0 also means "not found"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VitalReading(u8);

impl VitalReading {
    /// Create a reading, clamping to 100
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Whether the bar showed no fill (or was not found)
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Stages of one analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisStage {
    /// Pass started
    Init,
    /// The client's render surface was found
    WindowResolved,
    /// The window has a valid bounding box
    GeometryValid,
    /// Auto-battle flag decided
    BattleChecked,
    /// Round counter read (or defaulted)
    RoundsChecked,
    /// Vital bars read; skipped during battle
    VitalsChecked,
    /// Window or geometry missing; remaining stages skipped
    NotFound,
    /// Snapshot assembled
    Done,
}

impl AnalysisStage {
    /// Whether `next` may follow this stage
    pub fn can_advance_to(&self, next: AnalysisStage) -> bool {
        use AnalysisStage::*;
        matches!(
            (self, next),
            (Init, WindowResolved | NotFound)
                | (WindowResolved, GeometryValid | NotFound)
                | (GeometryValid, BattleChecked)
                | (BattleChecked, RoundsChecked)
                | (RoundsChecked, VitalsChecked | Done)
                | (VitalsChecked, Done)
                | (NotFound, Done)
        )
    }
}

/// Game state derived from one analysis pass.
///
/// Only the analyzer builds snapshots; every field is read-only afterwards.
/// The default value is the "window not found" snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateSnapshot {
    pub(crate) found: bool,
    pub(crate) in_battle: bool,
    pub(crate) window_rect: ScreenRect,
    pub(crate) resolution: Resolution,
    pub(crate) hp: VitalReading,
    pub(crate) mp: VitalReading,
    pub(crate) player_hp: VitalReading,
    pub(crate) player_mp: VitalReading,
    pub(crate) hp_button: Point,
    pub(crate) mp_button: Point,
    pub(crate) player_hp_button: Point,
    pub(crate) player_mp_button: Point,
    pub(crate) add_round_button: Point,
    pub(crate) rounds_remaining: u32,
}

impl Default for GameStateSnapshot {
    fn default() -> Self {
        Self {
            found: false,
            in_battle: false,
            window_rect: ScreenRect::default(),
            resolution: Resolution::default(),
            hp: VitalReading::default(),
            mp: VitalReading::default(),
            player_hp: VitalReading::default(),
            player_mp: VitalReading::default(),
            hp_button: Point::SENTINEL,
            mp_button: Point::SENTINEL,
            player_hp_button: Point::SENTINEL,
            player_mp_button: Point::SENTINEL,
            add_round_button: Point::SENTINEL,
            rounds_remaining: 0,
        }
    }
}

impl GameStateSnapshot {
    /// Snapshot for a pass that found no usable window
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Whether the game window was found
    pub fn found(&self) -> bool {
        self.found
    }

    /// Whether an automated battle is running
    pub fn in_battle(&self) -> bool {
        self.in_battle
    }

    /// Absolute window bounding box
    pub fn window_rect(&self) -> ScreenRect {
        self.window_rect
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Hp bar fill; 0 during battle
    pub fn hp(&self) -> VitalReading {
        self.hp
    }

    /// Mp bar fill; 0 during battle
    pub fn mp(&self) -> VitalReading {
        self.mp
    }

    /// Player hp bar fill; 0 during battle
    pub fn player_hp(&self) -> VitalReading {
        self.player_hp
    }

    /// Player mp bar fill; 0 during battle
    pub fn player_mp(&self) -> VitalReading {
        self.player_mp
    }

    pub fn hp_button(&self) -> Point {
        self.hp_button
    }

    pub fn mp_button(&self) -> Point {
        self.mp_button
    }

    pub fn player_hp_button(&self) -> Point {
        self.player_hp_button
    }

    pub fn player_mp_button(&self) -> Point {
        self.player_mp_button
    }

    /// Where to click to add auto rounds; sentinel when the panel is hidden
    pub fn add_round_button(&self) -> Point {
        self.add_round_button
    }

    /// Remaining automated rounds
    pub fn rounds_remaining(&self) -> u32 {
        self.rounds_remaining
    }
}
