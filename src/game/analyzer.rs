//! State aggregation
//!
//! Runs the detection stages in their fixed order against one engine
//! session and assembles the snapshot. A missing window or geometry ends
//! the pass before any pixel operation is attempted.

use super::state::{AnalysisStage, GameStateSnapshot};
use crate::config::Settings;
use crate::engine::AutomationEngine;
use crate::vision::{
    detect_battle, extract_rounds, measure_window, resolve_window, scan_vitals, Detection, Vitals,
};

/// Orchestrates one analysis pass
pub struct StateAggregator<'a> {
    settings: &'a Settings,
    /// Stages visited by the last pass
    visited: Vec<AnalysisStage>,
}

impl<'a> StateAggregator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            visited: Vec::new(),
        }
    }

    /// Stages visited by the last pass, in order
    pub fn visited(&self) -> &[AnalysisStage] {
        &self.visited
    }

    /// Current stage
    pub fn stage(&self) -> AnalysisStage {
        self.visited.last().copied().unwrap_or(AnalysisStage::Init)
    }

    fn enter(&mut self, stage: AnalysisStage) {
        if let Some(&current) = self.visited.last() {
            debug_assert!(
                current.can_advance_to(stage),
                "invalid transition {:?} -> {:?}",
                current,
                stage
            );
        }
        log::trace!("Analysis stage {:?}", stage);
        self.visited.push(stage);
    }

    fn finish_not_found(&mut self) -> GameStateSnapshot {
        self.enter(AnalysisStage::NotFound);
        self.enter(AnalysisStage::Done);
        log::info!("Game window not found");
        GameStateSnapshot::not_found()
    }

    /// Analyze the screen once
    pub fn run<E: AutomationEngine + ?Sized>(&mut self, engine: &mut E) -> GameStateSnapshot {
        let settings = self.settings;
        self.visited.clear();
        self.enter(AnalysisStage::Init);

        let Detection::Found(handle) = resolve_window(engine, &settings.window) else {
            return self.finish_not_found();
        };
        self.enter(AnalysisStage::WindowResolved);

        let Detection::Found(geometry) = measure_window(engine, handle) else {
            return self.finish_not_found();
        };
        self.enter(AnalysisStage::GeometryValid);
        let resolution = geometry.resolution;

        let battle = detect_battle(
            engine,
            resolution,
            &settings.battle,
            &settings.resources.battle_template,
        );
        if let Detection::Found(evidence) = battle {
            log::debug!("In battle ({:?})", evidence);
        }
        let in_battle = battle.is_found();
        self.enter(AnalysisStage::BattleChecked);

        let rounds = extract_rounds(engine, resolution, &settings.rounds).unwrap_or_default();
        self.enter(AnalysisStage::RoundsChecked);

        // Vital bars are covered by the battle scene.
        let vitals = if in_battle {
            Vitals::default()
        } else {
            let vitals = scan_vitals(engine, resolution, &settings.vitals).unwrap_or_default();
            self.enter(AnalysisStage::VitalsChecked);
            vitals
        };
        self.enter(AnalysisStage::Done);

        let snapshot = GameStateSnapshot {
            found: true,
            in_battle,
            window_rect: geometry.rect,
            resolution,
            hp: vitals.hp,
            mp: vitals.mp,
            player_hp: vitals.player_hp,
            player_mp: vitals.player_mp,
            hp_button: geometry.hp_button,
            mp_button: geometry.mp_button,
            player_hp_button: geometry.player_hp_button,
            player_mp_button: geometry.player_mp_button,
            add_round_button: rounds.add_button,
            rounds_remaining: rounds.remaining,
        };
        log::info!(
            "Window {}x{} battle={} rounds={} hp={} mp={} player_hp={} player_mp={}",
            resolution.width,
            resolution.height,
            in_battle,
            snapshot.rounds_remaining,
            snapshot.hp.percent(),
            snapshot.mp.percent(),
            snapshot.player_hp.percent(),
            snapshot.player_mp.percent()
        );
        snapshot
    }
}
