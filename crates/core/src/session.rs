//! Session module - timers around one [`GameEngine`]
//!
//! The caller drives [`GameSession::advance`] with elapsed milliseconds from
//! its own clock (a fixed timestep loop, a test, a server tick). The session
//! turns that into engine calls:
//!
//! - **Fall timer**: one `tick()` per current tick interval while running.
//! - **Clear timer**: after a match the board holds still for
//!   `clear_delay_ms`; the fall timer is frozen and input is dropped.
//! - **Garbage**: rows queued at any time are applied on the next running
//!   tick, all at once.
//!
//! Restart and game over drop both timers, so nothing scheduled for the old
//! game can touch the new board.

use crate::config::{ConfigError, EngineConfig};
use crate::game_state::{EngineEvent, GameEngine, TickResult};
use crate::snapshot::GameSnapshot;
use crate::types::{EnginePhase, GameAction};

/// One player's game plus its timers
#[derive(Debug, Clone)]
pub struct GameSession {
    engine: GameEngine,
    fall_timer_ms: u32,
    /// Remaining highlight time; Some only while clearing
    clear_timer_ms: Option<u32>,
}

impl GameSession {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_engine(GameEngine::new(config)?))
    }

    pub fn from_engine(engine: GameEngine) -> Self {
        Self {
            engine,
            fall_timer_ms: 0,
            clear_timer_ms: None,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }

    pub fn phase(&self) -> EnginePhase {
        self.engine.phase()
    }

    pub fn clear_timer_ms(&self) -> Option<u32> {
        self.clear_timer_ms
    }

    pub fn fall_timer_ms(&self) -> u32 {
        self.fall_timer_ms
    }

    pub fn start(&mut self) -> TickResult {
        let result = self.engine.start();
        self.after(&result);
        result
    }

    /// Fresh game with the same configuration; pending timers are cancelled
    pub fn restart(&mut self) -> TickResult {
        self.cancel_timers();
        self.engine.reset();
        self.start()
    }

    /// Garbage from an opponent; applied on the next running tick
    pub fn queue_garbage(&mut self, rows: u32) {
        self.engine.queue_garbage(rows);
    }

    /// Advance the clock by `elapsed_ms`
    pub fn advance(&mut self, elapsed_ms: u32) -> TickResult {
        let mut result = TickResult::new();

        match self.engine.phase() {
            EnginePhase::Clearing => {
                let remaining = self
                    .clear_timer_ms
                    .unwrap_or(0)
                    .saturating_sub(elapsed_ms);
                if remaining > 0 {
                    self.clear_timer_ms = Some(remaining);
                    return result;
                }
                self.clear_timer_ms = None;
                let cleared = self.engine.finish_clear();
                self.after(&cleared);
                result.extend(cleared);
            }
            EnginePhase::Running => {
                self.fall_timer_ms = self.fall_timer_ms.saturating_add(elapsed_ms);
                while self.engine.is_running()
                    && self.fall_timer_ms >= self.engine.current_tick_ms()
                {
                    self.fall_timer_ms -= self.engine.current_tick_ms();
                    let step = self.engine.tick();
                    self.after(&step);
                    result.extend(step);
                }
            }
            EnginePhase::Idle | EnginePhase::Over => {}
        }

        result
    }

    /// Route one input event.
    ///
    /// Everything except restart and releasing soft drop is ignored unless a
    /// piece is falling; input during the clear pause is dropped, not queued.
    pub fn apply_action(&mut self, action: GameAction) -> TickResult {
        if action == GameAction::Restart {
            return self.restart();
        }
        if action == GameAction::SoftDropStop {
            self.engine.set_soft_drop(false);
            return TickResult::new();
        }
        if !self.engine.is_running() {
            return TickResult::new();
        }

        let result = match action {
            GameAction::MoveLeft => self.shift(-1),
            GameAction::MoveRight => self.shift(1),
            GameAction::SoftDropStart => {
                self.engine.set_soft_drop(true);
                TickResult::new()
            }
            GameAction::HardDrop => self.engine.hard_drop(),
            GameAction::SoftDropStop | GameAction::Restart => TickResult::new(),
        };
        self.after(&result);
        result
    }

    fn shift(&mut self, dx: i32) -> TickResult {
        if self.engine.move_horizontal(dx) {
            TickResult::from(EngineEvent::Moved)
        } else {
            TickResult::new()
        }
    }

    /// Keep timers in step with the phase an engine call left behind
    fn after(&mut self, result: &TickResult) {
        match self.engine.phase() {
            EnginePhase::Clearing => {
                // A fresh match (first or chained) restarts the highlight pause.
                if result.matched().is_some() {
                    self.clear_timer_ms = Some(self.engine.config().clear_delay_ms.max(1));
                    self.fall_timer_ms = 0;
                }
            }
            EnginePhase::Running => {
                self.clear_timer_ms = None;
                if result.spawned() {
                    self.fall_timer_ms = 0;
                }
            }
            EnginePhase::Idle | EnginePhase::Over => self.cancel_timers(),
        }
    }

    fn cancel_timers(&mut self) {
        self.fall_timer_ms = 0;
        self.clear_timer_ms = None;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine.snapshot()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.engine.snapshot_into(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, Element, Molecule};

    fn session(pattern: &str) -> GameSession {
        let config = EngineConfig::default().with_custom_pool(vec![Molecule::new("t", pattern)]);
        let mut s = GameSession::new(config).unwrap();
        s.start();
        s
    }

    #[test]
    fn test_fall_timer_drives_ticks() {
        let mut s = session("OOOOOOOO");
        assert!(s.advance(799).is_empty());
        assert_eq!(s.advance(1).events(), &[EngineEvent::Moved]);
        assert_eq!(s.engine().active().unwrap().y, 1);

        // A large step catches up on several rows.
        s.advance(800 * 3);
        assert_eq!(s.engine().active().unwrap().y, 4);
    }

    #[test]
    fn test_clear_pause_freezes_fall_and_input() {
        let mut s = session("CC");
        s.engine_mut().board_mut().set(4, 11, Cell::Carbon);
        s.engine_mut().spawn_element(Element::Carbon);
        s.engine_mut().move_horizontal(-1);

        let drop = s.apply_action(GameAction::HardDrop);
        assert!(drop.matched().is_some());
        assert_eq!(s.phase(), EnginePhase::Clearing);
        assert_eq!(s.clear_timer_ms(), Some(500));

        assert!(s.apply_action(GameAction::MoveLeft).is_empty());
        assert!(s.advance(499).is_empty());
        assert_eq!(s.engine().highlighted().len(), 2);

        let done = s.advance(1);
        assert!(done
            .events()
            .iter()
            .any(|e| matches!(e, EngineEvent::Cleared(_))));
        assert!(s.engine().board().is_row_empty(11));
        assert_eq!(s.phase(), EnginePhase::Running);
        assert_eq!(s.clear_timer_ms(), None);
    }

    #[test]
    fn test_garbage_waits_for_running_tick() {
        let mut s = session("CC");
        s.engine_mut().board_mut().set(4, 11, Cell::Carbon);
        s.engine_mut().spawn_element(Element::Carbon);
        s.engine_mut().move_horizontal(-1);
        s.apply_action(GameAction::HardDrop);
        assert_eq!(s.phase(), EnginePhase::Clearing);

        s.queue_garbage(2);
        s.queue_garbage(1);
        s.advance(100);
        assert_eq!(s.engine().pending_garbage(), 3);
        assert!(s.engine().board().is_row_empty(9));

        s.advance(400); // clear finishes, next piece spawns
        assert_eq!(s.engine().pending_garbage(), 3);

        let tick = s.advance(s.engine().current_tick_ms());
        assert!(tick.events().contains(&EngineEvent::GarbageAdded(3)));
        assert!(!s.engine().board().is_row_empty(9));
    }

    #[test]
    fn test_restart_cancels_clear_timer() {
        let mut s = session("CC");
        s.engine_mut().board_mut().set(4, 11, Cell::Carbon);
        s.engine_mut().spawn_element(Element::Carbon);
        s.engine_mut().move_horizontal(-1);
        s.apply_action(GameAction::HardDrop);
        assert!(s.clear_timer_ms().is_some());

        s.apply_action(GameAction::Restart);
        assert_eq!(s.clear_timer_ms(), None);
        assert_eq!(s.engine().score(), 0);
        assert_eq!(s.phase(), EnginePhase::Running);

        // The stale pause must not clear anything on the new board.
        let result = s.advance(500);
        assert!(!result
            .events()
            .iter()
            .any(|e| matches!(e, EngineEvent::Cleared(_))));
    }

    #[test]
    fn test_game_over_stops_timers() {
        let mut s = session("OOOOOOOO");
        s.engine_mut().board_mut().set(0, 0, Cell::Carbon);
        s.queue_garbage(1);
        let result = s.advance(800);
        assert!(result.game_over().is_some());
        assert_eq!(s.phase(), EnginePhase::Over);
        assert!(s.advance(10_000).is_empty());
        assert!(s.apply_action(GameAction::HardDrop).is_empty());
    }

    #[test]
    fn test_soft_drop_stop_always_accepted() {
        let mut s = session("OOOOOOOO");
        s.apply_action(GameAction::SoftDropStart);
        assert!(s.engine().soft_drop());
        s.apply_action(GameAction::SoftDropStop);
        assert!(!s.engine().soft_drop());
    }
}
