//! Game engine module - owns the board and drives the spawn/fall/lock/match cycle
//!
//! Every public operation returns a [`TickResult`] (or a plain bool for
//! simple moves) describing what happened; nothing here panics or returns an
//! error once the engine is constructed. Timing (fall interval, the highlight
//! pause before a clear) lives one layer up in [`GameSession`](crate::GameSession).
//!
//! Phase transitions:
//!
//! ```text
//! Idle --start--> Running --lock+match--> Clearing --finish_clear--> Running
//!                    |                        |   \--chained match--> Clearing
//!                    +--spawn blocked / garbage overflow--> Over
//! ```

use log::{debug, info, warn};

use crate::board::Board;
use crate::config::{ConfigError, EngineConfig};
use crate::matcher::{find_best_match, MatchCandidate};
use crate::pattern::PatternGraph;
use crate::rng::SimpleRng;
use crate::selector::TargetSelector;
use crate::types::*;

/// The single falling atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub element: Element,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Something observable that an engine operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Active piece moved down one row
    Moved,
    /// Active piece was written into the board
    Locked(Coord),
    /// A new active piece appeared at the top
    Spawned(ActivePiece),
    /// Target found on the board; its cells are highlighted until cleared
    Matched(MatchCandidate),
    /// Matched cells were removed and gravity applied
    Cleared(MatchCandidate),
    /// Garbage rows were pushed in from the bottom
    GarbageAdded(usize),
    TargetChanged(Molecule),
    GameOver(GameOverCause),
}

/// Events produced by one engine operation, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickResult {
    events: Vec<EngineEvent>,
}

impl TickResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: TickResult) {
        self.events.extend(other.events);
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<EngineEvent> {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Last match reported in this result
    pub fn matched(&self) -> Option<&MatchCandidate> {
        self.events.iter().rev().find_map(|e| match e {
            EngineEvent::Matched(m) => Some(m),
            _ => None,
        })
    }

    /// All matches reported in this result, oldest first
    pub fn matches(&self) -> impl Iterator<Item = &MatchCandidate> {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::Matched(m) => Some(m),
            _ => None,
        })
    }

    pub fn game_over(&self) -> Option<GameOverCause> {
        self.events.iter().find_map(|e| match e {
            EngineEvent::GameOver(cause) => Some(*cause),
            _ => None,
        })
    }

    pub fn locked(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, EngineEvent::Locked(_)))
    }

    pub fn spawned(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, EngineEvent::Spawned(_)))
    }
}

impl From<EngineEvent> for TickResult {
    fn from(event: EngineEvent) -> Self {
        Self {
            events: vec![event],
        }
    }
}

/// Complete engine state for one game instance
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: EngineConfig,
    board: Board,
    active: Option<ActivePiece>,
    score: u32,
    target: Molecule,
    target_graph: PatternGraph,
    selector: TargetSelector,
    rng: SimpleRng,
    phase: EnginePhase,
    over_cause: Option<GameOverCause>,
    soft_drop: bool,
    current_tick_ms: u32,
    /// Garbage rows received but not yet applied
    pending_garbage: u32,
    /// Match waiting for its highlight to finish
    pending_match: Option<MatchCandidate>,
    /// Clears chained since the last player lock
    cascade_depth: u32,
}

impl GameEngine {
    /// Create an idle engine; call [`GameEngine::start`] to spawn the first piece
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let selector = TargetSelector::builtin().with_custom_pool(config.custom_pool.clone());
        let mut rng = SimpleRng::new(config.seed);
        let target = selector.select(0, None, &mut rng);
        let target_graph = PatternGraph::parse(&target.pattern);

        Ok(Self {
            board: Board::new(config.width, config.height),
            active: None,
            score: 0,
            target,
            target_graph,
            selector,
            rng,
            phase: EnginePhase::Idle,
            over_cause: None,
            soft_drop: false,
            current_tick_ms: config.base_tick_ms,
            pending_garbage: 0,
            pending_match: None,
            cascade_depth: 0,
            config,
        })
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) -> TickResult {
        if self.phase != EnginePhase::Idle {
            return TickResult::new();
        }
        self.phase = EnginePhase::Running;
        self.spawn()
    }

    /// Back to a fresh idle game; configuration is kept
    pub fn reset(&mut self) {
        info!("reset (final score {})", self.score);
        self.board = Board::new(self.config.width, self.config.height);
        self.active = None;
        self.score = 0;
        self.phase = EnginePhase::Idle;
        self.over_cause = None;
        self.soft_drop = false;
        self.current_tick_ms = self.config.base_tick_ms;
        self.pending_garbage = 0;
        self.pending_match = None;
        self.cascade_depth = 0;
        let next = self.selector.select(0, None, &mut self.rng);
        self.set_target(next);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for scripted setups (tests, puzzles)
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target(&self) -> &Molecule {
        &self.target
    }

    pub fn target_graph(&self) -> &PatternGraph {
        &self.target_graph
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == EnginePhase::Running
    }

    pub fn game_over_cause(&self) -> Option<GameOverCause> {
        self.over_cause
    }

    pub fn soft_drop(&self) -> bool {
        self.soft_drop
    }

    pub fn base_tick_ms(&self) -> u32 {
        self.config.base_tick_ms
    }

    pub fn current_tick_ms(&self) -> u32 {
        self.current_tick_ms
    }

    /// `base / current`; 1.0 at the start of a game, growing as it speeds up
    pub fn speed_ratio(&self) -> f64 {
        self.config.base_tick_ms as f64 / self.current_tick_ms.max(1) as f64
    }

    pub fn pending_garbage(&self) -> u32 {
        self.pending_garbage
    }

    pub fn pending_match(&self) -> Option<&MatchCandidate> {
        self.pending_match.as_ref()
    }

    /// Cells highlighted while a clear is pending
    pub fn highlighted(&self) -> &[Coord] {
        self.pending_match
            .as_ref()
            .map(MatchCandidate::coords)
            .unwrap_or(&[])
    }

    /// Replace the target without re-checking the board
    pub fn set_target(&mut self, target: Molecule) {
        self.target_graph = PatternGraph::parse(&target.pattern);
        self.target = target;
    }

    /// Put a new random atom at the top center
    pub fn spawn(&mut self) -> TickResult {
        let oxygen_chance = if self.score >= OXYGEN_SCORE_THRESHOLD {
            OXYGEN_CHANCE_LATE
        } else {
            OXYGEN_CHANCE_EARLY
        };
        let element = if self.rng.chance(oxygen_chance) {
            Element::Oxygen
        } else {
            Element::Carbon
        };

        self.spawn_element(element)
    }

    /// Put a specific atom at the top center.
    ///
    /// Ends the game when that cell is already occupied.
    pub fn spawn_element(&mut self, element: Element) -> TickResult {
        let x = (self.board.width() / 2) as i32;
        if self.board.is_occupied(x, 0) {
            return self.end_game(GameOverCause::SpawnBlocked);
        }

        let piece = ActivePiece { element, x, y: 0 };
        self.active = Some(piece);
        EngineEvent::Spawned(piece).into()
    }

    /// One gravity step (two while soft-dropping).
    ///
    /// Queued garbage is applied first, in a single injection.
    pub fn tick(&mut self) -> TickResult {
        let mut result = TickResult::new();
        if self.phase != EnginePhase::Running {
            return result;
        }

        if self.pending_garbage > 0 {
            let rows = std::mem::take(&mut self.pending_garbage);
            result.extend(self.receive_garbage(rows as usize));
            if self.phase != EnginePhase::Running {
                return result;
            }
        }

        let steps = if self.soft_drop { 2 } else { 1 };
        for _ in 0..steps {
            let Some(piece) = self.active else {
                break;
            };
            if self.board.is_valid(piece.x, piece.y + 1) {
                self.active = Some(ActivePiece {
                    y: piece.y + 1,
                    ..piece
                });
                result.push(EngineEvent::Moved);
            } else {
                result.extend(self.lock_piece());
                break;
            }
        }

        result
    }

    /// Drop the active piece as far as it goes and lock it
    pub fn hard_drop(&mut self) -> TickResult {
        if self.phase != EnginePhase::Running {
            return TickResult::new();
        }
        let Some(mut piece) = self.active else {
            return TickResult::new();
        };

        while self.board.is_valid(piece.x, piece.y + 1) {
            piece.y += 1;
        }
        self.active = Some(piece);
        self.lock_piece()
    }

    /// Shift the active piece one column; false if blocked or not playing
    pub fn move_horizontal(&mut self, dx: i32) -> bool {
        if self.phase != EnginePhase::Running {
            return false;
        }
        let Some(piece) = self.active else {
            return false;
        };

        let x = piece.x + dx.signum();
        if !self.board.is_valid(x, piece.y) {
            return false;
        }
        self.active = Some(ActivePiece { x, ..piece });
        true
    }

    /// Engage or release soft drop. Engaging is refused outside `Running`.
    pub fn set_soft_drop(&mut self, on: bool) -> bool {
        if on && self.phase != EnginePhase::Running {
            return false;
        }
        self.soft_drop = on;
        true
    }

    /// Write the active piece into the board and look for the target
    fn lock_piece(&mut self) -> TickResult {
        let Some(piece) = self.active.take() else {
            return TickResult::new();
        };

        self.board.set(piece.x, piece.y, Cell::from(piece.element));
        let mut result = TickResult::from(EngineEvent::Locked(piece.coord()));

        self.cascade_depth = 0;
        match find_best_match(&self.target_graph, &self.board) {
            Some(candidate) => result.push(self.register_match(candidate)),
            None => result.extend(self.spawn()),
        }
        result
    }

    fn register_match(&mut self, candidate: MatchCandidate) -> EngineEvent {
        debug!(
            "matched {} at {} (score {})",
            self.target.name,
            candidate.signature(),
            self.score + 1
        );
        self.score += 1;
        self.boost_speed(1);
        self.phase = EnginePhase::Clearing;
        self.soft_drop = false;
        self.pending_match = Some(candidate.clone());
        EngineEvent::Matched(candidate)
    }

    /// Remove the matched atoms and let every column settle
    pub fn clear_match(&mut self, candidate: &MatchCandidate) {
        self.board.clear_cells(candidate.coords());
        self.board.apply_gravity();
    }

    /// Resolve the pending match once its highlight is over.
    ///
    /// Clears the cells, picks the next target and either chains another
    /// match or spawns the next piece.
    pub fn finish_clear(&mut self) -> TickResult {
        if self.phase != EnginePhase::Clearing {
            return TickResult::new();
        }
        let Some(candidate) = self.pending_match.take() else {
            self.phase = EnginePhase::Running;
            return self.spawn();
        };

        self.clear_match(&candidate);
        let mut result = TickResult::from(EngineEvent::Cleared(candidate));
        result.extend(self.pick_new_target());
        result
    }

    /// Choose the next target and check the board against it right away
    pub fn pick_new_target(&mut self) -> TickResult {
        let previous = self.target.name.clone();
        let next = self
            .selector
            .select(self.score, Some(previous.as_str()), &mut self.rng);
        debug!("new target {} ({})", next.name, next.pattern);
        self.set_target(next.clone());

        let mut result = TickResult::from(EngineEvent::TargetChanged(next));
        if matches!(self.phase, EnginePhase::Idle | EnginePhase::Over) {
            return result;
        }

        // A falling piece keeps falling; the match is found when it locks.
        if self.active.is_some() {
            return result;
        }

        if self.cascade_depth < self.config.cascade_limit {
            if let Some(candidate) = find_best_match(&self.target_graph, &self.board) {
                self.cascade_depth += 1;
                result.push(self.register_match(candidate));
                return result;
            }
        } else {
            debug!("cascade limit {} reached", self.config.cascade_limit);
        }

        self.cascade_depth = 0;
        self.phase = EnginePhase::Running;
        result.extend(self.spawn());
        result
    }

    /// Scale the fall interval by `0.9^n`, never below [`MIN_TICK_MS`]
    /// and never above the configured base
    pub fn boost_speed(&mut self, n: u32) {
        let scaled = (self.current_tick_ms as f64 * SPEED_BOOST_FACTOR.powi(n as i32)).floor();
        let floor = MIN_TICK_MS.min(self.config.base_tick_ms);
        self.current_tick_ms = (scaled as u32).max(floor).min(self.current_tick_ms);
    }

    /// Push up to [`MAX_GARBAGE_ROWS`] garbage rows in from the bottom.
    ///
    /// Refuses without touching the board when any of the top `count` rows
    /// holds something. Each new row has one random open column.
    pub fn add_garbage_rows(&mut self, count: usize) -> bool {
        let count = self.garbage_row_cap(count);
        if count == 0 {
            return true;
        }
        if (0..count).any(|y| !self.board.is_row_empty(y)) {
            return false;
        }

        let width = self.board.width();
        let gaps: Vec<usize> = (0..count)
            .map(|_| self.rng.pick_index(width).unwrap_or(0))
            .collect();
        self.board.push_garbage_rows(&gaps);

        if let Some(piece) = self.active {
            self.active = Some(ActivePiece {
                y: (piece.y - count as i32).max(0),
                ..piece
            });
        }
        true
    }

    /// Rows a single injection of `count` actually adds
    fn garbage_row_cap(&self, count: usize) -> usize {
        count.min(MAX_GARBAGE_ROWS).min(self.board.height())
    }

    /// Apply incoming garbage now; overflow ends the game
    pub fn receive_garbage(&mut self, rows: usize) -> TickResult {
        let applied = self.garbage_row_cap(rows);
        if !self.add_garbage_rows(rows) {
            warn!("garbage overflow ({} rows)", applied);
            return self.end_game(GameOverCause::GarbageOverflow);
        }

        // A piece pinned against the ceiling can end up inside the new stack.
        if let Some(piece) = self.active {
            if self.board.is_occupied(piece.x, piece.y) {
                warn!("garbage pushed the stack into the falling piece");
                return self.end_game(GameOverCause::GarbageOverflow);
            }
        }
        EngineEvent::GarbageAdded(applied).into()
    }

    /// Queue garbage to be applied on the next running tick
    pub fn queue_garbage(&mut self, rows: u32) {
        if self.phase == EnginePhase::Over {
            return;
        }
        self.pending_garbage = self.pending_garbage.saturating_add(rows);
    }

    /// Enter the terminal state
    pub fn end_game(&mut self, cause: GameOverCause) -> TickResult {
        info!("game over: {} (score {})", cause.as_str(), self.score);
        self.phase = EnginePhase::Over;
        self.over_cause = Some(cause);
        self.active = None;
        self.soft_drop = false;
        self.pending_garbage = 0;
        self.pending_match = None;
        EngineEvent::GameOver(cause).into()
    }
}
