use crate::game_state::{ActivePiece, GameEngine};
use crate::types::{Cell, Coord, Element, EnginePhase, GameOverCause, Molecule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub element: Element,
    pub x: i32,
    pub y: i32,
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            element: value.element,
            x: value.x,
            y: value.y,
        }
    }
}

/// Read-only view of one game for renderers and broadcasters
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major cells, top row first
    pub board: Vec<Cell>,
    pub active: Option<ActiveSnapshot>,
    pub score: u32,
    pub target: Molecule,
    pub speed_ratio: f64,
    pub current_tick_ms: u32,
    pub highlighted: Vec<Coord>,
    pub phase: EnginePhase,
    pub game_over: Option<GameOverCause>,
    pub pending_garbage: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.board.clear();
        self.active = None;
        self.score = 0;
        self.target = Molecule::new("", "");
        self.speed_ratio = 1.0;
        self.current_tick_ms = 0;
        self.highlighted.clear();
        self.phase = EnginePhase::Idle;
        self.game_over = None;
        self.pending_garbage = 0;
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.board.get(y * self.width + x).copied()
    }

    pub fn is_highlighted(&self, x: usize, y: usize) -> bool {
        self.highlighted
            .iter()
            .any(|c| c.x == x as i32 && c.y == y as i32)
    }

    /// Board rows as glyph strings (`.`, `C`, `O`, `#`)
    pub fn rows(&self) -> Vec<String> {
        self.board
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(Cell::glyph).collect())
            .collect()
    }

    pub fn playable(&self) -> bool {
        self.phase == EnginePhase::Running
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            board: Vec::new(),
            active: None,
            score: 0,
            target: Molecule::new("", ""),
            speed_ratio: 1.0,
            current_tick_ms: 0,
            highlighted: Vec::new(),
            phase: EnginePhase::Idle,
            game_over: None,
            pending_garbage: 0,
        }
    }
}

impl GameEngine {
    /// Fill `out` in place, reusing its buffers
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        let board = self.board();
        out.width = board.width();
        out.height = board.height();
        out.board.clear();
        out.board.extend_from_slice(board.cells());
        out.active = self.active().map(ActiveSnapshot::from);
        out.score = self.score();
        let target = self.target();
        out.target.name.clone_from(&target.name);
        out.target.pattern.clone_from(&target.pattern);
        out.speed_ratio = self.speed_ratio();
        out.current_tick_ms = self.current_tick_ms();
        out.highlighted.clear();
        out.highlighted.extend_from_slice(self.highlighted());
        out.phase = self.phase();
        out.game_over = self.game_over_cause();
        out.pending_garbage = self.pending_garbage();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_snapshot_reflects_engine() {
        let mut engine = GameEngine::new(EngineConfig::default().with_size(4, 3)).unwrap();
        engine.start();
        engine.board_mut().set(0, 2, Cell::Garbage);

        let snap = engine.snapshot();
        assert_eq!((snap.width, snap.height), (4, 3));
        assert_eq!(snap.cell(0, 2), Some(Cell::Garbage));
        assert_eq!(snap.cell(4, 0), None);
        assert_eq!(snap.rows(), vec!["....", "....", "#..."]);
        assert_eq!(snap.active.map(|a| (a.x, a.y)), Some((2, 0)));
        assert_eq!(snap.phase, EnginePhase::Running);
        assert!(snap.playable());
        assert!(snap.highlighted.is_empty());
    }

    #[test]
    fn test_snapshot_into_reuses_buffer() {
        let engine = GameEngine::new(EngineConfig::default()).unwrap();
        let mut snap = GameSnapshot::default();
        engine.snapshot_into(&mut snap);
        engine.snapshot_into(&mut snap);
        assert_eq!(snap.board.len(), 120);
        assert_eq!(snap.target, *engine.target());
    }
}
