//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, multiplayer adapter).
//!
//! # Board Dimensions
//!
//! Default playfield dimensions:
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 12 rows (indexed 0-11, row 0 at the top)
//! - **Spawn position**: (width / 2, 0)
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep of the terminal runner (~60 FPS) |
//! | `BASE_TICK_MS` | 800 | Fall interval at the start of a game |
//! | `MIN_TICK_MS` | 80 | Fall interval floor after speed boosts |
//! | `CLEAR_HIGHLIGHT_MS` | 500 | Highlight pause before matched cells vanish |
//!
//! # Examples
//!
//! ```
//! use moldrop_types::{Cell, Element, Molecule, BOARD_WIDTH};
//!
//! let cell = Cell::from(Element::Oxygen);
//! assert!(cell.is_atom());
//! assert_eq!(cell.element(), Some(Element::Oxygen));
//!
//! let target = Molecule::new("ethanol", "CCO");
//! assert_eq!(target.atom_count(), 3);
//! assert_eq!(BOARD_WIDTH, 10);
//! ```

/// Board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 12;

/// Game timing constants (in milliseconds)
pub const TICK_MS: u32 = 16;
pub const BASE_TICK_MS: u32 = 800;
pub const MIN_TICK_MS: u32 = 80;
pub const CLEAR_HIGHLIGHT_MS: u32 = 500;

/// Speed multiplier applied per successful clear.
pub const SPEED_BOOST_FACTOR: f64 = 0.9;

/// Maximum rows accepted by a single garbage injection.
pub const MAX_GARBAGE_ROWS: usize = 6;

/// Default cap on automatically chained clears.
pub const DEFAULT_CASCADE_LIMIT: u32 = 8;

/// Oxygen spawn probabilities (before / after the score threshold).
pub const OXYGEN_CHANCE_EARLY: f64 = 0.15;
pub const OXYGEN_CHANCE_LATE: f64 = 0.25;
pub const OXYGEN_SCORE_THRESHOLD: u32 = 4;

/// Atom element that a player can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Carbon,
    Oxygen,
}

impl Element {
    /// Parse an element from its line-notation symbol
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'C' => Some(Element::Carbon),
            'O' => Some(Element::Oxygen),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Carbon => "carbon",
            Element::Oxygen => "oxygen",
        }
    }
}

/// Cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Carbon,
    Oxygen,
    Garbage,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// True for player-placed atoms (not garbage, not empty)
    pub fn is_atom(&self) -> bool {
        matches!(self, Cell::Carbon | Cell::Oxygen)
    }

    pub fn element(&self) -> Option<Element> {
        match self {
            Cell::Carbon => Some(Element::Carbon),
            Cell::Oxygen => Some(Element::Oxygen),
            Cell::Empty | Cell::Garbage => None,
        }
    }

    /// Single-character glyph used by text renderers and snapshots.
    pub fn glyph(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Carbon => 'C',
            Cell::Oxygen => 'O',
            Cell::Garbage => '#',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            '.' => Some(Cell::Empty),
            'C' => Some(Cell::Carbon),
            'O' => Some(Cell::Oxygen),
            '#' => Some(Cell::Garbage),
            _ => None,
        }
    }
}

impl From<Element> for Cell {
    fn from(value: Element) -> Self {
        match value {
            Element::Carbon => Cell::Carbon,
            Element::Oxygen => Cell::Oxygen,
        }
    }
}

/// Board coordinate; x is the column, y the row (0 = top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(&self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }
}

/// Target molecule: a display name plus its line-notation pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Molecule {
    pub name: String,
    pub pattern: String,
}

impl Molecule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Number of atoms the pattern spells out (non-atom characters are ignored)
    pub fn atom_count(&self) -> usize {
        self.pattern
            .chars()
            .filter(|&c| Element::from_symbol(c).is_some())
            .count()
    }
}

/// Player input actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    SoftDropStart,
    SoftDropStop,
    HardDrop,
    Restart,
}

impl GameAction {
    /// Parse action from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdropstart" => Some(GameAction::SoftDropStart),
            "softdropstop" => Some(GameAction::SoftDropStop),
            "harddrop" => Some(GameAction::HardDrop),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDropStart => "softDropStart",
            GameAction::SoftDropStop => "softDropStop",
            GameAction::HardDrop => "hardDrop",
            GameAction::Restart => "restart",
        }
    }
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverCause {
    /// The spawn cell at the top center was occupied.
    SpawnBlocked,
    /// Incoming garbage would have pushed atoms off the top.
    GarbageOverflow,
}

impl GameOverCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverCause::SpawnBlocked => "spawnBlocked",
            GameOverCause::GarbageOverflow => "garbageOverflow",
        }
    }

    /// Player-facing message
    pub fn message(&self) -> &'static str {
        match self {
            GameOverCause::SpawnBlocked => "Game over",
            GameOverCause::GarbageOverflow => "Garbage overflow",
        }
    }
}

/// Engine lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnginePhase {
    #[default]
    Idle,
    Running,
    Clearing,
    Over,
}

impl EnginePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnginePhase::Idle => "idle",
            EnginePhase::Running => "playing",
            EnginePhase::Clearing => "clearing",
            EnginePhase::Over => "over",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(EnginePhase::Idle),
            "playing" => Some(EnginePhase::Running),
            "clearing" => Some(EnginePhase::Clearing),
            "over" => Some(EnginePhase::Over),
            _ => None,
        }
    }
}
