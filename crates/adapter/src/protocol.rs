//! Protocol module - JSON records exchanged between players
//!
//! Every record here is immutable once published; players never share a live
//! board, only these snapshots.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::GameEngine;
use crate::types::{EnginePhase, Molecule};

/// Milliseconds since the Unix epoch (0 if the clock is before it)
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "clearing")]
    Clearing,
    #[serde(rename = "over")]
    Over,
}

impl From<EnginePhase> for PlayerStatus {
    fn from(value: EnginePhase) -> Self {
        match value {
            EnginePhase::Idle => PlayerStatus::Idle,
            EnginePhase::Running => PlayerStatus::Playing,
            EnginePhase::Clearing => PlayerStatus::Clearing,
            EnginePhase::Over => PlayerStatus::Over,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub name: String,
    pub pattern: String,
}

impl From<&Molecule> for TargetInfo {
    fn from(value: &Molecule) -> Self {
        Self {
            name: value.name.clone(),
            pattern: value.pattern.clone(),
        }
    }
}

/// Per-player state shown to everyone else in the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub player_id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Rows top to bottom: `.` empty, `C`, `O`, `#` garbage
    pub board: Vec<String>,
    pub score: u32,
    pub status: PlayerStatus,
    pub target: TargetInfo,
    pub speed_ratio: f64,
    pub last_update: u64,
}

impl PlayerSnapshot {
    pub fn from_engine(
        player_id: &str,
        username: &str,
        avatar: Option<&str>,
        engine: &GameEngine,
        ts: u64,
    ) -> Self {
        Self {
            player_id: player_id.to_string(),
            username: username.to_string(),
            avatar: avatar.map(str::to_string),
            board: engine.board().to_rows(),
            score: engine.score(),
            status: engine.phase().into(),
            target: engine.target().into(),
            speed_ratio: engine.speed_ratio(),
            last_update: ts,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, PlayerStatus::Playing | PlayerStatus::Clearing)
    }
}

/// One attack: `rows` garbage rows from `from` to `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarbageEvent {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub rows: u32,
    pub ts: u64,
    #[serde(default)]
    pub consumed: bool,
}

/// Offered to the high-score sink when a game ends with points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub username: String,
    pub user_id: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub score: u32,
    pub timestamp: u64,
}

/// Garbage rows sent for clearing a molecule of `atom_count` atoms
pub fn attack_rows(atom_count: usize) -> u32 {
    ((atom_count / 3) as u32).max(1)
}
