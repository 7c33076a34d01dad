//! Player session - one player's game wired to the shared bus
//!
//! Each call to [`PlayerSession::advance`] or [`PlayerSession::apply_action`]:
//!
//! 1. pulls garbage addressed to this player (consumed on read),
//! 2. runs the game,
//! 3. sends an attack for every match when opponents are present,
//! 4. offers the score to the high-score sink on game over,
//! 5. republishes this player's snapshot if anything happened.

use std::sync::Arc;

use log::{debug, warn};

use crate::bus::SharedStateBus;
use crate::core::{GameSession, TickResult};
use crate::protocol::{attack_rows, now_ms, HighScoreEntry, PlayerSnapshot};
use crate::types::{GameAction, GameOverCause};

/// External high-score submission; returns true for a new top score
pub trait HighScoreSink {
    fn submit(&mut self, entry: &HighScoreEntry) -> bool;
}

impl<F> HighScoreSink for F
where
    F: FnMut(&HighScoreEntry) -> bool,
{
    fn submit(&mut self, entry: &HighScoreEntry) -> bool {
        self(entry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
}

impl PlayerProfile {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// How the last game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub cause: GameOverCause,
    pub score: u32,
    pub new_high_score: bool,
}

impl GameOverReport {
    pub fn message(&self) -> String {
        if self.new_high_score {
            format!("New high score: {}!", self.score)
        } else {
            format!("{} - score {}", self.cause.message(), self.score)
        }
    }
}

pub struct PlayerSession {
    profile: PlayerProfile,
    session: GameSession,
    bus: Arc<SharedStateBus>,
    high_scores: Option<Box<dyn HighScoreSink + Send>>,
    last_report: Option<GameOverReport>,
}

impl PlayerSession {
    pub fn new(profile: PlayerProfile, session: GameSession, bus: Arc<SharedStateBus>) -> Self {
        Self {
            profile,
            session,
            bus,
            high_scores: None,
            last_report: None,
        }
    }

    pub fn with_high_score_sink(mut self, sink: impl HighScoreSink + Send + 'static) -> Self {
        self.high_scores = Some(Box::new(sink));
        self
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn game_over_report(&self) -> Option<&GameOverReport> {
        self.last_report.as_ref()
    }

    pub fn start(&mut self) -> TickResult {
        let result = self.session.start();
        self.publish();
        result
    }

    pub fn advance(&mut self, elapsed_ms: u32) -> TickResult {
        let incoming = self.bus.take_garbage(&self.profile.id);
        if incoming > 0 {
            debug!("{} receives {} garbage rows", self.profile.id, incoming);
            self.session.queue_garbage(incoming);
        }

        let result = self.session.advance(elapsed_ms);
        self.handle(&result);
        result
    }

    pub fn apply_action(&mut self, action: GameAction) -> TickResult {
        if action == GameAction::Restart {
            self.last_report = None;
        }
        let result = self.session.apply_action(action);
        self.handle(&result);
        if action == GameAction::Restart {
            self.publish();
        }
        result
    }

    fn handle(&mut self, result: &TickResult) {
        for candidate in result.matches() {
            self.attack(candidate.atom_count());
        }

        if let Some(cause) = result.game_over() {
            self.report(cause);
        }

        if !result.is_empty() {
            self.publish();
        }
    }

    /// Opponent with the highest score still in play; lowest id on ties
    pub fn attack_target(&self) -> Option<String> {
        self.bus
            .players()
            .into_iter()
            .filter(|p| p.player_id != self.profile.id && p.is_active())
            .max_by(|a, b| {
                a.score
                    .cmp(&b.score)
                    .then_with(|| b.player_id.cmp(&a.player_id))
            })
            .map(|p| p.player_id)
    }

    fn attack(&mut self, atom_count: usize) {
        let Some(target) = self.attack_target() else {
            return;
        };
        let rows = attack_rows(atom_count);
        debug!("{} attacks {} with {} rows", self.profile.id, target, rows);
        self.bus.send_garbage(&self.profile.id, &target, rows);
    }

    fn report(&mut self, cause: GameOverCause) {
        let score = self.session.engine().score();
        let mut new_high_score = false;

        if score > 0 {
            if let Some(sink) = self.high_scores.as_mut() {
                let entry = HighScoreEntry {
                    username: self.profile.username.clone(),
                    user_id: self.profile.id.clone(),
                    avatar: self.profile.avatar.clone(),
                    score,
                    timestamp: now_ms(),
                };
                new_high_score = sink.submit(&entry);
            }
        }

        self.last_report = Some(GameOverReport {
            cause,
            score,
            new_high_score,
        });
    }

    /// Broadcast this player's current state
    pub fn publish(&self) {
        let snapshot = PlayerSnapshot::from_engine(
            &self.profile.id,
            &self.profile.username,
            self.profile.avatar.as_deref(),
            self.session.engine(),
            now_ms(),
        );
        if let Err(e) = self.bus.publish_snapshot(&snapshot) {
            warn!("snapshot for {} not published: {}", self.profile.id, e);
        }
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("profile", &self.profile)
            .field("phase", &self.session.phase())
            .field("last_report", &self.last_report)
            .finish()
    }
}
