//! Soft-drop tracking for terminals that may not report key releases
//!
//! Some terminals never send `Release` events. Holding a key there shows up
//! as a stream of auto-repeat presses, so soft drop is treated as released
//! once no down press has arrived for [`SOFT_DROP_GRACE_MS`]. Callers feed the
//! game's soft-drop flag back through [`SoftDropLatch::sync`] every frame.

use crate::types::GameAction;

/// Longer than a typical terminal auto-repeat interval
pub const SOFT_DROP_GRACE_MS: u32 = 150;

#[derive(Debug, Clone)]
pub struct SoftDropLatch {
    held: bool,
    since_press_ms: u32,
    grace_ms: u32,
}

impl SoftDropLatch {
    pub fn new() -> Self {
        Self::with_grace(SOFT_DROP_GRACE_MS)
    }

    pub fn with_grace(grace_ms: u32) -> Self {
        Self {
            held: false,
            since_press_ms: 0,
            grace_ms,
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Filter a mapped action.
    ///
    /// Repeated soft-drop presses only refresh the latch; a stop is passed on
    /// only if soft drop was active.
    pub fn filter(&mut self, action: GameAction) -> Option<GameAction> {
        match action {
            GameAction::SoftDropStart => {
                self.since_press_ms = 0;
                if self.held {
                    None
                } else {
                    self.held = true;
                    Some(action)
                }
            }
            GameAction::SoftDropStop => self.release(),
            GameAction::Restart => {
                self.held = false;
                Some(action)
            }
            _ => Some(action),
        }
    }

    /// Follow the game's own soft-drop flag.
    ///
    /// The game drops soft drop on its own after a match, and ignores a start
    /// while no piece is falling. Releasing the latch then lets the next
    /// auto-repeat press through again.
    pub fn sync(&mut self, soft_drop_active: bool) {
        if self.held && !soft_drop_active {
            self.held = false;
            self.since_press_ms = 0;
        }
    }

    /// Advance the latch clock; returns a stop once the grace period runs out
    pub fn update(&mut self, elapsed_ms: u32) -> Option<GameAction> {
        if !self.held {
            return None;
        }
        self.since_press_ms = self.since_press_ms.saturating_add(elapsed_ms);
        if self.since_press_ms > self.grace_ms {
            self.release()
        } else {
            None
        }
    }

    fn release(&mut self) -> Option<GameAction> {
        if !self.held {
            return None;
        }
        self.held = false;
        self.since_press_ms = 0;
        Some(GameAction::SoftDropStop)
    }
}

impl Default for SoftDropLatch {
    fn default() -> Self {
        Self::new()
    }
}
