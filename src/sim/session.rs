//! Score, lives, level and the session state machine
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |           |
//!           +--> Over <-+      (Over -> Running via start/restart)
//! ```
//!
//! Calls made in a state where they mean nothing are ignored.

use serde::{Deserialize, Serialize};

use super::catalog::KindSpec;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    /// Lives ran out; frozen until restart
    Over,
}

/// Effect of a click on the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub points_delta: i64,
    pub life_lost: bool,
    /// New level, if this click crossed a threshold
    pub level_up: Option<u32>,
    pub game_over: bool,
}

/// Effect of a critter timing out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryOutcome {
    pub life_lost: bool,
    pub game_over: bool,
}

/// Level reached at `score`: one level per `per_level` points, starting at 1
pub fn level_for_score(score: i64, per_level: i64) -> u32 {
    let per_level = per_level.max(1);
    (score.div_euclid(per_level) + 1).clamp(1, u32::MAX as i64) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    score: i64,
    level: u32,
    lives: i32,
    max_lives: i32,
    status: SessionStatus,
}

impl Session {
    pub fn new(max_lives: i32) -> Self {
        Self {
            score: 0,
            level: 1,
            lives: max_lives,
            max_lives,
            status: SessionStatus::Idle,
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn max_lives(&self) -> i32 {
        self.max_lives
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Back to a fresh, idle session
    pub fn reset(&mut self, max_lives: i32) {
        *self = Self::new(max_lives);
    }

    /// `Idle | Over -> Running`. Starting from `Over` resets first.
    pub fn start(&mut self, max_lives: i32) -> bool {
        match self.status {
            SessionStatus::Running | SessionStatus::Paused => false,
            SessionStatus::Over => {
                self.reset(max_lives);
                self.status = SessionStatus::Running;
                true
            }
            SessionStatus::Idle => {
                self.status = SessionStatus::Running;
                true
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.status = SessionStatus::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        self.status = SessionStatus::Running;
        true
    }

    /// `Running | Paused -> Idle`, keeping the score. `Over` stays `Over`.
    pub fn stop(&mut self) -> bool {
        match self.status {
            SessionStatus::Running | SessionStatus::Paused => {
                self.status = SessionStatus::Idle;
                true
            }
            SessionStatus::Idle | SessionStatus::Over => false,
        }
    }

    /// Score a click on a critter of kind `spec`. Ignored unless running.
    pub fn apply_click(&mut self, spec: &KindSpec, level_up_score: i64) -> Option<ClickOutcome> {
        if self.status != SessionStatus::Running {
            return None;
        }

        let previous_level = self.level;
        self.score += spec.points;
        let life_lost = spec.is_hazard();
        if life_lost {
            self.lives -= 1;
        }

        // Level only ever goes up within a session
        self.level = self
            .level
            .max(level_for_score(self.score, level_up_score));
        let level_up = (self.level > previous_level).then_some(self.level);

        Some(ClickOutcome {
            points_delta: spec.points,
            life_lost,
            level_up,
            game_over: self.check_game_over(),
        })
    }

    /// Apply the timeout of a critter of kind `spec`. Ignored unless running.
    pub fn apply_expiry(&mut self, spec: &KindSpec) -> Option<ExpiryOutcome> {
        if self.status != SessionStatus::Running {
            return None;
        }

        let life_lost = spec.penalizes_miss();
        if life_lost {
            self.lives -= 1;
        }

        Some(ExpiryOutcome {
            life_lost,
            game_over: self.check_game_over(),
        })
    }

    fn check_game_over(&mut self) -> bool {
        if self.lives <= 0 && self.status != SessionStatus::Over {
            self.status = SessionStatus::Over;
            return true;
        }
        false
    }
}
