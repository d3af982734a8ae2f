//! Rest-break timer
//!
//! After a stretch of play the game is paused for a fixed rest, then play
//! resumes and the stretch starts over. Hiding the page stops the play
//! deadline from firing; the time spent hidden still counts as play.

use serde::Serialize;

use super::engine::GameEngine;
use crate::error::ConfigError;
use crate::settings::RestOptions;

/// Edge reported by [`RestBreak::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RestTransition {
    Started,
    Ended,
}

/// Snapshot for the overlay and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestStats {
    /// Play time since the current stretch began (ms)
    pub elapsed_ms: u64,
    /// Play time left before the next rest (ms)
    pub remaining_ms: u64,
    pub resting: bool,
    pub play_limit_ms: u64,
    pub rest_duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct RestBreak {
    options: RestOptions,
    play_started: Option<u64>,
    /// Armed play deadline, absent while suspended or resting
    play_deadline: Option<u64>,
    /// End of the current rest
    rest_ends: Option<u64>,
}

impl RestBreak {
    /// Build an idle timer. Fails on zero-length play or rest.
    pub fn new(options: RestOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            options,
            play_started: None,
            play_deadline: None,
            rest_ends: None,
        })
    }

    pub fn options(&self) -> &RestOptions {
        &self.options
    }

    pub fn is_resting(&self) -> bool {
        self.rest_ends.is_some()
    }

    /// Start the play stretch. No-op while a deadline is already armed.
    pub fn start(&mut self, now: u64) {
        if self.play_deadline.is_some() || self.is_resting() {
            return;
        }
        self.play_started = Some(now);
        self.play_deadline = Some(now + self.options.play_limit_ms);
        log::debug!("Rest break armed for {}ms", self.options.play_limit_ms);
    }

    /// Page hidden: keep the stretch but stop the deadline from firing
    pub fn suspend(&mut self) {
        self.play_deadline = None;
    }

    /// Page visible again: re-arm for what is left of the stretch.
    /// Starts the rest at once when nothing is left.
    pub fn unsuspend(&mut self, now: u64) -> Option<RestTransition> {
        if self.is_resting() {
            return None;
        }
        let started = self.play_started?;
        let remaining = self.remaining_at(started, now);
        if remaining > 0 {
            self.play_deadline = Some(now + remaining);
            None
        } else {
            self.begin_rest(now)
        }
    }

    /// Rest right now, whatever is left of the stretch
    pub fn force_rest(&mut self, now: u64) -> Option<RestTransition> {
        self.begin_rest(now)
    }

    /// Check the clock. Reports at most one edge per call.
    pub fn update(&mut self, now: u64) -> Option<RestTransition> {
        if let Some(ends) = self.rest_ends {
            if now < ends {
                return None;
            }
            self.rest_ends = None;
            log::info!("Rest over, back to the game");
            self.start(ends);
            return Some(RestTransition::Ended);
        }

        match self.play_deadline {
            Some(deadline) if now >= deadline => self.begin_rest(deadline),
            _ => None,
        }
    }

    /// Apply every edge due at `now` to `engine`: pause on rest start,
    /// resume on rest end.
    pub fn drive(&mut self, now: u64, engine: &mut GameEngine) -> Vec<RestTransition> {
        let mut transitions = Vec::new();
        while let Some(transition) = self.update(now) {
            match transition {
                RestTransition::Started => engine.pause(),
                RestTransition::Ended => engine.resume(),
            }
            transitions.push(transition);
        }
        transitions
    }

    /// Whole seconds left in the current rest, rounded up; 0 when playing
    pub fn seconds_left(&self, now: u64) -> u64 {
        self.rest_ends
            .map_or(0, |ends| ends.saturating_sub(now).div_ceil(1000))
    }

    /// Fraction of the current rest already served, in `0.0..=1.0`
    pub fn progress(&self, now: u64) -> f32 {
        let Some(ends) = self.rest_ends else {
            return 0.0;
        };
        let left = ends.saturating_sub(now).min(self.options.rest_duration_ms);
        1.0 - left as f32 / self.options.rest_duration_ms as f32
    }

    pub fn stats(&self, now: u64) -> RestStats {
        let elapsed_ms = self
            .play_started
            .map_or(0, |started| now.saturating_sub(started));
        RestStats {
            elapsed_ms,
            remaining_ms: self.options.play_limit_ms.saturating_sub(elapsed_ms),
            resting: self.is_resting(),
            play_limit_ms: self.options.play_limit_ms,
            rest_duration_ms: self.options.rest_duration_ms,
        }
    }

    /// Disarm everything
    pub fn cleanup(&mut self) {
        self.play_started = None;
        self.play_deadline = None;
        self.rest_ends = None;
    }

    fn remaining_at(&self, started: u64, now: u64) -> u64 {
        self.options
            .play_limit_ms
            .saturating_sub(now.saturating_sub(started))
    }

    fn begin_rest(&mut self, at: u64) -> Option<RestTransition> {
        if self.is_resting() {
            return None;
        }
        self.play_deadline = None;
        self.rest_ends = Some(at + self.options.rest_duration_ms);
        log::info!("Time for a {}s rest", self.options.rest_duration_ms / 1000);
        Some(RestTransition::Started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameOptions;
    use crate::sim::session::SessionStatus;

    fn quick() -> RestBreak {
        RestBreak::new(RestOptions::quick()).unwrap()
    }

    #[test]
    fn test_rejects_zero_rest() {
        let options = RestOptions {
            rest_duration_ms: 0,
            ..RestOptions::quick()
        };
        assert!(matches!(
            RestBreak::new(options),
            Err(ConfigError::ZeroDuration { name: "rest_duration_ms" })
        ));
    }

    #[test]
    fn test_rest_starts_after_play_limit_and_ends_after_rest() {
        let mut rest = quick();
        rest.start(0);
        assert_eq!(rest.update(9_999), None);
        assert_eq!(rest.update(10_000), Some(RestTransition::Started));
        assert!(rest.is_resting());
        assert_eq!(rest.seconds_left(10_000), 5);
        assert_eq!(rest.seconds_left(12_500), 3);
        assert_eq!(rest.update(14_999), None);
        assert_eq!(rest.update(15_000), Some(RestTransition::Ended));
        assert!(!rest.is_resting());

        // Play stretch starts over from the end of the rest
        assert_eq!(rest.update(24_999), None);
        assert_eq!(rest.update(25_000), Some(RestTransition::Started));
    }

    #[test]
    fn test_start_is_noop_when_armed() {
        let mut rest = quick();
        rest.start(0);
        rest.start(5_000);
        assert_eq!(rest.update(10_000), Some(RestTransition::Started));
    }

    #[test]
    fn test_suspend_holds_deadline_but_time_still_counts() {
        let mut rest = quick();
        rest.start(0);
        rest.suspend();
        assert_eq!(rest.update(12_000), None);

        let mut back_early = rest.clone();
        assert_eq!(back_early.unsuspend(4_000), None);
        assert_eq!(back_early.update(9_999), None);
        assert_eq!(back_early.update(10_000), Some(RestTransition::Started));

        assert_eq!(rest.unsuspend(12_000), Some(RestTransition::Started));
        assert_eq!(rest.seconds_left(12_000), 5);
    }

    #[test]
    fn test_unsuspend_before_start_or_while_resting_is_noop() {
        let mut rest = quick();
        assert_eq!(rest.unsuspend(1_000), None);
        assert_eq!(rest.update(100_000), None);

        rest.start(0);
        rest.force_rest(1_000);
        assert_eq!(rest.unsuspend(2_000), None);
        assert_eq!(rest.force_rest(2_000), None);
        assert_eq!(rest.update(6_000), Some(RestTransition::Ended));
    }

    #[test]
    fn test_progress_and_stats() {
        let mut rest = quick();
        assert_eq!(rest.stats(0).remaining_ms, 10_000);
        rest.start(1_000);
        let stats = rest.stats(4_000);
        assert_eq!(stats.elapsed_ms, 3_000);
        assert_eq!(stats.remaining_ms, 7_000);
        assert!(!stats.resting);
        assert_eq!(rest.progress(4_000), 0.0);

        rest.force_rest(4_000);
        assert!(rest.stats(4_000).resting);
        assert!((rest.progress(6_500) - 0.5).abs() < 1e-6);
        assert_eq!(rest.seconds_left(8_999), 1);
    }

    #[test]
    fn test_cleanup_disarms() {
        let mut rest = quick();
        rest.start(0);
        rest.force_rest(100);
        rest.cleanup();
        assert!(!rest.is_resting());
        assert_eq!(rest.update(1_000_000), None);
        assert_eq!(rest.stats(50).elapsed_ms, 0);
    }

    #[test]
    fn test_drive_pauses_and_resumes_engine() {
        let mut engine = GameEngine::new(GameOptions::default(), 9).unwrap();
        let mut rest = quick();
        engine.start();
        rest.start(0);

        engine.advance_to(10_000);
        assert_eq!(rest.drive(10_000, &mut engine), vec![RestTransition::Started]);
        assert_eq!(engine.status(), SessionStatus::Paused);

        engine.advance_to(12_000);
        assert!(rest.drive(12_000, &mut engine).is_empty());

        engine.advance_to(15_000);
        assert_eq!(rest.drive(15_000, &mut engine), vec![RestTransition::Ended]);
        assert_eq!(engine.status(), SessionStatus::Running);
    }
}
