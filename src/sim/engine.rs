//! Game engine: wires the scheduler to the session
//!
//! The engine runs on a virtual millisecond clock driven by the platform
//! layer through [`GameEngine::advance_to`]. All deferred work fires from
//! there, one action at a time, with the clock set to the action's due time.
//! Presentation reads [`GameStats`] and drains [`GameEvent`]s; it never
//! touches scheduler state directly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::catalog::{EntityCatalog, EntityKind};
use super::difficulty::DifficultyModel;
use super::entity::{EntityId, EntityInstance};
use super::scheduler::{SpawnContext, SpawnScheduler, TimerAction};
use super::session::{Session, SessionStatus};
use crate::consts::*;
use crate::error::ConfigError;
use crate::settings::{GameOptions, OptionsPatch};

/// Why a critter left the play area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalReason {
    /// Clicked (points applied, possibly negative)
    Scored,
    /// Timed out
    Missed,
    /// Swept away by stop, restart or game over
    Cleared,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Spawned {
        id: EntityId,
        kind: EntityKind,
        variant: &'static str,
        points: i64,
        position: Vec2,
    },
    Removed {
        id: EntityId,
        reason: RemovalReason,
        points_delta: i64,
    },
    LifeLost {
        lives: i32,
    },
    LevelUp {
        level: u32,
    },
    GameOver {
        final_score: i64,
        final_level: u32,
    },
}

impl GameEvent {
    /// True for removals caused by a click
    pub fn was_scored(&self) -> bool {
        matches!(
            self,
            GameEvent::Removed {
                reason: RemovalReason::Scored,
                ..
            }
        )
    }
}

/// Read-only snapshot for HUDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub score: i64,
    pub level: u32,
    pub lives: i32,
    pub max_lives: i32,
    pub active_entities: usize,
    pub status: SessionStatus,
}

pub struct GameEngine {
    options: GameOptions,
    catalog: EntityCatalog,
    difficulty: DifficultyModel,
    session: Session,
    scheduler: SpawnScheduler,
    rng: Pcg32,
    play_area: Vec2,
    /// Virtual clock (ms)
    now: u64,
    events: Vec<GameEvent>,
}

impl GameEngine {
    /// Build an idle engine. Fails if `options` are out of range.
    pub fn new(options: GameOptions, seed: u64) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            catalog: EntityCatalog::new(&options.spawn_weights),
            difficulty: DifficultyModel::from_options(&options),
            session: Session::new(options.max_lives),
            scheduler: SpawnScheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            play_area: Vec2::new(DEFAULT_AREA_WIDTH, DEFAULT_AREA_HEIGHT),
            now: 0,
            events: Vec::new(),
            options,
        })
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    /// Current clock time (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn stats(&self) -> GameStats {
        GameStats {
            score: self.session.score(),
            level: self.session.level(),
            lives: self.session.lives(),
            max_lives: self.session.max_lives(),
            active_entities: self.scheduler.active_count(),
            status: self.session.status(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityInstance> {
        self.scheduler.get(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityInstance> {
        self.scheduler.entities()
    }

    /// Take the notifications produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resize the area new critters spawn in
    pub fn set_play_area(&mut self, width: f32, height: f32) {
        self.play_area = Vec2::new(width, height);
    }

    /// Merge option changes. Current lives are not rescaled; a new
    /// `max_lives` applies from the next reset. Invalid patches change nothing.
    pub fn update_options(&mut self, patch: &OptionsPatch) -> Result<(), ConfigError> {
        let options = self.options.merged(patch)?;
        self.catalog = EntityCatalog::new(&options.spawn_weights);
        self.difficulty = DifficultyModel::from_options(&options);
        self.options = options;
        log::info!("Options updated");
        Ok(())
    }

    /// Begin (or, after game over, begin again). No-op while running or paused.
    pub fn start(&mut self) {
        if !self.session.start(self.options.max_lives) {
            return;
        }
        self.scheduler.start(self.now);
        log::info!("Game started");
        self.run_due();
    }

    pub fn pause(&mut self) {
        if !self.session.pause() {
            return;
        }
        self.scheduler.pause();
        log::info!("Game paused");
    }

    pub fn resume(&mut self) {
        if !self.session.resume() {
            return;
        }
        log::info!("Game resumed");
        let overdue = self.scheduler.resume(self.now).unwrap_or_default();
        for id in overdue {
            self.expire(id);
        }
        self.run_due();
    }

    /// Halt spawning and clear the area without scoring anything
    pub fn stop(&mut self) {
        if !self.session.stop() {
            return;
        }
        self.clear_entities();
        log::info!("Game stopped");
    }

    /// Tear down, reset to the configured values and start again
    pub fn restart(&mut self) {
        self.clear_entities();
        self.session.reset(self.options.max_lives);
        log::info!("Game restarted");
        self.start();
    }

    /// Click on a rendered critter. Stale ids and clicks outside play are ignored.
    pub fn handle_click(&mut self, id: EntityId) {
        if self.session.status() != SessionStatus::Running {
            log::trace!("Click on #{} ignored while {:?}", id, self.session.status());
            return;
        }
        let Some(entity) = self.scheduler.remove(id) else {
            log::trace!("Click on #{} ignored, already gone", id);
            return;
        };

        let spec = self.catalog.spec(entity.kind);
        let Some(outcome) = self.session.apply_click(spec, self.options.level_up_score) else {
            return;
        };
        log::debug!(
            "Clicked {} #{}: {:+} points",
            entity.kind.as_str(),
            id,
            outcome.points_delta
        );

        self.events.push(GameEvent::Removed {
            id,
            reason: RemovalReason::Scored,
            points_delta: outcome.points_delta,
        });
        if outcome.life_lost {
            self.life_lost();
        }
        if let Some(level) = outcome.level_up {
            log::info!("Level up! Now level {}", level);
            self.events.push(GameEvent::LevelUp { level });
        }
        if outcome.game_over {
            self.game_over();
        }
    }

    /// Move the clock forward to `now`, firing everything that comes due.
    /// The clock never runs backwards.
    pub fn advance_to(&mut self, now: u64) {
        while let Some((due, action)) = self.scheduler.pop_due(now) {
            self.now = self.now.max(due);
            self.fire(action);
        }
        self.now = self.now.max(now);
    }

    /// Advance the clock by `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        self.advance_to(self.now + dt_ms);
    }

    fn run_due(&mut self) {
        self.advance_to(self.now);
    }

    fn fire(&mut self, action: TimerAction) {
        match action {
            TimerAction::Spawn => self.spawn(),
            TimerAction::Expire(id) => self.expire(id),
        }
    }

    fn spawn(&mut self) {
        let ctx = SpawnContext {
            catalog: &self.catalog,
            difficulty: &self.difficulty,
            level: self.session.level(),
            area: self.play_area,
        };
        if let Some(entity) = self.scheduler.spawn_tick(self.now, &ctx, &mut self.rng) {
            self.events.push(GameEvent::Spawned {
                id: entity.id,
                kind: entity.kind,
                variant: entity.variant,
                points: entity.points,
                position: entity.position,
            });
        }
    }

    fn expire(&mut self, id: EntityId) {
        let Some(entity) = self.scheduler.remove(id) else {
            return;
        };
        let spec = self.catalog.spec(entity.kind);
        let Some(outcome) = self.session.apply_expiry(spec) else {
            return;
        };
        log::debug!("{} #{} escaped", entity.kind.as_str(), id);

        self.events.push(GameEvent::Removed {
            id,
            reason: RemovalReason::Missed,
            points_delta: 0,
        });
        if outcome.life_lost {
            self.life_lost();
        }
        if outcome.game_over {
            self.game_over();
        }
    }

    fn life_lost(&mut self) {
        let lives = self.session.lives().max(0);
        log::debug!("Life lost, {} left", lives);
        self.events.push(GameEvent::LifeLost { lives });
    }

    fn game_over(&mut self) {
        self.clear_entities();
        let (final_score, final_level) = (self.session.score(), self.session.level());
        log::info!("Game over: score {}, level {}", final_score, final_level);
        self.events.push(GameEvent::GameOver {
            final_score,
            final_level,
        });
    }

    fn clear_entities(&mut self) {
        for entity in self.scheduler.stop() {
            self.events.push(GameEvent::Removed {
                id: entity.id,
                reason: RemovalReason::Cleared,
                points_delta: 0,
            });
        }
    }
}
