//! Spawn cadence and critter expiry timers
//!
//! The scheduler owns the active critters and every deferred action that
//! touches them: one pending spawn and at most one expiry per critter.
//! Scoring consequences are left to the session; the scheduler only
//! reports what came due.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;

use super::catalog::EntityCatalog;
use super::difficulty::DifficultyModel;
use super::entity::{EntityId, EntityInstance};
use super::position::random_position;
use super::timer::{TimerHandle, TimerQueue};

/// Deferred work owned by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Spawn,
    Expire(EntityId),
}

/// Inputs a spawn needs from the rest of the engine
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub catalog: &'a EntityCatalog,
    pub difficulty: &'a DifficultyModel,
    /// Level at the moment of the spawn
    pub level: u32,
    pub area: Vec2,
}

#[derive(Debug)]
pub struct SpawnScheduler {
    running: bool,
    paused: bool,
    spawn_timer: Option<TimerHandle>,
    active: BTreeMap<EntityId, EntityInstance>,
    timers: TimerQueue<TimerAction>,
    /// Bumped on every stop; actions armed under an older epoch are dropped
    epoch: u64,
    next_id: EntityId,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self {
            running: false,
            paused: false,
            spawn_timer: None,
            active: BTreeMap::new(),
            timers: TimerQueue::new(),
            epoch: 0,
            next_id: 1,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityInstance> {
        self.active.get(&id)
    }

    /// Active critters in spawn order
    pub fn entities(&self) -> impl Iterator<Item = &EntityInstance> {
        self.active.values()
    }

    /// Due time of the pending spawn, if one is armed
    pub fn next_spawn_at(&self) -> Option<u64> {
        self.spawn_timer.map(|h| h.due())
    }

    /// Begin spawning. The first spawn is due immediately.
    pub fn start(&mut self, now: u64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.paused = false;
        self.arm_spawn(now);
        true
    }

    /// Suspend the cadence and every expiry, keeping spawn times and lifetimes
    pub fn pause(&mut self) -> bool {
        if !self.running || self.paused {
            return false;
        }
        self.paused = true;
        if let Some(handle) = self.spawn_timer.take() {
            self.timers.cancel(handle);
        }
        for entity in self.active.values_mut() {
            if let Some(handle) = entity.expiry.take() {
                self.timers.cancel(handle);
            }
        }
        true
    }

    /// Restart the cadence and re-arm expiries for what is left of each lifetime.
    ///
    /// Returns the critters whose lifetime ran out while paused; their expiry
    /// is not re-armed and the caller must run the expiry path for them.
    /// Returns `None` when not paused.
    pub fn resume(&mut self, now: u64) -> Option<Vec<EntityId>> {
        if !self.running || !self.paused {
            return None;
        }
        self.paused = false;
        self.arm_spawn(now);

        let mut overdue = Vec::new();
        for entity in self.active.values_mut() {
            let remaining = entity.remaining_at(now);
            if remaining > 0 {
                entity.expiry = Some(self.timers.arm(
                    now + remaining,
                    self.epoch,
                    TimerAction::Expire(entity.id),
                ));
            } else {
                overdue.push(entity.id);
            }
        }
        Some(overdue)
    }

    /// Drop the active critters without expiring them.
    ///
    /// Pending actions stay queued; bumping the epoch invalidates them and
    /// `pop_due` discards them as they come due.
    pub fn stop(&mut self) -> Vec<EntityInstance> {
        self.running = false;
        self.paused = false;
        self.spawn_timer = None;
        self.epoch += 1;
        std::mem::take(&mut self.active)
            .into_values()
            .map(|mut entity| {
                entity.expiry = None;
                entity
            })
            .collect()
    }

    /// Spawn one critter and arm the next spawn from the current level
    pub fn spawn_tick<R: Rng + ?Sized>(
        &mut self,
        now: u64,
        ctx: &SpawnContext<'_>,
        rng: &mut R,
    ) -> Option<EntityInstance> {
        if !self.running || self.paused {
            return None;
        }
        let entity = self.spawn_entity(now, ctx, rng);
        self.arm_spawn(now + ctx.difficulty.spawn_interval(ctx.level));
        Some(entity)
    }

    /// Create a critter, arm its expiry and add it to the active set
    pub fn spawn_entity<R: Rng + ?Sized>(
        &mut self,
        now: u64,
        ctx: &SpawnContext<'_>,
        rng: &mut R,
    ) -> EntityInstance {
        let draw = ctx.catalog.draw(rng);
        let lifetime = ctx.difficulty.entity_lifetime(ctx.level);
        let position = random_position(rng, ctx.area);

        let id = self.next_id;
        self.next_id += 1;

        let entity = EntityInstance {
            id,
            kind: draw.kind,
            variant: draw.variant,
            points: draw.points,
            position,
            spawned_at: now,
            lifetime,
            expiry: Some(
                self.timers
                    .arm(now + lifetime, self.epoch, TimerAction::Expire(id)),
            ),
        };
        log::debug!(
            "Spawned {} {} #{} for {}ms",
            entity.kind.as_str(),
            entity.variant,
            id,
            lifetime
        );
        self.active.insert(id, entity.clone());
        entity
    }

    /// Remove a critter and cancel its expiry. Unknown ids are a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityInstance> {
        let entity = self.active.remove(&id)?;
        if let Some(handle) = entity.expiry {
            self.timers.cancel(handle);
        }
        Some(entity)
    }

    /// Next action due at or before `now`, with its due time
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, TimerAction)> {
        loop {
            let fired = self.timers.pop_due(now)?;
            if fired.epoch != self.epoch {
                log::trace!("Dropping stale {:?} from epoch {}", fired.action, fired.epoch);
                continue;
            }
            match fired.action {
                TimerAction::Spawn => {
                    if self.spawn_timer == Some(fired.handle) {
                        self.spawn_timer = None;
                    }
                }
                TimerAction::Expire(id) => {
                    if let Some(entity) = self.active.get_mut(&id) {
                        if entity.expiry == Some(fired.handle) {
                            entity.expiry = None;
                        }
                    }
                }
            }
            return Some((fired.handle.due(), fired.action));
        }
    }

    fn arm_spawn(&mut self, due: u64) {
        if let Some(handle) = self.spawn_timer.take() {
            self.timers.cancel(handle);
        }
        self.spawn_timer = Some(self.timers.arm(due, self.epoch, TimerAction::Spawn));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Fixture {
        catalog: EntityCatalog,
        difficulty: DifficultyModel,
        rng: Pcg32,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: EntityCatalog::default(),
                difficulty: DifficultyModel::default(),
                rng: Pcg32::seed_from_u64(7),
            }
        }
    }

    fn spawn(scheduler: &mut SpawnScheduler, fx: &mut Fixture, now: u64, level: u32) -> EntityInstance {
        let Fixture {
            catalog,
            difficulty,
            rng,
        } = fx;
        let ctx = SpawnContext {
            catalog,
            difficulty,
            level,
            area: Vec2::new(800.0, 400.0),
        };
        scheduler.spawn_tick(now, &ctx, rng).unwrap()
    }

    #[test]
    fn test_start_is_idempotent_and_immediate() {
        let mut scheduler = SpawnScheduler::new();
        assert!(scheduler.start(100));
        assert!(!scheduler.start(200));
        assert_eq!(scheduler.next_spawn_at(), Some(100));
        assert_eq!(scheduler.pop_due(100), Some((100, TimerAction::Spawn)));
    }

    #[test]
    fn test_spawn_rearms_from_current_level() {
        let mut fx = Fixture::new();
        let mut scheduler = SpawnScheduler::new();
        scheduler.start(0);
        scheduler.pop_due(0);

        let first = spawn(&mut scheduler, &mut fx, 0, 1);
        assert_eq!(scheduler.next_spawn_at(), Some(2000));
        assert_eq!(first.lifetime, 5000);
        assert_eq!(first.expiry.map(|h| h.due()), Some(5000));

        scheduler.pop_due(2000);
        let second = spawn(&mut scheduler, &mut fx, 2000, 2);
        assert_eq!(scheduler.next_spawn_at(), Some(3700));
        assert_eq!(second.lifetime, 4500);
        assert_ne!(first.id, second.id);
        assert_eq!(scheduler.active_count(), 2);
    }

    #[test]
    fn test_pause_resume_rearms_remaining_lifetime() {
        let mut fx = Fixture::new();
        let mut scheduler = SpawnScheduler::new();
        scheduler.start(0);
        scheduler.pop_due(0);
        let critter = spawn(&mut scheduler, &mut fx, 0, 1);

        assert!(scheduler.pause());
        assert!(!scheduler.pause());
        assert!(scheduler.get(critter.id).unwrap().expiry.is_none());
        assert_eq!(scheduler.next_spawn_at(), None);
        assert!(scheduler.pop_due(10_000).is_none());

        let overdue = scheduler.resume(2000).unwrap();
        assert!(overdue.is_empty());
        let expiry = scheduler.get(critter.id).unwrap().expiry.unwrap();
        assert_eq!(expiry.due() - 2000, 3000);
        // Fresh cadence: next spawn is due right away
        assert_eq!(scheduler.next_spawn_at(), Some(2000));
        assert!(scheduler.resume(2000).is_none());
    }

    #[test]
    fn test_resume_reports_critters_that_ran_out() {
        let mut fx = Fixture::new();
        let mut scheduler = SpawnScheduler::new();
        scheduler.start(0);
        scheduler.pop_due(0);
        let critter = spawn(&mut scheduler, &mut fx, 0, 1);

        scheduler.pause();
        let overdue = scheduler.resume(9000).unwrap();
        assert_eq!(overdue, vec![critter.id]);
        assert!(scheduler.get(critter.id).unwrap().expiry.is_none());
    }

    #[test]
    fn test_remove_is_idempotent_and_cancels_expiry() {
        let mut fx = Fixture::new();
        let mut scheduler = SpawnScheduler::new();
        scheduler.start(0);
        scheduler.pop_due(0);
        let critter = spawn(&mut scheduler, &mut fx, 0, 1);

        assert!(scheduler.remove(critter.id).is_some());
        assert!(scheduler.remove(critter.id).is_none());
        // Only the next spawn is left
        assert_eq!(scheduler.pop_due(10_000), Some((2000, TimerAction::Spawn)));
        assert!(scheduler.pop_due(10_000).is_none());
    }

    #[test]
    fn test_stop_clears_without_expiring_and_bumps_epoch() {
        let mut fx = Fixture::new();
        let mut scheduler = SpawnScheduler::new();
        scheduler.start(0);
        scheduler.pop_due(0);
        spawn(&mut scheduler, &mut fx, 0, 1);
        spawn(&mut scheduler, &mut fx, 0, 1);

        let epoch = scheduler.epoch();
        let cleared = scheduler.stop();
        assert_eq!(cleared.len(), 2);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.epoch(), epoch + 1);
        assert!(!scheduler.is_running());
        assert!(scheduler.pop_due(u64::MAX).is_none());

        let Fixture {
            catalog,
            difficulty,
            rng,
        } = &mut fx;
        let ctx = SpawnContext {
            catalog,
            difficulty,
            level: 1,
            area: Vec2::ZERO,
        };
        assert!(scheduler.spawn_tick(0, &ctx, rng).is_none());
    }

    #[test]
    fn test_actions_armed_before_stop_never_fire() {
        let mut fx = Fixture::new();
        let mut scheduler = SpawnScheduler::new();
        scheduler.start(0);
        scheduler.pop_due(0);
        let old = spawn(&mut scheduler, &mut fx, 0, 1);
        scheduler.stop();

        // Old spawn (2000) and expiry (5000) are still queued
        assert!(scheduler.timers.len() >= 2);

        scheduler.start(1000);
        assert_eq!(scheduler.pop_due(1000), Some((1000, TimerAction::Spawn)));
        let fresh = spawn(&mut scheduler, &mut fx, 1000, 1);

        // Only the new session's actions come out, in due order
        assert_eq!(scheduler.pop_due(10_000), Some((3000, TimerAction::Spawn)));
        assert_eq!(
            scheduler.pop_due(10_000),
            Some((6000, TimerAction::Expire(fresh.id)))
        );
        assert!(scheduler.pop_due(10_000).is_none());
        assert!(scheduler.timers.is_empty());
        assert_ne!(old.id, fresh.id);
    }

    #[test]
    fn test_ids_survive_restart() {
        let mut fx = Fixture::new();
        let mut scheduler = SpawnScheduler::new();
        scheduler.start(0);
        let first = spawn(&mut scheduler, &mut fx, 0, 1);
        scheduler.stop();
        scheduler.start(0);
        let second = spawn(&mut scheduler, &mut fx, 0, 1);
        assert!(second.id > first.id);
    }
}
