//! Level-driven difficulty scaling
//!
//! Both curves decrease linearly per level, are clamped to a fraction of
//! their base value, and never go below an absolute floor.

use crate::settings::GameOptions;

/// Pure mapping from level to spawn interval and critter lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyModel {
    base_spawn_interval_ms: u64,
    spawn_decrease_per_level: f64,
    spawn_floor_factor: f64,
    min_spawn_interval_ms: u64,
    base_lifetime_ms: u64,
    lifetime_decrease_per_level: f64,
    lifetime_floor_factor: f64,
    min_lifetime_ms: u64,
}

impl Default for DifficultyModel {
    fn default() -> Self {
        Self::from_options(&GameOptions::default())
    }
}

impl DifficultyModel {
    pub fn from_options(options: &GameOptions) -> Self {
        Self {
            base_spawn_interval_ms: options.base_spawn_interval_ms,
            spawn_decrease_per_level: options.spawn_decrease_per_level,
            spawn_floor_factor: options.spawn_floor_factor,
            min_spawn_interval_ms: options.min_spawn_interval_ms,
            base_lifetime_ms: options.base_entity_lifetime_ms,
            lifetime_decrease_per_level: options.lifetime_decrease_per_level,
            lifetime_floor_factor: options.lifetime_floor_factor,
            min_lifetime_ms: options.min_entity_lifetime_ms,
        }
    }

    /// Time between spawns at `level` (ms)
    pub fn spawn_interval(&self, level: u32) -> u64 {
        let interval = scaled(
            self.base_spawn_interval_ms,
            self.spawn_decrease_per_level,
            self.spawn_floor_factor,
            self.min_spawn_interval_ms,
            level,
        );
        log::debug!("Level {}: spawn interval {}ms", level, interval);
        interval
    }

    /// How long a critter spawned at `level` stays up (ms)
    pub fn entity_lifetime(&self, level: u32) -> u64 {
        let lifetime = scaled(
            self.base_lifetime_ms,
            self.lifetime_decrease_per_level,
            self.lifetime_floor_factor,
            self.min_lifetime_ms,
            level,
        );
        log::debug!("Level {}: critter lifetime {}ms", level, lifetime);
        lifetime
    }
}

/// `max(floor_ms, base * max(floor_factor, 1 - decrease * (level - 1)))`
fn scaled(base: u64, decrease: f64, floor_factor: f64, floor_ms: u64, level: u32) -> u64 {
    let steps = level.saturating_sub(1) as f64;
    let factor = (1.0 - decrease * steps).max(floor_factor);
    let value = (base as f64 * factor).round() as u64;
    value.max(floor_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_one_uses_base_values() {
        let model = DifficultyModel::default();
        assert_eq!(model.spawn_interval(1), 2000);
        assert_eq!(model.entity_lifetime(1), 5000);
        // Level 0 is treated as level 1
        assert_eq!(model.spawn_interval(0), 2000);
    }

    #[test]
    fn test_linear_decrease() {
        let model = DifficultyModel::default();
        assert_eq!(model.spawn_interval(2), 1700);
        assert_eq!(model.spawn_interval(3), 1400);
        assert_eq!(model.entity_lifetime(2), 4500);
        assert_eq!(model.entity_lifetime(4), 3500);
    }

    #[test]
    fn test_factor_floor_then_absolute_floor() {
        let model = DifficultyModel::default();
        // 1 - 0.15 * 5 = 0.25 -> factor floor reached at level 6
        assert_eq!(model.spawn_interval(6), 500);
        assert_eq!(model.spawn_interval(50), 500);
        // 5000 * 0.4 = 2000, which is also the absolute floor
        assert_eq!(model.entity_lifetime(7), 2000);
        assert_eq!(model.entity_lifetime(100), 2000);

        let generous = DifficultyModel::from_options(&GameOptions {
            base_spawn_interval_ms: 10_000,
            min_spawn_interval_ms: 100,
            ..Default::default()
        });
        assert_eq!(generous.spawn_interval(40), 2500);
    }

    proptest! {
        #[test]
        fn prop_floors_hold_for_every_level(
            level in 1u32..10_000,
            base_interval in 1u64..60_000,
            base_lifetime in 1u64..60_000,
            min_interval in 1u64..5_000,
            min_lifetime in 1u64..5_000,
            decrease in 0.0f64..2.0,
        ) {
            let model = DifficultyModel::from_options(&GameOptions {
                base_spawn_interval_ms: base_interval,
                base_entity_lifetime_ms: base_lifetime,
                min_spawn_interval_ms: min_interval,
                min_entity_lifetime_ms: min_lifetime,
                spawn_decrease_per_level: decrease,
                lifetime_decrease_per_level: decrease,
                ..Default::default()
            });
            prop_assert!(model.spawn_interval(level) >= min_interval);
            prop_assert!(model.entity_lifetime(level) >= min_lifetime);
        }

        #[test]
        fn prop_difficulty_never_eases_with_level(level in 1u32..1_000) {
            let model = DifficultyModel::default();
            prop_assert!(model.spawn_interval(level + 1) <= model.spawn_interval(level));
            prop_assert!(model.entity_lifetime(level + 1) <= model.entity_lifetime(level));
        }
    }
}
