//! Critter Hunt - A reflex game of timed, clickable critters
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawn scheduling, entity lifetimes, session rules)
//! - `settings`: Validated game options and rest-break timings
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{GameOptions, OptionsPatch, RestOptions, SpawnWeights};

/// Game configuration defaults
pub mod consts {
    /// Lives at the start of a session
    pub const MAX_LIVES: i32 = 10;

    /// Spawn cadence at level 1 (ms)
    pub const SPAWN_INTERVAL_MS: u64 = 2000;
    /// Entity lifetime at level 1 (ms)
    pub const ENTITY_LIFETIME_MS: u64 = 5000;
    /// Fraction of the spawn interval removed per level
    pub const SPAWN_DECREASE_PER_LEVEL: f64 = 0.15;
    /// Fraction of the entity lifetime removed per level
    pub const LIFETIME_DECREASE_PER_LEVEL: f64 = 0.10;
    /// Spawn interval never shrinks below this fraction of the base
    pub const SPAWN_FLOOR_FACTOR: f64 = 0.25;
    /// Lifetime never shrinks below this fraction of the base
    pub const LIFETIME_FLOOR_FACTOR: f64 = 0.40;
    /// Hard floor on the spawn interval (ms)
    pub const MIN_SPAWN_INTERVAL_MS: u64 = 500;
    /// Hard floor on the entity lifetime (ms)
    pub const MIN_ENTITY_LIFETIME_MS: u64 = 2000;

    /// Score needed per level
    pub const LEVEL_UP_SCORE: i64 = 100;

    /// Play area used when the container reports no size
    pub const DEFAULT_AREA_WIDTH: f32 = 800.0;
    pub const DEFAULT_AREA_HEIGHT: f32 = 400.0;
    /// Space reserved at the right/bottom edge so a critter stays inside the area
    pub const ENTITY_FOOTPRINT: f32 = 80.0;
    /// Smallest spawn extent along either axis
    pub const MIN_SPAWN_EXTENT: f32 = 50.0;

    /// Play time before a rest break (20 minutes)
    pub const PLAY_LIMIT_MS: u64 = 20 * 60 * 1000;
    /// Rest break length (1 minute)
    pub const REST_DURATION_MS: u64 = 60 * 1000;
    /// Short timings for trying the rest break out
    pub const QUICK_PLAY_LIMIT_MS: u64 = 10 * 1000;
    pub const QUICK_REST_DURATION_MS: u64 = 5 * 1000;
}
