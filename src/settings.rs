//! Game options and rest-break timings
//!
//! Options are resolved and validated once, when an engine is built or
//! updated. On the web they are persisted in LocalStorage; natively the
//! defaults are used.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tolerance when checking that spawn weights sum to one
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Relative spawn probability of each critter kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub predator: f64,
    pub prey: f64,
    pub omnivore: f64,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            predator: 0.60,
            prey: 0.25,
            omnivore: 0.15,
        }
    }
}

impl SpawnWeights {
    /// Weights in catalog order (predator, prey, omnivore)
    pub fn as_array(&self) -> [f64; 3] {
        [self.predator, self.prey, self.omnivore]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("predator", self.predator),
            ("prey", self.prey),
            ("omnivore", self.omnivore),
        ];
        for (kind, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { kind, value });
            }
        }

        let sum: f64 = self.as_array().iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightSum { sum });
        }
        Ok(())
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    // === Lives & scoring ===
    /// Lives at the start of a session
    pub max_lives: i32,
    /// Score needed per level
    pub level_up_score: i64,

    // === Spawn cadence ===
    /// Interval between spawns at level 1 (ms)
    pub base_spawn_interval_ms: u64,
    /// Fraction of the interval removed per level
    pub spawn_decrease_per_level: f64,
    /// Lower bound on the level scaling factor
    pub spawn_floor_factor: f64,
    /// Absolute lower bound on the interval (ms)
    pub min_spawn_interval_ms: u64,

    // === Critter lifetime ===
    /// Lifetime at level 1 (ms)
    pub base_entity_lifetime_ms: u64,
    pub lifetime_decrease_per_level: f64,
    pub lifetime_floor_factor: f64,
    pub min_entity_lifetime_ms: u64,

    // === Mix ===
    pub spawn_weights: SpawnWeights,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            max_lives: MAX_LIVES,
            level_up_score: LEVEL_UP_SCORE,

            base_spawn_interval_ms: SPAWN_INTERVAL_MS,
            spawn_decrease_per_level: SPAWN_DECREASE_PER_LEVEL,
            spawn_floor_factor: SPAWN_FLOOR_FACTOR,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,

            base_entity_lifetime_ms: ENTITY_LIFETIME_MS,
            lifetime_decrease_per_level: LIFETIME_DECREASE_PER_LEVEL,
            lifetime_floor_factor: LIFETIME_FLOOR_FACTOR,
            min_entity_lifetime_ms: MIN_ENTITY_LIFETIME_MS,

            spawn_weights: SpawnWeights::default(),
        }
    }
}

impl GameOptions {
    /// Check every field, reporting the first one out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lives < 1 {
            return Err(ConfigError::NonPositiveLives(self.max_lives));
        }
        if self.level_up_score < 1 {
            return Err(ConfigError::ZeroLevelUpScore(self.level_up_score));
        }

        let durations = [
            ("base_spawn_interval_ms", self.base_spawn_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
            ("base_entity_lifetime_ms", self.base_entity_lifetime_ms),
            ("min_entity_lifetime_ms", self.min_entity_lifetime_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { name });
            }
        }

        let rates = [
            ("spawn_decrease_per_level", self.spawn_decrease_per_level),
            ("spawn_floor_factor", self.spawn_floor_factor),
            ("lifetime_decrease_per_level", self.lifetime_decrease_per_level),
            ("lifetime_floor_factor", self.lifetime_floor_factor),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }

        // A floor above the base would stop difficulty from ever rising
        let floors = [
            ("spawn_floor_factor", self.spawn_floor_factor),
            ("lifetime_floor_factor", self.lifetime_floor_factor),
        ];
        for (name, value) in floors {
            if value > 1.0 {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }

        self.spawn_weights.validate()
    }

    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Merge a patch, returning the validated result without touching `self`
    pub fn merged(&self, patch: &OptionsPatch) -> Result<Self, ConfigError> {
        let mut next = self.clone();
        patch.apply_to(&mut next);
        next.validate()?;
        Ok(next)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "critter_hunt_options";

    /// Load options from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(options) => {
                        log::info!("Loaded options from LocalStorage");
                        return options;
                    }
                    Err(e) => log::warn!("Ignoring stored options: {}", e),
                }
            }
        }

        log::info!("Using default options");
        Self::default()
    }

    /// Save options to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Options saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Partial options update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsPatch {
    pub max_lives: Option<i32>,
    pub level_up_score: Option<i64>,
    pub base_spawn_interval_ms: Option<u64>,
    pub spawn_decrease_per_level: Option<f64>,
    pub spawn_floor_factor: Option<f64>,
    pub min_spawn_interval_ms: Option<u64>,
    pub base_entity_lifetime_ms: Option<u64>,
    pub lifetime_decrease_per_level: Option<f64>,
    pub lifetime_floor_factor: Option<f64>,
    pub min_entity_lifetime_ms: Option<u64>,
    pub spawn_weights: Option<SpawnWeights>,
}

impl OptionsPatch {
    fn apply_to(&self, options: &mut GameOptions) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        set(&mut options.max_lives, self.max_lives);
        set(&mut options.level_up_score, self.level_up_score);
        set(&mut options.base_spawn_interval_ms, self.base_spawn_interval_ms);
        set(&mut options.spawn_decrease_per_level, self.spawn_decrease_per_level);
        set(&mut options.spawn_floor_factor, self.spawn_floor_factor);
        set(&mut options.min_spawn_interval_ms, self.min_spawn_interval_ms);
        set(&mut options.base_entity_lifetime_ms, self.base_entity_lifetime_ms);
        set(
            &mut options.lifetime_decrease_per_level,
            self.lifetime_decrease_per_level,
        );
        set(&mut options.lifetime_floor_factor, self.lifetime_floor_factor);
        set(&mut options.min_entity_lifetime_ms, self.min_entity_lifetime_ms);
        set(&mut options.spawn_weights, self.spawn_weights);
    }
}

/// Rest-break timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestOptions {
    /// Continuous play allowed before a break (ms)
    pub play_limit_ms: u64,
    /// Length of the break (ms)
    pub rest_duration_ms: u64,
}

impl Default for RestOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl RestOptions {
    /// Twenty minutes of play, one minute of rest
    pub fn standard() -> Self {
        Self {
            play_limit_ms: PLAY_LIMIT_MS,
            rest_duration_ms: REST_DURATION_MS,
        }
    }

    /// Ten seconds of play, five of rest
    pub fn quick() -> Self {
        Self {
            play_limit_ms: QUICK_PLAY_LIMIT_MS,
            rest_duration_ms: QUICK_REST_DURATION_MS,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.play_limit_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                name: "play_limit_ms",
            });
        }
        if self.rest_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                name: "rest_duration_ms",
            });
        }
        Ok(())
    }
}
