//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual millisecond clock only, advanced by the caller
//! - Seeded RNG only
//! - Stable iteration order (by entity ID, then timer due time and arm order)
//! - No rendering or platform dependencies

pub mod catalog;
pub mod difficulty;
pub mod engine;
pub mod entity;
pub mod position;
pub mod rest;
pub mod scheduler;
pub mod session;
pub mod timer;

pub use catalog::{Draw, EntityCatalog, EntityKind, KindSpec, Penalty};
pub use difficulty::DifficultyModel;
pub use engine::{GameEngine, GameEvent, GameStats, RemovalReason};
pub use entity::{EntityId, EntityInstance};
pub use position::random_position;
pub use rest::{RestBreak, RestStats, RestTransition};
pub use scheduler::{SpawnContext, SpawnScheduler, TimerAction};
pub use session::{ClickOutcome, ExpiryOutcome, Session, SessionStatus, level_for_score};
pub use timer::{Fired, TimerHandle, TimerQueue};
