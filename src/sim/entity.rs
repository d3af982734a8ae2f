//! Spawned critters

use glam::Vec2;
use serde::Serialize;

use super::catalog::EntityKind;
use super::timer::TimerHandle;

/// Critter identifier, unique for the lifetime of an engine
pub type EntityId = u32;

/// One active critter
#[derive(Debug, Clone, Serialize)]
pub struct EntityInstance {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Display glyph
    pub variant: &'static str,
    /// Score change when clicked (negative for hazards)
    pub points: i64,
    /// Top-left corner inside the play area
    pub position: Vec2,
    /// Clock time of the spawn (ms)
    pub spawned_at: u64,
    /// Total time on screen (ms)
    pub lifetime: u64,
    /// Pending expiry, absent while paused
    #[serde(skip)]
    pub expiry: Option<TimerHandle>,
}

impl EntityInstance {
    /// Lifetime left at `now`, counting any time spent paused
    pub fn remaining_at(&self, now: u64) -> u64 {
        let elapsed = now.saturating_sub(self.spawned_at);
        self.lifetime.saturating_sub(elapsed)
    }

    /// Clock time at which the lifetime runs out
    pub fn expires_at(&self) -> u64 {
        self.spawned_at + self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn critter(spawned_at: u64, lifetime: u64) -> EntityInstance {
        EntityInstance {
            id: 1,
            kind: EntityKind::Predator,
            variant: "🦁",
            points: 20,
            position: Vec2::ZERO,
            spawned_at,
            lifetime,
            expiry: None,
        }
    }

    #[test]
    fn test_remaining_lifetime() {
        let c = critter(1000, 5000);
        assert_eq!(c.remaining_at(1000), 5000);
        assert_eq!(c.remaining_at(3000), 3000);
        assert_eq!(c.remaining_at(6000), 0);
        assert_eq!(c.remaining_at(60_000), 0);
        assert_eq!(c.expires_at(), 6000);
    }
}
