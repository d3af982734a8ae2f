//! Critter kinds and the weighted draw that picks one

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::SpawnWeights;

/// Critter categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Reward kind: scores on click, costs a life if it escapes
    Predator,
    /// Hazard kind: costs points and a life when clicked
    Prey,
    /// Hazard kind, smaller penalty
    Omnivore,
}

impl EntityKind {
    /// Catalog order
    pub const ALL: [EntityKind; 3] = [EntityKind::Predator, EntityKind::Prey, EntityKind::Omnivore];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Predator => "predator",
            EntityKind::Prey => "prey",
            EntityKind::Omnivore => "omnivore",
        }
    }
}

/// When a kind costs the player a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Penalty {
    /// Clicking it is a mistake
    OnClick,
    /// Letting it expire is a mistake
    OnMiss,
}

/// Static description of one kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindSpec {
    pub kind: EntityKind,
    pub points: i64,
    pub penalty: Penalty,
    pub variants: &'static [&'static str],
}

impl KindSpec {
    pub fn is_hazard(&self) -> bool {
        self.penalty == Penalty::OnClick
    }

    pub fn penalizes_miss(&self) -> bool {
        self.penalty == Penalty::OnMiss
    }
}

const PREDATOR: KindSpec = KindSpec {
    kind: EntityKind::Predator,
    points: 20,
    penalty: Penalty::OnMiss,
    variants: &["🦁", "🐯", "🐺", "🦈", "🐊", "🦅"],
};

const PREY: KindSpec = KindSpec {
    kind: EntityKind::Prey,
    points: -10,
    penalty: Penalty::OnClick,
    variants: &["🐄", "🐑", "🐰", "🦌", "🐴", "🐘"],
};

const OMNIVORE: KindSpec = KindSpec {
    kind: EntityKind::Omnivore,
    points: -5,
    penalty: Penalty::OnClick,
    variants: &["🐻", "🐷", "🐵", "🐸", "🐔", "🦔"],
};

/// Result of a catalog draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub kind: EntityKind,
    pub variant: &'static str,
    pub points: i64,
}

/// Kind table plus the cumulative probabilities used to draw from it
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    /// Upper bounds of the predator and prey bands; omnivore takes the rest
    thresholds: [f64; 2],
}

impl Default for EntityCatalog {
    fn default() -> Self {
        Self::new(&SpawnWeights::default())
    }
}

impl EntityCatalog {
    /// Build from weights that have already been validated
    pub fn new(weights: &SpawnWeights) -> Self {
        Self {
            thresholds: [weights.predator, weights.predator + weights.prey],
        }
    }

    pub fn spec(&self, kind: EntityKind) -> &'static KindSpec {
        match kind {
            EntityKind::Predator => &PREDATOR,
            EntityKind::Prey => &PREY,
            EntityKind::Omnivore => &OMNIVORE,
        }
    }

    /// Map a uniform sample in `[0, 1)` to a kind
    pub fn kind_for_sample(&self, sample: f64) -> EntityKind {
        if sample < self.thresholds[0] {
            EntityKind::Predator
        } else if sample < self.thresholds[1] {
            EntityKind::Prey
        } else {
            EntityKind::Omnivore
        }
    }

    /// Pick a kind by weight, then one of its variants uniformly
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Draw {
        let kind = self.kind_for_sample(rng.random::<f64>());
        let spec = self.spec(kind);
        let variant = spec.variants[rng.random_range(0..spec.variants.len())];
        Draw {
            kind,
            variant,
            points: spec.points,
        }
    }
}
