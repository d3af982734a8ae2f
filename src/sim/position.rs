//! Random spawn positions inside the play area

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// Pick a top-left corner for a critter inside `area`.
///
/// A non-positive dimension falls back to the default area size, and the
/// spawn extent never drops below `MIN_SPAWN_EXTENT` on either axis.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R, area: Vec2) -> Vec2 {
    let width = if area.x > 0.0 { area.x } else { DEFAULT_AREA_WIDTH };
    let height = if area.y > 0.0 { area.y } else { DEFAULT_AREA_HEIGHT };
    let max_x = (width - ENTITY_FOOTPRINT).max(MIN_SPAWN_EXTENT);
    let max_y = (height - ENTITY_FOOTPRINT).max(MIN_SPAWN_EXTENT);

    Vec2::new(rng.random_range(0.0..=max_x), rng.random_range(0.0..=max_y))
}
