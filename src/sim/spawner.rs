//! Object spawning
//!
//! One object per category timer fire, with a random column and fall speed.

use rand::Rng;

use super::config::SimConfig;
use super::object::{Category, FallingObject, ObjectId};
use super::state::GameState;
use crate::consts::MAX_HORIZONTAL_POSITION;

/// Roll a new object. Fall duration is category-independent.
pub fn roll_object<R: Rng>(
    rng: &mut R,
    id: ObjectId,
    category: Category,
    config: &SimConfig,
    now_ms: u64,
    frozen_total_ms: u64,
) -> FallingObject {
    let (fall_min, fall_max) = config.fall_range();
    FallingObject {
        id,
        category,
        horizontal_position: rng.random_range(0.0..=MAX_HORIZONTAL_POSITION),
        fall_duration_ms: rng.random_range(fall_min..=fall_max),
        created_at_ms: now_ms,
        frozen_ms_at_spawn: frozen_total_ms,
    }
}

/// Spawn one object into the registry.
///
/// Returns `None` only if the registry rejected the id, which the monotonic
/// allocator makes unreachable outside of bugs.
pub fn spawn(state: &mut GameState, category: Category, now_ms: u64) -> Option<ObjectId> {
    let id = state.next_object_id();
    let object = roll_object(
        &mut state.rng,
        id,
        category,
        &state.config,
        now_ms,
        state.frozen_total_ms,
    );
    match state.registry.insert(object) {
        Ok(()) => {
            log::trace!("Spawned {} #{}", category.as_str(), id);
            Some(id)
        }
        Err(e) => {
            log::error!("Spawn failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rolled_objects_stay_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let config = SimConfig::default();
        let (fall_min, fall_max) = config.fall_range();
        for i in 0..500 {
            let obj = roll_object(&mut rng, ObjectId(i), Category::Hazard, &config, 1000, 0);
            assert!((0.0..=MAX_HORIZONTAL_POSITION).contains(&obj.horizontal_position));
            assert!((fall_min..=fall_max).contains(&obj.fall_duration_ms));
            assert_eq!(obj.created_at_ms, 1000);
        }
    }

    #[test]
    fn test_spawn_grows_registry_by_one() {
        let mut state = GameState::new(3, SimConfig::default());
        state.start(0);
        let id = spawn(&mut state, Category::PowerFreeze, 500).unwrap();
        assert_eq!(state.registry.len(), 1);
        let obj = state.registry.get(id).unwrap();
        assert_eq!(obj.category, Category::PowerFreeze);
        assert_eq!(obj.created_at_ms, 500);
    }

    #[test]
    fn test_same_seed_same_objects() {
        let mut a = GameState::new(42, SimConfig::default());
        let mut b = GameState::new(42, SimConfig::default());
        for t in 0..10 {
            spawn(&mut a, Category::Collectible, t * 100);
            spawn(&mut b, Category::Collectible, t * 100);
        }
        assert_eq!(a.registry.snapshot(), b.registry.snapshot());
    }
}
