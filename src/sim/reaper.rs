//! Lifecycle sweep
//!
//! Runs on its own fixed period rather than per object, so expiry latency is
//! bounded by one sweep period.

use super::config::{ExpiryPolicy, SimConfig};
use super::object::ObjectId;
use super::registry::Registry;

/// Evict every expired object, returning the evicted ids
pub fn sweep(
    registry: &mut Registry,
    now_ms: u64,
    config: &SimConfig,
    frozen_total_ms: u64,
) -> Vec<ObjectId> {
    let max_lifetime = config.max_lifetime_ms();
    match config.expiry_policy {
        ExpiryPolicy::Age => registry.retain(|o| !o.is_expired(now_ms, max_lifetime)),
        ExpiryPolicy::Position => registry.retain(|o| {
            !o.is_expired(now_ms, max_lifetime) && !o.has_crossed_bottom(now_ms, frozen_total_ms)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::object::{Category, FallingObject};

    fn registry_with(objects: &[(u64, u64, u64)]) -> Registry {
        let mut registry = Registry::new();
        for &(id, created_at_ms, fall_duration_ms) in objects {
            registry
                .insert(FallingObject {
                    id: ObjectId(id),
                    category: Category::Collectible,
                    horizontal_position: 0.0,
                    fall_duration_ms,
                    created_at_ms,
                    frozen_ms_at_spawn: 0,
                })
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_age_sweep_respects_lifetime() {
        let config = SimConfig::default();
        let lifetime = config.max_lifetime_ms();
        let mut registry = registry_with(&[(1, 0, 3000), (2, 1000, 3000)]);

        assert!(sweep(&mut registry, lifetime - 1, &config, 0).is_empty());
        assert_eq!(sweep(&mut registry, lifetime, &config, 0), vec![ObjectId(1)]);
        assert_eq!(sweep(&mut registry, lifetime + 1000, &config, 0), vec![ObjectId(2)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let config = SimConfig::default();
        let mut registry = registry_with(&[(1, 0, 3000)]);
        let now = config.max_lifetime_ms();
        assert_eq!(sweep(&mut registry, now, &config, 0).len(), 1);
        assert!(sweep(&mut registry, now, &config, 0).is_empty());
    }

    #[test]
    fn test_position_sweep_uses_visual_progress() {
        let config = SimConfig {
            expiry_policy: ExpiryPolicy::Position,
            ..Default::default()
        };
        let mut registry = registry_with(&[(1, 0, 2000), (2, 0, 4000)]);

        // Object 1 reached the bottom at 2000 ms
        assert_eq!(sweep(&mut registry, 2000, &config, 0), vec![ObjectId(1)]);
        // A freeze of 1000 ms holds object 2 on screen past its nominal fall time
        assert!(sweep(&mut registry, 4500, &config, 1000).is_empty());
        assert_eq!(sweep(&mut registry, 5000, &config, 1000), vec![ObjectId(2)]);
    }
}
