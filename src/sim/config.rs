//! Simulation tuning
//!
//! Everything the simulation needs to know about timing, in one value. Built
//! from [`crate::Settings`] by the session, or used directly in tests.

use serde::{Deserialize, Serialize};

use super::object::Category;
use crate::consts::*;
use crate::max_lifetime_ms;

/// How the reaper decides an object is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpiryPolicy {
    /// Evict once the object is older than the maximum lifetime
    #[default]
    Age,
    /// Evict once the object has visually crossed the bottom of the board
    /// (or hit the maximum lifetime, whichever comes first)
    Position,
}

/// Timer periods for the clock multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervals {
    pub collectible_ms: u64,
    pub hazard_ms: u64,
    pub power_freeze_ms: u64,
    pub sweep_ms: u64,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            collectible_ms: COLLECTIBLE_INTERVAL_MS,
            hazard_ms: HAZARD_INTERVAL_MS,
            power_freeze_ms: POWER_FREEZE_INTERVAL_MS,
            sweep_ms: SWEEP_INTERVAL_MS,
        }
    }
}

impl Intervals {
    pub fn spawn_interval(&self, category: Category) -> u64 {
        match category {
            Category::Collectible => self.collectible_ms,
            Category::Hazard => self.hazard_ms,
            Category::PowerFreeze => self.power_freeze_ms,
        }
    }

    /// Scale spawn periods (the sweep period is left alone)
    pub fn scaled(&self, factor: f32) -> Self {
        let scale = |ms: u64| ((ms as f32 * factor).round() as u64).max(1);
        Self {
            collectible_ms: scale(self.collectible_ms),
            hazard_ms: scale(self.hazard_ms),
            power_freeze_ms: scale(self.power_freeze_ms),
            sweep_ms: self.sweep_ms,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub intervals: Intervals,
    /// Fall duration range, inclusive
    pub fall_min_ms: u64,
    pub fall_max_ms: u64,
    pub freeze_duration_ms: u64,
    pub expiry_policy: ExpiryPolicy,
    /// Ignore clicks while frozen
    pub freeze_blocks_clicks: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            intervals: Intervals::default(),
            fall_min_ms: FALL_MIN_MS,
            fall_max_ms: FALL_MAX_MS,
            freeze_duration_ms: FREEZE_DURATION_MS,
            expiry_policy: ExpiryPolicy::Age,
            freeze_blocks_clicks: false,
        }
    }
}

impl SimConfig {
    /// Fall range with the floor applied and min <= max guaranteed
    pub fn fall_range(&self) -> (u64, u64) {
        let min = self.fall_min_ms.max(FALL_FLOOR_MS);
        let max = self.fall_max_ms.max(min);
        (min, max)
    }

    /// Age at which the reaper evicts an object
    pub fn max_lifetime_ms(&self) -> u64 {
        let (_, fall_max) = self.fall_range();
        max_lifetime_ms(fall_max, self.freeze_duration_ms)
    }
}
