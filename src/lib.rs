//! Fall Game - catch the hearts, dodge the bombs, freeze the sky
//!
//! Core modules:
//! - `sim`: Deterministic simulation (timers, spawning, expiry, scoring)
//! - `view`: Projection of live objects for rendering
//! - `effects`: Particle bursts for resolved objects
//! - `audio`: Synthesised sound effects
//! - `player`: Identity capture and validation
//! - `persistence`: Player stats, leaderboard and settings records
//! - `session`: Wires the simulation to persistence and effects
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod effects;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod player;
pub mod session;
pub mod settings;
pub mod sim;
pub mod view;

pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use persistence::{KeyValueStore, MemoryStore, Storage, StorageError};
pub use player::{Player, ValidationError, validate_username};
pub use session::GameSession;
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Spawn interval for hearts
    pub const COLLECTIBLE_INTERVAL_MS: u64 = 1200;
    /// Spawn interval for bombs
    pub const HAZARD_INTERVAL_MS: u64 = 5000;
    /// Spawn interval for snowflakes
    pub const POWER_FREEZE_INTERVAL_MS: u64 = 15000;
    /// Lifecycle sweep period
    pub const SWEEP_INTERVAL_MS: u64 = 1000;

    /// How long a freeze pickup holds the sky still
    pub const FREEZE_DURATION_MS: u64 = 2000;

    /// Fall duration range (time to cross the board top to bottom)
    pub const FALL_MIN_MS: u64 = 2000;
    pub const FALL_MAX_MS: u64 = 4000;
    /// Nothing falls faster than this, whatever the config says
    pub const FALL_FLOOR_MS: u64 = 1000;

    /// Extra lifetime past the slowest fall plus one freeze window
    pub const LIFETIME_SAFETY_MARGIN_MS: u64 = 2000;

    /// Objects spawn with their left edge in [0, 90] percent of board width
    pub const MAX_HORIZONTAL_POSITION: f32 = 90.0;

    /// Score effects
    pub const COLLECTIBLE_REWARD: u32 = 1;
    pub const HAZARD_PENALTY: u32 = 10;

    /// Maximum missed periods a timer replays in one advance (prevents spiral of death)
    pub const MAX_CATCH_UP_FIRES: u32 = 8;

    /// Largest frame gap fed to the simulation (tab switches, debugger stops)
    pub const MAX_FRAME_GAP_MS: u64 = 250;
}

/// Maximum lifetime of a falling object.
///
/// Covers the slowest possible fall, one full freeze window and a safety margin,
/// so an object is never reaped while it is still visibly on the board.
#[inline]
pub const fn max_lifetime_ms(fall_max_ms: u64, freeze_duration_ms: u64) -> u64 {
    fall_max_ms + freeze_duration_ms + consts::LIFETIME_SAFETY_MARGIN_MS
}

/// Current unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn unix_now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current unix time in milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn unix_now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetime_is_eight_seconds() {
        let lifetime = max_lifetime_ms(consts::FALL_MAX_MS, consts::FREEZE_DURATION_MS);
        assert_eq!(lifetime, 8000);
        assert!(lifetime >= consts::FALL_MAX_MS);
    }
}
