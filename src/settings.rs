//! Game settings and preferences
//!
//! Persisted as their own record, separately from the player and leaderboard.

use serde::{Deserialize, Serialize};

use crate::sim::{ExpiryPolicy, Intervals, SimConfig};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on spawn intervals (lower = busier sky)
    pub fn interval_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.7,
        }
    }

    /// Fall duration range in ms (lower = faster objects)
    pub fn fall_range_ms(&self) -> (u64, u64) {
        match self {
            Difficulty::Easy => (2500, 4500),
            Difficulty::Normal => (2000, 4000),
            Difficulty::Hard => (1500, 3000),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // === Audio ===
    pub sound_enabled: bool,
    pub music_enabled: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Gameplay ===
    pub difficulty: Difficulty,
    /// Ignore clicks while the sky is frozen
    pub freeze_blocks_clicks: bool,
    /// How off-screen objects are detected
    pub expiry_policy: ExpiryPolicy,

    // === Accessibility ===
    /// Skip particle bursts
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: false,
            sfx_volume: 1.0,

            difficulty: Difficulty::Normal,
            freeze_blocks_clicks: false,
            expiry_policy: ExpiryPolicy::Age,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty (everything else default)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Simulation configuration for these settings
    pub fn sim_config(&self) -> SimConfig {
        let (fall_min_ms, fall_max_ms) = self.difficulty.fall_range_ms();
        SimConfig {
            intervals: Intervals::default().scaled(self.difficulty.interval_scale()),
            fall_min_ms,
            fall_max_ms,
            expiry_policy: self.expiry_policy,
            freeze_blocks_clicks: self.freeze_blocks_clicks,
            ..SimConfig::default()
        }
    }

    /// Effective particle bursts (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        !self.reduced_motion
    }

    /// Effective SFX volume (0 when sound is off)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sound_enabled {
            self.sfx_volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_normal_matches_base_intervals() {
        let config = Settings::default().sim_config();
        assert_eq!(config.intervals, Intervals::default());
        assert_eq!(config.fall_range(), (FALL_MIN_MS, FALL_MAX_MS));
        assert_eq!(config.max_lifetime_ms(), 8000);
    }

    #[test]
    fn test_hard_is_busier() {
        let config = Settings::from_difficulty(Difficulty::Hard).sim_config();
        assert!(config.intervals.collectible_ms < COLLECTIBLE_INTERVAL_MS);
        assert_eq!(config.intervals.sweep_ms, SWEEP_INTERVAL_MS);
    }

    #[test]
    fn test_legacy_settings_record_loads() {
        // Older records only carry the first three fields
        let json = r#"{"soundEnabled":false,"musicEnabled":false,"difficulty":"hard"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(!settings.sound_enabled);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.expiry_policy, ExpiryPolicy::Age);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("norm"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }
}
