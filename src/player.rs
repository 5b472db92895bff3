//! Player identity
//!
//! A player is just a name and some lifetime stats, stored locally.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Username length bounds (characters, after trimming)
pub const USERNAME_MIN_LEN: usize = 2;
pub const USERNAME_MAX_LEN: usize = 20;

/// Why a username was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a player name")]
    Empty,
    #[error("Name must be at least 2 characters")]
    TooShort,
    #[error("Name must be at most 20 characters")]
    TooLong,
}

/// Trim and bounds-check a username
pub fn validate_username(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 {
        Err(ValidationError::Empty)
    } else if len < USERNAME_MIN_LEN {
        Err(ValidationError::TooShort)
    } else if len > USERNAME_MAX_LEN {
        Err(ValidationError::TooLong)
    } else {
        Ok(name.to_string())
    }
}

/// A locally stored player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub username: String,
    pub high_score: u32,
    pub games_played: u32,
    pub total_score: u64,
    /// Stored as an RFC 3339 string
    pub created_at: DateTime<Utc>,
    pub last_played: DateTime<Utc>,
}

/// Unix milliseconds to a UTC timestamp (the epoch if out of range)
pub fn timestamp_from_ms(ms: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

impl Player {
    /// Create a fresh player from an already validated name
    pub fn new<R: Rng>(username: String, now: f64, rng: &mut R) -> Self {
        Self {
            id: generate_player_id(now, rng),
            username,
            high_score: 0,
            games_played: 0,
            total_score: 0,
            created_at: timestamp_from_ms(now),
            last_played: timestamp_from_ms(now),
        }
    }

    /// Fold a finished game into the stats.
    ///
    /// Returns true if the score set a new personal best.
    pub fn record_game(&mut self, final_score: u32, now: f64) -> bool {
        self.games_played += 1;
        self.total_score += u64::from(final_score);
        self.last_played = timestamp_from_ms(now);
        self.raise_high_score(final_score)
    }

    /// Raise the high score if beaten; returns true if it changed
    pub fn raise_high_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    /// Mean score per game (0 if none played)
    pub fn average_score(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f64 / f64::from(self.games_played)
        }
    }
}

/// `user_<9 base36 chars>_<unix ms>`
fn generate_player_id<R: Rng>(now: f64, rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("user_{}_{}", suffix, now as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(""), Err(ValidationError::Empty));
        assert_eq!(validate_username("    "), Err(ValidationError::Empty));
        assert_eq!(validate_username("a"), Err(ValidationError::TooShort));
        assert_eq!(validate_username(&"x".repeat(21)), Err(ValidationError::TooLong));
        assert_eq!(validate_username(&"x".repeat(20)), Ok("x".repeat(20)));
        assert_eq!(validate_username("  hi  "), Ok("hi".to_string()));
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        // 10 two-byte characters is 20 bytes but only 10 characters
        assert!(validate_username(&"\u{e9}".repeat(10)).is_ok());
        assert_eq!(validate_username("\u{e9}"), Err(ValidationError::TooShort));
    }

    #[test]
    fn test_player_id_format() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new("hi".into(), 1_700_000_000_000.0, &mut rng);
        let parts: Vec<&str> = player.id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert_eq!(parts[1].len(), 9);
        assert_eq!(parts[2], "1700000000000");
    }

    #[test]
    fn test_record_game() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut player = Player::new("hi".into(), 0.0, &mut rng);
        assert!(player.record_game(12, 10.0));
        assert!(!player.record_game(5, 20.0));
        assert_eq!(player.games_played, 2);
        assert_eq!(player.total_score, 17);
        assert_eq!(player.high_score, 12);
        assert_eq!(player.last_played.timestamp_millis(), 20);
        assert_eq!(player.created_at.timestamp_millis(), 0);
        assert!((player.average_score() - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_timestamps_serialize_as_iso_strings() {
        let mut rng = Pcg32::seed_from_u64(1);
        let player = Player::new("hi".into(), 1_700_000_000_000.0, &mut rng);
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["createdAt"].as_str(), Some("2023-11-14T22:13:20Z"));

        let stored = r#"{"id":"user_abc123def_1700000000000","username":"Old","highScore":3,
            "gamesPlayed":2,"totalScore":4,"createdAt":"2023-11-14T22:13:20.000Z",
            "lastPlayed":"2023-11-15T08:00:00.000Z"}"#;
        let player: Player = serde_json::from_str(stored).unwrap();
        assert_eq!(player.created_at.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(player.last_played.to_rfc3339(), "2023-11-15T08:00:00+00:00");
    }
}
