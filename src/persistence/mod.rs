//! Local persistence for player stats, leaderboard and settings
//!
//! Three JSON records over a pluggable key-value store:
//! - `fallgame_user`: the current player
//! - `fallgame_leaderboard`: best score per player, top 15
//! - `fallgame_settings`: preferences
//!
//! A record that fails to parse is logged and treated as absent; nothing in here
//! is allowed to take the game down.

pub mod store;

pub use store::{KeyValueStore, MemoryStore};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::player::{Player, ValidationError, timestamp_from_ms, validate_username};
use crate::settings::Settings;

pub const USER_KEY: &str = "fallgame_user";
pub const LEADERBOARD_KEY: &str = "fallgame_leaderboard";
pub const SETTINGS_KEY: &str = "fallgame_settings";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("record '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Export/import bundle of all three records
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportBundle {
    user: Option<Player>,
    #[serde(default)]
    leaderboard: Option<Vec<LeaderboardEntry>>,
    #[serde(default)]
    settings: Option<Settings>,
    #[serde(default)]
    exported_at: Option<DateTime<Utc>>,
}

/// Persistence component, injected into the game session
#[derive(Debug, Clone)]
pub struct Storage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    // === Raw records ===

    /// Load and parse a record; a missing key is `Ok(None)`
    pub fn load_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(json) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    /// Serialize and store a record
    pub fn save_record<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }

    /// Load a record, degrading any failure to "absent"
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.load_record(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}; starting fresh", e);
                None
            }
        }
    }

    /// Store a record, logging failures
    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        match self.save_record(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save '{}': {}", key, e);
                false
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            log::warn!("Failed to remove '{}': {}", key, e);
        }
    }

    // === Player ===

    /// Validate a name and store a brand new player, replacing any existing one
    pub fn create_player<R: Rng>(
        &mut self,
        raw_name: &str,
        now: f64,
        rng: &mut R,
    ) -> Result<Player, ValidationError> {
        let username = validate_username(raw_name)?;
        let player = Player::new(username, now, rng);
        self.save_player(&player);
        log::info!("Created player '{}' ({})", player.username, player.id);
        Ok(player)
    }

    /// Restore the stored player, if any
    pub fn load_existing_player(&self) -> Option<Player> {
        let player: Option<Player> = self.read(USER_KEY);
        if let Some(ref p) = player {
            log::info!("Welcome back, {}", p.username);
        }
        player
    }

    /// Returns false if the record could not be written
    pub fn save_player(&mut self, player: &Player) -> bool {
        self.write(USER_KEY, player)
    }

    /// Load the stored player if it is the one we expect
    fn player_with_id(&self, player_id: &str) -> Option<Player> {
        let player: Player = self.read(USER_KEY)?;
        if player.id != player_id {
            log::warn!(
                "Stored player {} does not match {}; ignoring update",
                player.id,
                player_id
            );
            return None;
        }
        Some(player)
    }

    /// Fold a finished game into the player's stats.
    ///
    /// Games played and total score always increase; the high score only when
    /// beaten. Returns the updated player, or `None` if no such player is stored.
    pub fn record_game_result(&mut self, player_id: &str, final_score: u32, now: f64) -> Option<Player> {
        let mut player = self.player_with_id(player_id)?;
        if player.record_game(final_score, now) {
            log::info!("New personal best for {}: {}", player.username, final_score);
        }
        self.save_player(&player);
        Some(player)
    }

    /// Raise the stored high score mid-game (stats are counted at game end)
    pub fn update_high_score(&mut self, player_id: &str, score: u32, now: f64) -> Option<Player> {
        let mut player = self.player_with_id(player_id)?;
        if player.raise_high_score(score) {
            player.last_played = timestamp_from_ms(now);
            self.save_player(&player);
        }
        Some(player)
    }

    /// Forget the current player (and their settings); the leaderboard stays
    pub fn clear_player_session(&mut self) {
        self.remove(USER_KEY);
        self.remove(SETTINGS_KEY);
        log::info!("Player session cleared");
    }

    // === Leaderboard ===

    pub fn fetch_leaderboard(&self) -> Leaderboard {
        self.read::<Vec<LeaderboardEntry>>(LEADERBOARD_KEY)
            .map(Leaderboard::from_entries)
            .unwrap_or_default()
    }

    /// Add a score, keep each player's best, store the top 15
    pub fn upsert_leaderboard(
        &mut self,
        player_id: &str,
        username: &str,
        score: u32,
        date: &str,
    ) -> Leaderboard {
        let mut board = self.fetch_leaderboard();
        let rank = board.upsert(LeaderboardEntry {
            username: username.to_string(),
            score,
            date: date.to_string(),
            user_id: player_id.to_string(),
        });
        if self.write(LEADERBOARD_KEY, &board.entries) {
            log::info!("Leaderboard saved ({} entries, {} ranked {:?})", board.len(), username, rank);
        }
        board
    }

    // === Settings ===

    pub fn load_settings(&self) -> Settings {
        self.read(SETTINGS_KEY).unwrap_or_else(|| {
            log::info!("Using default settings");
            Settings::default()
        })
    }

    pub fn save_settings(&mut self, settings: &Settings) {
        if self.write(SETTINGS_KEY, settings) {
            log::info!("Settings saved");
        }
    }

    // === Export / import ===

    /// Dump all three records as pretty JSON
    pub fn export_data(&self, now: f64) -> Result<String, StorageError> {
        let bundle = ExportBundle {
            user: self.read(USER_KEY),
            leaderboard: Some(self.fetch_leaderboard().entries),
            settings: Some(self.load_settings()),
            exported_at: Some(timestamp_from_ms(now)),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Restore records from an export. Only records present in the bundle are
    /// overwritten; a malformed bundle changes nothing.
    pub fn import_data(&mut self, json: &str) -> Result<(), StorageError> {
        let bundle: ExportBundle = serde_json::from_str(json).map_err(|source| StorageError::Corrupt {
            key: "import".to_string(),
            source,
        })?;
        if let Some(user) = bundle.user {
            self.save_record(USER_KEY, &user)?;
        }
        if let Some(entries) = bundle.leaderboard {
            self.save_record(LEADERBOARD_KEY, &Leaderboard::from_entries(entries).entries)?;
        }
        if let Some(settings) = bundle.settings {
            self.save_record(SETTINGS_KEY, &settings)?;
        }
        log::info!("Data imported");
        Ok(())
    }
}
