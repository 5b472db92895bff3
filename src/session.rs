//! Game session
//!
//! Owns one simulation plus the collaborators that react to it: the storage
//! component, the signed-in player, particle effects and settings. The platform
//! layer only talks to the session.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::effects::EffectsSystem;
use crate::leaderboard::{Leaderboard, format_date};
use crate::persistence::{KeyValueStore, Storage};
use crate::player::{Player, ValidationError, timestamp_from_ms};
use crate::settings::Settings;
use crate::sim::{Click, GameEvent, GamePhase, GameState, TickInput, tick};
use crate::unix_now_ms;

/// Result of ending a run
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub final_score: u32,
    /// The `Ended` event, for audio and UI
    pub event: GameEvent,
    /// Updated player stats, if a player was signed in
    pub player: Option<Player>,
    /// 1-based leaderboard rank, if the score made the board
    pub rank: Option<usize>,
}

/// A running game wired to persistence and effects
pub struct GameSession<S: KeyValueStore> {
    pub state: GameState,
    pub effects: EffectsSystem,
    storage: Storage<S>,
    player: Option<Player>,
    settings: Settings,
    /// Input queued by the platform layer until the next tick
    pending: TickInput,
    rng: Pcg32,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Create a session over `store`, loading settings from it
    pub fn new(store: S, seed: u64) -> Self {
        let storage = Storage::new(store);
        let settings = storage.load_settings();
        let mut effects = EffectsSystem::new(seed ^ 0x5eed);
        effects.set_enabled(settings.effective_particles());
        Self {
            state: GameState::new(seed, settings.sim_config()),
            effects,
            storage,
            player: None,
            settings,
            pending: TickInput::default(),
            rng: Pcg32::seed_from_u64(seed.wrapping_add(1)),
        }
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // === Identity ===

    /// Sign in with a previously stored player, if any
    pub fn restore(&mut self) -> Option<&Player> {
        self.player = self.storage.load_existing_player();
        self.sync_high_score();
        self.player.as_ref()
    }

    /// Create a new player from a submitted name
    pub fn login(&mut self, raw_name: &str) -> Result<&Player, ValidationError> {
        let player = self
            .storage
            .create_player(raw_name, unix_now_ms(), &mut self.rng)?;
        self.state.high_score_to_beat = player.high_score;
        Ok(&*self.player.insert(player))
    }

    /// Forget the player and their settings; the board stays
    pub fn logout(&mut self, now_ms: u64) {
        if self.state.is_playing() || self.state.is_paused() {
            self.state.end(now_ms);
        }
        self.storage.clear_player_session();
        self.player = None;
        self.state.high_score_to_beat = 0;
        self.state.phase = GamePhase::Ready;
        self.effects.clear();
        self.pending.clear();
        self.apply_settings(Settings::default(), now_ms);
    }

    fn sync_high_score(&mut self) {
        self.state.high_score_to_beat = self.player.as_ref().map_or(0, |p| p.high_score);
    }

    // === Lifecycle ===

    /// Start (or restart) a run. Only a signed-in player can play.
    pub fn start(&mut self, now_ms: u64) -> Option<GameEvent> {
        if self.player.is_none() {
            log::warn!("Cannot start a game without a player");
            return None;
        }
        self.sync_high_score();
        self.effects.clear();
        self.pending.clear();
        Some(self.state.start(now_ms))
    }

    /// Queue a click for the next tick
    pub fn click(&mut self, click: Click) {
        self.pending.clicks.push(click);
    }

    /// Queue a pause toggle for the next tick
    pub fn toggle_pause(&mut self) {
        self.pending.pause = !self.pending.pause;
    }

    /// Pause if currently playing (window blur, tab hidden)
    pub fn auto_pause(&mut self) {
        if self.state.is_playing() {
            self.pending.pause = true;
        }
    }

    /// Advance the game to `now_ms`, applying queued input
    pub fn tick(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let input = std::mem::take(&mut self.pending);
        let events = tick(&mut self.state, &input, now_ms);

        for event in &events {
            match event {
                GameEvent::Resolved { .. } => self.effects.on_resolved(event, now_ms),
                GameEvent::NewHighScore { score } => self.persist_high_score(*score),
                _ => {}
            }
        }
        self.effects.update(now_ms);
        events
    }

    /// The in-memory player is authoritative; storage writes are best effort
    fn persist_high_score(&mut self, score: u32) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let now = unix_now_ms();
        if player.raise_high_score(score) {
            player.last_played = timestamp_from_ms(now);
        }
        let player = player.clone();
        if !self.storage.save_player(&player) {
            log::warn!("High score {} kept in memory only", score);
        }
        self.storage
            .upsert_leaderboard(&player.id, &player.username, score, &format_date(now));
    }

    /// End the run and fold the score into the player's stats and the board
    pub fn end_game(&mut self, now_ms: u64) -> Option<GameSummary> {
        if !(self.state.is_playing() || self.state.is_paused()) {
            return None;
        }
        let event = self.state.end(now_ms);
        let final_score = self.state.score;
        self.pending.clear();

        let Some(player) = self.player.as_mut() else {
            return Some(GameSummary {
                final_score,
                event,
                player: None,
                rank: None,
            });
        };
        let now = unix_now_ms();
        if player.record_game(final_score, now) {
            log::info!("New personal best for {}: {}", player.username, final_score);
        }
        let player = player.clone();
        if !self.storage.save_player(&player) {
            log::warn!("Stats for {} kept in memory only", player.username);
        }
        let board = self
            .storage
            .upsert_leaderboard(&player.id, &player.username, final_score, &format_date(now));
        Some(GameSummary {
            final_score,
            event,
            rank: board.rank_of(&player.id),
            player: Some(player),
        })
    }

    pub fn leaderboard(&self) -> Leaderboard {
        self.storage.fetch_leaderboard()
    }

    // === Settings ===

    /// Adopt new settings: persisted, pushed into the simulation and effects
    pub fn apply_settings(&mut self, settings: Settings, now_ms: u64) {
        self.state.set_config(settings.sim_config(), now_ms);
        self.effects.set_enabled(settings.effective_particles());
        if self.player.is_some() {
            self.storage.save_settings(&settings);
        }
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, StorageError};
    use crate::settings::Difficulty;
    use crate::sim::Category;

    fn session() -> GameSession<MemoryStore> {
        GameSession::new(MemoryStore::new(), 42)
    }

    fn first_of(session: &GameSession<MemoryStore>, category: Category) -> Option<Click> {
        session
            .state
            .registry
            .snapshot()
            .iter()
            .find(|o| o.category == category)
            .map(|o| Click { id: o.id, category })
    }

    #[test]
    fn test_start_requires_player() {
        let mut session = session();
        assert_eq!(session.start(0), None);
        assert_eq!(session.state.phase, GamePhase::Ready);

        assert_eq!(session.login("x").unwrap_err(), ValidationError::TooShort);
        session.login("alice").unwrap();
        assert_eq!(session.start(0), Some(GameEvent::Started));
        assert!(session.state.is_playing());
    }

    #[test]
    fn test_collect_spawns_burst_and_records_high_score() {
        let mut session = session();
        session.login("alice").unwrap();
        session.start(0);
        session.tick(1200);
        let click = first_of(&session, Category::Collectible).unwrap();
        session.click(click);

        let events = session.tick(1300);
        assert!(events.contains(&GameEvent::NewHighScore { score: 1 }));
        assert_eq!(session.effects.bursts().len(), 1);
        assert_eq!(session.player().unwrap().high_score, 1);
        assert_eq!(session.leaderboard().entries[0].score, 1);
    }

    #[test]
    fn test_end_game_records_stats() {
        let mut session = session();
        session.login("bob").unwrap();
        session.start(0);
        session.tick(2400);
        let click = first_of(&session, Category::Collectible).unwrap();
        session.click(click);
        session.tick(2500);

        let summary = session.end_game(3000).unwrap();
        assert_eq!(summary.final_score, 1);
        assert_eq!(summary.event, GameEvent::Ended { final_score: 1 });
        assert_eq!(summary.rank, Some(1));
        let player = summary.player.unwrap();
        assert_eq!((player.games_played, player.total_score), (1, 1));
        assert_eq!(session.state.phase, GamePhase::Ended);
        assert!(session.end_game(4000).is_none());
    }

    #[test]
    fn test_restore_carries_high_score() {
        let mut session = session();
        session.login("carol").unwrap();
        session.start(0);
        session.tick(1200);
        let click = first_of(&session, Category::Collectible).unwrap();
        session.click(click);
        session.tick(1300);
        session.end_game(1400);

        let store = session.storage().store().clone();
        let mut restored = GameSession::new(store, 7);
        assert_eq!(restored.restore().unwrap().username, "carol");
        restored.start(0);
        assert_eq!(restored.state.high_score_to_beat, 1);
    }

    #[test]
    fn test_pause_toggle_goes_through_tick() {
        let mut session = session();
        session.login("dave").unwrap();
        session.start(0);
        session.tick(1200);
        session.toggle_pause();
        let events = session.tick(1300);
        assert!(matches!(events.last(), Some(GameEvent::Paused { cleared: 1 })));
        assert!(session.state.registry.is_empty());

        // Auto-pause does not un-pause
        session.auto_pause();
        assert!(session.tick(1400).is_empty());
        assert!(session.state.is_paused());
    }

    #[test]
    fn test_settings_flow_into_simulation() {
        let mut session = session();
        session.login("erin").unwrap();
        let settings = Settings {
            reduced_motion: true,
            ..Settings::from_difficulty(Difficulty::Hard)
        };
        session.apply_settings(settings.clone(), 0);
        assert_eq!(session.state.config, settings.sim_config());
        assert_eq!(session.storage().load_settings(), settings);

        session.start(0);
        session.tick(1000);
        let click = first_of(&session, Category::Collectible).unwrap();
        session.click(click);
        session.tick(1100);
        assert!(session.effects.bursts().is_empty());
    }

    #[test]
    fn test_logout_clears_session() {
        let mut session = session();
        session.login("frank").unwrap();
        session.start(0);
        session.logout(500);
        assert!(session.player().is_none());
        assert_eq!(session.state.phase, GamePhase::Ready);
        assert!(session.storage().load_existing_player().is_none());
        assert_eq!(session.start(600), None);
    }

    /// Reads work, every write fails (quota exceeded, private mode)
    #[derive(Default)]
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_stats_survive_failed_writes() {
        let mut session = GameSession::new(ReadOnlyStore::default(), 42);
        session.login("grace").unwrap();

        session.start(0);
        session.tick(1200);
        let click = session
            .state
            .registry
            .snapshot()
            .iter()
            .find(|o| o.category == Category::Collectible)
            .map(|o| Click { id: o.id, category: o.category })
            .unwrap();
        session.click(click);
        session.tick(1300);
        assert_eq!(session.player().unwrap().high_score, 1);

        let summary = session.end_game(1400).unwrap();
        let player = summary.player.unwrap();
        assert_eq!((player.games_played, player.total_score, player.high_score), (1, 1, 1));

        session.start(2000);
        session.end_game(2100).unwrap();
        let player = session.player().unwrap();
        assert_eq!((player.games_played, player.total_score), (2, 1));
        assert!(session.storage().load_existing_player().is_none());
    }
}
