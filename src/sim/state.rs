//! Game state and core simulation types
//!
//! A single owned value holds everything the game loop mutates: score, phase,
//! freeze flag, the live registry, the clock and the RNG.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::config::SimConfig;
use super::object::{Category, ObjectId};
use super::registry::Registry;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a player / start button; nothing spawns
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused; the board is empty
    Paused,
    /// Run ended, final score recorded
    Ended,
}

/// Things that happened during a tick, for persistence, effects and audio
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Spawned {
        id: ObjectId,
        category: Category,
    },
    /// An object was clicked and its effect applied
    Resolved {
        id: ObjectId,
        category: Category,
        /// Where it was on the board (percent across, fall progress down)
        horizontal_position: f32,
        fall_progress: f32,
        score: u32,
    },
    Expired {
        id: ObjectId,
    },
    FreezeStarted {
        until_ms: u64,
    },
    FreezeEnded,
    Paused {
        /// Objects dropped from the board
        cleared: usize,
    },
    Resumed,
    NewHighScore {
        score: u32,
    },
    Ended {
        final_score: u32,
    },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Score, never negative
    pub score: u32,
    /// Current phase
    pub phase: GamePhase,
    /// Sky is frozen (visual fall progression halted)
    pub frozen: bool,
    /// Total time spent frozen since the game started
    pub frozen_total_ms: u64,
    /// Live falling objects
    pub registry: Registry,
    /// Spawn/sweep/freeze timers
    pub clock: Clock,
    pub config: SimConfig,
    /// Score that must be beaten to report a new high score
    pub high_score_to_beat: u32,
    pub(crate) rng: Pcg32,
    /// Last timestamp the state was advanced to
    pub(crate) last_time_ms: u64,
    /// Next object ID (never reset, so ids stay unique across restarts)
    next_id: u64,
}

impl GameState {
    /// Create a game in the Ready phase
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self {
            seed,
            score: 0,
            phase: GamePhase::Ready,
            frozen: false,
            frozen_total_ms: 0,
            registry: Registry::new(),
            clock: Clock::new(),
            config,
            high_score_to_beat: 0,
            rng: Pcg32::seed_from_u64(seed),
            last_time_ms: 0,
            next_id: 1,
        }
    }

    /// Allocate a new object ID
    pub fn next_object_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        ObjectId(id)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Start (or restart) a run: fresh score, empty board, timers armed from `now`
    pub fn start(&mut self, now_ms: u64) -> GameEvent {
        self.score = 0;
        self.frozen = false;
        self.frozen_total_ms = 0;
        self.registry.remove_all();
        self.clock.cancel_freeze_clear();
        self.clock.restart(&self.config.intervals, now_ms);
        self.last_time_ms = now_ms;
        self.phase = GamePhase::Playing;
        log::info!("Game started (seed {})", self.seed);
        GameEvent::Started
    }

    /// End the run
    pub fn end(&mut self, now_ms: u64) -> GameEvent {
        self.advance_time(now_ms);
        self.clock.stop();
        self.clock.cancel_freeze_clear();
        self.registry.remove_all();
        self.frozen = false;
        self.phase = GamePhase::Ended;
        log::info!("Game ended with score {}", self.score);
        GameEvent::Ended {
            final_score: self.score,
        }
    }

    /// Flip between Playing and Paused.
    ///
    /// Pausing empties the board and disarms the spawn/sweep timers; resuming
    /// re-arms them fresh. The freeze clear is left running. Any other phase is a
    /// no-op and returns `None`.
    pub fn toggle_pause(&mut self, now_ms: u64) -> Option<GameEvent> {
        match self.phase {
            GamePhase::Playing => {
                self.advance_time(now_ms);
                self.clock.stop();
                let cleared = self.registry.remove_all();
                self.phase = GamePhase::Paused;
                log::info!("Paused ({} objects cleared)", cleared);
                Some(GameEvent::Paused { cleared })
            }
            GamePhase::Paused => {
                self.advance_time(now_ms);
                self.clock.start(&self.config.intervals, now_ms);
                self.phase = GamePhase::Playing;
                log::info!("Resumed");
                Some(GameEvent::Resumed)
            }
            GamePhase::Ready | GamePhase::Ended => None,
        }
    }

    /// Swap in a new configuration; timers are re-armed if the intervals changed mid-game
    pub fn set_config(&mut self, config: SimConfig, now_ms: u64) {
        let intervals_changed = config.intervals != self.config.intervals;
        self.config = config;
        if intervals_changed && self.clock.is_armed() {
            self.clock.restart(&self.config.intervals, now_ms);
            log::info!("Spawn intervals changed, timers re-armed");
        }
    }

    /// Move the state's notion of "now" forward, accumulating frozen time
    pub(crate) fn advance_time(&mut self, now_ms: u64) {
        if now_ms > self.last_time_ms {
            if self.frozen {
                self.frozen_total_ms += now_ms - self.last_time_ms;
            }
            self.last_time_ms = now_ms;
        }
    }

    /// Begin (or extend) a freeze window ending `freeze_duration_ms` from now
    pub(crate) fn start_freeze(&mut self, now_ms: u64) -> u64 {
        let until_ms = now_ms + self.config.freeze_duration_ms;
        self.frozen = true;
        self.clock.arm_freeze_clear(until_ms);
        until_ms
    }

    /// End the freeze window; returns whether the state was frozen
    pub(crate) fn clear_freeze(&mut self) -> bool {
        std::mem::replace(&mut self.frozen, false)
    }
}
