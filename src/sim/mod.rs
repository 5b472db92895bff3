//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in as explicit millisecond timestamps
//! - Seeded RNG only
//! - Stable iteration order (by object ID)
//! - No rendering, storage or platform dependencies

pub mod clock;
pub mod config;
pub mod object;
pub mod reaper;
pub mod registry;
pub mod resolver;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::{Clock, TimerFire, TimerKind};
pub use config::{ExpiryPolicy, Intervals, SimConfig};
pub use object::{Category, FallingObject, ObjectId};
pub use reaper::sweep;
pub use registry::{Registry, RegistryError};
pub use resolver::{Effect, Resolution, resolve};
pub use spawner::spawn;
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{Click, TickInput, tick};
