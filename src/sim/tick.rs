//! Simulation tick
//!
//! Core game loop entry point: advances the clock to `now`, dispatches every
//! timer fire that came due, then applies the frame's input.

use super::clock::{TimerFire, TimerKind};
use super::object::{Category, ObjectId};
use super::reaper::sweep;
use super::resolver::{Effect, Resolution, resolve};
use super::spawner::spawn;
use super::state::{GameEvent, GameState};

/// A click on a rendered object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub id: ObjectId,
    pub category: Category,
}

/// Input collected since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Object clicks, in the order they happened
    pub clicks: Vec<Click>,
    /// Pause toggle (applied after the clicks)
    pub pause: bool,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty() && !self.pause
    }

    /// Reset one-shot inputs after processing
    pub fn clear(&mut self) {
        self.clicks.clear();
        self.pause = false;
    }
}

/// Advance the game to `now_ms`.
///
/// Timer fires are dispatched in scheduled order, each at its own due time, so a
/// long frame still spawns objects with the right ages. Time never runs
/// backwards: a `now_ms` earlier than the last tick is treated as no time passing.
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64) -> Vec<GameEvent> {
    let now_ms = now_ms.max(state.last_time_ms);
    let mut events = Vec::new();

    for fire in state.clock.advance(now_ms) {
        if !state.clock.is_current(&fire) {
            log::debug!("Dropping stale {:?} fire", fire.kind);
            continue;
        }
        state.advance_time(fire.due_ms);
        dispatch_fire(state, fire, &mut events);
    }
    state.advance_time(now_ms);

    for click in &input.clicks {
        resolve_click(state, click, now_ms, &mut events);
    }

    if input.pause {
        events.extend(state.toggle_pause(now_ms));
    }

    events
}

fn dispatch_fire(state: &mut GameState, fire: TimerFire, events: &mut Vec<GameEvent>) {
    match fire.kind {
        TimerKind::Spawn(category) => {
            // Spawn timers are disarmed outside play; this only guards a stray fire
            if !state.is_playing() {
                return;
            }
            if let Some(id) = spawn(state, category, fire.due_ms) {
                events.push(GameEvent::Spawned { id, category });
            }
        }
        TimerKind::Sweep => {
            let expired = sweep(
                &mut state.registry,
                fire.due_ms,
                &state.config,
                state.frozen_total_ms,
            );
            if !expired.is_empty() {
                log::trace!("Reaped {} objects", expired.len());
            }
            events.extend(expired.into_iter().map(|id| GameEvent::Expired { id }));
        }
        TimerKind::FreezeClear => {
            if state.clear_freeze() {
                log::debug!("Freeze ended");
                events.push(GameEvent::FreezeEnded);
            }
        }
    }
}

fn resolve_click(state: &mut GameState, click: &Click, now_ms: u64, events: &mut Vec<GameEvent>) {
    let frozen_total_ms = state.frozen_total_ms;
    match resolve(state, click.id, click.category, now_ms) {
        Resolution::Applied { object, effect } => {
            log::debug!("Resolved {} #{}: {:?}", object.category.as_str(), object.id, effect);
            if let Effect::Frozen { until_ms } = effect {
                events.push(GameEvent::FreezeStarted { until_ms });
            }
            events.push(GameEvent::Resolved {
                id: object.id,
                category: object.category,
                horizontal_position: object.horizontal_position,
                fall_progress: object.fall_progress(now_ms, frozen_total_ms).min(1.0),
                score: state.score,
            });
            if state.score > state.high_score_to_beat {
                state.high_score_to_beat = state.score;
                events.push(GameEvent::NewHighScore { score: state.score });
            }
        }
        Resolution::Ignored | Resolution::Blocked | Resolution::Missed => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::config::{Intervals, SimConfig};
    use crate::sim::state::GamePhase;

    fn config() -> SimConfig {
        SimConfig {
            intervals: Intervals {
                collectible_ms: 1200,
                hazard_ms: 5000,
                power_freeze_ms: 15000,
                sweep_ms: 1000,
            },
            ..Default::default()
        }
    }

    fn spawned(events: &[GameEvent], category: Category) -> Vec<ObjectId> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Spawned { id, category: c } if *c == category => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn click(id: ObjectId, category: Category) -> TickInput {
        TickInput {
            clicks: vec![Click { id, category }],
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_spawns_before_start() {
        let mut state = GameState::new(5, config());
        let events = tick(&mut state, &TickInput::default(), 60_000);
        assert!(events.is_empty());
        assert!(state.registry.is_empty());
    }

    #[test]
    fn test_spawn_cadence() {
        let mut state = GameState::new(5, config());
        state.start(0);
        let events = tick(&mut state, &TickInput::default(), 6000);
        assert_eq!(spawned(&events, Category::Collectible).len(), 5);
        assert_eq!(spawned(&events, Category::Hazard).len(), 1);
        assert_eq!(spawned(&events, Category::PowerFreeze).len(), 0);
        assert_eq!(state.registry.len(), 6);
    }

    #[test]
    fn test_collect_then_score() {
        let mut state = GameState::new(5, config());
        state.start(0);
        let events = tick(&mut state, &TickInput::default(), 1200);
        let heart = spawned(&events, Category::Collectible)[0];

        let events = tick(&mut state, &click(heart, Category::Collectible), 1300);
        assert_eq!(state.score, 1);
        assert!(events.contains(&GameEvent::NewHighScore { score: 1 }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Resolved { id, .. } if *id == heart)));
    }

    #[test]
    fn test_pause_empties_and_silences() {
        let mut state = GameState::new(5, config());
        state.start(0);
        tick(&mut state, &TickInput::default(), 5000);
        assert!(!state.registry.is_empty());

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        let events = tick(&mut state, &pause, 5100);
        assert!(matches!(events.last(), Some(GameEvent::Paused { .. })));
        assert!(state.registry.is_empty());

        // A minute of pause spawns nothing
        let events = tick(&mut state, &TickInput::default(), 65_100);
        assert!(events.is_empty());
        assert!(state.registry.is_empty());

        // Resume re-arms fresh: first heart one full period after resume
        tick(&mut state, &pause, 65_100);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(tick(&mut state, &TickInput::default(), 66_299).is_empty());
        let events = tick(&mut state, &TickInput::default(), 66_300);
        assert_eq!(spawned(&events, Category::Collectible).len(), 1);
    }

    #[test]
    fn test_reaper_removes_unclicked_objects() {
        let mut state = GameState::new(5, config());
        state.start(0);
        let events = tick(&mut state, &TickInput::default(), 1200);
        let heart = spawned(&events, Category::Collectible)[0];

        let lifetime = state.config.max_lifetime_ms();
        tick(&mut state, &TickInput::default(), 1200 + lifetime - 1);
        assert!(state.registry.contains(heart));

        let events = tick(&mut state, &TickInput::default(), 1200 + lifetime + 1000);
        assert!(events.contains(&GameEvent::Expired { id: heart }));
        assert!(!state.registry.contains(heart));
    }

    #[test]
    fn test_freeze_refresh_window() {
        let mut state = GameState::new(5, config());
        state.start(0);
        let a = spawn(&mut state, Category::PowerFreeze, 0).unwrap();
        let b = spawn(&mut state, Category::PowerFreeze, 0).unwrap();

        let events = tick(&mut state, &click(a, Category::PowerFreeze), 1000);
        assert!(events.contains(&GameEvent::FreezeStarted { until_ms: 3000 }));
        tick(&mut state, &click(b, Category::PowerFreeze), 2500);
        assert!(state.frozen);

        // First window would have ended at 3000; the second runs to 4500
        tick(&mut state, &TickInput::default(), 3000);
        assert!(state.frozen);
        tick(&mut state, &TickInput::default(), 4499);
        assert!(state.frozen);
        let events = tick(&mut state, &TickInput::default(), 4500);
        assert!(!state.frozen);
        assert!(events.contains(&GameEvent::FreezeEnded));
        assert_eq!(state.frozen_total_ms, 3500);
    }

    #[test]
    fn test_freeze_clear_fires_while_paused() {
        let mut state = GameState::new(5, config());
        state.start(0);
        let flake = spawn(&mut state, Category::PowerFreeze, 0).unwrap();
        tick(&mut state, &click(flake, Category::PowerFreeze), 100);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, 200);
        assert!(state.is_paused());
        tick(&mut state, &TickInput::default(), 2100);
        assert!(!state.frozen);
    }

    #[test]
    fn test_clicks_land_before_pause() {
        let mut state = GameState::new(5, config());
        state.start(0);
        let heart = spawn(&mut state, Category::Collectible, 0).unwrap();
        let input = TickInput {
            clicks: vec![Click {
                id: heart,
                category: Category::Collectible,
            }],
            pause: true,
        };
        tick(&mut state, &input, 100);
        assert_eq!(state.score, 1);
        assert!(state.is_paused());
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut state = GameState::new(5, config());
        state.start(1000);
        tick(&mut state, &TickInput::default(), 2000);
        let events = tick(&mut state, &TickInput::default(), 500);
        assert!(events.is_empty());
        assert_eq!(state.last_time_ms, 2000);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical boards
        let mut state1 = GameState::new(99999, config());
        let mut state2 = GameState::new(99999, config());
        state1.start(0);
        state2.start(0);

        for now in (0..30_000).step_by(16) {
            tick(&mut state1, &TickInput::default(), now);
            tick(&mut state2, &TickInput::default(), now);
        }

        assert_eq!(state1.registry.snapshot(), state2.registry.snapshot());
    }
}
