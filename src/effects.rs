//! Particle bursts
//!
//! A short-lived flourish where an object was clicked. Purely visual: the
//! effects system reads resolved events and nothing in the simulation reads it
//! back.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{Category, GameEvent};
use crate::view::top_percent;

/// How long a burst stays on screen
pub const BURST_DURATION_MS: u64 = 800;
/// Hard cap on simultaneous bursts
pub const MAX_BURSTS: usize = 32;

/// One particle of a burst
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Direction and speed (unit-ish; scaled by spread at render time)
    pub vel: Vec2,
    pub color: &'static str,
    /// Pixels
    pub size: f32,
}

/// A particle burst
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub id: u64,
    pub category: Category,
    /// Percent of board (x across, y down)
    pub origin: Vec2,
    pub particles: Vec<Particle>,
    pub started_ms: u64,
}

impl Burst {
    /// 0 at spawn, 1 when finished
    pub fn progress(&self, now_ms: u64) -> f32 {
        (now_ms.saturating_sub(self.started_ms) as f32 / BURST_DURATION_MS as f32).min(1.0)
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) >= BURST_DURATION_MS
    }

    /// Particle offset from the origin, easing out to `spread`
    pub fn particle_offset(&self, particle: &Particle, now_ms: u64, spread: f32) -> Vec2 {
        let t = self.progress(now_ms);
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        particle.vel * spread * eased
    }
}

fn palette(category: Category) -> &'static [&'static str] {
    match category {
        Category::Hazard => &["#FF4444", "#FF6B6B", "#FFE66D", "#FFA726", "#FF9800"],
        Category::Collectible => &["#FF6B8B", "#FF8FA3", "#FFB3C6", "#FFCCD5"],
        Category::PowerFreeze => &["#4ECDC4", "#6FFFE9", "#9EFCF7", "#C7FDF7"],
    }
}

/// Particle layout per category: (count, size in px)
fn shape(category: Category) -> (usize, f32) {
    match category {
        Category::Hazard => (12, 10.0),
        Category::Collectible | Category::PowerFreeze => (8, 6.0),
    }
}

/// Live bursts
#[derive(Debug, Clone)]
pub struct EffectsSystem {
    bursts: Vec<Burst>,
    rng: Pcg32,
    next_id: u64,
    enabled: bool,
}

impl EffectsSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            bursts: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            enabled: true,
        }
    }

    /// Turn bursts on/off (reduced motion)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.bursts.clear();
        }
    }

    /// React to a simulation event; only resolved objects produce a burst
    pub fn on_resolved(&mut self, event: &GameEvent, now_ms: u64) {
        if let GameEvent::Resolved {
            category,
            horizontal_position,
            fall_progress,
            ..
        } = *event
        {
            let origin = Vec2::new(horizontal_position, top_percent(fall_progress));
            self.spawn_burst(category, origin, now_ms);
        }
    }

    /// Start a burst at `origin` (percent of board)
    pub fn spawn_burst(&mut self, category: Category, origin: Vec2, now_ms: u64) {
        if !self.enabled {
            return;
        }
        let (count, size) = shape(category);
        let colors = palette(category);
        let particles = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                let speed = 0.8 + self.rng.random::<f32>() * 0.4;
                Particle {
                    vel: Vec2::from_angle(angle) * speed,
                    color: colors[self.rng.random_range(0..colors.len())],
                    size,
                }
            })
            .collect();

        if self.bursts.len() >= MAX_BURSTS {
            self.bursts.remove(0);
        }
        self.bursts.push(Burst {
            id: self.next_id,
            category,
            origin,
            particles,
            started_ms: now_ms,
        });
        self.next_id += 1;
    }

    /// Drop finished bursts, returning the ids removed
    pub fn update(&mut self, now_ms: u64) -> Vec<u64> {
        let mut finished = Vec::new();
        self.bursts.retain(|b| {
            let done = b.is_finished(now_ms);
            if done {
                finished.push(b.id);
            }
            !done
        });
        finished
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn clear(&mut self) {
        self.bursts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ObjectId;

    fn resolved(category: Category) -> GameEvent {
        GameEvent::Resolved {
            id: ObjectId(1),
            category,
            horizontal_position: 40.0,
            fall_progress: 0.5,
            score: 0,
        }
    }

    #[test]
    fn test_burst_shapes() {
        let mut fx = EffectsSystem::new(1);
        fx.on_resolved(&resolved(Category::Hazard), 0);
        fx.on_resolved(&resolved(Category::Collectible), 0);
        assert_eq!(fx.bursts()[0].particles.len(), 12);
        assert_eq!(fx.bursts()[1].particles.len(), 8);
        assert_eq!(fx.bursts()[0].origin, Vec2::new(40.0, 50.0));
        assert!(fx.bursts()[1]
            .particles
            .iter()
            .all(|p| palette(Category::Collectible).contains(&p.color)));
    }

    #[test]
    fn test_burst_origin_tracks_animated_position() {
        let mut fx = EffectsSystem::new(1);
        let at = |fall_progress| GameEvent::Resolved {
            id: ObjectId(2),
            category: Category::Collectible,
            horizontal_position: 10.0,
            fall_progress,
            score: 0,
        };
        fx.on_resolved(&at(0.0), 0);
        fx.on_resolved(&at(1.0), 0);
        assert_eq!(fx.bursts()[0].origin, Vec2::new(10.0, -10.0));
        assert_eq!(fx.bursts()[1].origin, Vec2::new(10.0, 110.0));
    }

    #[test]
    fn test_only_resolved_events_burst() {
        let mut fx = EffectsSystem::new(1);
        fx.on_resolved(&GameEvent::Expired { id: ObjectId(3) }, 0);
        fx.on_resolved(&GameEvent::FreezeEnded, 0);
        assert!(fx.bursts().is_empty());
    }

    #[test]
    fn test_bursts_expire() {
        let mut fx = EffectsSystem::new(1);
        fx.on_resolved(&resolved(Category::PowerFreeze), 100);
        assert!(fx.update(100 + BURST_DURATION_MS - 1).is_empty());
        assert_eq!(fx.update(100 + BURST_DURATION_MS), vec![1]);
        assert!(fx.bursts().is_empty());
    }

    #[test]
    fn test_particles_move_outward() {
        let mut fx = EffectsSystem::new(1);
        fx.spawn_burst(Category::Collectible, Vec2::ZERO, 0);
        let burst = &fx.bursts()[0];
        let p = &burst.particles[0];
        assert_eq!(burst.particle_offset(p, 0, 50.0), Vec2::ZERO);
        let half = burst.particle_offset(p, BURST_DURATION_MS / 2, 50.0).length();
        let end = burst.particle_offset(p, BURST_DURATION_MS, 50.0).length();
        assert!(half > 0.0 && end > half);
    }

    #[test]
    fn test_disabled_effects_do_nothing() {
        let mut fx = EffectsSystem::new(1);
        fx.set_enabled(false);
        fx.on_resolved(&resolved(Category::Hazard), 0);
        assert!(fx.bursts().is_empty());
    }
}
