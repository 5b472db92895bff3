//! Render projection
//!
//! Turns the live registry plus game state into flat per-object records. The
//! renderer only reads these; it never touches simulation state directly.

use crate::sim::{Category, GamePhase, GameState, ObjectId};

/// Vertical travel of the `fall` keyframes in `index.html`, percent of board height
pub const FALL_START_PERCENT: f32 = -10.0;
pub const FALL_END_PERCENT: f32 = 110.0;

/// On-screen vertical position for a fall progress in [0, 1]
pub fn top_percent(progress: f32) -> f32 {
    FALL_START_PERCENT + (FALL_END_PERCENT - FALL_START_PERCENT) * progress
}

/// Everything the renderer needs to draw one object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectView {
    pub id: ObjectId,
    pub category: Category,
    /// `game-element <type>[ frozen]`
    pub class_name: String,
    pub emoji: &'static str,
    /// Left edge, percent of board width
    pub left_percent: f32,
    /// CSS animation duration
    pub fall_duration_secs: f32,
    /// 0 = top, 1 = bottom, freeze-adjusted
    pub progress: f32,
    /// Animation should be held
    pub frozen: bool,
}

/// Heads-up display state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudView {
    pub score: u32,
    pub high_score: u32,
    pub phase: GamePhase,
    pub frozen: bool,
}

impl HudView {
    /// Pause button label
    pub fn pause_label(&self) -> &'static str {
        if self.phase == GamePhase::Paused {
            "\u{25b6}\u{fe0f}"
        } else {
            "\u{23f8}\u{fe0f}"
        }
    }
}

/// Project every live object, in insertion order
pub fn project(state: &GameState, now_ms: u64) -> Vec<ObjectView> {
    state
        .registry
        .snapshot()
        .iter()
        .map(|obj| {
            let mut class_name = format!("game-element {}", obj.category.as_str());
            if state.frozen {
                class_name.push_str(" frozen");
            }
            ObjectView {
                id: obj.id,
                category: obj.category,
                class_name,
                emoji: obj.category.emoji(),
                left_percent: obj.horizontal_position,
                fall_duration_secs: obj.fall_duration_ms as f32 / 1000.0,
                progress: obj.fall_progress(now_ms, state.frozen_total_ms).min(1.0),
                frozen: state.frozen,
            }
        })
        .collect()
}

pub fn hud(state: &GameState) -> HudView {
    HudView {
        score: state.score,
        high_score: state.high_score_to_beat,
        phase: state.phase,
        frozen: state.frozen,
    }
}
