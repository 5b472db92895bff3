//! Click resolution
//!
//! Turns a click on an object into its score/freeze effect. A click on an
//! object that is already gone (reaped, or clicked twice in one frame) is a
//! plain miss, never an error.

use super::object::{Category, FallingObject, ObjectId};
use super::state::GameState;
use crate::consts::{COLLECTIBLE_REWARD, HAZARD_PENALTY};

/// The effect applied by a resolved object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Score went up by this much
    Scored(u32),
    /// Score went down by this much (less than the penalty if it hit zero)
    Penalized(u32),
    /// Sky frozen until this time
    Frozen { until_ms: u64 },
}

/// Outcome of a click
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Applied { object: FallingObject, effect: Effect },
    /// Game not running (paused, not started, or over); the object stays put
    Ignored,
    /// Clicks are blocked while frozen; the object stays put
    Blocked,
    /// Object no longer live
    Missed,
}

/// Apply a click on `id`.
///
/// `category` is what the view believed the object to be; the registry's copy
/// wins if they disagree.
pub fn resolve(state: &mut GameState, id: ObjectId, category: Category, now_ms: u64) -> Resolution {
    if !state.is_playing() {
        return Resolution::Ignored;
    }
    if state.frozen && state.config.freeze_blocks_clicks {
        return Resolution::Blocked;
    }

    let Some(object) = state.registry.remove(id) else {
        log::trace!("Click on #{} missed (already gone)", id);
        return Resolution::Missed;
    };

    if object.category != category {
        log::warn!(
            "Click on #{} reported {:?} but object is {:?}",
            id,
            category,
            object.category
        );
    }

    let effect = apply_effect(state, object.category, now_ms);
    Resolution::Applied { object, effect }
}

fn apply_effect(state: &mut GameState, category: Category, now_ms: u64) -> Effect {
    match category {
        Category::Collectible => {
            state.score = state.score.saturating_add(COLLECTIBLE_REWARD);
            Effect::Scored(COLLECTIBLE_REWARD)
        }
        Category::Hazard => {
            let before = state.score;
            state.score = state.score.saturating_sub(HAZARD_PENALTY);
            Effect::Penalized(before - state.score)
        }
        Category::PowerFreeze => Effect::Frozen {
            until_ms: state.start_freeze(now_ms),
        },
    }
}
