//! Falling objects
//!
//! Objects are immutable after creation; the only way they change is by leaving
//! the registry.

use serde::{Deserialize, Serialize};

/// Unique object identifier, allocated monotonically per game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of thing is falling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Heart: +1
    Collectible,
    /// Bomb: -10, floored at 0
    Hazard,
    /// Snowflake: freezes the sky for a moment
    PowerFreeze,
}

impl Category {
    /// All categories in timer dispatch order
    pub const ALL: [Category; 3] = [Category::Collectible, Category::Hazard, Category::PowerFreeze];

    /// CSS class / DOM name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Collectible => "heart",
            Category::Hazard => "bomb",
            Category::PowerFreeze => "freeze",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "heart" => Some(Category::Collectible),
            "bomb" => Some(Category::Hazard),
            "freeze" => Some(Category::PowerFreeze),
            _ => None,
        }
    }

    /// Glyph shown on the board
    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Collectible => "\u{2764}\u{fe0f}",
            Category::Hazard => "\u{1f4a3}",
            Category::PowerFreeze => "\u{2744}\u{fe0f}",
        }
    }
}

/// A single falling object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: ObjectId,
    pub category: Category,
    /// Left edge as a percentage of board width, in [0, 90]
    pub horizontal_position: f32,
    /// Time to traverse the board top to bottom
    pub fall_duration_ms: u64,
    /// Game clock timestamp of insertion
    pub created_at_ms: u64,
    /// Game's cumulative frozen time when this object spawned
    pub frozen_ms_at_spawn: u64,
}

impl FallingObject {
    /// Time since spawn
    #[inline]
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }

    /// Age-based expiry
    #[inline]
    pub fn is_expired(&self, now_ms: u64, max_lifetime_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= max_lifetime_ms
    }

    /// Visual fall progress (0 = top, 1 = bottom edge), excluding time spent frozen
    pub fn fall_progress(&self, now_ms: u64, frozen_total_ms: u64) -> f32 {
        let frozen_since_spawn = frozen_total_ms.saturating_sub(self.frozen_ms_at_spawn);
        let moving_ms = self.elapsed_ms(now_ms).saturating_sub(frozen_since_spawn);
        moving_ms as f32 / self.fall_duration_ms.max(1) as f32
    }

    /// Has the object visually crossed the bottom of the viewport
    #[inline]
    pub fn has_crossed_bottom(&self, now_ms: u64, frozen_total_ms: u64) -> bool {
        self.fall_progress(now_ms, frozen_total_ms) >= 1.0
    }
}
