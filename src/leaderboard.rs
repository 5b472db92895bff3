//! Leaderboard
//!
//! One best entry per player, sorted descending by score, top 15 kept.

use serde::{Deserialize, Serialize};

/// Maximum number of leaderboard entries to keep
pub const MAX_LEADERBOARD_ENTRIES: usize = 15;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    pub user_id: String,
}

/// Leaderboard, always kept deduplicated, sorted and capped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from raw entries (e.g. a stored list), normalizing it
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self { entries };
        board.normalize();
        board
    }

    /// Add a score; returns the player's rank afterwards (1-indexed) if they are on the board
    pub fn upsert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let user_id = entry.user_id.clone();
        self.entries.push(entry);
        self.normalize();
        self.rank_of(&user_id)
    }

    /// Keep each player's best entry, sort descending, truncate.
    ///
    /// For equal scores the earlier entry keeps its place.
    fn normalize(&mut self) {
        let mut best: Vec<LeaderboardEntry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            match best.iter_mut().find(|e| e.user_id == entry.user_id) {
                Some(existing) if entry.score > existing.score => *existing = entry,
                Some(_) => {}
                None => best.push(entry),
            }
        }
        best.sort_by(|a, b| b.score.cmp(&a.score));
        best.truncate(MAX_LEADERBOARD_ENTRIES);
        self.entries = best;
    }

    /// 1-indexed rank of a player, if listed
    pub fn rank_of(&self, user_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|i| i + 1)
    }

    /// Would this score make the board for this player
    pub fn qualifies(&self, user_id: &str, score: u32) -> bool {
        if let Some(existing) = self.entries.iter().find(|e| e.user_id == user_id) {
            return score > existing.score;
        }
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

/// Format a unix timestamp (ms) as a `YYYY-MM-DD` date (UTC)
pub fn format_date(timestamp_ms: f64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms as i64)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: u32, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            username: format!("player{}", user),
            score,
            date: "2026-10-17".to_string(),
            user_id: format!("user_{}", user),
        }
    }

    #[test]
    fn test_twenty_players_keeps_top_fifteen() {
        let mut board = Leaderboard::new();
        for user in 0..20 {
            board.upsert(entry(user, user * 3));
        }
        assert_eq!(board.len(), MAX_LEADERBOARD_ENTRIES);
        assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));

        let mut ids: Vec<&str> = board.entries.iter().map(|e| e.user_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MAX_LEADERBOARD_ENTRIES);
        assert_eq!(board.top_score(), Some(57));
    }

    #[test]
    fn test_keeps_best_per_player() {
        let mut board = Leaderboard::new();
        board.upsert(entry(1, 40));
        board.upsert(entry(2, 30));
        assert_eq!(board.upsert(entry(1, 10)), Some(1));
        assert_eq!(board.len(), 2);
        assert_eq!(board.entries[0].score, 40);

        assert_eq!(board.upsert(entry(2, 50)), Some(1));
        assert_eq!(board.entries[0].user_id, "user_2");
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_rank_none_when_pushed_off() {
        let mut board = Leaderboard::new();
        for user in 0..15 {
            board.upsert(entry(user, 100 + user));
        }
        assert!(!board.qualifies("user_99", 1));
        assert_eq!(board.upsert(entry(99, 1)), None);
        assert!(board.qualifies("user_99", 500));
    }

    #[test]
    fn test_from_entries_normalizes() {
        let board = Leaderboard::from_entries(vec![entry(1, 5), entry(2, 9), entry(1, 7)]);
        let scores: Vec<u32> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![9, 7]);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(0.0), "1970-01-01");
        assert_eq!(format_date(1_700_000_000_000.0), "2023-11-14");
    }
}
