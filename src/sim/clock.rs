//! Timer multiplexer
//!
//! One repeating trigger per category, one for the lifecycle sweep, and a
//! one-shot freeze clear. The clock never calls back into the game; `advance`
//! hands back the fires that came due, in scheduled order, and the tick
//! dispatches them.
//!
//! Every `start` bumps the epoch. A fire carries the epoch it was produced under,
//! so anything produced before a `stop` is recognisably stale.

use super::config::Intervals;
use super::object::Category;
use crate::consts::MAX_CATCH_UP_FIRES;

/// What a timer fire asks the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Lifecycle sweep (reaper)
    Sweep,
    /// Spawn one object of this category
    Spawn(Category),
    /// End of the freeze window
    FreezeClear,
}

impl TimerKind {
    /// Tie-break for fires scheduled at the same instant
    fn rank(&self) -> u8 {
        match self {
            TimerKind::Sweep => 0,
            TimerKind::Spawn(Category::Collectible) => 1,
            TimerKind::Spawn(Category::Hazard) => 2,
            TimerKind::Spawn(Category::PowerFreeze) => 3,
            TimerKind::FreezeClear => 4,
        }
    }
}

/// A single timer occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFire {
    pub kind: TimerKind,
    /// When it was scheduled to fire (may be earlier than `now` when catching up)
    pub due_ms: u64,
    pub epoch: u64,
}

#[derive(Debug, Clone)]
struct RepeatingTimer {
    kind: TimerKind,
    period_ms: u64,
    next_due_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Clock {
    timers: Vec<RepeatingTimer>,
    epoch: u64,
    freeze_clear_due: Option<u64>,
    freeze_epoch: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm every repeating trigger; each first fires one full period after `now`.
    ///
    /// Any previously armed triggers are dropped first, so there is never more
    /// than one trigger per kind.
    pub fn start(&mut self, intervals: &Intervals, now_ms: u64) {
        self.stop();
        self.epoch += 1;

        let mut arm = |kind: TimerKind, period_ms: u64| {
            let period_ms = period_ms.max(1);
            self.timers.push(RepeatingTimer {
                kind,
                period_ms,
                next_due_ms: now_ms + period_ms,
            });
        };
        arm(TimerKind::Sweep, intervals.sweep_ms);
        for category in Category::ALL {
            arm(TimerKind::Spawn(category), intervals.spawn_interval(category));
        }

        log::debug!("Clock armed (epoch {}) at {} ms", self.epoch, now_ms);
    }

    /// Disarm every repeating trigger. Idempotent. The freeze clear keeps running.
    pub fn stop(&mut self) {
        if !self.timers.is_empty() {
            self.timers.clear();
            self.epoch += 1;
            log::debug!("Clock disarmed (epoch {})", self.epoch);
        }
    }

    /// Stop and start again from a clean state
    pub fn restart(&mut self, intervals: &Intervals, now_ms: u64) {
        self.stop();
        self.start(intervals, now_ms);
    }

    pub fn is_armed(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Schedule the freeze clear, replacing any pending one
    pub fn arm_freeze_clear(&mut self, due_ms: u64) {
        self.freeze_epoch += 1;
        self.freeze_clear_due = Some(due_ms);
    }

    /// Drop the pending freeze clear
    pub fn cancel_freeze_clear(&mut self) {
        if self.freeze_clear_due.take().is_some() {
            self.freeze_epoch += 1;
        }
    }

    pub fn freeze_clear_due(&self) -> Option<u64> {
        self.freeze_clear_due
    }

    /// Is this fire still valid, or was it produced before a stop/re-arm
    pub fn is_current(&self, fire: &TimerFire) -> bool {
        match fire.kind {
            TimerKind::FreezeClear => fire.epoch == self.freeze_epoch,
            _ => self.is_armed() && fire.epoch == self.epoch,
        }
    }

    /// Collect every fire due at or before `now`, ordered by scheduled time.
    ///
    /// A trigger that fell more than [`MAX_CATCH_UP_FIRES`] periods behind drops
    /// the backlog and re-anchors on `now`.
    pub fn advance(&mut self, now_ms: u64) -> Vec<TimerFire> {
        let mut fires = Vec::new();

        for timer in &mut self.timers {
            let mut count = 0;
            while timer.next_due_ms <= now_ms && count < MAX_CATCH_UP_FIRES {
                fires.push(TimerFire {
                    kind: timer.kind,
                    due_ms: timer.next_due_ms,
                    epoch: self.epoch,
                });
                timer.next_due_ms += timer.period_ms;
                count += 1;
            }
            if timer.next_due_ms <= now_ms {
                log::debug!("{:?} timer fell behind, re-anchoring at {} ms", timer.kind, now_ms);
                timer.next_due_ms = now_ms + timer.period_ms;
            }
        }

        if let Some(due_ms) = self.freeze_clear_due.filter(|&due| due <= now_ms) {
            fires.push(TimerFire {
                kind: TimerKind::FreezeClear,
                due_ms,
                epoch: self.freeze_epoch,
            });
            self.freeze_clear_due = None;
        }

        fires.sort_by_key(|f| (f.due_ms, f.kind.rank()));
        fires
    }
}
