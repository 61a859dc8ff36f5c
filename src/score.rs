//! Scoring, level and gravity progression

use std::time::Duration;

/// Points per cleared row, multiplied by level
const POINTS_PER_ROW: u64 = 100;
/// Extra points for clearing four rows at once, multiplied by level
const FOUR_ROW_BONUS: u64 = 400;
/// Lines needed per level
const LINES_PER_LEVEL: u32 = 10;

/// Outcome of a scored clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub rows: u32,
    pub points: u64,
    pub leveled_up: bool,
}

/// Running score for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, starts at 1
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Add a simultaneous clear of `rows` rows
    pub fn add_clear(&mut self, rows: u32) -> ClearOutcome {
        if rows == 0 {
            return ClearOutcome {
                rows,
                points: 0,
                leveled_up: false,
            };
        }

        // Scored at the level the rows were cleared on
        let level = self.level as u64;
        let mut points = rows as u64 * POINTS_PER_ROW * level;
        if rows == 4 {
            points += FOUR_ROW_BONUS * level;
        }
        self.points += points;

        self.lines += rows;
        let previous = self.level;
        self.level = self.lines / LINES_PER_LEVEL + 1;

        ClearOutcome {
            rows,
            points,
            leveled_up: self.level > previous,
        }
    }
}

/// Gravity tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gravity {
    /// Interval at level 1
    pub base: Duration,
    /// Reduction per level above 1
    pub step: Duration,
    /// Floor the interval never goes below
    pub min: Duration,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            step: Duration::from_millis(50),
            min: Duration::from_millis(100),
        }
    }
}

impl Gravity {
    /// Get the fall interval for a level
    pub fn interval(&self, level: u32) -> Duration {
        let reduction = self.step.saturating_mul(level.saturating_sub(1));
        self.base.saturating_sub(reduction).max(self.min)
    }
}
