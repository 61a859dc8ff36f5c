//! Gravity and line-clear animation clocks
//!
//! Two independent periodic tasks polled once per frame. Gravity only runs
//! while the session is live and nothing is being cleared; the animation
//! clock only runs while rows are pending.

use crate::game::{Game, GameState};
use std::time::{Duration, Instant};

/// A periodic task that can be stopped and re-armed
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    /// `None` while stopped
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Start counting from `now` unless already running
    pub fn resume(&mut self, now: Instant) {
        if self.last.is_none() {
            self.last = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.last = None;
    }

    /// Fire at most once per call; a late poll does not queue catch-up ticks
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                self.last = Some(now);
                true
            }
            _ => false,
        }
    }
}

/// What fired on this poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Due {
    pub gravity: bool,
    pub animation: bool,
}

/// Drives `Game::tick` and `Game::animation_tick`
#[derive(Debug, Clone)]
pub struct Scheduler {
    gravity: Ticker,
    animation: Ticker,
}

impl Scheduler {
    pub fn new(animation_frame: Duration) -> Self {
        Self {
            gravity: Ticker::new(Duration::MAX),
            animation: Ticker::new(animation_frame),
        }
    }

    /// Start or stop each clock to match the session, then run whatever is due
    pub fn run(&mut self, game: &mut Game, now: Instant) -> Due {
        let due = self.poll(game, now);
        if due.animation {
            game.animation_tick();
        }
        if due.gravity {
            game.tick();
        }
        due
    }

    pub fn poll(&mut self, game: &Game, now: Instant) -> Due {
        self.gravity.set_interval(game.gravity_interval());

        if game.is_clearing() {
            self.animation.resume(now);
        } else {
            self.animation.stop();
        }

        if game.state() == GameState::Running && !game.is_clearing() {
            self.gravity.resume(now);
        } else {
            self.gravity.stop();
        }

        Due {
            gravity: self.gravity.poll(now),
            animation: self.animation.poll(now),
        }
    }

    /// Time until the next clock fires, for sizing the input wait
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        [&self.gravity, &self.animation]
            .into_iter()
            .filter_map(|ticker| {
                let last = ticker.last?;
                Some(
                    (last + ticker.interval.min(Duration::from_secs(3600)))
                        .saturating_duration_since(now),
                )
            })
            .min()
    }
}
