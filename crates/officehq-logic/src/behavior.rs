//! Behavior selection: idle wandering vs. heading to the work desk.
//!
//! Driven only by two inputs: the externally polled [`Status`] and the
//! expiry of the idle linger timer. Elapsed time alone never moves an
//! agent that is at, or travelling to, the desk.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::layout::OfficeLayout;
use crate::status::Status;

/// Shortest idle dwell, in seconds.
pub const LINGER_MIN_SECS: f64 = 8.0;
/// Longest idle dwell, in seconds.
pub const LINGER_MAX_SECS: f64 = 20.0;
/// Delay after startup before the first idle pick.
pub const STARTUP_IDLE_DELAY_SECS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    IdleWandering,
    TravelingToWork,
}

impl Mode {
    pub fn for_status(status: Status) -> Self {
        if status.is_idle() {
            Mode::IdleWandering
        } else {
            Mode::TravelingToWork
        }
    }
}

/// What the scene should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    GoTo(String),
}

#[derive(Debug, Clone)]
pub struct BehaviorSelector {
    mode: Mode,
    last_idle: Option<String>,
}

impl Default for BehaviorSelector {
    fn default() -> Self {
        Self {
            mode: Mode::IdleWandering,
            last_idle: None,
        }
    }
}

impl BehaviorSelector {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Pick a random idle location, never the one picked last time unless
    /// it is the only one configured. Returns `None` with no idle locations.
    pub fn pick_idle<R: Rng + ?Sized>(&mut self, layout: &OfficeLayout, rng: &mut R) -> Option<String> {
        let all: Vec<&str> = layout.idle_locations().map(|l| l.name.as_str()).collect();
        let fresh: Vec<&str> = all
            .iter()
            .copied()
            .filter(|n| Some(*n) != self.last_idle.as_deref())
            .collect();
        let pool = if fresh.is_empty() { &all } else { &fresh };
        if pool.is_empty() {
            return None;
        }
        let pick = pool[rng.gen_range(0..pool.len())].to_string();
        self.last_idle = Some(pick.clone());
        Some(pick)
    }

    /// React to a polled status. Only a change between idle and non-idle
    /// produces a directive; typing ↔ working keeps the current walk.
    pub fn on_status<R: Rng + ?Sized>(
        &mut self,
        previous: Status,
        current: Status,
        layout: &OfficeLayout,
        rng: &mut R,
    ) -> Option<Directive> {
        if previous == current {
            return None;
        }
        self.mode = Mode::for_status(current);
        if current.is_idle() {
            self.pick_idle(layout, rng).map(Directive::GoTo)
        } else if previous.is_idle() {
            Some(Directive::GoTo(layout.work_location.clone()))
        } else {
            None
        }
    }

    /// React to the linger timer running out.
    pub fn on_linger_expired<R: Rng + ?Sized>(
        &mut self,
        layout: &OfficeLayout,
        rng: &mut R,
    ) -> Option<Directive> {
        if self.mode != Mode::IdleWandering {
            return None;
        }
        self.pick_idle(layout, rng).map(Directive::GoTo)
    }

    /// Whether arriving at `location` should start a linger timer.
    pub fn lingers_at(&self, location: &str, layout: &OfficeLayout) -> bool {
        self.mode == Mode::IdleWandering && location != layout.work_location
    }
}

/// Draw a linger duration uniformly from `[LINGER_MIN_SECS, LINGER_MAX_SECS)`.
pub fn linger_duration<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(LINGER_MIN_SECS..LINGER_MAX_SECS)
}
