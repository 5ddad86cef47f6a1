//! Sliding glass doors.
//!
//! Each door is a 2×2 block of panels anchored at its top-left tile. The
//! door opens while the agent is within [`TRIGGER_RADIUS`] of its center
//! and closes otherwise:
//!
//! | State     | Agent in range | Agent out of range |
//! |-----------|----------------|--------------------|
//! | `Closed`  | → `Opening`    | stays              |
//! | `Opening` | ramps up       | → `Closing`        |
//! | `Open`    | stays          | → `Closing`        |
//! | `Closing` | → `Opening`    | ramps down         |
//!
//! Collision is tied to the raw open amount, not to where the panels are
//! drawn: the door is passable once `open_amount > 0.5`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::{ease_in_out_quad, Point, TilePos, TILE_SIZE};

/// Full openings per second.
pub const DOOR_SPEED: f32 = 3.0;

/// Distance from the door center that triggers opening.
pub const TRIGGER_RADIUS: f32 = 2.5 * TILE_SIZE;

/// How far each panel slides when fully open.
pub const SLIDE_DISTANCE: f32 = TILE_SIZE;

/// Open amount above which the door no longer blocks.
pub const PASSABLE_ABOVE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Closed => "closed",
            DoorState::Opening => "opening",
            DoorState::Open => "open",
            DoorState::Closing => "closing",
        }
    }
}

/// Something observable that changed during [`Door::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorChange {
    State(DoorState),
    Passable(bool),
}

#[derive(Debug, Clone)]
pub struct Door {
    /// Closed positions: top-left, top-right, bottom-left, bottom-right.
    pub panels: [Point; 4],
    pub center: Point,
    open_amount: f32,
    state: DoorState,
}

impl Door {
    /// Build a closed door from the top-left tile of its 2×2 block.
    pub fn from_anchor(anchor: TilePos) -> Self {
        let panel = |dc: i32, dr: i32| {
            Point::new(
                (anchor.col() + dc) as f32 * TILE_SIZE + TILE_SIZE / 2.0,
                (anchor.row() + dr) as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            )
        };
        Self {
            panels: [panel(0, 0), panel(1, 0), panel(0, 1), panel(1, 1)],
            center: Point::new(
                (anchor.col() + 1) as f32 * TILE_SIZE,
                (anchor.row() + 1) as f32 * TILE_SIZE,
            ),
            open_amount: 0.0,
            state: DoorState::Closed,
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn open_amount(&self) -> f32 {
        self.open_amount
    }

    pub fn passable(&self) -> bool {
        self.open_amount > PASSABLE_ABOVE
    }

    /// Horizontal panel offset for the current open amount, eased.
    pub fn slide_offset(&self) -> f32 {
        ease_in_out_quad(self.open_amount) * SLIDE_DISTANCE
    }

    /// Where each panel is drawn now. Left panels slide `-x`, right `+x`.
    pub fn panel_positions(&self) -> [Point; 4] {
        let off = self.slide_offset();
        let [tl, tr, bl, br] = self.panels;
        [
            Point::new(tl.x - off, tl.y),
            Point::new(tr.x + off, tr.y),
            Point::new(bl.x - off, bl.y),
            Point::new(br.x + off, br.y),
        ]
    }

    /// Advance one tick given the agent's position. Returns every state
    /// transition and passability flip, in the order they happened.
    pub fn advance(&mut self, dt: f32, agent: Point) -> Vec<DoorChange> {
        let mut changes = Vec::new();
        let was_passable = self.passable();
        let in_range = agent.distance(self.center) < TRIGGER_RADIUS;

        match (in_range, self.state) {
            (true, DoorState::Closed | DoorState::Closing) => {
                self.set_state(DoorState::Opening, &mut changes)
            }
            (false, DoorState::Open | DoorState::Opening) => {
                self.set_state(DoorState::Closing, &mut changes)
            }
            _ => {}
        }

        let step = DOOR_SPEED * dt;
        match self.state {
            DoorState::Opening => {
                self.open_amount = (self.open_amount + step).min(1.0);
                if self.open_amount >= 1.0 {
                    self.set_state(DoorState::Open, &mut changes);
                }
            }
            DoorState::Closing => {
                self.open_amount = (self.open_amount - step).max(0.0);
                if self.open_amount <= 0.0 {
                    self.set_state(DoorState::Closed, &mut changes);
                }
            }
            DoorState::Open | DoorState::Closed => {}
        }

        let passable = self.passable();
        if passable != was_passable {
            changes.push(DoorChange::Passable(passable));
        }
        changes
    }

    fn set_state(&mut self, next: DoorState, changes: &mut Vec<DoorChange>) {
        debug!(
            "door at ({:.0},{:.0}): {} → {}",
            self.center.x,
            self.center.y,
            self.state.as_str(),
            next.as_str()
        );
        self.state = next;
        changes.push(DoorChange::State(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn door() -> Door {
        Door::from_anchor(TilePos(3, 7))
    }

    #[test]
    fn anchor_geometry() {
        let d = door();
        assert_eq!(d.center, Point::new(128.0, 256.0));
        assert_eq!(d.panels[0], Point::new(112.0, 240.0));
        assert_eq!(d.panels[1], Point::new(144.0, 240.0));
        assert_eq!(d.panels[2], Point::new(112.0, 272.0));
        assert_eq!(d.panels[3], Point::new(144.0, 272.0));
        assert_eq!(d.state(), DoorState::Closed);
        assert!(!d.passable());
    }

    #[test]
    fn opens_when_agent_near() {
        let mut d = door();
        let changes = d.advance(DT, d.center);
        assert_eq!(changes, vec![DoorChange::State(DoorState::Opening)]);
        assert!(d.open_amount() > 0.0);

        for _ in 0..60 {
            d.advance(DT, d.center);
        }
        assert_eq!(d.state(), DoorState::Open);
        assert_eq!(d.open_amount(), 1.0);
        assert!(d.passable());
    }

    #[test]
    fn stays_closed_when_agent_far() {
        let mut d = door();
        let far = Point::new(d.center.x + TRIGGER_RADIUS + 1.0, d.center.y);
        for _ in 0..30 {
            assert!(d.advance(DT, far).is_empty());
        }
        assert_eq!(d.state(), DoorState::Closed);
        assert_eq!(d.open_amount(), 0.0);
    }

    #[test]
    fn reverses_mid_animation() {
        let mut d = door();
        for _ in 0..5 {
            d.advance(DT, d.center);
        }
        let partial = d.open_amount();
        let far = Point::new(0.0, 0.0);
        let changes = d.advance(DT, far);
        assert_eq!(changes[0], DoorChange::State(DoorState::Closing));
        assert!(d.open_amount() < partial);

        let changes = d.advance(DT, d.center);
        assert_eq!(changes[0], DoorChange::State(DoorState::Opening));
        assert_eq!(d.state(), DoorState::Opening);
    }

    #[test]
    fn passability_flips_exactly_once_each_way() {
        let mut d = door();
        let mut flips = Vec::new();
        for _ in 0..40 {
            for c in d.advance(DT, d.center) {
                if let DoorChange::Passable(p) = c {
                    assert_eq!(p, d.open_amount() > 0.5);
                    flips.push(p);
                }
            }
        }
        for _ in 0..40 {
            for c in d.advance(DT, Point::new(0.0, 0.0)) {
                if let DoorChange::Passable(p) = c {
                    assert_eq!(p, d.open_amount() > 0.5);
                    flips.push(p);
                }
            }
        }
        assert_eq!(flips, vec![true, false]);
        assert_eq!(d.state(), DoorState::Closed);
    }

    #[test]
    fn panels_slide_eased_and_apart() {
        let mut d = door();
        // one big step to half open
        d.advance(0.5 / DOOR_SPEED, d.center);
        assert!((d.open_amount() - 0.5).abs() < 1e-5);
        let p = d.panel_positions();
        let half = SLIDE_DISTANCE * 0.5;
        assert!((p[0].x - (d.panels[0].x - half)).abs() < 1e-4);
        assert!((p[1].x - (d.panels[1].x + half)).abs() < 1e-4);
        assert_eq!(p[2].y, d.panels[2].y);

        // eased offset lags linear early on
        let mut e = door();
        e.advance(0.2 / DOOR_SPEED, e.center);
        assert!(e.slide_offset() < 0.2 * SLIDE_DISTANCE);
    }

    #[test]
    fn huge_step_clamps() {
        let mut d = door();
        let changes = d.advance(10.0, d.center);
        assert_eq!(
            changes,
            vec![
                DoorChange::State(DoorState::Opening),
                DoorChange::State(DoorState::Open),
                DoorChange::Passable(true),
            ]
        );
        assert_eq!(d.open_amount(), 1.0);
        d.advance(10.0, Point::new(-500.0, -500.0));
        assert_eq!(d.open_amount(), 0.0);
        assert_eq!(d.state(), DoorState::Closed);
    }
}
