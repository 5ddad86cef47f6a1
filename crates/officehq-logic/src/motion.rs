//! Route following for the agent.
//!
//! Auto-walk closes one axis at a time: horizontal first while the gap is
//! larger than the arrival threshold, then vertical. Velocity is never
//! non-zero on both axes during auto-walk. Manual input overrides the
//! route for the tick it is held.

use serde::{Deserialize, Serialize};

use crate::geometry::{Facing, Point};
use crate::route::Route;

/// Walking speed in world pixels per second.
pub const WALK_SPEED: f32 = 100.0;

/// A waypoint closer than this counts as reached.
pub const ARRIVE_THRESHOLD: f32 = 6.0;

/// Per-axis scale when two manual directions are held at once.
pub const DIAGONAL_FACTOR: f32 = 0.707;

/// Residual gap treated as already closed on the vertical axis.
const AXIS_EPS: f32 = 1e-3;

/// Directional keys held this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ManualInput {
    pub fn is_active(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    fn axes(&self) -> (f32, f32) {
        let mx = (self.right as i8 - self.left as i8) as f32;
        let my = (self.down as i8 - self.up as i8) as f32;
        (mx, my)
    }
}

/// Outcome of one auto-walk step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEvent {
    /// Popped a waypoint; more remain.
    WaypointReached { remaining: usize },
    /// Popped the final waypoint.
    Arrived,
}

/// Position, facing, and the route being walked.
#[derive(Debug, Clone)]
pub struct Walker {
    pub position: Point,
    pub facing: Facing,
    route: Route,
    arrived: bool,
    velocity: (f32, f32),
}

impl Walker {
    /// A walker standing still at `position`, already arrived.
    pub fn new(position: Point, facing: Facing) -> Self {
        Self {
            position,
            facing,
            route: Route::default(),
            arrived: true,
            velocity: (0.0, 0.0),
        }
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Velocity applied during the last [`advance`](Self::advance).
    pub fn velocity(&self) -> (f32, f32) {
        self.velocity
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != (0.0, 0.0)
    }

    /// Still has queued waypoints and has not signalled arrival.
    pub fn is_walking(&self) -> bool {
        !self.arrived && !self.route.is_empty()
    }

    /// Replace the route wholesale. An empty route leaves the walker idle
    /// but not arrived, matching what the scene does with a failed build.
    pub fn set_route(&mut self, route: Route) {
        self.route = route;
        self.arrived = false;
    }

    /// Advance one tick. `arrival_facing` is applied when the final
    /// waypoint is popped.
    pub fn advance(
        &mut self,
        dt: f32,
        input: ManualInput,
        arrival_facing: Facing,
    ) -> Option<MotionEvent> {
        self.velocity = (0.0, 0.0);

        if input.is_active() {
            self.manual_step(dt, input);
            return None;
        }
        if self.arrived {
            return None;
        }
        let target = self.route.head()?;

        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        if self.position.distance(target) < ARRIVE_THRESHOLD {
            self.route.pop();
            if self.route.is_empty() {
                self.arrived = true;
                self.facing = arrival_facing;
                return Some(MotionEvent::Arrived);
            }
            return Some(MotionEvent::WaypointReached {
                remaining: self.route.len(),
            });
        }

        let step = WALK_SPEED * dt;
        if dx.abs() > ARRIVE_THRESHOLD || dy.abs() <= AXIS_EPS {
            let moved = step.min(dx.abs());
            self.position.x += moved * dx.signum();
            self.velocity = (WALK_SPEED * dx.signum(), 0.0);
            self.facing = Facing::horizontal(dx);
        } else {
            let moved = step.min(dy.abs());
            self.position.y += moved * dy.signum();
            self.velocity = (0.0, WALK_SPEED * dy.signum());
            self.facing = Facing::vertical(dy);
        }
        None
    }

    fn manual_step(&mut self, dt: f32, input: ManualInput) {
        let (mx, my) = input.axes();
        let mut vx = mx * WALK_SPEED;
        let mut vy = my * WALK_SPEED;
        if mx != 0.0 && my != 0.0 {
            vx *= DIAGONAL_FACTOR;
            vy *= DIAGONAL_FACTOR;
        }
        if mx != 0.0 {
            self.facing = Facing::horizontal(mx);
        } else if my != 0.0 {
            self.facing = Facing::vertical(my);
        }
        self.position.x += vx * dt;
        self.position.y += vy * dt;
        self.velocity = (vx, vy);
        // the route resumes from wherever manual control leaves the agent
        self.arrived = false;
    }
}
