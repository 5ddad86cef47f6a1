//! The office scene: one agent, its doors, and the per-frame update.
//!
//! [`OfficeScene`] owns all mutable state for a session. The host calls
//! [`OfficeScene::tick`] once per frame and [`OfficeScene::apply_status`]
//! whenever a status poll completes; nothing else mutates the scene.
//!
//! ```
//! use officehq_logic::layout::OfficeLayout;
//! use officehq_logic::motion::ManualInput;
//! use officehq_logic::scene::OfficeScene;
//! use officehq_logic::status::Status;
//!
//! let layout = OfficeLayout::default_hq().unwrap();
//! let anchors = layout.door_anchors.clone();
//! let mut scene = OfficeScene::new(layout, &anchors, 42);
//! scene.apply_status(Status::Working);
//! for _ in 0..600 {
//!     scene.tick(1.0 / 60.0, ManualInput::default());
//! }
//! assert!(scene.walker().arrived());
//! ```

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::behavior::{linger_duration, BehaviorSelector, Directive, Mode, STARTUP_IDLE_DELAY_SECS};
use crate::door::{Door, DoorChange, DoorState};
use crate::geometry::{Facing, Point, TilePos};
use crate::layout::OfficeLayout;
use crate::motion::{ManualInput, MotionEvent, Walker};
use crate::route::Route;
use crate::status::Status;

/// Something the host may want to log, trace, or animate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    RouteStarted { target: String, waypoints: usize },
    RouteUnavailable { target: String },
    WaypointReached { remaining: usize },
    Arrived { location: String },
    LingerExpired,
    DoorStateChanged { door: usize, state: DoorState },
    DoorPassability { door: usize, passable: bool },
}

/// Render-facing view of one door.
#[derive(Debug, Clone, Serialize)]
pub struct DoorView {
    pub center: Point,
    pub state: DoorState,
    pub open_amount: f32,
    pub passable: bool,
    pub panels: [Point; 4],
}

/// Render-facing view of the whole scene at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub time: f64,
    pub position: Point,
    pub facing: Facing,
    pub moving: bool,
    pub mode: Mode,
    pub status: Status,
    pub target: String,
    pub arrived: bool,
    pub waypoints: Vec<Point>,
    /// Typing/working bubble above the agent's head.
    pub bubble_visible: bool,
    pub doors: Vec<DoorView>,
}

pub struct OfficeScene {
    layout: OfficeLayout,
    walker: Walker,
    selector: BehaviorSelector,
    doors: Vec<Door>,
    rng: StdRng,
    clock: f64,
    status: Status,
    /// Location the agent is at or walking toward.
    target: String,
    linger_until: Option<f64>,
    first_pick_at: Option<f64>,
    manual_held: bool,
}

impl OfficeScene {
    /// Start a session with the agent standing at the work location.
    pub fn new(layout: OfficeLayout, door_anchors: &[TilePos], seed: u64) -> Self {
        let start = layout.work().map(|l| l.pos).unwrap_or_default();
        let facing = layout.arrival_facing(&layout.work_location);
        let target = layout.work_location.clone();
        Self {
            walker: Walker::new(start, facing),
            selector: BehaviorSelector::default(),
            doors: door_anchors.iter().map(|a| Door::from_anchor(*a)).collect(),
            rng: StdRng::seed_from_u64(seed),
            clock: 0.0,
            status: Status::Idle,
            target,
            linger_until: None,
            first_pick_at: Some(STARTUP_IDLE_DELAY_SECS),
            manual_held: false,
            layout,
        }
    }

    pub fn layout(&self) -> &OfficeLayout {
        &self.layout
    }

    pub fn walker(&self) -> &Walker {
        &self.walker
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn mode(&self) -> Mode {
        self.selector.mode()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Seconds since the session started.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn linger_until(&self) -> Option<f64> {
        self.linger_until
    }

    /// Feed a freshly polled status. Unchanged statuses are a no-op.
    pub fn apply_status(&mut self, status: Status) -> Vec<SceneEvent> {
        let previous = self.status;
        if previous == status {
            return Vec::new();
        }
        info!("status {previous} → {status}");
        self.status = status;
        let directive = self
            .selector
            .on_status(previous, status, &self.layout, &mut self.rng);
        // a status change supersedes the startup idle pick
        self.first_pick_at = None;
        match directive {
            Some(Directive::GoTo(name)) => vec![self.navigate_to(&name)],
            None => Vec::new(),
        }
    }

    /// Send the agent to `name`.
    ///
    /// Mid-walk, the queued points are kept up to the first spine node and
    /// the route continues from there. Otherwise the route is composed from
    /// the current target. When no route exists the scene is left exactly
    /// as it was; otherwise the linger timer is cleared.
    pub fn navigate_to(&mut self, name: &str) -> SceneEvent {
        let route = if self.walker.is_walking() {
            let remaining = self.walker.route().to_vec();
            self.layout
                .retarget(&remaining, name)
                .unwrap_or_else(|| self.layout.build_route(&self.target, name))
        } else if self.walker.arrived() && self.target == name {
            // Already here: settle in place and re-face. This skips the
            // exit → spine → entry loop a same-location route would walk.
            Route::new(self.layout.location(name).map(|l| l.pos))
        } else {
            self.layout.build_route(&self.target, name)
        };

        let waypoints = route.len();
        if waypoints == 0 {
            debug!("no route to {name}, keeping target {}", self.target);
            return SceneEvent::RouteUnavailable {
                target: name.to_string(),
            };
        }

        self.target = name.to_string();
        self.linger_until = None;
        self.walker.set_route(route);
        debug!("heading to {name} via {waypoints} waypoints");
        SceneEvent::RouteStarted {
            target: self.target.clone(),
            waypoints,
        }
    }

    /// Advance the scene by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: ManualInput) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        self.clock += f64::from(dt);
        self.manual_held = input.is_active();

        if let Some(at) = self.first_pick_at {
            if self.clock >= at {
                self.first_pick_at = None;
                if self.status.is_idle() {
                    if let Some(name) = self.selector.pick_idle(&self.layout, &mut self.rng) {
                        events.push(self.navigate_to(&name));
                    }
                }
            }
        }

        let facing = self.layout.arrival_facing(&self.target);
        match self.walker.advance(dt, input, facing) {
            Some(MotionEvent::WaypointReached { remaining }) => {
                events.push(SceneEvent::WaypointReached { remaining });
            }
            Some(MotionEvent::Arrived) => {
                events.push(SceneEvent::Arrived {
                    location: self.target.clone(),
                });
                if self.selector.lingers_at(&self.target, &self.layout) {
                    let secs = linger_duration(&mut self.rng);
                    debug!("lingering at {} for {secs:.1}s", self.target);
                    self.linger_until = Some(self.clock + secs);
                }
            }
            None => {
                if !input.is_active() && self.walker.arrived() {
                    self.check_linger(&mut events);
                }
            }
        }

        let agent = self.walker.position;
        for (i, door) in self.doors.iter_mut().enumerate() {
            for change in door.advance(dt, agent) {
                events.push(match change {
                    DoorChange::State(state) => SceneEvent::DoorStateChanged { door: i, state },
                    DoorChange::Passable(passable) => {
                        SceneEvent::DoorPassability { door: i, passable }
                    }
                });
            }
        }
        events
    }

    fn check_linger(&mut self, events: &mut Vec<SceneEvent>) {
        let Some(until) = self.linger_until else {
            return;
        };
        if self.clock <= until {
            return;
        }
        self.linger_until = None;
        events.push(SceneEvent::LingerExpired);
        if let Some(Directive::GoTo(name)) =
            self.selector.on_linger_expired(&self.layout, &mut self.rng)
        {
            events.push(self.navigate_to(&name));
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            time: self.clock,
            position: self.walker.position,
            facing: self.walker.facing,
            moving: self.walker.is_moving(),
            mode: self.selector.mode(),
            status: self.status,
            target: self.target.clone(),
            arrived: self.walker.arrived(),
            waypoints: self.walker.route().to_vec(),
            bubble_visible: self.walker.arrived() && !self.manual_held && !self.status.is_idle(),
            doors: self
                .doors
                .iter()
                .map(|d| DoorView {
                    center: d.center,
                    state: d.state(),
                    open_amount: d.open_amount(),
                    passable: d.passable(),
                    panels: d.panel_positions(),
                })
                .collect(),
        }
    }
}
