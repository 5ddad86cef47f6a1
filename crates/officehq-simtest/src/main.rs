//! OfficeHQ Headless Scene Harness
//!
//! Validates the office layout and drives the agent through scripted
//! sessions. Runs entirely in-process: no network, no rendering.
//!
//! Usage:
//!   cargo run -p officehq-simtest
//!   cargo run -p officehq-simtest -- --verbose
//!   cargo run -p officehq-simtest -- --layout path/to/layout.json

use officehq_logic::door::{Door, DoorChange, DoorState};
use officehq_logic::geometry::{Facing, Point};
use officehq_logic::layout::{validate_all, OfficeLayout, Severity};
use officehq_logic::motion::{ManualInput, MotionEvent, Walker, ARRIVE_THRESHOLD};
use officehq_logic::scene::{OfficeScene, SceneEvent};
use officehq_logic::status::Status;

const DT: f32 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let layout_path = args
        .iter()
        .position(|a| a == "--layout")
        .and_then(|i| args.get(i + 1));
    println!("=== OfficeHQ Scene Harness ===\n");

    let layout = match load_layout(layout_path.map(String::as_str)) {
        Ok(l) => l,
        Err(e) => {
            println!("  ✗ layout_load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Layout integrity
    results.extend(validate_layout(&layout, verbose));

    // 2. Route composition for every location pair
    results.extend(validate_routes(&layout, verbose));

    // 3. Walking every route
    results.extend(validate_walking(&layout, verbose));

    // 4. Behavior transitions
    results.extend(validate_behavior(&layout, verbose));

    // 5. Door cycle
    results.extend(validate_doors(&layout, verbose));

    // 6. End-to-end sessions
    results.extend(validate_sessions(&layout, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_layout(path: Option<&str>) -> Result<OfficeLayout, String> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(p).map_err(|e| format!("{p}: {e}"))?;
            OfficeLayout::from_json(&json).map_err(|e| e.to_string())
        }
        None => OfficeLayout::default_hq().map_err(|e| e.to_string()),
    }
}

fn names(layout: &OfficeLayout) -> Vec<String> {
    layout.locations.iter().map(|l| l.name.clone()).collect()
}

fn scene(layout: &OfficeLayout, seed: u64) -> OfficeScene {
    OfficeScene::new(layout.clone(), &layout.door_anchors, seed)
}

/// Tick until an `Arrived` event; returns the location and ticks used.
fn run_until_arrived(scene: &mut OfficeScene, max_ticks: usize) -> Option<(String, usize)> {
    for t in 0..max_ticks {
        for e in scene.tick(DT, ManualInput::default()) {
            if let SceneEvent::Arrived { location } = e {
                return Some((location, t + 1));
            }
        }
    }
    None
}

// ── 1. Layout ───────────────────────────────────────────────────────────

fn validate_layout(layout: &OfficeLayout, verbose: bool) -> Vec<TestResult> {
    println!("--- Layout ---");
    let mut results = Vec::new();

    let problems = validate_all(layout);
    let errors: Vec<_> = problems
        .iter()
        .filter(|p| p.severity == Severity::Error)
        .collect();
    if verbose {
        for p in &problems {
            println!("    {}", p);
        }
    }
    results.push(TestResult {
        name: "layout_no_errors".into(),
        passed: errors.is_empty(),
        detail: format!(
            "{} errors, {} warnings",
            errors.len(),
            problems.len() - errors.len()
        ),
    });

    results.push(TestResult {
        name: "layout_has_spine".into(),
        passed: layout.spine.len() >= 2,
        detail: format!("{} spine nodes", layout.spine.len()),
    });

    let idle = layout.idle_locations().count();
    results.push(TestResult {
        name: "layout_idle_locations".into(),
        passed: idle >= 2,
        detail: format!("{} idle locations besides '{}'", idle, layout.work_location),
    });

    results
}

// ── 2. Routes ───────────────────────────────────────────────────────────

fn validate_routes(layout: &OfficeLayout, _verbose: bool) -> Vec<TestResult> {
    println!("--- Routes ---");
    let mut results = Vec::new();

    let mut empty = Vec::new();
    let mut wrong_end = Vec::new();
    let mut non_monotonic = Vec::new();
    let mut pairs = 0;

    for from in names(layout) {
        for to in names(layout) {
            if from == to {
                continue;
            }
            pairs += 1;
            let route = layout.build_route(&from, &to);
            let Some(last) = route.last() else {
                empty.push(format!("{from}→{to}"));
                continue;
            };
            if let Some(dest) = layout.location(&to) {
                if last.distance(dest.pos) >= ARRIVE_THRESHOLD {
                    wrong_end.push(format!("{from}→{to}"));
                }
            }
            if layout.direct_route(&from, &to).is_none() {
                let pts = route.to_vec();
                let head = layout.exits.get(&from).map_or(0, |f| f.path.len());
                let tail = layout.entries.get(&to).map_or(0, |f| f.path.len());
                if head + tail <= pts.len() {
                    let seg = layout.spine_indices(&pts[head..pts.len() - tail]);
                    let rising = seg.windows(2).all(|w| w[0] < w[1]);
                    let falling = seg.windows(2).all(|w| w[0] > w[1]);
                    if !(rising || falling) {
                        non_monotonic.push(format!("{from}→{to} {seg:?}"));
                    }
                }
            }
        }
    }

    results.push(TestResult {
        name: "routes_non_empty".into(),
        passed: empty.is_empty(),
        detail: if empty.is_empty() {
            format!("{pairs} pairs routed")
        } else {
            format!("empty: {}", empty.join(", "))
        },
    });
    results.push(TestResult {
        name: "routes_end_at_destination".into(),
        passed: wrong_end.is_empty(),
        detail: if wrong_end.is_empty() {
            "all routes end at their destination".into()
        } else {
            format!("wrong end: {}", wrong_end.join(", "))
        },
    });
    results.push(TestResult {
        name: "routes_spine_monotonic".into(),
        passed: non_monotonic.is_empty(),
        detail: if non_monotonic.is_empty() {
            "spine segments run one way".into()
        } else {
            non_monotonic.join("; ")
        },
    });

    results
}

// ── 3. Walking ──────────────────────────────────────────────────────────

fn validate_walking(layout: &OfficeLayout, verbose: bool) -> Vec<TestResult> {
    println!("--- Walking ---");
    let mut results = Vec::new();

    let mut diagonal = 0;
    let mut bad_pops = Vec::new();
    let mut stuck = Vec::new();
    let mut wrong_facing = Vec::new();
    let mut longest = (String::new(), 0.0f32);

    for from in names(layout) {
        for to in names(layout) {
            if from == to {
                continue;
            }
            let Some(start) = layout.location(&from).map(|l| l.pos) else {
                continue;
            };
            let route = layout.build_route(&from, &to);
            let expected = route.len();
            let facing = layout.arrival_facing(&to);
            let mut w = Walker::new(start, Facing::Down);
            w.set_route(route);

            let mut pops = 0;
            let mut arrived = false;
            let mut ticks = 0;
            while ticks < 30_000 {
                ticks += 1;
                let e = w.advance(DT, ManualInput::default(), facing);
                let (vx, vy) = w.velocity();
                if vx != 0.0 && vy != 0.0 {
                    diagonal += 1;
                }
                match e {
                    Some(MotionEvent::WaypointReached { .. }) => pops += 1,
                    Some(MotionEvent::Arrived) => {
                        pops += 1;
                        arrived = true;
                        break;
                    }
                    None => {}
                }
            }
            if !arrived {
                stuck.push(format!("{from}→{to}"));
                continue;
            }
            if pops != expected {
                bad_pops.push(format!("{from}→{to} ({pops}/{expected})"));
            }
            if w.facing != facing {
                wrong_facing.push(format!("{from}→{to}"));
            }
            let secs = ticks as f32 * DT;
            if secs > longest.1 {
                longest = (format!("{from}→{to}"), secs);
            }
        }
    }

    if verbose {
        println!("    longest walk: {} ({:.1}s)", longest.0, longest.1);
    }

    results.push(TestResult {
        name: "walk_all_arrive".into(),
        passed: stuck.is_empty(),
        detail: if stuck.is_empty() {
            format!("longest {} at {:.1}s", longest.0, longest.1)
        } else {
            format!("stuck: {}", stuck.join(", "))
        },
    });
    results.push(TestResult {
        name: "walk_no_diagonal".into(),
        passed: diagonal == 0,
        detail: format!("{diagonal} diagonal ticks"),
    });
    results.push(TestResult {
        name: "walk_each_point_once".into(),
        passed: bad_pops.is_empty(),
        detail: if bad_pops.is_empty() {
            "one pop per waypoint".into()
        } else {
            bad_pops.join(", ")
        },
    });
    results.push(TestResult {
        name: "walk_arrival_facing".into(),
        passed: wrong_facing.is_empty(),
        detail: if wrong_facing.is_empty() {
            "facing set on arrival".into()
        } else {
            wrong_facing.join(", ")
        },
    });

    results
}

// ── 4. Behavior ─────────────────────────────────────────────────────────

fn validate_behavior(layout: &OfficeLayout, _verbose: bool) -> Vec<TestResult> {
    println!("--- Behavior ---");
    let mut results = Vec::new();

    // Idle wandering over ten simulated minutes
    let mut s = scene(layout, 42);
    let mut targets = Vec::new();
    for _ in 0..(60 * 60 * 10) {
        for e in s.tick(DT, ManualInput::default()) {
            if let SceneEvent::RouteStarted { target, .. } = e {
                targets.push(target);
            }
        }
    }
    let repeats = targets.windows(2).filter(|w| w[0] == w[1]).count();
    let to_desk = targets.iter().filter(|t| *t == &layout.work_location).count();
    results.push(TestResult {
        name: "idle_no_repeat".into(),
        passed: repeats == 0 && targets.len() >= 10,
        detail: format!("{} walks, {} repeats", targets.len(), repeats),
    });
    results.push(TestResult {
        name: "idle_avoids_work".into(),
        passed: to_desk == 0,
        detail: format!("{to_desk} idle walks to '{}'", layout.work_location),
    });

    // Working keeps the agent at the desk indefinitely
    let mut s = scene(layout, 7);
    s.apply_status(Status::Working);
    let arrived = run_until_arrived(&mut s, 5_000);
    let mut moved = false;
    for _ in 0..(60 * 120) {
        if s
            .tick(DT, ManualInput::default())
            .iter()
            .any(|e| matches!(e, SceneEvent::RouteStarted { .. }))
        {
            moved = true;
        }
    }
    results.push(TestResult {
        name: "working_stays_put".into(),
        passed: arrived.is_some() && !moved,
        detail: "no time-driven walks while working".into(),
    });

    // typing ↔ working must not re-route
    let mut s = scene(layout, 8);
    s.apply_status(Status::Typing);
    let quiet = s.apply_status(Status::Working).is_empty();
    results.push(TestResult {
        name: "typing_working_no_reroute".into(),
        passed: quiet,
        detail: "typing → working keeps the current walk".into(),
    });

    results
}

// ── 5. Doors ────────────────────────────────────────────────────────────

fn validate_doors(layout: &OfficeLayout, _verbose: bool) -> Vec<TestResult> {
    println!("--- Doors ---");
    let mut results = Vec::new();

    for (i, anchor) in layout.door_anchors.iter().enumerate() {
        let mut d = Door::from_anchor(*anchor);
        let far = Point::new(d.center.x + 1000.0, d.center.y);
        let mut states = vec![d.state()];
        let mut monotonic = true;
        let mut flips_ok = true;
        let mut prev = d.open_amount();

        for t in 0..120 {
            let agent = if t < 60 { d.center } else { far };
            for c in d.advance(DT, agent) {
                match c {
                    DoorChange::State(s) => states.push(s),
                    DoorChange::Passable(p) => flips_ok &= p == (d.open_amount() > 0.5),
                }
            }
            let now = d.open_amount();
            let rising = d.state() == DoorState::Opening || d.state() == DoorState::Open;
            if (rising && now < prev) || (!rising && now > prev) || !(0.0..=1.0).contains(&now) {
                monotonic = false;
            }
            prev = now;
        }

        let expected = [
            DoorState::Closed,
            DoorState::Opening,
            DoorState::Open,
            DoorState::Closing,
            DoorState::Closed,
        ];
        results.push(TestResult {
            name: format!("door_{i}_cycle"),
            passed: states == expected,
            detail: states
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" → "),
        });
        results.push(TestResult {
            name: format!("door_{i}_monotonic"),
            passed: monotonic,
            detail: "open amount ramps one way per phase, stays in [0,1]".into(),
        });
        results.push(TestResult {
            name: format!("door_{i}_passability"),
            passed: flips_ok,
            detail: "passable exactly when open amount > 0.5".into(),
        });
    }

    results
}

// ── 6. Sessions ─────────────────────────────────────────────────────────

fn validate_sessions(layout: &OfficeLayout, verbose: bool) -> Vec<TestResult> {
    println!("--- Sessions ---");
    let mut results = Vec::new();
    let Some(work) = layout.work().map(|l| (l.pos, l.facing)) else {
        results.push(TestResult {
            name: "session_work_location".into(),
            passed: false,
            detail: format!("'{}' missing", layout.work_location),
        });
        return results;
    };

    // Idle at desk, status flips to working
    let mut s = scene(layout, 1);
    s.apply_status(Status::Working);
    let arrived = run_until_arrived(&mut s, 5_000);
    let at_desk = s.walker().position.distance(work.0) < ARRIVE_THRESHOLD;
    results.push(TestResult {
        name: "session_desk_working".into(),
        passed: matches!(&arrived, Some((loc, _)) if *loc == layout.work_location)
            && at_desk
            && s.walker().facing == work.1,
        detail: format!("arrived {:?}, facing {}", arrived, s.walker().facing.as_str()),
    });

    // Status flips to working mid-walk
    let mut s = scene(layout, 2);
    while !s.walker().is_walking() && s.clock() < 5.0 {
        s.tick(DT, ManualInput::default());
    }
    for _ in 0..30 {
        s.tick(DT, ManualInput::default());
    }
    let queued = s.walker().route().to_vec();
    s.apply_status(Status::Working);
    let spliced = s.walker().route().to_vec();
    let kept_head = queued.first() == spliced.first();
    let arrived = run_until_arrived(&mut s, 20_000);
    if verbose {
        println!(
            "    mid-walk: {} queued → {} after splice",
            queued.len(),
            spliced.len()
        );
    }
    results.push(TestResult {
        name: "session_midwalk_retarget".into(),
        passed: kept_head
            && matches!(&arrived, Some((loc, _)) if *loc == layout.work_location),
        detail: format!("kept head: {kept_head}, arrived {:?}", arrived),
    });

    // Manual override moves the agent and hides the bubble
    let mut s = scene(layout, 3);
    s.apply_status(Status::Working);
    run_until_arrived(&mut s, 5_000);
    let before = s.walker().position;
    let left = ManualInput {
        left: true,
        ..Default::default()
    };
    for _ in 0..30 {
        s.tick(DT, left);
    }
    let moved = s.walker().position.x < before.x;
    let bubble_hidden = !s.snapshot().bubble_visible;
    results.push(TestResult {
        name: "session_manual_override".into(),
        passed: moved && bubble_hidden && !s.walker().arrived(),
        detail: format!("moved {:.0}px left", before.x - s.walker().position.x),
    });

    // Snapshot is serializable for render hosts
    let json = serde_json::to_string(&s.snapshot());
    results.push(TestResult {
        name: "session_snapshot_json".into(),
        passed: json.is_ok(),
        detail: json
            .map(|j| format!("{} bytes", j.len()))
            .unwrap_or_else(|e| e.to_string()),
    });

    results
}
