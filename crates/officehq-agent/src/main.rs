//! OfficeHQ headless agent.
//!
//! Drives one office scene at a fixed frame rate while a background task
//! polls the status endpoint. Scene events are logged, and optionally
//! written to stdout as JSON lines for replay or inspection.
//!
//! Usage:
//!   cargo run -p officehq-agent -- --status-url http://127.0.0.1:8787/status
//!   cargo run -p officehq-agent -- --config officehq.toml --trace-json
//!
//! Logging is controlled with `RUST_LOG` (default `officehq=info`).

mod poller;
mod settings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use officehq_logic::geometry::TilePos;
use officehq_logic::layout::{is_runnable, validate_all, OfficeLayout, Severity};
use officehq_logic::motion::ManualInput;
use officehq_logic::scene::{OfficeScene, SceneEvent};
use officehq_logic::tilemap::TileMap;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::poller::StatusPoller;
use crate::settings::Settings;

/// Longest frame delta fed to the scene; longer stalls are clipped.
const MAX_FRAME_DT: f32 = 0.25;

#[derive(Parser, Debug)]
#[command(name = "officehq-agent")]
#[command(about = "Run the OfficeHQ agent headlessly against a status endpoint")]
struct Cli {
    /// TOML settings file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Status endpoint URL
    #[arg(long)]
    status_url: Option<String>,

    /// Seconds between status polls
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Frames per second
    #[arg(long)]
    tick_hz: Option<u32>,

    /// RNG seed for idle picks and linger times
    #[arg(long)]
    seed: Option<u64>,

    /// Office layout JSON (built-in HQ layout when omitted)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Tiled map JSON to scan for glass doors
    #[arg(long)]
    map: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write scene events to stdout as JSON lines
    #[arg(long)]
    trace_json: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.status_url {
            settings.status_url = url.clone();
        }
        if let Some(secs) = self.poll_interval {
            settings.poll_interval_secs = secs;
        }
        if let Some(hz) = self.tick_hz {
            settings.tick_hz = hz;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.layout.is_some() {
            settings.layout_path = self.layout.clone();
        }
        if self.map.is_some() {
            settings.map_path = self.map.clone();
        }
        if self.max_ticks.is_some() {
            settings.max_ticks = self.max_ticks;
        }
        if self.trace_json {
            settings.trace_json = true;
        }
    }
}

#[derive(Serialize)]
struct TraceLine<'a> {
    tick: u64,
    time: f64,
    #[serde(flatten)]
    event: &'a SceneEvent,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "officehq=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    cli.apply(&mut settings);
    if settings.tick_hz == 0 || settings.poll_interval_secs == 0 {
        bail!("tick_hz and poll_interval_secs must be positive");
    }
    debug!(?settings, "settings loaded");

    let layout = load_layout(&settings)?;
    let anchors = load_door_anchors(&settings, &layout)?;
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        locations = layout.locations.len(),
        doors = anchors.len(),
        "scene ready"
    );
    let mut scene = OfficeScene::new(layout, &anchors, seed);

    let poller = StatusPoller::new(
        settings.status_url.clone(),
        Duration::from_secs(settings.poll_interval_secs),
        Duration::from_secs(settings.poll_timeout_secs),
    )
    .context("building HTTP client")?;
    let (tx, mut rx) = watch::channel(None);
    let poll_task = tokio::spawn(poller.run(tx));

    let mut frame = interval(Duration::from_secs_f64(1.0 / f64::from(settings.tick_hz)));
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut tick: u64 = 0;
    let mut last = Instant::now();
    loop {
        tokio::select! {
            _ = frame.tick() => {}
            _ = &mut shutdown => {
                info!("interrupted");
                break;
            }
        }

        let mut events = Vec::new();
        if rx.has_changed().unwrap_or(false) {
            if let Some(status) = *rx.borrow_and_update() {
                events.extend(scene.apply_status(status));
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_FRAME_DT);
        last = now;
        events.extend(scene.tick(dt, ManualInput::default()));

        for event in &events {
            log_event(event);
            if settings.trace_json {
                let line = TraceLine {
                    tick,
                    time: scene.clock(),
                    event,
                };
                println!("{}", serde_json::to_string(&line)?);
            }
        }

        tick += 1;
        if settings.max_ticks.is_some_and(|max| tick >= max) {
            info!(tick, "frame limit reached");
            break;
        }
    }

    poll_task.abort();
    let snap = scene.snapshot();
    info!(
        destination = %snap.target,
        status = %snap.status,
        x = snap.position.x,
        y = snap.position.y,
        arrived = snap.arrived,
        "agent stopped"
    );
    Ok(())
}

fn load_layout(settings: &Settings) -> Result<OfficeLayout> {
    let layout = match &settings.layout_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading layout {}", path.display()))?;
            OfficeLayout::from_json(&json)
                .with_context(|| format!("parsing layout {}", path.display()))?
        }
        None => OfficeLayout::default_hq().context("parsing built-in layout")?,
    };

    let problems = validate_all(&layout);
    for p in &problems {
        match p.severity {
            Severity::Error => error!(category = p.category, "{}", p.message),
            Severity::Warning => warn!(category = p.category, "{}", p.message),
        }
    }
    if !is_runnable(&problems) {
        bail!("layout failed validation");
    }
    Ok(layout)
}

fn load_door_anchors(settings: &Settings, layout: &OfficeLayout) -> Result<Vec<TilePos>> {
    let Some(path) = &settings.map_path else {
        return Ok(layout.door_anchors.clone());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading map {}", path.display()))?;
    let map = TileMap::from_json(&json).with_context(|| format!("parsing map {}", path.display()))?;
    let anchors = map.find_door_anchors(&settings.door_layer, settings.door_anchor_gid);
    if anchors.is_empty() {
        warn!(
            layer = %settings.door_layer,
            gid = settings.door_anchor_gid,
            "no doors found in map"
        );
    }
    Ok(anchors)
}

fn log_event(event: &SceneEvent) {
    match event {
        SceneEvent::RouteStarted { target, waypoints } => {
            info!(destination = %target, waypoints, "route started")
        }
        SceneEvent::RouteUnavailable { target } => {
            warn!(destination = %target, "no route, staying put")
        }
        SceneEvent::Arrived { location } => info!(%location, "arrived"),
        SceneEvent::LingerExpired => debug!("linger expired"),
        SceneEvent::WaypointReached { remaining } => debug!(remaining, "waypoint reached"),
        SceneEvent::DoorStateChanged { door, state } => {
            debug!(door, state = state.as_str(), "door state")
        }
        SceneEvent::DoorPassability { door, passable } => debug!(door, passable, "door passability"),
    }
}
