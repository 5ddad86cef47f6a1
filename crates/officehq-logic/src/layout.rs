//! Office layout: the waypoint spine, named locations, and the fragment
//! tables that connect each location to the spine.
//!
//! Layouts are authored in tile coordinates (`data/office_layout.json`)
//! and converted to world points once at load. A loaded layout is never
//! mutated; run [`validate_all`] before handing it to a scene.
//!
//! ```
//! use officehq_logic::layout::{OfficeLayout, validate_all, Severity};
//!
//! let layout = OfficeLayout::default_hq().unwrap();
//! let errors = validate_all(&layout);
//! assert!(errors.iter().all(|e| e.severity != Severity::Error));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Facing, Point, TilePos, Zone};

/// Two points closer than this on both axes are the same spine node.
pub const SPINE_MATCH_EPS: f32 = 2.0;

const DEFAULT_LAYOUT_JSON: &str = include_str!("../../../data/office_layout.json");

// ── Authoring format (tile coordinates) ─────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDef {
    pub work_location: String,
    pub spine: Vec<TilePos>,
    pub locations: Vec<LocationDef>,
    pub exits: HashMap<String, FragmentDef>,
    pub entries: HashMap<String, FragmentDef>,
    #[serde(default)]
    pub direct_routes: Vec<DirectRouteDef>,
    #[serde(default)]
    pub doors: Vec<TilePos>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDef {
    pub name: String,
    pub tile: TilePos,
    pub facing: Facing,
    pub zone: Zone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentDef {
    pub spine: TilePos,
    pub path: Vec<TilePos>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectRouteDef {
    pub from: String,
    pub to: String,
    pub path: Vec<TilePos>,
}

// ── Runtime layout (world points) ───────────────────────────────────────

/// A named place the agent can walk to.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub pos: Point,
    pub facing: Facing,
    pub zone: Zone,
}

/// Short path between a location and the spine node it attaches to.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub spine: Point,
    pub path: Vec<Point>,
}

/// Fixed route for a location pair that bypasses the spine.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectRoute {
    pub from: String,
    pub to: String,
    pub path: Vec<Point>,
}

#[derive(Debug, Clone)]
pub struct OfficeLayout {
    pub work_location: String,
    pub spine: Vec<Point>,
    pub locations: Vec<Location>,
    /// location → spine
    pub exits: HashMap<String, Fragment>,
    /// spine → location
    pub entries: HashMap<String, Fragment>,
    pub direct_routes: Vec<DirectRoute>,
    /// Top-left tile of each 2×2 glass door.
    pub door_anchors: Vec<TilePos>,
}

/// Failure to load a layout document.
#[derive(Debug)]
pub enum LayoutError {
    Parse(serde_json::Error),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Parse(e) => write!(f, "layout JSON parse error: {e}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Parse(e) => Some(e),
        }
    }
}

fn points(tiles: &[TilePos]) -> Vec<Point> {
    tiles.iter().map(|t| t.to_point()).collect()
}

fn fragments(defs: &HashMap<String, FragmentDef>) -> HashMap<String, Fragment> {
    defs
        .iter()
        .map(|(name, f)| {
            (
                name.clone(),
                Fragment {
                    spine: f.spine.to_point(),
                    path: points(&f.path),
                },
            )
        })
        .collect()
}

impl From<LayoutDef> for OfficeLayout {
    fn from(def: LayoutDef) -> Self {
        Self {
            work_location: def.work_location,
            spine: points(&def.spine),
            locations: def
                .locations
                .iter()
                .map(|l| Location {
                    name: l.name.clone(),
                    pos: l.tile.to_point(),
                    facing: l.facing,
                    zone: l.zone,
                })
                .collect(),
            exits: fragments(&def.exits),
            entries: fragments(&def.entries),
            direct_routes: def
                .direct_routes
                .iter()
                .map(|r| DirectRoute {
                    from: r.from.clone(),
                    to: r.to.clone(),
                    path: points(&r.path),
                })
                .collect(),
            door_anchors: def.doors,
        }
    }
}

impl OfficeLayout {
    /// Parse a layout document in the authoring format.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let def: LayoutDef = serde_json::from_str(json).map_err(LayoutError::Parse)?;
        Ok(def.into())
    }

    /// The built-in HQ office.
    pub fn default_hq() -> Result<Self, LayoutError> {
        Self::from_json(DEFAULT_LAYOUT_JSON)
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn work(&self) -> Option<&Location> {
        self.location(&self.work_location)
    }

    /// Every location except the work location, in layout order.
    pub fn idle_locations(&self) -> impl Iterator<Item = &Location> {
        self.locations
            .iter()
            .filter(move |l| l.name != self.work_location)
    }

    /// Facing to assume on arrival at `name`.
    pub fn arrival_facing(&self, name: &str) -> Facing {
        match self.location(name) {
            Some(loc) => loc.facing,
            None if name == self.work_location => Facing::Left,
            None => Facing::Down,
        }
    }

    /// Index of the spine node at `p`, matching within [`SPINE_MATCH_EPS`].
    pub fn spine_index(&self, p: Point) -> Option<usize> {
        self.spine.iter().position(|s| s.near(p, SPINE_MATCH_EPS))
    }

    pub fn direct_route(&self, from: &str, to: &str) -> Option<&DirectRoute> {
        self.direct_routes
            .iter()
            .find(|r| r.from == from && r.to == to)
    }
}

// ── Validation ──────────────────────────────────────────────────────────

/// A layout integrity problem.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{sev}] {}: {}", self.category, self.message)
    }
}

/// Spine must exist and contain no duplicate nodes.
pub fn check_spine(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if layout.spine.is_empty() {
        errors.push(ValidationError {
            category: "spine",
            severity: Severity::Error,
            message: "spine has no waypoints".into(),
        });
    }
    for (i, p) in layout.spine.iter().enumerate() {
        if let Some(first) = layout.spine_index(*p) {
            if first != i {
                errors.push(ValidationError {
                    category: "spine",
                    severity: Severity::Error,
                    message: format!(
                        "spine node #{i} ({:.0},{:.0}) duplicates node #{first}",
                        p.x, p.y
                    ),
                });
            }
        }
    }
    errors
}

/// Location names must be unique and the work location must exist.
pub fn check_locations(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for loc in &layout.locations {
        if !seen.insert(loc.name.as_str()) {
            errors.push(ValidationError {
                category: "locations",
                severity: Severity::Error,
                message: format!("duplicate location '{}'", loc.name),
            });
        }
    }
    if layout.work().is_none() {
        errors.push(ValidationError {
            category: "locations",
            severity: Severity::Error,
            message: format!("work location '{}' is not defined", layout.work_location),
        });
    }
    if layout.idle_locations().count() < 2 {
        errors.push(ValidationError {
            category: "locations",
            severity: Severity::Warning,
            message: "fewer than two idle locations; idle picks will repeat".into(),
        });
    }
    errors
}

/// Every location needs both an exit and an entry fragment, and every
/// fragment must name a known location.
pub fn check_fragment_coverage(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for loc in &layout.locations {
        for (table, map) in [("exit", &layout.exits), ("entry", &layout.entries)] {
            if !map.contains_key(&loc.name) {
                errors.push(ValidationError {
                    category: "fragments",
                    severity: Severity::Error,
                    message: format!("location '{}' has no {table} fragment", loc.name),
                });
            }
        }
    }
    for (table, map) in [("exit", &layout.exits), ("entry", &layout.entries)] {
        for name in map.keys() {
            if layout.location(name).is_none() {
                errors.push(ValidationError {
                    category: "fragments",
                    severity: Severity::Warning,
                    message: format!("{table} fragment for unknown location '{name}'"),
                });
            }
        }
    }
    errors
}

/// Each fragment's connection point must be a spine node. A miss here
/// would make every route through that location silently empty.
pub fn check_fragment_spine_nodes(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (table, map) in [("exit", &layout.exits), ("entry", &layout.entries)] {
        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        for name in names {
            let frag = &map[name];
            if layout.spine_index(frag.spine).is_none() {
                errors.push(ValidationError {
                    category: "fragments",
                    severity: Severity::Error,
                    message: format!(
                        "{table} fragment '{name}' connects at ({:.0},{:.0}), which is not on the spine",
                        frag.spine.x, frag.spine.y
                    ),
                });
            }
        }
    }
    errors
}

/// Entry fragments must end where the location is; exit fragments must
/// end on their own spine node.
pub fn check_fragment_endpoints(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for loc in &layout.locations {
        if let Some(entry) = layout.entries.get(&loc.name) {
            match entry.path.last() {
                Some(last) if last.near(loc.pos, SPINE_MATCH_EPS) => {}
                _ => errors.push(ValidationError {
                    category: "fragments",
                    severity: Severity::Error,
                    message: format!("entry fragment '{}' does not end at the location", loc.name),
                }),
            }
        }
        if let Some(exit) = layout.exits.get(&loc.name) {
            match exit.path.last() {
                Some(last) if last.near(exit.spine, SPINE_MATCH_EPS) => {}
                _ => errors.push(ValidationError {
                    category: "fragments",
                    severity: Severity::Warning,
                    message: format!(
                        "exit fragment '{}' does not end on its spine node",
                        loc.name
                    ),
                }),
            }
        }
    }
    errors
}

/// Direct routes must join known locations and end at the destination.
pub fn check_direct_routes(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in &layout.direct_routes {
        let (Some(_), Some(dest)) = (layout.location(&r.from), layout.location(&r.to)) else {
            errors.push(ValidationError {
                category: "direct_routes",
                severity: Severity::Error,
                message: format!("direct route {} → {} names an unknown location", r.from, r.to),
            });
            continue;
        };
        match r.path.last() {
            Some(last) if last.near(dest.pos, SPINE_MATCH_EPS) => {}
            _ => errors.push(ValidationError {
                category: "direct_routes",
                severity: Severity::Error,
                message: format!("direct route {} → {} does not end at {}", r.from, r.to, r.to),
            }),
        }
    }
    errors
}

/// Run all layout checks.
pub fn validate_all(layout: &OfficeLayout) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_spine(layout));
    all.extend(check_locations(layout));
    all.extend(check_fragment_coverage(layout));
    all.extend(check_fragment_spine_nodes(layout));
    all.extend(check_fragment_endpoints(layout));
    all.extend(check_direct_routes(layout));
    all
}

/// True when `errors` contains nothing that should block startup.
pub fn is_runnable(errors: &[ValidationError]) -> bool {
    errors.iter().all(|e| e.severity != Severity::Error)
}
