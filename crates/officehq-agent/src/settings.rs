//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file,
//! `OFFICEHQ_*` environment variables, then command-line flags (applied by
//! the caller).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use officehq_logic::tilemap::{DOOR_ANCHOR_GID, DOOR_LAYER};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS_URL: &str = "http://127.0.0.1:8787/status";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Endpoint returning `{"status": "idle" | "typing" | "working"}`.
    pub status_url: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub tick_hz: u32,
    /// Fixed RNG seed; random when unset.
    pub seed: Option<u64>,
    /// Layout JSON; the built-in HQ layout when unset.
    pub layout_path: Option<PathBuf>,
    /// Tiled map JSON to scan for doors; layout door anchors when unset.
    pub map_path: Option<PathBuf>,
    pub door_layer: String,
    pub door_anchor_gid: u32,
    /// Stop after this many frames; run until Ctrl-C when unset.
    pub max_ticks: Option<u64>,
    /// Emit every scene event as a JSON line on stdout.
    pub trace_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            poll_interval_secs: 5,
            poll_timeout_secs: 4,
            tick_hz: 60,
            seed: None,
            layout_path: None,
            map_path: None,
            door_layer: DOOR_LAYER.to_string(),
            door_anchor_gid: DOOR_ANCHOR_GID,
            max_ticks: None,
            trace_json: false,
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.map(|p| File::from(p).format(FileFormat::Toml).required(true));
        layered(file, Some(env_source()))
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("OFFICEHQ").try_parsing(true)
}

fn layered<F, E>(file: Option<F>, env: Option<E>) -> Result<Settings, ConfigError>
where
    F: Source + Send + Sync + 'static,
    E: Source + Send + Sync + 'static,
{
    let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
    if let Some(file) = file {
        builder = builder.add_source(file);
    }
    if let Some(env) = env {
        builder = builder.add_source(env);
    }
    builder.build()?.try_deserialize()
}
