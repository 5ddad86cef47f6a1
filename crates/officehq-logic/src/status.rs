//! The externally polled status flag.

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Typing,
    Working,
}

/// Body returned by the status endpoint. Any other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub status: Option<String>,
}

impl Status {
    /// Interpret a raw status string. Missing or empty means idle; an
    /// unrecognised value still means "busy" and is treated as working.
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("idle") => Status::Idle,
            Some("typing") => Status::Typing,
            Some("working") => Status::Working,
            Some(other) => {
                warn!("unrecognised status '{other}', treating as working");
                Status::Working
            }
        }
    }

    pub fn from_body(body: &StatusBody) -> Self {
        Self::from_wire(body.status.as_deref())
    }

    pub fn is_idle(&self) -> bool {
        *self == Status::Idle
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Typing => "typing",
            Status::Working => "working",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
