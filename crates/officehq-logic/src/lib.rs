//! Pure scene logic for OfficeHQ.
//!
//! Everything here is independent of rendering, networking, and the async
//! runtime. Functions take plain data and return results, so the whole
//! agent can be driven deterministically from tests or the headless
//! harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`behavior`] | Idle wandering vs. work, idle picks, linger timing |
//! | [`door`] | Proximity-triggered 4-panel sliding doors |
//! | [`geometry`] | Points, tile conversion, facing, easing |
//! | [`layout`] | Office layout data and integrity checks |
//! | [`motion`] | Axis-by-axis route following and manual override |
//! | [`route`] | Route composition over the waypoint spine, retargeting |
//! | [`scene`] | Per-frame coordinator owning all session state |
//! | [`status`] | Polled status flag parsing |
//! | [`tilemap`] | Door anchor discovery in Tiled JSON maps |

pub mod behavior;
pub mod door;
pub mod geometry;
pub mod layout;
pub mod motion;
pub mod route;
pub mod scene;
pub mod status;
pub mod tilemap;
