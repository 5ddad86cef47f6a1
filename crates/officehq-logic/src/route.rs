//! Route composition over the waypoint spine.
//!
//! A route between two named locations is stitched together from three
//! pieces:
//!
//! ```text
//! [from exit fragment] + [spine slice] + [to entry fragment]
//! ```
//!
//! The spine slice runs from the node after the exit connection up to and
//! including the entry connection, forward or backward depending on which
//! index is larger. There is no general search; an unknown name or a
//! connection point that is not on the spine yields an empty route.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::geometry::Point;
use crate::layout::OfficeLayout;

/// Remaining waypoints for the agent, consumed from the front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    points: VecDeque<Point>,
}

impl Route {
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn head(&self) -> Option<Point> {
        self.points.front().copied()
    }

    pub fn pop(&mut self) -> Option<Point> {
        self.points.pop_front()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.back().copied()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.points.iter().copied().collect()
    }
}

/// Push the spine nodes strictly after `from` up to and including `to`.
/// Nothing is pushed when the indices are equal.
fn push_spine_slice(spine: &[Point], from: usize, to: usize, out: &mut Vec<Point>) {
    if from < to {
        out.extend_from_slice(&spine[from + 1..=to]);
    } else if from > to {
        out.extend(spine[to..from].iter().rev().copied());
    }
}

impl OfficeLayout {
    /// Compose the route from location `from` to location `to`.
    ///
    /// Returns an empty route when either name is unknown or a fragment's
    /// connection point is not on the spine. Callers treat that as "stay
    /// put", not as an error.
    pub fn build_route(&self, from: &str, to: &str) -> Route {
        if let Some(direct) = self.direct_route(from, to) {
            debug!("direct route {from} → {to} ({} points)", direct.path.len());
            return Route::new(direct.path.iter().copied());
        }

        let (Some(exit), Some(entry)) = (self.exits.get(from), self.entries.get(to)) else {
            warn!("no route {from} → {to}: unknown location");
            return Route::default();
        };
        let (Some(ia), Some(ib)) = (self.spine_index(exit.spine), self.spine_index(entry.spine))
        else {
            warn!("no route {from} → {to}: fragment not connected to spine");
            return Route::default();
        };

        let mut points = exit.path.clone();
        push_spine_slice(&self.spine, ia, ib, &mut points);
        points.extend_from_slice(&entry.path);
        debug!(
            "route {from} → {to}: spine {ia}→{ib}, {} points",
            points.len()
        );
        Route::new(points)
    }

    /// Re-route an agent that is still walking `remaining` toward `to`.
    ///
    /// Keeps the queued points up to and including the first one on the
    /// spine, then continues along the spine to the destination's entry
    /// fragment. This keeps the agent from snapping back to the start of a
    /// walk it has already half finished.
    ///
    /// Returns `None` when the destination is unknown or nothing left in
    /// `remaining` lies on the spine; the caller falls back to
    /// [`build_route`](Self::build_route) from its current target.
    pub fn retarget(&self, remaining: &[Point], to: &str) -> Option<Route> {
        let entry = self.entries.get(to)?;
        let ib = self.spine_index(entry.spine)?;
        let (k, start) = remaining
            .iter()
            .enumerate()
            .find_map(|(k, p)| self.spine_index(*p).map(|s| (k, s)))?;

        let mut points = remaining[..=k].to_vec();
        push_spine_slice(&self.spine, start, ib, &mut points);
        points.extend_from_slice(&entry.path);
        debug!(
            "retarget → {to}: kept {} queued points, spine {start}→{ib}",
            k + 1
        );
        Some(Route::new(points))
    }

    /// Spine indices of every point in `points`, skipping off-spine ones.
    pub fn spine_indices(&self, points: &[Point]) -> Vec<usize> {
        points.iter().filter_map(|p| self.spine_index(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hq() -> OfficeLayout {
        OfficeLayout::default_hq().unwrap()
    }

    fn tile(col: i32, row: i32) -> Point {
        Point::from_tile(col, row)
    }

    #[test]
    fn forward_route_mid_to_lounge() {
        let layout = hq();
        let route = layout.build_route("check_monitor", "ping_pong");
        // exit [CORR_TL] + spine 4..=9 + entry [ping pong]
        let expected = vec![
            tile(3, 9),
            tile(5, 9),
            tile(5, 14),
            tile(13, 14),
            tile(13, 15),
            tile(13, 17),
            tile(15, 17),
            tile(15, 20),
        ];
        assert_eq!(route.to_vec(), expected);
    }

    #[test]
    fn backward_route_lounge_to_mid() {
        let layout = hq();
        let route = layout.build_route("ping_pong", "water_plant");
        let expected = vec![
            tile(15, 17),
            tile(13, 17),
            tile(13, 15),
            tile(13, 14),
            tile(5, 14),
            tile(5, 9),
            tile(6, 12),
        ];
        assert_eq!(route.to_vec(), expected);
    }

    #[test]
    fn same_spine_node_inserts_nothing() {
        let layout = hq();
        // both connect at CORR_TL
        let route = layout.build_route("check_monitor", "wander");
        assert_eq!(route.to_vec(), vec![tile(3, 9), tile(9, 9), tile(9, 12)]);
    }

    #[test]
    fn direct_routes_bypass_spine() {
        let layout = hq();
        assert_eq!(
            layout.build_route("look_painting", "desk").to_vec(),
            vec![tile(1, 5), tile(7, 5)]
        );
        assert_eq!(
            layout.build_route("desk", "look_painting").to_vec(),
            vec![tile(1, 5), tile(1, 4)]
        );
    }

    #[test]
    fn unknown_location_gives_empty_route() {
        let layout = hq();
        assert!(layout.build_route("desk", "rooftop").is_empty());
        assert!(layout.build_route("rooftop", "desk").is_empty());
    }

    #[test]
    fn spine_miss_gives_empty_route() {
        let mut layout = hq();
        layout.entries.get_mut("wander").unwrap().spine = tile(10, 10);
        assert!(layout.build_route("watch_tv", "wander").is_empty());
    }

    #[test]
    fn desk_to_lounge_ends_at_location() {
        let layout = hq();
        let route = layout.build_route("desk", "look_window");
        assert_eq!(route.head(), Some(tile(7, 5)));
        assert_eq!(route.last(), Some(tile(18, 19)));
    }

    #[test]
    fn retarget_keeps_progress() {
        let layout = hq();
        // walking check_monitor → ping_pong, already past CORR_C5
        let remaining = vec![
            tile(5, 14),
            tile(13, 14),
            tile(13, 15),
            tile(13, 17),
            tile(15, 17),
            tile(15, 20),
        ];
        let route = layout.retarget(&remaining, "water_plant").unwrap();
        assert_eq!(route.to_vec(), vec![tile(5, 14), tile(5, 9), tile(6, 12)]);
    }

    #[test]
    fn retarget_skips_leading_off_spine_points() {
        let layout = hq();
        // still inside wander's exit fragment
        let remaining = vec![tile(9, 9), tile(3, 9), tile(5, 9)];
        let route = layout.retarget(&remaining, "look_painting").unwrap();
        let pts = route.to_vec();
        assert_eq!(pts[0], tile(9, 9));
        assert_eq!(pts[1], tile(3, 9));
        assert_eq!(pts.last(), Some(&tile(1, 4)));
        // spine 3 → 0, then painting entry
        assert_eq!(
            layout.spine_indices(&pts[1..pts.len() - 2]),
            vec![3, 2, 1, 0]
        );
    }

    #[test]
    fn retarget_without_spine_point_is_none() {
        let layout = hq();
        let remaining = vec![tile(9, 9), tile(9, 12)];
        assert!(layout.retarget(&remaining, "desk").is_none());
        assert!(layout.retarget(&[], "desk").is_none());
    }

    #[test]
    fn retarget_unknown_destination_is_none() {
        let layout = hq();
        assert!(layout.retarget(&[tile(5, 14)], "rooftop").is_none());
    }

    #[test]
    fn route_queue_ops() {
        let mut r = Route::new(vec![tile(1, 1), tile(2, 1)]);
        assert_eq!(r.len(), 2);
        assert_eq!(r.pop(), Some(tile(1, 1)));
        assert_eq!(r.head(), Some(tile(2, 1)));
        assert_eq!(r.pop(), Some(tile(2, 1)));
        assert!(r.is_empty());
        assert_eq!(r.pop(), None);
    }
}
