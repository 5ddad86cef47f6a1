//! World-space points, tile conversion, and facing directions.
//!
//! All positions use feet-corrected Y: a character standing on tile
//! `(col, row)` is at `(col*T + T/2, row*T - FEET_OFFSET)`.

use serde::{Deserialize, Serialize};

/// Tile edge length in world pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Vertical shift from a tile's top edge to a character's visual feet.
pub const FEET_OFFSET: f32 = 7.0;

/// A 2D coordinate in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Feet position of a character standing on tile `(col, row)`.
    pub fn from_tile(col: i32, row: i32) -> Self {
        Self {
            x: col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            y: row as f32 * TILE_SIZE - FEET_OFFSET,
        }
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when both axes are within `eps` of `other`.
    pub fn near(&self, other: Point, eps: f32) -> bool {
        (self.x - other.x).abs() < eps && (self.y - other.y).abs() < eps
    }
}

/// A tile coordinate `(col, row)` as written in layout data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos(pub i32, pub i32);

impl TilePos {
    pub fn col(&self) -> i32 {
        self.0
    }

    pub fn row(&self) -> i32 {
        self.1
    }

    pub fn to_point(self) -> Point {
        Point::from_tile(self.0, self.1)
    }
}

/// One of the four cardinal directions a character can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }

    /// Facing for horizontal motion with the given sign.
    pub fn horizontal(dx: f32) -> Self {
        if dx > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    /// Facing for vertical motion with the given sign (screen Y grows down).
    pub fn vertical(dy: f32) -> Self {
        if dy > 0.0 {
            Facing::Down
        } else {
            Facing::Up
        }
    }
}

/// Map region a location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Top,
    Mid,
    Bot,
}

/// Quadratic ease-in-out over `t ∈ [0, 1]`.
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_point_uses_feet_offset() {
        let p = Point::from_tile(7, 5);
        assert_eq!(p, Point::new(240.0, 153.0));
    }

    #[test]
    fn near_checks_both_axes() {
        let a = Point::new(10.0, 10.0);
        assert!(a.near(Point::new(11.5, 8.5), 2.0));
        assert!(!a.near(Point::new(12.5, 10.0), 2.0));
        assert!(!a.near(Point::new(10.0, 7.9), 2.0));
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        assert!((a.distance(Point::new(3.0, 4.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert!((ease_in_out_quad(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-6);
        // slow start, slow finish
        assert!(ease_in_out_quad(0.1) < 0.1);
        assert!(ease_in_out_quad(0.9) > 0.9);
    }

    #[test]
    fn ease_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = ease_in_out_quad(i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn facing_from_sign() {
        assert_eq!(Facing::horizontal(3.0), Facing::Right);
        assert_eq!(Facing::horizontal(-3.0), Facing::Left);
        assert_eq!(Facing::vertical(1.0), Facing::Down);
        assert_eq!(Facing::vertical(-1.0), Facing::Up);
    }
}
