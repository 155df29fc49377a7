//! Segment intersection and movement classification for crossing tests.

use crate::counter::Direction;
use crate::tracker::Rect;

/// Determinant magnitude below which two segments are treated as parallel.
const PARALLEL_EPS: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Bottom-center of a box.
    #[inline]
    pub fn foot_of(rect: &Rect) -> Self {
        let (x, y) = rect.bottom_center();
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Whether segment `p1 -> p2` intersects segment `a -> b`, endpoints
/// included.
///
/// Solves `p1 + t (p2 - p1) = a + u (b - a)`; there is an intersection iff
/// both `t` and `u` are in `[0, 1]`. Near-parallel segments never intersect.
pub fn segments_intersect(p1: Point, p2: Point, a: Point, b: Point) -> bool {
    let (x1, y1) = (p1.x as f64, p1.y as f64);
    let (x2, y2) = (p2.x as f64, p2.y as f64);
    let (x3, y3) = (a.x as f64, a.y as f64);
    let (x4, y4) = (b.x as f64, b.y as f64);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < PARALLEL_EPS {
        return false;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;

    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Classify a movement by its dominant axis. Ties go to the vertical axis.
pub fn crossing_direction(prev: Point, curr: Point) -> Direction {
    let dx = curr.x - prev.x;
    let dy = curr.y - prev.y;

    if dx.abs() > dy.abs() {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}
