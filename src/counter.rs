//! Directional counting of track crossings over a single virtual line.

mod direction;
mod geometry;
mod line_counter;

pub use direction::Direction;
pub use geometry::{Point, crossing_direction, segments_intersect};
pub use line_counter::{CrossingEvent, CrossingKind, Counts, LineCounter};
