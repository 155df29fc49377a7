//! ByteTrack multi-object tracking with directional line-crossing counts.
//!
//! Detections go into a [`BYTETracker`], which keeps persistent track ids
//! through a constant-velocity Kalman filter and two-stage IoU association.
//! The per-frame active tracks are handed to a [`LineCounter`], which counts
//! entry and exit crossings of a single virtual line.
//!
//! ```no_run
//! use bytetrack_counter::{BYTETracker, Detection, Direction, LineConfig, LineCounter, TrackerConfig};
//!
//! let mut tracker = BYTETracker::new(TrackerConfig::default())?;
//! let mut counter = LineCounter::new(LineConfig {
//!     start: [320.0, 0.0],
//!     end: [320.0, 480.0],
//!     entry: Direction::Right,
//!     exit: Direction::Left,
//! })?;
//!
//! let tracks = tracker.update(&[Detection::new(10.0, 20.0, 50.0, 80.0, 0.9)]);
//! counter.update(&tracks);
//! println!("{:?}", counter.get_counts());
//! # Ok::<(), bytetrack_counter::ConfigError>(())
//! ```

pub mod config;
pub mod counter;
pub mod error;
pub mod integration;
pub mod tracker;

pub use config::{LineConfig, RunConfig, TrackerConfig};
pub use counter::{Counts, Direction, LineCounter, Point};
pub use error::{ConfigError, DetectionError, MotionError, RecordError};
pub use integration::{CountingPipeline, DetectionBuilder, DetectionSource, FrameReport};
pub use tracker::{ActiveTrack, BYTETracker, Detection, Rect};
