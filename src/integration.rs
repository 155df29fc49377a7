//! Boundary between the tracking engine and its external collaborators.
//!
//! Detections come in through [`DetectionSource`], one frame at a time;
//! [`CountingPipeline`] runs tracker and counter over them, and
//! [`MotWriter`] persists the per-frame tracks in MOT text format.

mod builder;
mod detector;
mod mot;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use mot::{MotDetections, MotWriter};
pub use pipeline::{CountingPipeline, FrameReport, RunSummary};
