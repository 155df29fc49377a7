mod byte_tracker;
mod kalman_filter;
mod matching;
mod rect;
mod strack;
mod track_state;

pub use byte_tracker::BYTETracker;
pub use kalman_filter::KalmanFilter;
pub use matching::{AssignmentResult, Detection, associate, iou_distance, linear_assignment};
pub use rect::{Rect, iou_batch};
pub use strack::{ActiveTrack, STrack};
pub use track_state::TrackState;
