//! Single object track (STrack) for multi-object tracking.

use ndarray::{Array1, Array2};

use crate::error::MotionError;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Read-only view of a track reported as active for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveTrack {
    /// Unique track identifier, never reused
    pub track_id: u64,
    /// Reported bounding box
    pub rect: Rect,
    /// Confidence of the last matched detection
    pub score: f32,
}

impl ActiveTrack {
    /// Box as (x1, y1, x2, y2).
    #[inline]
    pub fn tlbr(&self) -> [f32; 4] {
        self.rect.to_tlbr()
    }
}

/// Single object track.
#[derive(Debug, Clone)]
pub struct STrack {
    /// Unique track identifier
    pub track_id: u64,
    /// Current track state
    pub state: TrackState,
    /// Detection confidence score
    pub score: f32,
    /// Frames since birth on which the track was matched, starting at 1
    pub age: u32,
    /// Consecutive frames without a match
    pub lost_frames: u32,
    /// Frame ID when track was started
    pub start_frame: u32,
    /// Kalman filter state mean (8-dim)
    mean: Array1<f64>,
    /// Kalman filter state covariance (8x8)
    covariance: Array2<f64>,
    /// Box reported for the current frame (TLWH)
    tlwh: Rect,
}

fn measurement(rect: &Rect) -> [f64; 4] {
    let [cx, cy, w, h] = rect.to_xywh();
    [cx as f64, cy as f64, w as f64, h as f64]
}

impl STrack {
    /// Start a new track from an unmatched detection.
    pub fn new(track_id: u64, det: &Detection, kalman_filter: &KalmanFilter, frame_id: u32) -> Self {
        let (mean, covariance) = kalman_filter.initiate(measurement(&det.bbox));
        Self {
            track_id,
            state: TrackState::Active,
            score: det.score,
            age: 1,
            lost_frames: 0,
            start_frame: frame_id,
            mean,
            covariance,
            tlwh: det.bbox,
        }
    }

    /// Box reported for the current frame: the matched detection after an
    /// update, the motion prediction otherwise.
    pub fn rect(&self) -> Rect {
        self.tlwh
    }

    /// Box described by the filter state.
    pub fn predicted_rect(&self) -> Rect {
        Rect::from_xywh(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    /// Filter state `[cx, cy, w, h, vx, vy, vw, vh]`.
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.lost_frames == 0 && self.state == TrackState::Active
    }

    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        let (new_mean, new_cov) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = new_mean;
        self.covariance = new_cov;
        self.tlwh = self.predicted_rect();
    }

    /// Correct the track with a matched detection.
    ///
    /// On error the track is left as it was before the call.
    pub fn update(&mut self, det: &Detection, kalman_filter: &KalmanFilter) -> Result<(), MotionError> {
        let (new_mean, new_cov) =
            kalman_filter.update(&self.mean, &self.covariance, measurement(&det.bbox))?;

        self.mean = new_mean;
        self.covariance = new_cov;
        self.tlwh = det.bbox;
        self.score = det.score;
        self.age += 1;
        self.lost_frames = 0;
        self.state = TrackState::Active;
        Ok(())
    }

    pub fn mark_lost(&mut self) {
        self.lost_frames += 1;
        self.state = TrackState::Coasting;
    }

    pub fn mark_removed(&mut self) {
        self.state = TrackState::Removed;
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.state == TrackState::Removed
    }

    pub fn snapshot(&self) -> ActiveTrack {
        ActiveTrack {
            track_id: self.track_id,
            rect: self.tlwh,
            score: self.score,
        }
    }

    pub fn multi_predict(stracks: &mut [STrack], kalman_filter: &KalmanFilter) {
        for strack in stracks.iter_mut() {
            strack.predict(kalman_filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_track() {
        let kf = KalmanFilter::new();
        let det = Detection::new(10.0, 20.0, 50.0, 100.0, 0.9);
        let track = STrack::new(7, &det, &kf, 3);

        assert_eq!(track.track_id, 7);
        assert_eq!(track.start_frame, 3);
        assert_eq!(track.age, 1);
        assert!(track.is_active());
        assert_eq!(track.rect(), det.bbox);
        assert_eq!(track.predicted_rect().to_tlbr(), [10.0, 20.0, 50.0, 100.0]);
    }

    #[test]
    fn test_update_resets_lost_frames() {
        let kf = KalmanFilter::new();
        let mut track = STrack::new(1, &Detection::new(0.0, 0.0, 20.0, 40.0, 0.9), &kf, 1);
        track.predict(&kf);
        track.mark_lost();
        track.predict(&kf);
        track.mark_lost();
        assert_eq!(track.lost_frames, 2);
        assert_eq!(track.state, TrackState::Coasting);
        assert!(!track.is_active());

        track.predict(&kf);
        let det = Detection::new(2.0, 0.0, 22.0, 40.0, 0.7);
        track.update(&det, &kf).unwrap();
        assert_eq!(track.lost_frames, 0);
        assert_eq!(track.age, 2);
        assert_eq!(track.score, 0.7);
        assert_eq!(track.rect(), det.bbox);
        assert!(track.is_active());
    }

    #[test]
    fn test_failed_update_leaves_track_untouched() {
        let kf = KalmanFilter::new();
        let mut track = STrack::new(1, &Detection::new(0.0, 0.0, 20.0, 40.0, 0.9), &kf, 1);
        track.predict(&kf);
        let before = track.mean().clone();

        let bad = Detection::new(f32::NAN, 0.0, 20.0, 40.0, 0.9);
        assert!(track.update(&bad, &kf).is_err());
        assert_eq!(track.mean(), &before);
        assert_eq!(track.age, 1);
    }

    #[test]
    fn test_predict_reports_motion_box() {
        let kf = KalmanFilter::new();
        let mut track = STrack::new(1, &Detection::new(0.0, 0.0, 20.0, 40.0, 0.9), &kf, 1);
        track.predict(&kf);
        // zero initial velocity: prediction stays put
        assert_eq!(track.rect().to_tlbr(), [0.0, 0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_mark_removed() {
        let kf = KalmanFilter::new();
        let mut track = STrack::new(1, &Detection::new(0.0, 0.0, 20.0, 40.0, 0.9), &kf, 1);
        assert!(!track.is_removed());
        track.mark_lost();
        track.mark_removed();
        assert!(track.is_removed());
        assert!(!track.is_active());
    }
}
