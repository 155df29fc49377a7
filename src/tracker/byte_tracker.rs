//! Main BYTETracker algorithm implementation.

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::config::TrackerConfig;
use crate::error::ConfigError;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::Rect;
use crate::tracker::strack::{ActiveTrack, STrack};

/// Owns every live track and advances them one frame at a time.
///
/// Frames must be fed in order. Callers only ever see [`ActiveTrack`]
/// snapshots or shared references; the track set is never handed out
/// mutably.
#[derive(Debug)]
pub struct BYTETracker {
    tracks: Vec<STrack>,
    frame_id: u32,
    next_id: u64,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
}

impl BYTETracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tracks: Vec::new(),
            frame_id: 0,
            next_id: 1,
            config,
            kalman_filter: KalmanFilter::default(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames processed so far.
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Tracks currently held, active and coasting.
    pub fn tracks(&self) -> &[STrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn next_track_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Process one frame of detections and return the tracks active in it.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<ActiveTrack> {
        self.frame_id += 1;
        let frame_id = self.frame_id;

        // Step 1: Predict every held track
        STrack::multi_predict(&mut self.tracks, &self.kalman_filter);

        // Step 2: Drop malformed detections, split the rest by score
        let mut detections_high = Vec::new();
        let mut detections_low = Vec::new();

        for det in detections {
            if let Err(err) = det.validate() {
                debug!(frame_id, ?det, %err, "dropping malformed detection");
                continue;
            }
            if det.score >= self.config.track_thresh {
                detections_high.push(*det);
            } else if det.score >= self.config.low_thresh {
                detections_low.push(*det);
            }
        }

        let num_tracks = self.tracks.len();
        let mut failed = vec![false; num_tracks];

        // Step 3: First association, all tracks against high score detections
        let pool_rects: Vec<Rect> = self.tracks.iter().map(|t| t.rect()).collect();
        let det_rects: Vec<Rect> = detections_high.iter().map(|d| d.bbox).collect();

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::associate(&pool_rects, &det_rects, self.config.match_thresh);

        for &(itracked, idet) in &matches {
            self.apply_update(itracked, &detections_high[idet], &mut failed);
        }

        // Step 4: Second association, leftover tracks against low score
        // detections. Local indices map back through `r_track_indices`.
        let r_track_indices = unmatched_tracks;
        let r_rects: Vec<Rect> = r_track_indices
            .iter()
            .map(|&idx| self.tracks[idx].rect())
            .collect();
        let det_low_rects: Vec<Rect> = detections_low.iter().map(|d| d.bbox).collect();

        let AssignmentResult {
            matches: matches_second,
            ..
        } = matching::associate(&r_rects, &det_low_rects, self.config.match_thresh);

        let mut still_unmatched: BTreeSet<usize> = r_track_indices.iter().copied().collect();
        for &(local, idet) in &matches_second {
            let itracked = r_track_indices[local];
            still_unmatched.remove(&itracked);
            self.apply_update(itracked, &detections_low[idet], &mut failed);
        }

        // Step 5: Everything left coasts
        for &idx in &still_unmatched {
            self.tracks[idx].mark_lost();
        }

        // Step 6: Init new tracks from unmatched high score detections only
        for &idet in &unmatched_detections {
            let track_id = self.next_track_id();
            let track = STrack::new(track_id, &detections_high[idet], &self.kalman_filter, frame_id);
            debug!(frame_id, track_id, score = track.score, "new track");
            self.tracks.push(track);
        }

        // Step 7: Evict failed and expired tracks
        let track_buffer = self.config.track_buffer;
        for (idx, track) in self.tracks.iter_mut().enumerate() {
            let numeric_failure = failed.get(idx).copied().unwrap_or(false);
            if numeric_failure || track.lost_frames >= track_buffer {
                track.mark_removed();
                debug!(
                    frame_id,
                    track_id = track.track_id,
                    lost_frames = track.lost_frames,
                    lived = frame_id - track.start_frame,
                    numeric_failure,
                    "removing track"
                );
            }
        }
        self.tracks.retain(|track| !track.is_removed());

        trace!(
            frame_id,
            high = detections_high.len(),
            low = detections_low.len(),
            first_matches = matches.len(),
            second_matches = matches_second.len(),
            coasting = still_unmatched.len(),
            created = unmatched_detections.len(),
            held = self.tracks.len(),
            "frame associated"
        );

        // Step 8: Report tracks matched or born this frame
        self.tracks
            .iter()
            .filter(|t| t.is_active())
            .map(STrack::snapshot)
            .collect()
    }

    fn apply_update(&mut self, idx: usize, det: &Detection, failed: &mut [bool]) {
        let track = &mut self.tracks[idx];
        if let Err(err) = track.update(det, &self.kalman_filter) {
            warn!(
                frame_id = self.frame_id,
                track_id = track.track_id,
                %err,
                "motion update failed, dropping track"
            );
            failed[idx] = true;
        }
    }
}
