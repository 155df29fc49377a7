//! CountingPipeline for combining a detection source with tracking and
//! line counting.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{LineConfig, TrackerConfig};
use crate::counter::{Counts, CrossingEvent, CrossingKind, LineCounter};
use crate::error::ConfigError;
use crate::tracker::{ActiveTrack, BYTETracker};

use super::{DetectionSource, IntoDetections};

/// Everything produced for one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// 1-based frame number
    pub frame: u32,
    /// Tracks active in this frame
    pub tracks: Vec<ActiveTrack>,
    /// Crossings recorded in this frame
    pub crossings: Vec<CrossingEvent>,
    /// Cumulative counts after this frame
    pub counts: Counts,
}

/// Final summary of a run, serialised as `results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub sequence: String,
    pub total_frames: u32,
    pub counts: Counts,
}

/// Runs detections through a [`BYTETracker`] and a [`LineCounter`], frame
/// by frame.
///
/// To stop early, stop calling [`step`](Self::step); the counts gathered so
/// far stay available through [`counts`](Self::counts).
pub struct CountingPipeline<D: DetectionSource> {
    source: D,
    tracker: BYTETracker,
    counter: LineCounter,
}

impl<D: DetectionSource> CountingPipeline<D> {
    /// Create a pipeline. Both configs are validated before any frame runs.
    pub fn new(source: D, tracker: TrackerConfig, line: LineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            source,
            tracker: BYTETracker::new(tracker)?,
            counter: LineCounter::new(line)?,
        })
    }

    /// Pull the next frame from the source and process it. Returns `None`
    /// once the source is exhausted.
    pub fn step(&mut self) -> Result<Option<FrameReport>, D::Error> {
        match self.source.next_frame()? {
            Some(detections) => Ok(Some(self.process_detections(detections))),
            None => Ok(None),
        }
    }

    /// Process one frame of detections that did not come from the source.
    pub fn process_detections(&mut self, detections: impl IntoDetections) -> FrameReport {
        let detections = detections.into_detections();
        let tracks = self.tracker.update(&detections);
        let crossings = self.counter.update(&tracks);
        let frame = self.tracker.frame_id();

        for event in &crossings {
            if event.kind != CrossingKind::Uncounted {
                info!(
                    frame,
                    track_id = event.track_id,
                    direction = %event.direction,
                    kind = ?event.kind,
                    "counted crossing"
                );
            }
        }

        FrameReport {
            frame,
            tracks,
            crossings,
            counts: self.counter.get_counts(),
        }
    }

    pub fn counts(&self) -> Counts {
        self.counter.get_counts()
    }

    /// Frames processed so far.
    pub fn frames_processed(&self) -> u32 {
        self.tracker.frame_id()
    }

    pub fn summary(&self, sequence: impl Into<String>) -> RunSummary {
        RunSummary {
            sequence: sequence.into(),
            total_frames: self.frames_processed(),
            counts: self.counts(),
        }
    }

    /// Get a reference to the underlying detection source.
    pub fn source(&self) -> &D {
        &self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &BYTETracker {
        &self.tracker
    }

    /// Get a reference to the underlying counter.
    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::Direction;
    use crate::tracker::Detection;

    struct ScriptedSource {
        frames: std::vec::IntoIter<Vec<Detection>>,
    }

    impl DetectionSource for ScriptedSource {
        type Error = std::convert::Infallible;

        fn next_frame(&mut self) -> Result<Option<Vec<Detection>>, Self::Error> {
            Ok(self.frames.next())
        }
    }

    fn line() -> LineConfig {
        LineConfig {
            start: [45.0, 0.0],
            end: [45.0, 400.0],
            entry: Direction::Right,
            exit: Direction::Left,
        }
    }

    #[test]
    fn test_pipeline_runs_until_source_ends() {
        let frames: Vec<Vec<Detection>> = (0..6)
            .map(|i| {
                let x = i as f32 * 10.0 + 20.0;
                vec![Detection::new(x - 10.0, 100.0, x + 10.0, 200.0, 0.9)]
            })
            .collect();
        let source = ScriptedSource {
            frames: frames.into_iter(),
        };
        let config = TrackerConfig {
            match_thresh: 0.3,
            ..TrackerConfig::default()
        };
        let mut pipeline = CountingPipeline::new(source, config, line()).unwrap();

        let mut reports = Vec::new();
        while let Some(report) = pipeline.step().unwrap() {
            reports.push(report);
        }

        assert_eq!(reports.len(), 6);
        assert_eq!(reports[0].frame, 1);
        assert!(reports.iter().all(|r| r.tracks.len() == 1 && r.tracks[0].track_id == 1));
        assert_eq!(pipeline.counts().entry, 1);

        let summary = pipeline.summary("synthetic");
        assert_eq!(summary.total_frames, 6);
        assert_eq!(summary.counts.total_crossings, 1);
    }

    #[test]
    fn test_invalid_line_rejected_before_first_frame() {
        let source = ScriptedSource {
            frames: Vec::new().into_iter(),
        };
        let bad = LineConfig {
            exit: Direction::Right,
            ..line()
        };
        assert!(CountingPipeline::new(source, TrackerConfig::default(), bad).is_err());
    }

    #[test]
    fn test_summary_serialises() {
        let summary = RunSummary {
            sequence: "MOT17-09".to_string(),
            total_frames: 525,
            counts: Counts {
                entry: 3,
                exit: 2,
                total_crossings: 5,
                unique_tracks: 5,
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["counts"]["entry"], 3);
        assert_eq!(json["total_frames"], 525);
    }
}
