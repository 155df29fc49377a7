//! Entry/exit counter over one configured line.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LineConfig;
use crate::counter::Direction;
use crate::counter::geometry::{Point, crossing_direction, segments_intersect};
use crate::error::ConfigError;
use crate::tracker::ActiveTrack;

/// Snapshot of the cumulative counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub entry: u64,
    pub exit: u64,
    pub total_crossings: u64,
    /// Distinct track ids that have had a crossing recorded.
    pub unique_tracks: u64,
}

/// How a recorded crossing affected the counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingKind {
    Entry,
    Exit,
    /// Direction is neither the entry nor the exit direction.
    Uncounted,
}

/// A crossing that passed the debounce on this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEvent {
    pub track_id: u64,
    pub direction: Direction,
    pub kind: CrossingKind,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy)]
struct TrackHistory {
    last_point: Point,
    last_crossing: Option<Direction>,
}

#[derive(Debug)]
pub struct LineCounter {
    config: LineConfig,
    start: Point,
    end: Point,
    history: HashMap<u64, TrackHistory>,
    crossed_ids: BTreeSet<u64>,
    entry_count: u64,
    exit_count: u64,
}

impl LineCounter {
    pub fn new(config: LineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            start: Point::from(config.start),
            end: Point::from(config.end),
            config,
            history: HashMap::new(),
            crossed_ids: BTreeSet::new(),
            entry_count: 0,
            exit_count: 0,
        })
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    /// Line endpoints.
    pub fn line(&self) -> (Point, Point) {
        (self.start, self.end)
    }

    /// Feed this frame's active tracks. Returns the crossings recorded.
    ///
    /// Ids missing from `tracks` lose their position and crossing history.
    pub fn update(&mut self, tracks: &[ActiveTrack]) -> Vec<CrossingEvent> {
        let mut events = Vec::new();
        let mut current_ids = HashSet::with_capacity(tracks.len());

        for track in tracks {
            current_ids.insert(track.track_id);
            let current = Point::foot_of(&track.rect);

            let Some(record) = self.history.get_mut(&track.track_id) else {
                self.history.insert(
                    track.track_id,
                    TrackHistory {
                        last_point: current,
                        last_crossing: None,
                    },
                );
                continue;
            };

            let previous = record.last_point;
            record.last_point = current;

            if !segments_intersect(previous, current, self.start, self.end) {
                continue;
            }

            let direction = crossing_direction(previous, current);
            if record.last_crossing == Some(direction) {
                continue;
            }
            record.last_crossing = Some(direction);

            let kind = if direction == self.config.entry {
                self.entry_count += 1;
                CrossingKind::Entry
            } else if direction == self.config.exit {
                self.exit_count += 1;
                CrossingKind::Exit
            } else {
                CrossingKind::Uncounted
            };
            self.crossed_ids.insert(track.track_id);

            debug!(track_id = track.track_id, %direction, ?kind, "line crossed");
            events.push(CrossingEvent {
                track_id: track.track_id,
                direction,
                kind,
                from: previous,
                to: current,
            });
        }

        self.history.retain(|id, _| current_ids.contains(id));
        events
    }

    pub fn get_counts(&self) -> Counts {
        Counts {
            entry: self.entry_count,
            exit: self.exit_count,
            total_crossings: self.entry_count + self.exit_count,
            unique_tracks: self.crossed_ids.len() as u64,
        }
    }

    /// Ids with position history, i.e. present in the last update.
    pub fn tracked_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.history.keys().copied()
    }
}
