//! Validated configuration for the tracker and the counting line.
//!
//! Every structure here is checked once by `validate()` and then handed to
//! the engine by value; nothing reads configuration after startup.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::counter::Direction;
use crate::error::ConfigError;

/// Configuration for the BYTETracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Detections at or above this confidence take part in the first
    /// association and may start new tracks.
    pub track_thresh: f32,
    /// Lower admission bound for the second association.
    pub low_thresh: f32,
    /// Minimum IoU for a track/detection pair to be accepted.
    pub match_thresh: f32,
    /// Consecutive unmatched frames before a track is removed. A track that
    /// has missed `track_buffer - 1` frames can still be rematched on the
    /// next one; after `track_buffer` misses it is gone.
    pub track_buffer: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            track_thresh: 0.5,
            low_thresh: 0.1,
            match_thresh: 0.8,
            track_buffer: 30,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("track_thresh", self.track_thresh),
            ("low_thresh", self.low_thresh),
            ("match_thresh", self.match_thresh),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, "must be finite"));
            }
        }
        if !(0.0..=1.0).contains(&self.track_thresh) {
            return Err(ConfigError::invalid("track_thresh", "must be in [0, 1]"));
        }
        if self.low_thresh < 0.0 {
            return Err(ConfigError::invalid("low_thresh", "must be >= 0"));
        }
        if self.low_thresh > self.track_thresh {
            return Err(ConfigError::invalid(
                "low_thresh",
                format!(
                    "must not exceed track_thresh ({} > {})",
                    self.low_thresh, self.track_thresh
                ),
            ));
        }
        if self.match_thresh <= 0.0 || self.match_thresh > 1.0 {
            return Err(ConfigError::invalid("match_thresh", "must be in (0, 1]"));
        }
        if self.track_buffer == 0 {
            return Err(ConfigError::invalid("track_buffer", "must be > 0"));
        }
        Ok(())
    }
}

/// A single counting line and the directions that count as entry and exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub entry: Direction,
    pub exit: Direction,
}

impl LineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.start.iter().chain(self.end.iter()).all(|v| v.is_finite()) {
            return Err(ConfigError::invalid("line", "endpoints must be finite"));
        }
        if self.start == self.end {
            return Err(ConfigError::invalid("line", "endpoints must differ"));
        }
        if self.entry == self.exit {
            return Err(ConfigError::invalid(
                "exit",
                format!("must differ from entry direction `{}`", self.entry),
            ));
        }
        Ok(())
    }
}

/// Everything a run needs: tracker parameters plus a counting line per
/// sequence name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub lines: BTreeMap<String, LineConfig>,
}

impl RunConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: RunConfig = serde_json::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        for line in self.lines.values() {
            line.validate()?;
        }
        Ok(())
    }

    /// Counting line configured for `sequence`.
    pub fn line_for(&self, sequence: &str) -> Result<&LineConfig, ConfigError> {
        self.lines
            .get(sequence)
            .ok_or_else(|| ConfigError::UnknownSequence(sequence.to_string()))
    }
}
