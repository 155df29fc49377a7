//! MOT Challenge text formats.
//!
//! Both detection and track files are comma separated with one box per line:
//! `frame,id,left,top,width,height,confidence,...`. Frames are 1-based.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Deserialize;

use crate::error::RecordError;
use crate::integration::{DetectionBuilder, DetectionSource};
use crate::tracker::{ActiveTrack, Detection};

/// Detections loaded from a MOT `det.txt` file, replayed frame by frame.
///
/// Frames between 1 and the last listed frame that have no rows are replayed
/// as empty frames.
#[derive(Debug, Clone, Default)]
pub struct MotDetections {
    frames: BTreeMap<u32, Vec<Detection>>,
    total_frames: u32,
    next: u32,
}

impl MotDetections {
    pub fn from_path(path: &Path) -> Result<Self, RecordError> {
        Self::from_reader(File::open(path)?)
    }

    /// Rows need at least the first seven columns; anything after the
    /// confidence is ignored. Blank lines and `#` comments are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RecordError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut frames: BTreeMap<u32, Vec<Detection>> = BTreeMap::new();
        for record in reader.records() {
            let record = record?;
            let (frame, det) = parse_record(&record)?;
            frames.entry(frame).or_default().push(det);
        }

        let total_frames = frames.keys().next_back().copied().unwrap_or(0);
        Ok(Self {
            frames,
            total_frames,
            next: 1,
        })
    }

    /// Replay at least `total_frames` frames, padding with empty ones.
    pub fn with_total_frames(mut self, total_frames: u32) -> Self {
        self.total_frames = self.total_frames.max(total_frames);
        self
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Detections listed for `frame` that have not been replayed yet.
    pub fn frame(&self, frame: u32) -> &[Detection] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }
}

const MOT_ROW_FIELDS: usize = 7;

/// Leading columns of a MOT detection row.
#[derive(Debug, Deserialize)]
struct MotRow {
    frame: u32,
    _id: f32,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    confidence: f32,
}

fn parse_record(record: &StringRecord) -> Result<(u32, Detection), RecordError> {
    let line = record.position().map_or(0, |pos| pos.line() as usize);
    let malformed = |reason: String| RecordError::Malformed { line, reason };

    let head: StringRecord = record.iter().take(MOT_ROW_FIELDS).collect();
    let row: MotRow = head
        .deserialize(None)
        .map_err(|err| malformed(err.to_string()))?;
    if row.frame == 0 {
        return Err(malformed("frame numbers start at 1".to_string()));
    }

    let det = DetectionBuilder::new()
        .tlwh(row.left, row.top, row.width, row.height)
        .score(row.confidence)
        .build();
    Ok((row.frame, det))
}

impl DetectionSource for MotDetections {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>, Self::Error> {
        if self.next > self.total_frames {
            return Ok(None);
        }
        let frame = self.next;
        self.next += 1;
        Ok(Some(self.frames.remove(&frame).unwrap_or_default()))
    }
}

/// Writes tracker output as MOT track records:
/// `frame,track_id,left,top,width,height,confidence,-1,-1,-1`.
pub struct MotWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl MotWriter<File> {
    pub fn create(path: &Path) -> Result<Self, RecordError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> MotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(false).from_writer(writer),
        }
    }

    pub fn write_frame(&mut self, frame: u32, tracks: &[ActiveTrack]) -> Result<(), RecordError> {
        for track in tracks {
            let [left, top, width, height] = track.rect.to_tlwh();
            self.writer.write_record([
                frame.to_string(),
                track.track_id.to_string(),
                format!("{left:.2}"),
                format!("{top:.2}"),
                format!("{width:.2}"),
                format!("{height:.2}"),
                format!("{:.4}", track.score),
                "-1".to_string(),
                "-1".to_string(),
                "-1".to_string(),
            ])?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W, RecordError> {
        self.writer
            .into_inner()
            .map_err(|err| RecordError::Io(err.into_error()))
    }
}
