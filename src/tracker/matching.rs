//! Detection input and IoU-based assignment between tracks and detections.

use ndarray::Array2;
use tracing::warn;

use crate::error::DetectionError;
use crate::tracker::rect::{Rect, iou_batch};

/// Cost given to padding cells of the square matrix handed to the solver.
const PADDING_COST: f64 = 1e6;

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Bounding box (stored as TLWH, constructed from TLBR)
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self { bbox, score }
    }

    /// Check that the box is finite and non-inverted and the score is a
    /// probability.
    pub fn validate(&self) -> Result<(), DetectionError> {
        if !self.bbox.is_finite() || !self.score.is_finite() {
            return Err(DetectionError::NonFinite);
        }
        if self.bbox.width <= 0.0 || self.bbox.height <= 0.0 {
            return Err(DetectionError::Inverted);
        }
        if !(0.0..=1.0).contains(&self.score) {
            return Err(DetectionError::ConfidenceOutOfRange(self.score));
        }
        Ok(())
    }
}

/// Compute IoU distance matrix between tracks and detections.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    iou_batch(track_boxes, det_boxes).mapv(|iou| 1.0 - iou)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    fn all_unmatched(num_rows: usize, num_cols: usize) -> Self {
        Self {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        }
    }
}

/// Minimum-total-cost assignment of rows (tracks) to columns (detections).
///
/// Pairs whose cost exceeds `max_cost` are dropped and reported as unmatched
/// on both sides.
pub fn linear_assignment(cost_matrix: &Array2<f32>, max_cost: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::all_unmatched(num_rows, num_cols);
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), PADDING_COST);

    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = cost_matrix[[i, j]] as f64;
        }
    }

    let row_to_col = match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => row_to_col,
        Err(err) => {
            warn!(?err, num_rows, num_cols, "assignment solver failed, leaving stage unmatched");
            return AssignmentResult::all_unmatched(num_rows, num_cols);
        }
    };

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
        if col_idx < num_cols && cost_matrix[[row_idx, col_idx]] <= max_cost {
            matches.push((row_idx, col_idx));
            unmatched_detections_mask[col_idx] = false;
        } else {
            unmatched_tracks.push(row_idx);
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Match track boxes against detection boxes, accepting pairs whose IoU is
/// at least `match_thresh`.
pub fn associate(track_boxes: &[Rect], det_boxes: &[Rect], match_thresh: f32) -> AssignmentResult {
    if track_boxes.is_empty() || det_boxes.is_empty() {
        return AssignmentResult::all_unmatched(track_boxes.len(), det_boxes.len());
    }
    let dists = iou_distance(track_boxes, det_boxes);
    linear_assignment(&dists, 1.0 - match_thresh)
}
