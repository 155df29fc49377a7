//! Builder for creating Detection objects from various box formats.

use crate::error::DetectionError;
use crate::tracker::{Detection, Rect};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Rect,
    score: f32,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::from_xywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height), as used
    /// by MOT text files.
    pub fn tlwh(mut self, left: f32, top: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(left, top, w, h);
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection` without checking it.
    pub fn build(self) -> Detection {
        Detection::from_rect(self.bbox, self.score)
    }

    /// Build the final `Detection`, rejecting malformed boxes and scores.
    pub fn try_build(self) -> Result<Detection, DetectionError> {
        let det = self.build();
        det.validate()?;
        Ok(det)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .score(0.95)
            .build();

        assert_eq!(det.score, 0.95);
        assert_eq!(det.bbox.to_tlwh(), [10.0, 20.0, 40.0, 60.0]);
    }

    #[test]
    fn test_formats_agree() {
        let a = DetectionBuilder::new().tlbr(10.0, 20.0, 50.0, 80.0).build();
        let b = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build();
        let c = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build();
        assert_eq!(a.bbox, b.bbox);
        assert_eq!(a.bbox, c.bbox);
    }

    #[test]
    fn test_try_build_rejects_inverted_box() {
        let result = DetectionBuilder::new()
            .tlbr(50.0, 20.0, 10.0, 80.0)
            .score(0.5)
            .try_build();
        assert_eq!(result, Err(DetectionError::Inverted));
    }
}
