//! Trait for per-frame detection inputs.

use crate::integration::DetectionBuilder;
use crate::tracker::Detection;

/// A stream of per-frame detections, in frame order.
///
/// Implement this for a live detector, a file reader or anything else that
/// produces boxes. Returning `Ok(None)` ends the stream.
///
/// # Example
///
/// ```ignore
/// use bytetrack_counter::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Vec<Detection>>, Self::Error> {
///         // Run inference on the next frame
///         Ok(Some(vec![]))
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Detections for the next frame, or `None` once the input is exhausted.
    fn next_frame(&mut self) -> Result<Option<Vec<Detection>>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

impl IntoDetections for &[Detection] {
    fn into_detections(self) -> Vec<Detection> {
        self.to_vec()
    }
}

/// Rows of `[x1, y1, x2, y2, confidence]`.
impl IntoDetections for Vec<[f32; 5]> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|[x1, y1, x2, y2, score]| {
                DetectionBuilder::new().tlbr(x1, y1, x2, y2).score(score).build()
            })
            .collect()
    }
}
