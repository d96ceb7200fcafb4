//! Per-frame detector output

use crate::{FrameShape, Keypoint};

/// Everything the landmark source hands over for one frame.
///
/// `detections` holds one keypoint list per detected subject: a single
/// body in body mode, one entry per hand in hand mode. No detections
/// means nothing was found this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    pub shape: FrameShape,
    pub detections: Vec<Vec<Keypoint>>,
}

impl LandmarkFrame {
    /// Frame where the detector found nothing
    pub fn empty(shape: FrameShape) -> Self {
        Self {
            shape,
            detections: Vec::new(),
        }
    }

    /// Single-body frame. An empty keypoint list is treated as no detection.
    pub fn body(shape: FrameShape, keypoints: Vec<Keypoint>) -> Self {
        let detections = if keypoints.is_empty() {
            Vec::new()
        } else {
            vec![keypoints]
        };
        Self { shape, detections }
    }

    /// Multi-hand frame, one keypoint list per hand
    pub fn hands(shape: FrameShape, hands: Vec<Vec<Keypoint>>) -> Self {
        Self {
            shape,
            detections: hands.into_iter().filter(|h| !h.is_empty()).collect(),
        }
    }

    /// True when no detection carries any keypoint
    pub fn is_empty(&self) -> bool {
        self.detections.iter().all(|d| d.is_empty())
    }

    /// Keypoints of the first detection (empty slice if none)
    pub fn primary(&self) -> &[Keypoint] {
        self.detections.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn detection_count(&self) -> usize {
        self.detections.len()
    }
}

/// Look up a keypoint by landmark id.
///
/// Detector output is usually dense and ordered, so the positional slot
/// is checked before falling back to a scan.
pub fn find_keypoint(keypoints: &[Keypoint], id: usize) -> Option<&Keypoint> {
    match keypoints.get(id) {
        Some(kp) if kp.id == id => Some(kp),
        _ => keypoints.iter().find(|kp| kp.id == id),
    }
}
