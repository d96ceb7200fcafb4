//! Frame sampler - landmark validity gating
//!
//! Decides, per body part (or per hand), whether every required landmark
//! is present and detected this frame. No smoothing, no emission policy.

use posc_core::{
    find_keypoint, BodyPart, FrameShape, Keypoint, LandmarkFrame, BODY_LANDMARK_COUNT,
    HAND_LANDMARK_COUNT,
};

use crate::SchemaMode;

/// One body part's gating result
#[derive(Debug, Clone, PartialEq)]
pub struct PartObservation {
    pub part: BodyPart,
    /// All required landmarks present with positive coordinates
    pub valid: bool,
    /// The part's landmarks that were usable this frame
    pub keypoints: Vec<Keypoint>,
}

/// Body-mode sample of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct BodyObservation {
    pub shape: FrameShape,
    /// Indexed by `BodyPart::index()`
    pub parts: Vec<PartObservation>,
    /// Usable keypoints indexed by landmark id
    keypoints: Vec<Option<Keypoint>>,
}

impl BodyObservation {
    /// True when at least one keypoint was detected
    pub fn detected(&self) -> bool {
        self.keypoints.iter().any(Option::is_some)
    }

    pub fn part(&self, part: BodyPart) -> &PartObservation {
        &self.parts[part.index()]
    }

    pub fn is_valid(&self, part: BodyPart) -> bool {
        self.part(part).valid
    }

    /// Parts valid this frame, in emission order
    pub fn valid_parts(&self) -> Vec<BodyPart> {
        self.parts.iter().filter(|p| p.valid).map(|p| p.part).collect()
    }

    /// A usable keypoint by landmark id
    pub fn keypoint(&self, id: usize) -> Option<&Keypoint> {
        self.keypoints.get(id).and_then(Option::as_ref)
    }

    /// True if every listed landmark is usable
    pub fn has_all(&self, ids: &[usize]) -> bool {
        ids.iter().all(|&id| self.keypoint(id).is_some())
    }
}

/// One accepted hand: all 21 landmarks, ordered by id
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    pub landmarks: Vec<Keypoint>,
}

/// Result of sampling a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Body(BodyObservation),
    Hands(Vec<HandObservation>),
}

impl Observation {
    /// Whether anything usable was found
    pub fn detected(&self) -> bool {
        match self {
            Observation::Body(body) => body.detected(),
            Observation::Hands(hands) => !hands.is_empty(),
        }
    }

    /// Body parts valid this frame (empty in hand mode)
    pub fn valid_parts(&self) -> Vec<BodyPart> {
        match self {
            Observation::Body(body) => body.valid_parts(),
            Observation::Hands(_) => Vec::new(),
        }
    }

    pub fn hand_count(&self) -> usize {
        match self {
            Observation::Body(_) => 0,
            Observation::Hands(hands) => hands.len(),
        }
    }
}

/// Landmark gating stage
#[derive(Debug, Clone)]
pub struct FrameSampler {
    schema: SchemaMode,
    max_hands: usize,
    min_visibility: Option<f32>,
}

impl FrameSampler {
    pub fn new(schema: SchemaMode, max_hands: usize, min_visibility: Option<f32>) -> Self {
        Self {
            schema,
            max_hands,
            min_visibility,
        }
    }

    fn usable(&self, kp: &Keypoint) -> bool {
        kp.is_detected() && kp.meets_visibility(self.min_visibility)
    }

    /// Sample one frame according to the configured schema
    pub fn sample(&self, frame: &LandmarkFrame) -> Observation {
        match self.schema {
            SchemaMode::FixedBody => Observation::Body(self.sample_body(frame)),
            SchemaMode::VariableHand => Observation::Hands(self.sample_hands(frame)),
        }
    }

    /// Gate the first detection against the body parts
    pub fn sample_body(&self, frame: &LandmarkFrame) -> BodyObservation {
        let raw = frame.primary();

        let keypoints: Vec<Option<Keypoint>> = (0..BODY_LANDMARK_COUNT)
            .map(|id| find_keypoint(raw, id).filter(|kp| self.usable(kp)).copied())
            .collect();

        let parts = BodyPart::all()
            .iter()
            .map(|&part| {
                let found: Vec<Keypoint> = part
                    .landmarks()
                    .iter()
                    .filter_map(|&id| keypoints[id])
                    .collect();
                PartObservation {
                    part,
                    valid: found.len() == part.landmarks().len(),
                    keypoints: found,
                }
            })
            .collect();

        BodyObservation {
            shape: frame.shape,
            parts,
            keypoints,
        }
    }

    /// Accept up to `max_hands` hands whose 21 landmarks are all usable
    pub fn sample_hands(&self, frame: &LandmarkFrame) -> Vec<HandObservation> {
        frame
            .detections
            .iter()
            .filter_map(|hand| {
                let landmarks: Option<Vec<Keypoint>> = (0..HAND_LANDMARK_COUNT)
                    .map(|id| find_keypoint(hand, id).filter(|kp| self.usable(kp)).copied())
                    .collect();
                landmarks.map(|landmarks| HandObservation { landmarks })
            })
            .take(self.max_hands)
            .collect()
    }
}
