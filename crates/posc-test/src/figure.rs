//! Synthetic landmark generators
//!
//! A standing figure in the 33-point body layout and open hands in the
//! 21-point layout, with seeded jitter, per-keypoint occlusion and whole
//! frame dropouts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use posc_core::{
    FrameShape, Keypoint, LandmarkFrame, PoscResult, BODY_LANDMARK_COUNT, HAND_LANDMARK_COUNT,
};
use posc_runtime::LandmarkSource;

/// Standing figure, arms slightly away from the body. Fractions of the
/// frame width and height, indexed by landmark id.
const STANDING_POSE: [(f32, f32); BODY_LANDMARK_COUNT] = [
    (0.500, 0.167), // nose
    (0.512, 0.150),
    (0.520, 0.150),
    (0.528, 0.150),
    (0.488, 0.150),
    (0.480, 0.150),
    (0.472, 0.150),
    (0.540, 0.160),
    (0.460, 0.160),
    (0.512, 0.190),
    (0.488, 0.190),
    (0.578, 0.292), // left shoulder
    (0.422, 0.292), // right shoulder
    (0.609, 0.458), // left elbow
    (0.391, 0.458),
    (0.625, 0.625), // left wrist
    (0.375, 0.625),
    (0.630, 0.650),
    (0.370, 0.650),
    (0.628, 0.655),
    (0.372, 0.655),
    (0.620, 0.645),
    (0.380, 0.645),
    (0.547, 0.625), // left hip
    (0.453, 0.625), // right hip
    (0.555, 0.812), // left knee
    (0.445, 0.812),
    (0.563, 0.958), // left ankle
    (0.437, 0.958),
    (0.570, 0.970),
    (0.430, 0.970),
    (0.580, 0.985),
    (0.420, 0.985),
];

/// Noise applied to generated frames
#[derive(Clone, Debug, PartialEq)]
pub struct FigureConfig {
    /// Uniform jitter in pixels, applied per coordinate
    pub jitter: f32,
    /// Probability that one keypoint is reported at (0, 0)
    pub occlusion: f64,
    /// Probability that a whole frame has no detection
    pub dropout: f64,
}

impl FigureConfig {
    /// Perfectly still, always detected
    pub fn still() -> Self {
        FigureConfig {
            jitter: 0.0,
            occlusion: 0.0,
            dropout: 0.0,
        }
    }

    /// Detector noise only
    pub fn noisy() -> Self {
        FigureConfig {
            jitter: 3.0,
            occlusion: 0.0,
            dropout: 0.0,
        }
    }

    /// Noise, occlusions and lost frames
    pub fn flaky() -> Self {
        FigureConfig {
            jitter: 3.0,
            occlusion: 0.05,
            dropout: 0.1,
        }
    }
}

/// The undisturbed standing pose scaled to `shape`
pub fn standing_pose(shape: FrameShape) -> Vec<Keypoint> {
    let (w, h) = (shape.width() as f32, shape.height() as f32);
    STANDING_POSE
        .iter()
        .enumerate()
        .map(|(id, &(fx, fy))| Keypoint::new(id, fx * w, fy * h))
        .collect()
}

/// An open hand whose wrist sits at (`wrist_x`, `wrist_y`).
/// Fingers fan upwards; landmark x grows with id.
pub fn open_hand(wrist_x: f32, wrist_y: f32) -> Vec<Keypoint> {
    (0..HAND_LANDMARK_COUNT)
        .map(|id| {
            let finger = id.saturating_sub(1) / 4;
            let joint = if id == 0 { 0 } else { (id - 1) % 4 + 1 };
            Keypoint::new(
                id,
                wrist_x + id as f32 * 2.0,
                wrist_y - 12.0 * joint as f32 - finger as f32,
            )
        })
        .collect()
}

/// Seeded generator of body frames
pub struct SyntheticFigure {
    shape: FrameShape,
    config: FigureConfig,
    rng: StdRng,
    /// Frames left before the source ends (None = endless)
    remaining: Option<u64>,
    produced: u64,
}

impl SyntheticFigure {
    pub fn new(shape: FrameShape, config: FigureConfig, seed: u64) -> Self {
        SyntheticFigure {
            shape,
            config,
            rng: StdRng::seed_from_u64(seed),
            remaining: None,
            produced: 0,
        }
    }

    /// End the stream after `frames` frames
    pub fn limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Generate the next frame
    pub fn generate(&mut self) -> LandmarkFrame {
        self.produced += 1;

        if self.config.dropout > 0.0 && self.rng.gen_bool(self.config.dropout) {
            return LandmarkFrame::empty(self.shape);
        }

        let keypoints = standing_pose(self.shape)
            .into_iter()
            .map(|kp| self.disturb(kp))
            .collect();
        LandmarkFrame::body(self.shape, keypoints)
    }

    fn disturb(&mut self, mut kp: Keypoint) -> Keypoint {
        if self.config.occlusion > 0.0 && self.rng.gen_bool(self.config.occlusion) {
            kp.x = 0.0;
            kp.y = 0.0;
            return kp;
        }
        if self.config.jitter > 0.0 {
            let j = self.config.jitter;
            // Stay strictly inside the frame so jitter never reads as occlusion
            kp.x = (kp.x + self.rng.gen_range(-j..=j)).max(1.0);
            kp.y = (kp.y + self.rng.gen_range(-j..=j)).max(1.0);
        }
        kp
    }
}

impl LandmarkSource for SyntheticFigure {
    fn next_frame(&mut self) -> PoscResult<Option<LandmarkFrame>> {
        match self.remaining {
            Some(0) => return Ok(None),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        Ok(Some(self.generate()))
    }
}

/// Hand frames following a fixed script of hand counts
pub struct HandScript {
    shape: FrameShape,
    counts: Vec<usize>,
    next: usize,
}

impl HandScript {
    /// One frame per entry in `counts`, each with that many hands
    pub fn new(shape: FrameShape, counts: Vec<usize>) -> Self {
        HandScript {
            shape,
            counts,
            next: 0,
        }
    }

    /// The frame for a given hand count. Hands are spaced across the
    /// frame so their x coordinates never overlap.
    pub fn frame(shape: FrameShape, hands: usize) -> LandmarkFrame {
        let spacing = shape.width() as f32 / (hands as f32 + 1.0);
        let wrist_y = shape.height() as f32 * 0.8;
        LandmarkFrame::hands(
            shape,
            (0..hands)
                .map(|h| open_hand(spacing * (h as f32 + 1.0), wrist_y))
                .collect(),
        )
    }
}

impl LandmarkSource for HandScript {
    fn next_frame(&mut self) -> PoscResult<Option<LandmarkFrame>> {
        let Some(&hands) = self.counts.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        Ok(Some(Self::frame(self.shape, hands)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posc_core::{BodyPart, LEFT_SHOULDER, NOSE};

    fn shape() -> FrameShape {
        FrameShape::new(640, 480).unwrap()
    }

    #[test]
    fn test_standing_pose_scaled() {
        let pose = standing_pose(shape());
        assert_eq!(pose.len(), BODY_LANDMARK_COUNT);
        assert!((pose[NOSE].x - 320.0).abs() < 1.0);
        assert!(pose[LEFT_SHOULDER].x > pose[NOSE].x);
        assert!(pose.iter().all(|kp| kp.is_detected()));
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = SyntheticFigure::new(shape(), FigureConfig::flaky(), 7);
        let mut b = SyntheticFigure::new(shape(), FigureConfig::flaky(), 7);
        for _ in 0..20 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_jitter_stays_detected() {
        let mut figure = SyntheticFigure::new(shape(), FigureConfig::noisy(), 1);
        for _ in 0..50 {
            let frame = figure.generate();
            assert!(frame.primary().iter().all(|kp| kp.is_detected()));
        }
    }

    #[test]
    fn test_limit_ends_stream() {
        let mut figure = SyntheticFigure::new(shape(), FigureConfig::still(), 0).limit(3);
        let mut count = 0;
        while figure.next_frame().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
        assert_eq!(figure.produced(), 3);
    }

    #[test]
    fn test_open_hand_layout() {
        let hand = open_hand(100.0, 400.0);
        assert_eq!(hand.len(), HAND_LANDMARK_COUNT);
        assert!(hand.iter().all(|kp| kp.is_detected()));
        assert!(hand.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn test_hand_script() {
        let mut script = HandScript::new(shape(), vec![0, 2, 1]);
        let counts: Vec<usize> = std::iter::from_fn(|| script.next_frame().unwrap())
            .map(|f| f.detection_count())
            .collect();
        assert_eq!(counts, vec![0, 2, 1]);
    }

    #[test]
    fn test_body_parts_present_in_still_pose() {
        let frame = SyntheticFigure::new(shape(), FigureConfig::still(), 0).generate();
        for part in BodyPart::all() {
            for &id in part.landmarks() {
                assert!(frame.primary()[id].is_detected());
            }
        }
    }
}
