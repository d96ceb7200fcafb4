//! Parameter mapper - from observations to addressed parameters
//!
//! Two steps per frame: `raw_values` measures every channel that has valid
//! input (geometry happens here), and `assemble` turns the smoothed vector
//! into the outbound set according to the emission mode.

use posc_core::{
    hand_channel, BodyChannel, BodyPart, ChannelSource, HAND_LANDMARK_COUNT, LEFT_HIP,
    LEFT_SHOULDER, RIGHT_HIP, RIGHT_SHOULDER,
};
use posc_geometry::{angle, body_area};

use crate::{BodyObservation, EmissionMode, HandObservation, Observation, SchemaMode};

/// One addressed outbound parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub address: String,
    pub values: Vec<f32>,
}

impl Parameter {
    pub fn new(address: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            address: address.into(),
            values,
        }
    }
}

/// Everything a frame would send, before throttling
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    pub parameters: Vec<Parameter>,
    /// Anything usable was detected this frame
    pub detected: bool,
    /// Body parts that passed gating
    pub visible_parts: Vec<BodyPart>,
    /// Hands accepted this frame
    pub hands: usize,
}

impl ParameterSet {
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn get(&self, address: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.address == address)
    }

    pub fn addresses(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.address.as_str()).collect()
    }

    /// Flat list of every value, in address order
    pub fn values(&self) -> Vec<f32> {
        self.parameters.iter().flat_map(|p| p.values.iter().copied()).collect()
    }
}

/// Channel measurement and outbound assembly
#[derive(Debug, Clone)]
pub struct ParameterMapper {
    schema: SchemaMode,
    emission: EmissionMode,
}

impl ParameterMapper {
    pub fn new(schema: SchemaMode, emission: EmissionMode) -> Self {
        Self { schema, emission }
    }

    pub fn schema(&self) -> SchemaMode {
        self.schema
    }

    pub fn emission(&self) -> EmissionMode {
        self.emission
    }

    /// Channel count this frame if the schema lets it vary, zero when no
    /// hand was accepted. Fixed schemas return None.
    pub fn active_channels(&self, observation: &Observation) -> Option<usize> {
        match observation {
            Observation::Hands(hands) => Some(hands.len() * HAND_LANDMARK_COUNT),
            Observation::Body(_) => None,
        }
    }

    /// Raw value per channel; None where the inputs were not valid.
    /// Invalid channels count as zero for output but are never smoothed.
    pub fn raw_values(&self, observation: &Observation) -> Vec<Option<f32>> {
        match observation {
            Observation::Body(body) => body_raw_values(body),
            Observation::Hands(hands) => hand_raw_values(hands),
        }
    }

    /// Build the outbound set from the smoothed vector.
    ///
    /// `known_channels` is the channel count remembered across frames; it
    /// sizes the all-zero output of hand mode when no hand is visible.
    pub fn assemble(
        &self,
        observation: &Observation,
        smoothed: &[f32],
        known_channels: usize,
    ) -> ParameterSet {
        let detected = observation.detected();
        let parameters = match (observation, self.emission) {
            (Observation::Body(_), EmissionMode::AlwaysFixed) if !detected => {
                positional(&[0.0; BodyChannel::COUNT])
            }
            (Observation::Body(_), EmissionMode::AlwaysFixed) => positional(smoothed),
            (Observation::Body(body), EmissionMode::GatedNamed) => body
                .valid_parts()
                .into_iter()
                .filter(|part| body.has_all(&part.required_landmarks()))
                .map(|part| {
                    let values = part
                        .channels()
                        .iter()
                        .map(|ch| smoothed.get(ch.id().index()).copied().unwrap_or(0.0))
                        .collect();
                    Parameter::new(part.address(), values)
                })
                .collect(),
            (Observation::Hands(_), _) if detected => positional(smoothed),
            (Observation::Hands(_), EmissionMode::AlwaysFixed) => {
                positional(&vec![0.0; known_channels])
            }
            (Observation::Hands(_), EmissionMode::GatedNamed) => Vec::new(),
        };

        ParameterSet {
            parameters,
            detected,
            visible_parts: observation.valid_parts(),
            hands: observation.hand_count(),
        }
    }
}

/// `/0`, `/1`, ... each carrying one value
fn positional(values: &[f32]) -> Vec<Parameter> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| Parameter::new(format!("/{}", i), vec![v]))
        .collect()
}

fn body_raw_values(body: &BodyObservation) -> Vec<Option<f32>> {
    BodyChannel::all()
        .iter()
        .map(|ch| {
            let source = ch.source();
            if !body.has_all(&source.landmarks()) {
                return None;
            }
            let at = |id: usize| body.keypoint(id).map(|kp| kp.position());

            let value = match source {
                ChannelSource::X(id) => at(id)?.x,
                ChannelSource::Y(id) => at(id)?.y,
                ChannelSource::BodyArea => body_area(
                    at(LEFT_SHOULDER)?,
                    at(RIGHT_SHOULDER)?,
                    at(LEFT_HIP)?,
                    at(RIGHT_HIP)?,
                    body.shape,
                ) as f32,
                ChannelSource::Angle {
                    first,
                    vertex,
                    last,
                } => angle(at(first)?, at(vertex)?, at(last)?),
            };
            Some(value)
        })
        .collect()
}

fn hand_raw_values(hands: &[HandObservation]) -> Vec<Option<f32>> {
    let mut values = Vec::with_capacity(hands.len() * HAND_LANDMARK_COUNT);
    for (h, hand) in hands.iter().enumerate() {
        for kp in &hand.landmarks {
            debug_assert_eq!(hand_channel(h, kp.id).index(), values.len());
            values.push(Some(kp.x));
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameSampler;
    use posc_core::{FrameShape, Keypoint, LandmarkFrame, BODY_LANDMARK_COUNT};

    fn shape() -> FrameShape {
        FrameShape::new(640, 480).unwrap()
    }

    /// Arms straight out to the sides, legs straight down
    fn t_pose() -> Vec<Keypoint> {
        let mut kps: Vec<Keypoint> = (0..BODY_LANDMARK_COUNT)
            .map(|i| Keypoint::new(i, 320.0, 240.0))
            .collect();
        let mut set = |id: usize, x: f32, y: f32| kps[id] = Keypoint::new(id, x, y);
        set(0, 320.0, 80.0);
        set(11, 384.0, 140.0);
        set(12, 256.0, 140.0);
        set(13, 448.0, 140.0);
        set(14, 192.0, 140.0);
        set(15, 512.0, 140.0);
        set(16, 128.0, 140.0);
        set(23, 352.0, 332.0);
        set(24, 288.0, 332.0);
        set(25, 352.0, 400.0);
        set(26, 288.0, 400.0);
        set(27, 352.0, 460.0);
        set(28, 288.0, 460.0);
        kps
    }

    fn observe(schema: SchemaMode, frame: &LandmarkFrame) -> Observation {
        FrameSampler::new(schema, 2, None).sample(frame)
    }

    #[test]
    fn test_body_raw_values() {
        let mapper = ParameterMapper::new(SchemaMode::FixedBody, EmissionMode::AlwaysFixed);
        let obs = observe(SchemaMode::FixedBody, &LandmarkFrame::body(shape(), t_pose()));
        let raw = mapper.raw_values(&obs);

        assert_eq!(raw.len(), BodyChannel::COUNT);
        assert_eq!(raw[BodyChannel::NoseX.id().index()], Some(320.0));
        assert_eq!(raw[BodyChannel::NoseY.id().index()], Some(80.0));
        // shoulders 2.0, hips 1.0, torso 4.0 => 6
        assert_eq!(raw[BodyChannel::BodyArea.id().index()], Some(6.0));

        for ch in [BodyChannel::LeftElbow, BodyChannel::RightElbow, BodyChannel::LeftShoulder] {
            let v = raw[ch.id().index()].unwrap();
            assert!((v - 180.0).abs() < 1e-3, "{:?} = {}", ch, v);
        }
        let hip = raw[BodyChannel::LeftHip.id().index()].unwrap();
        assert!((hip - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_raw_missing_inputs_are_none() {
        let mapper = ParameterMapper::new(SchemaMode::FixedBody, EmissionMode::AlwaysFixed);
        let mut kps = t_pose();
        kps[16].x = 0.0;
        let obs = observe(SchemaMode::FixedBody, &LandmarkFrame::body(shape(), kps));
        let raw = mapper.raw_values(&obs);

        assert_eq!(raw[BodyChannel::RightElbow.id().index()], None);
        assert!(raw[BodyChannel::RightShoulder.id().index()].is_some());
    }

    #[test]
    fn test_always_fixed_empty_frame_is_zero_vector() {
        let mapper = ParameterMapper::new(SchemaMode::FixedBody, EmissionMode::AlwaysFixed);
        let obs = observe(SchemaMode::FixedBody, &LandmarkFrame::empty(shape()));
        let smoothed = vec![5.0; BodyChannel::COUNT];
        let set = mapper.assemble(&obs, &smoothed, BodyChannel::COUNT);

        assert!(!set.detected);
        assert_eq!(set.len(), 11);
        assert_eq!(set.addresses()[0], "/0");
        assert_eq!(set.addresses()[10], "/10");
        assert!(set.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_gated_named_only_valid_parts() {
        let mapper = ParameterMapper::new(SchemaMode::FixedBody, EmissionMode::GatedNamed);
        let mut kps = t_pose();
        kps[14].y = 0.0;
        let obs = observe(SchemaMode::FixedBody, &LandmarkFrame::body(shape(), kps));
        let smoothed: Vec<f32> = (0..BodyChannel::COUNT).map(|i| i as f32).collect();
        let set = mapper.assemble(&obs, &smoothed, BodyChannel::COUNT);

        assert_eq!(set.addresses(), vec!["/nose", "/left_arm", "/left_leg", "/right_leg"]);
        assert_eq!(set.get("/left_arm").unwrap().values, vec![5.0, 6.0]);
        assert_eq!(set.get("/nose").unwrap().values, vec![0.0, 1.0]);
        assert!(set.get("/right_arm").is_none());
    }

    #[test]
    fn test_gated_named_needs_every_channel_input() {
        // Left shoulder angle is measured against the right shoulder
        let mapper = ParameterMapper::new(SchemaMode::FixedBody, EmissionMode::GatedNamed);
        let mut kps = t_pose();
        kps[RIGHT_SHOULDER].x = 0.0;
        let obs = observe(SchemaMode::FixedBody, &LandmarkFrame::body(shape(), kps));
        assert!(obs.valid_parts().contains(&BodyPart::LeftArm));

        let smoothed = vec![0.0; BodyChannel::COUNT];
        let set = mapper.assemble(&obs, &smoothed, BodyChannel::COUNT);
        assert!(set.get("/left_arm").is_none());
        assert!(set.get("/right_arm").is_none());
        assert_eq!(set.addresses(), vec!["/nose", "/left_leg", "/right_leg"]);
    }

    #[test]
    fn test_gated_named_empty_frame_sends_nothing() {
        let mapper = ParameterMapper::new(SchemaMode::FixedBody, EmissionMode::GatedNamed);
        let obs = observe(SchemaMode::FixedBody, &LandmarkFrame::empty(shape()));
        let set = mapper.assemble(&obs, &[0.0; BodyChannel::COUNT], BodyChannel::COUNT);
        assert!(set.is_empty());
    }

    #[test]
    fn test_hand_channels() {
        let mapper = ParameterMapper::new(SchemaMode::VariableHand, EmissionMode::AlwaysFixed);
        let hand = |x0: f32| -> Vec<Keypoint> {
            (0..HAND_LANDMARK_COUNT)
                .map(|i| Keypoint::new(i, x0 + i as f32, 50.0))
                .collect()
        };
        let frame = LandmarkFrame::hands(shape(), vec![hand(100.0), hand(400.0)]);
        let obs = observe(SchemaMode::VariableHand, &frame);

        assert_eq!(mapper.active_channels(&obs), Some(42));
        let raw = mapper.raw_values(&obs);
        assert_eq!(raw.len(), 42);
        assert_eq!(raw[0], Some(100.0));
        assert_eq!(raw[21], Some(400.0));
        assert_eq!(raw[41], Some(420.0));
    }

    #[test]
    fn test_no_hands_output() {
        let obs = observe(SchemaMode::VariableHand, &LandmarkFrame::empty(shape()));

        let fixed = ParameterMapper::new(SchemaMode::VariableHand, EmissionMode::AlwaysFixed);
        assert_eq!(fixed.active_channels(&obs), Some(0));
        let set = fixed.assemble(&obs, &[], 21);
        assert_eq!(set.len(), 21);
        assert!(set.values().iter().all(|&v| v == 0.0));

        let gated = ParameterMapper::new(SchemaMode::VariableHand, EmissionMode::GatedNamed);
        assert!(gated.assemble(&obs, &[], 21).is_empty());
    }
}
