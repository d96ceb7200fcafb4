//! End-to-end scenarios
//!
//! Each scenario drives a full `Pipeline` into a recording sink and checks
//! what reached the wire:
//! - Gated named emission with one arm occluded
//! - All-zero output for an empty frame
//! - Throttling over a steady stream
//! - Hand mode seeding when a hand appears
//! - Smoother convergence on a held pose
//! - Long noisy streams staying well formed

use posc_core::{
    BodyChannel, ChannelId, FrameShape, LandmarkFrame, PoscResult, HAND_LANDMARK_COUNT,
    RIGHT_ELBOW,
};
use posc_runtime::{
    EmissionMode, LandmarkSource, Pipeline, PipelineConfig, PipelineStats, SchemaMode,
};
use posc_transport::MemorySink;

use crate::figure::{standing_pose, FigureConfig, HandScript, SyntheticFigure};

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of one scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub frames: u64,
    pub failures: Vec<String>,
}

impl ScenarioResult {
    fn new(name: &'static str) -> Self {
        ScenarioResult {
            name,
            frames: 0,
            failures: Vec::new(),
        }
    }

    fn check(&mut self, ok: bool, what: impl Into<String>) {
        if !ok {
            self.failures.push(what.into());
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

fn shape() -> PoscResult<FrameShape> {
    FrameShape::new(640, 480)
}

fn pipeline(config: PipelineConfig) -> PoscResult<Pipeline<MemorySink>> {
    Pipeline::new(config, MemorySink::new())
}

// ============================================================================
// SCENARIOS
// ============================================================================

/// Left arm visible, right elbow reported with y = 0: only the left arm
/// group goes out.
pub fn scenario_gated_left_arm() -> PoscResult<ScenarioResult> {
    let mut result = ScenarioResult::new("gated_left_arm");
    let mut pipeline = pipeline(PipelineConfig {
        emission: EmissionMode::GatedNamed,
        throttle_interval: 1,
        ..PipelineConfig::default()
    })?;

    let mut keypoints = standing_pose(shape()?);
    keypoints[RIGHT_ELBOW].y = 0.0;
    let report = pipeline.process_frame(&LandmarkFrame::body(shape()?, keypoints));
    result.frames = 1;

    result.check(report.parameters.get("/left_arm").is_some(), "left_arm missing from set");
    result.check(report.parameters.get("/right_arm").is_none(), "right_arm in set");
    let sink = pipeline.sink();
    result.check(sink.messages_to("/left_arm").len() == 1, "left_arm not sent once");
    result.check(sink.messages_to("/right_arm").is_empty(), "right_arm was sent");
    result.check(
        sink.messages_to("/left_arm")
            .first()
            .map_or(false, |m| m.args.len() == 2),
        "left_arm should carry shoulder and elbow angles",
    );
    Ok(result)
}

/// An empty keypoint list in always-fixed mode still sends 11 zeros
pub fn scenario_empty_frame_zeros() -> PoscResult<ScenarioResult> {
    let mut result = ScenarioResult::new("empty_frame_zeros");
    let mut pipeline = pipeline(PipelineConfig {
        throttle_interval: 1,
        ..PipelineConfig::default()
    })?;

    let report = pipeline.process_frame(&LandmarkFrame::body(shape()?, Vec::new()));
    result.frames = 1;

    let values = report.parameters.values();
    result.check(values.len() == BodyChannel::COUNT, format!("{} values", values.len()));
    result.check(values.iter().all(|v| *v == 0.0), "non-zero value in empty frame");

    let sent: Vec<f32> = pipeline
        .sink()
        .messages()
        .iter()
        .flat_map(|m| m.values())
        .collect();
    result.check(sent == vec![0.0; BodyChannel::COUNT], format!("sent {:?}", sent));
    Ok(result)
}

/// Interval 2 over 10 valid frames dispatches on frames 0, 2, 4, 6, 8
pub fn scenario_throttle() -> PoscResult<ScenarioResult> {
    let mut result = ScenarioResult::new("throttle");
    let mut pipeline = pipeline(PipelineConfig {
        throttle_interval: 2,
        ..PipelineConfig::default()
    })?;
    let mut figure = SyntheticFigure::new(shape()?, FigureConfig::noisy(), 11).limit(10);

    let mut dispatched = Vec::new();
    while let Some(frame) = figure.next_frame()? {
        let report = pipeline.process_frame(&frame);
        if report.outcome.is_dispatched() {
            dispatched.push(report.frame);
        }
    }
    result.frames = pipeline.stats().frames;

    result.check(dispatched == vec![0, 2, 4, 6, 8], format!("dispatched on {:?}", dispatched));
    result.check(
        pipeline.sink().packets().len() == 5 * BodyChannel::COUNT,
        format!("{} packets", pipeline.sink().packets().len()),
    );
    Ok(result)
}

/// Going from no hands to one hand seeds all 21 channels with their raw
/// values, not with zero
pub fn scenario_hand_seeding() -> PoscResult<ScenarioResult> {
    let mut result = ScenarioResult::new("hand_seeding");
    let mut pipeline = pipeline(PipelineConfig {
        schema: SchemaMode::VariableHand,
        throttle_interval: 1,
        ..PipelineConfig::default()
    })?;

    pipeline.process_frame(&HandScript::frame(shape()?, 0));
    let frame = HandScript::frame(shape()?, 1);
    let report = pipeline.process_frame(&frame);
    result.frames = 2;

    result.check(
        report.parameters.len() == HAND_LANDMARK_COUNT,
        format!("{} channels", report.parameters.len()),
    );
    for (id, kp) in frame.primary().iter().enumerate() {
        let smoothed = pipeline.smoother().get(ChannelId(id));
        result.check(
            smoothed == Some(kp.x),
            format!("channel {}: {:?} != {}", id, smoothed, kp.x),
        );
    }
    Ok(result)
}

/// Holding a new pose walks the nose channel monotonically onto it
pub fn scenario_smoother_convergence() -> PoscResult<ScenarioResult> {
    let mut result = ScenarioResult::new("smoother_convergence");
    let alpha = 0.5;
    let mut pipeline = pipeline(PipelineConfig {
        alpha,
        throttle_interval: 1,
        ..PipelineConfig::default()
    })?;

    let shape = shape()?;
    let mut pose = standing_pose(shape);
    pose[0].x = 100.0;
    pipeline.process_frame(&LandmarkFrame::body(shape, pose.clone()));

    let target = 300.0;
    pose[0].x = target;
    let mut previous = 100.0f32;
    for _ in 0..40 {
        let report = pipeline.process_frame(&LandmarkFrame::body(shape, pose.clone()));
        let value = report.parameters.values()[BodyChannel::NoseX.id().index()];
        result.check(value >= previous, format!("moved away: {} -> {}", previous, value));
        let expected = previous + alpha * (target - previous);
        result.check(
            (value - expected).abs() < 1e-3,
            format!("step {} -> {}, expected {}", previous, value, expected),
        );
        previous = value;
    }
    result.frames = pipeline.stats().frames;
    result.check((previous - target).abs() < 1e-3, format!("ended at {}", previous));
    Ok(result)
}

/// A long occluded, jittery stream: every value that reaches the sink is
/// finite and every angle channel is within [0, 180]
pub fn scenario_noisy_stream(seed: u64, frames: u64) -> PoscResult<ScenarioResult> {
    let mut result = ScenarioResult::new("noisy_stream");
    let mut pipeline = pipeline(PipelineConfig {
        throttle_interval: 1,
        ..PipelineConfig::default()
    })?;
    let mut figure = SyntheticFigure::new(shape()?, FigureConfig::flaky(), seed).limit(frames);

    let stats: PipelineStats = pipeline.run(&mut figure)?;
    result.frames = stats.frames;

    result.check(stats.frames == frames, format!("{} frames", stats.frames));
    result.check(stats.send_failures == 0, "send failures");
    result.check(
        stats.messages_sent == frames * BodyChannel::COUNT as u64,
        format!("{} messages", stats.messages_sent),
    );

    for message in pipeline.sink().messages() {
        for value in message.values() {
            result.check(value.is_finite(), format!("{} = {}", message.address, value));
        }
    }
    for channel in BodyChannel::all().iter().filter(|c| c.is_angle()) {
        for message in pipeline.sink().messages_to(&channel.id().address()) {
            let v = message.values()[0];
            result.check(
                (0.0..=180.0).contains(&v),
                format!("{} out of range: {}", channel.name(), v),
            );
        }
    }
    Ok(result)
}

/// Run every scenario with default parameters
pub fn run_all() -> PoscResult<Vec<ScenarioResult>> {
    Ok(vec![
        scenario_gated_left_arm()?,
        scenario_empty_frame_zeros()?,
        scenario_throttle()?,
        scenario_hand_seeding()?,
        scenario_smoother_convergence()?,
        scenario_noisy_stream(42, 600)?,
    ])
}
