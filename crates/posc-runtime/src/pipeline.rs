//! The per-frame pipeline

use std::time::{Duration, Instant};

use posc_core::{BodyChannel, LandmarkFrame, PoscResult};
use posc_smoothing::Smoother;
use posc_transport::MessageSink;

use crate::{
    EmitOutcome, Emitter, FrameRateMeter, FrameSampler, LandmarkSource, Observation,
    ParameterMapper, ParameterSet, PipelineConfig, PipelineStats, SchemaMode,
};

/// What happened to one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// 0-based frame index
    pub frame: u64,
    /// The set this frame would send, throttled or not
    pub parameters: ParameterSet,
    pub outcome: EmitOutcome,
    pub latency: Duration,
}

/// Pose-to-OSC pipeline.
///
/// Owns all cross-frame state: the smoother table and the emitter's frame
/// counter. One instance serves one landmark stream.
pub struct Pipeline<S: MessageSink> {
    config: PipelineConfig,
    sampler: FrameSampler,
    mapper: ParameterMapper,
    smoother: Smoother,
    emitter: Emitter,
    sink: S,
    stats: PipelineStats,
    meter: FrameRateMeter,
}

impl<S: MessageSink> Pipeline<S> {
    /// Build a pipeline; the config is validated here
    pub fn new(config: PipelineConfig, sink: S) -> PoscResult<Self> {
        config.validate()?;

        let smoother = match config.schema {
            SchemaMode::FixedBody => Smoother::with_channels(config.alpha, BodyChannel::COUNT)?,
            SchemaMode::VariableHand => Smoother::new(config.alpha)?,
        };
        let emitter = Emitter::new(config.throttle_interval, config.delivery, config.value_format)?;

        tracing::info!(
            schema = ?config.schema,
            emission = ?config.emission,
            delivery = ?config.delivery,
            alpha = config.alpha,
            throttle = config.throttle_interval,
            "pipeline ready"
        );

        Ok(Pipeline {
            sampler: FrameSampler::new(config.schema, config.max_hands, config.min_visibility),
            mapper: ParameterMapper::new(config.schema, config.emission),
            smoother,
            emitter,
            sink,
            stats: PipelineStats::default(),
            meter: FrameRateMeter::default(),
            config,
        })
    }

    /// Run one frame through every stage
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameReport {
        let start = Instant::now();
        let index = self.emitter.frame_counter();

        // Stage 1: Gate landmarks
        let observation = self.sampler.sample(frame);

        // Stage 2: Match the smoother to this frame's channel set
        match self.mapper.active_channels(&observation) {
            // No hands: keep the count for zero output, drop the values so
            // the next hand seeds from raw
            Some(0) => self.smoother.reset(),
            Some(channels) => {
                self.smoother.reconcile(channels);
            }
            None => {}
        }

        // Stage 3: Measure and smooth
        let raw = self.mapper.raw_values(&observation);
        let smoothed = self.smoother.apply(&raw);

        // Stage 4: Assemble the outbound set
        let parameters = self
            .mapper
            .assemble(&observation, &smoothed, self.smoother.len());
        tracing::trace!(frame = index, values = ?parameters.values(), "parameters");

        // Stage 5: Throttle and dispatch
        let outcome = self.emitter.emit(&parameters, &mut self.sink);

        let latency = start.elapsed();
        self.stats.record(observation.detected(), &outcome, latency);
        self.meter.record(Instant::now(), latency);
        self.log_frame(index, &observation, &outcome);

        FrameReport {
            frame: index,
            parameters,
            outcome,
            latency,
        }
    }

    fn log_frame(&self, index: u64, observation: &Observation, outcome: &EmitOutcome) {
        match observation {
            Observation::Body(body) => tracing::debug!(
                frame = index,
                parts = ?body.valid_parts().iter().map(|p| p.name()).collect::<Vec<_>>(),
                outcome = ?outcome,
                "frame processed"
            ),
            Observation::Hands(hands) => tracing::debug!(
                frame = index,
                hands = hands.len(),
                outcome = ?outcome,
                "frame processed"
            ),
        }

        let every = self.config.stats_interval;
        if every > 0 && (index + 1) % every == 0 {
            tracing::info!(
                frames = self.stats.frames,
                fps = self.meter.fps(),
                avg_latency_us = self.meter.avg_latency().as_micros() as u64,
                dispatches = self.stats.dispatches,
                send_failures = self.stats.send_failures,
                "throughput"
            );
        }
    }

    /// Drain a source until it ends. Source errors stop the run; sink
    /// errors never do.
    pub fn run<L: LandmarkSource + ?Sized>(&mut self, source: &mut L) -> PoscResult<PipelineStats> {
        while let Some(frame) = source.next_frame()? {
            self.process_frame(&frame);
        }
        tracing::info!(
            frames = self.stats.frames,
            dispatches = self.stats.dispatches,
            messages = self.stats.messages_sent,
            "landmark stream ended"
        );
        Ok(self.stats.clone())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn meter(&self) -> &FrameRateMeter {
        &self.meter
    }

    pub fn smoother(&self) -> &Smoother {
        &self.smoother
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
