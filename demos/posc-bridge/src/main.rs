//! POSC Bridge
//!
//! Reads landmark frames as JSON lines on stdin, runs them through the
//! pipeline and sends the parameters as OSC over UDP. Stops at end of
//! input or on Ctrl-C.

mod input;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::BufReader;

use posc_runtime::{
    init_tracing, ChannelSource, DeliveryMode, EmissionMode, LogFormat, Pipeline, PipelineConfig,
    SchemaMode,
};
use posc_transport::UdpSink;
use posc_wire::ValueFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Schema {
    Body,
    Hand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Emission {
    Fixed,
    Gated,
}

#[derive(Parser, Debug)]
#[command(name = "posc-bridge", about = "Pose keypoints to OSC over UDP")]
struct Args {
    /// JSON pipeline config; flags below override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// OSC receiver host
    #[arg(long)]
    host: Option<String>,

    /// OSC receiver port
    #[arg(long)]
    port: Option<u16>,

    /// Smoothing factor, 0 < alpha <= 1
    #[arg(long)]
    alpha: Option<f32>,

    /// Send every Nth frame
    #[arg(long)]
    throttle: Option<u32>,

    #[arg(long, value_enum)]
    schema: Option<Schema>,

    #[arg(long, value_enum)]
    emission: Option<Emission>,

    /// Send each frame as one timetagged bundle
    #[arg(long)]
    bundle: bool,

    /// Send integer arguments instead of floats
    #[arg(long)]
    int: bool,

    /// Frames buffered between the reader and the pipeline
    #[arg(long, default_value = "8")]
    queue: usize,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(host) = &self.host {
            config.sink.host = host.clone();
        }
        if let Some(port) = self.port {
            config.sink.port = port;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(throttle) = self.throttle {
            config.throttle_interval = throttle;
        }
        if let Some(schema) = self.schema {
            config.schema = match schema {
                Schema::Body => SchemaMode::FixedBody,
                Schema::Hand => SchemaMode::VariableHand,
            };
        }
        if let Some(emission) = self.emission {
            config.emission = match emission {
                Emission::Fixed => EmissionMode::AlwaysFixed,
                Emission::Gated => EmissionMode::GatedNamed,
            };
        }
        if self.bundle {
            config.delivery = DeliveryMode::Bundled;
        }
        if self.int {
            config.value_format = ValueFormat::Int;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.pipeline_config()?;

    let sink = UdpSink::resolve(&config.sink.host, config.sink.port)
        .await
        .with_context(|| format!("resolving {}:{}", config.sink.host, config.sink.port))?;
    let mut pipeline = Pipeline::new(config, sink)?;

    let (tx, mut source) = ChannelSource::channel(args.queue);
    let worker = tokio::task::spawn_blocking(move || pipeline.run(&mut source));

    let reader = input::forward_frames(BufReader::new(tokio::io::stdin()), tx);
    tokio::select! {
        read = reader => match read {
            Ok(stats) => tracing::info!(
                lines = stats.lines,
                frames = stats.frames,
                rejected = stats.rejected,
                "end of input"
            ),
            Err(e) => tracing::warn!(error = %e, "input stopped"),
        },
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
    }

    // The sender is gone now, so the pipeline drains its queue and stops
    let stats = worker.await.context("pipeline thread panicked")??;
    tracing::info!(
        frames = stats.frames,
        detected = stats.frames_detected,
        dispatches = stats.dispatches,
        messages = stats.messages_sent,
        send_failures = stats.send_failures,
        "done"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(args));
    // Stdin reads sit on a blocking thread that never returns on its own
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}
