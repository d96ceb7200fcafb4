//! Pipeline counters and frame-rate measurement

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::EmitOutcome;

/// Frames kept for the rolling rate window
pub const FPS_WINDOW: usize = 60;

/// Pipeline counters
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub frames: u64,
    /// Frames where something usable was detected
    pub frames_detected: u64,
    pub dispatches: u64,
    pub throttled: u64,
    pub messages_sent: u64,
    pub send_failures: u64,
    pub last_frame_latency: Duration,
}

impl PipelineStats {
    pub(crate) fn record(&mut self, detected: bool, outcome: &EmitOutcome, latency: Duration) {
        self.frames += 1;
        if detected {
            self.frames_detected += 1;
        }
        match outcome {
            EmitOutcome::Throttled => self.throttled += 1,
            EmitOutcome::Empty => {}
            EmitOutcome::Dispatched(d) => {
                self.dispatches += 1;
                self.messages_sent += d.delivered as u64;
                self.send_failures += d.failed as u64;
            }
        }
        self.last_frame_latency = latency;
    }
}

/// Rolling frames-per-second and latency over the last `FPS_WINDOW` frames
#[derive(Clone, Debug)]
pub struct FrameRateMeter {
    window: usize,
    samples: VecDeque<(Instant, Duration)>,
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(FPS_WINDOW)
    }
}

impl FrameRateMeter {
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
        }
    }

    /// Record a frame finishing at `now` after `latency` of processing
    pub fn record(&mut self, now: Instant, latency: Duration) {
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back((now, latency));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Frames per second across the window, 0 until two frames are seen
    pub fn fps(&self) -> f64 {
        let (Some((first, _)), Some((last, _))) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let span = last.saturating_duration_since(*first).as_secs_f64();
        if self.samples.len() < 2 || span <= 0.0 {
            return 0.0;
        }
        (self.samples.len() - 1) as f64 / span
    }

    pub fn avg_latency(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().map(|(_, l)| *l).sum();
        total / self.samples.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dispatch;

    #[test]
    fn test_stats_record() {
        let mut stats = PipelineStats::default();
        let sent = EmitOutcome::Dispatched(Dispatch {
            attempted: 3,
            delivered: 2,
            failed: 1,
        });

        stats.record(true, &sent, Duration::from_millis(2));
        stats.record(false, &EmitOutcome::Throttled, Duration::from_millis(1));
        stats.record(false, &EmitOutcome::Empty, Duration::from_millis(1));

        assert_eq!(stats.frames, 3);
        assert_eq!(stats.frames_detected, 1);
        assert_eq!(stats.dispatches, 1);
        assert_eq!(stats.throttled, 1);
        assert_eq!(stats.messages_sent, 2);
        assert_eq!(stats.send_failures, 1);
        assert_eq!(stats.last_frame_latency, Duration::from_millis(1));
    }

    #[test]
    fn test_fps_steady_rate() {
        let mut meter = FrameRateMeter::new(10);
        let start = Instant::now();
        for i in 0..30u64 {
            meter.record(start + Duration::from_millis(i * 20), Duration::from_millis(4));
        }
        assert_eq!(meter.len(), 10);
        assert!((meter.fps() - 50.0).abs() < 1e-6);
        assert_eq!(meter.avg_latency(), Duration::from_millis(4));
    }

    #[test]
    fn test_fps_needs_two_frames() {
        let mut meter = FrameRateMeter::default();
        assert_eq!(meter.fps(), 0.0);
        assert_eq!(meter.avg_latency(), Duration::ZERO);

        meter.record(Instant::now(), Duration::from_millis(1));
        assert_eq!(meter.fps(), 0.0);
    }
}
