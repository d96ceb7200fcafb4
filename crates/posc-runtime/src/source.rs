//! Landmark sources - where frames come from

use posc_core::{LandmarkFrame, PoscResult};
use tokio::sync::mpsc;

/// Producer of landmark frames.
///
/// `Ok(None)` means the stream ended normally.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> PoscResult<Option<LandmarkFrame>>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for &mut S {
    fn next_frame(&mut self) -> PoscResult<Option<LandmarkFrame>> {
        (**self).next_frame()
    }
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn next_frame(&mut self) -> PoscResult<Option<LandmarkFrame>> {
        (**self).next_frame()
    }
}

/// Frames pushed from another thread or task.
///
/// Receiving blocks the calling thread, so run the pipeline on a plain
/// thread or inside `spawn_blocking`, never directly on a runtime worker.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<LandmarkFrame>,
}

impl ChannelSource {
    /// Bounded channel; producers wait when `capacity` frames are queued
    pub fn channel(capacity: usize) -> (mpsc::Sender<LandmarkFrame>, ChannelSource) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, ChannelSource { rx })
    }

    pub fn new(rx: mpsc::Receiver<LandmarkFrame>) -> Self {
        ChannelSource { rx }
    }
}

impl LandmarkSource for ChannelSource {
    fn next_frame(&mut self) -> PoscResult<Option<LandmarkFrame>> {
        // All senders dropped is a normal end of stream
        Ok(self.rx.blocking_recv())
    }
}

/// Frames from any iterator
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    frames: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = LandmarkFrame>,
{
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        IterSource {
            frames: frames.into_iter(),
        }
    }
}

impl<I> LandmarkSource for IterSource<I>
where
    I: Iterator<Item = LandmarkFrame>,
{
    fn next_frame(&mut self) -> PoscResult<Option<LandmarkFrame>> {
        Ok(self.frames.next())
    }
}
