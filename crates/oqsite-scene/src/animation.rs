//! Frame loop with an explicit lifecycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::scene::{FrameSample, Scene, SceneError};

/// Receives each frame the loop produces.
pub trait FrameSink: Send + 'static {
    fn present(&mut self, frame: &FrameSample);
}

impl<F> FrameSink for F
where
    F: FnMut(&FrameSample) + Send + 'static,
{
    fn present(&mut self, frame: &FrameSample) {
        self(frame)
    }
}

/// A running frame loop.
///
/// The loop samples the scene at the wall-clock time since [`AnimationLoop::start`]
/// on every tick. It runs until [`stop`](AnimationLoop::stop),
/// [`cancel`](AnimationLoop::cancel), or the handle is dropped.
pub struct AnimationLoop {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<u64>>,
}

impl AnimationLoop {
    /// Start ticking `scene` every `frame_interval` on the current tokio runtime.
    pub fn start(
        scene: Arc<Scene>,
        frame_interval: Duration,
        mut sink: impl FrameSink,
    ) -> Result<Self, SceneError> {
        if frame_interval.is_zero() {
            return Err(SceneError::ZeroFrameInterval);
        }

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut frames = 0u64;

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let frame = scene.frame_at(started.elapsed().as_secs_f32());
                        sink.present(&frame);
                        frames += 1;
                    }
                }
            }

            tracing::debug!("Animation loop stopped after {} frames", frames);
            frames
        });

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Whether the loop task is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop after the current frame and return how many frames were presented.
    pub async fn stop(mut self) -> Result<u64, SceneError> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }

        match self.handle.take() {
            Some(handle) => handle.await.map_err(|e| SceneError::Task(e.to_string())),
            None => Ok(0),
        }
    }

    /// Abort the loop immediately without waiting for it.
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.abort();
    }
}
