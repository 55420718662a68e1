// Rust guideline compliant 2026-10-14

//! DEMO adapter for the `DetectionSource` port.
//!
//! Emits an endless stream of random frames at a fixed interval: up to three
//! detections per frame over classes `0..5`, plus an injected high-confidence
//! fire detection in roughly 2% of frames. Supports seeded randomness for
//! reproducible tests.

use domain::{Detection, DetectionSource, Frame, InferenceError};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;

/// Probability that a frame carries an injected fire detection.
const FIRE_RATE: f64 = 0.02;
/// Number of distinct classes the simulated detector knows.
const CLASS_COUNT: u32 = 5;

/// Concrete adapter for the `domain::DetectionSource` port.
///
/// Never exhausted; stop it with the cancellation token or a frame limit.
#[derive(Debug)]
pub struct DemoSource {
    rng: StdRng,
    frame_interval: Duration,
    fire_class: u32,
}

impl DemoSource {
    /// Create a new DEMO source.
    ///
    /// `seed = Some(s)` produces deterministic frames; `None` seeds from the OS.
    #[must_use]
    pub fn new(seed: Option<u64>, frame_interval: Duration, fire_class: u32) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { rng, frame_interval, fire_class }
    }

    fn random_frame(&mut self) -> Frame {
        let count = self.rng.random_range(0..=3);
        let mut detections: Vec<Detection> = (0..count)
            .map(|_| Detection {
                class_id: self.rng.random_range(0..CLASS_COUNT),
                confidence: self.rng.random_range(0.0..=1.0),
            })
            .collect();
        if self.rng.random_bool(FIRE_RATE) {
            detections.push(Detection {
                class_id: self.fire_class,
                confidence: self.rng.random_range(0.7..=1.0),
            });
        }
        Frame::new(detections)
    }
}

impl DetectionSource for DemoSource {
    /// Wait one frame interval, then return a random frame.
    ///
    /// # Errors
    ///
    /// Currently infallible.
    async fn next_frame(&mut self) -> Result<Option<Frame>, InferenceError> {
        tokio::time::sleep(self.frame_interval).await;
        let frame = self.random_frame();
        tracing::debug!(detections = frame.detections.len(), "demo_source.frame");
        Ok(Some(frame))
    }
}
