// Rust guideline compliant 2026-10-13

//! Detection loop -- pulls frames from a `DetectionSource`, applies the fire
//! policy to every detection, and drives the `Alarm` and `Notifier` ports.
//!
//! Entry points: [`DetectionLoop::is_fire`], [`DetectionLoop::process_frame`],
//! [`DetectionLoop::run`]. Configuration via [`WatchConfig::builder`].

use domain::{
    Alarm, AlarmError, Detection, DetectionSource, Frame, InferenceError, NotificationError,
    Notifier,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Message sent when no other body is configured.
pub const DEFAULT_ALERT_BODY: &str = "Fire detected! Please take immediate action.";

// ---------------------------------------------------------------------------
// WatchError
// ---------------------------------------------------------------------------

/// Errors that end a detection run.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The supplied configuration is invalid.
    #[error("invalid watch configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The detection source failed.
    #[error("detection source error: {0}")]
    Source(#[from] InferenceError),
    /// The alarm could not be activated.
    #[error("alarm error: {0}")]
    Alarm(#[from] AlarmError),
    /// The alert notification could not be delivered.
    #[error("notification error: {0}")]
    Notification(#[from] NotificationError),
}

// ---------------------------------------------------------------------------
// WatchConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`DetectionLoop`].
///
/// Construct via [`WatchConfig::builder`].
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Class index the detector uses for fire.
    pub fire_class: u32,
    /// A detection qualifies only when its confidence is strictly greater.
    pub confidence_threshold: f32,
    /// How long the alarm sounds per qualifying detection.
    pub alarm_duration: Duration,
    /// Notification body sent after each alarm.
    pub alert_body: String,
    /// Optional upper bound on the number of frames. `None` means unbounded.
    pub max_frames: Option<u64>,
}

/// Builder for [`WatchConfig`].
///
/// Obtain via [`WatchConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct WatchConfigBuilder {
    fire_class: u32,
    confidence_threshold: f32,
    alarm_duration: Duration,
    alert_body: String,
    max_frames: Option<u64>,
}

impl WatchConfig {
    /// Create a builder.
    ///
    /// Default values: `fire_class = 0`, `confidence_threshold = 0.6`,
    /// `alarm_duration = 20 s`, `alert_body = DEFAULT_ALERT_BODY`,
    /// `max_frames = None`.
    #[must_use]
    pub fn builder() -> WatchConfigBuilder {
        WatchConfigBuilder {
            fire_class: 0,
            confidence_threshold: 0.6,
            alarm_duration: Duration::from_secs(20),
            alert_body: DEFAULT_ALERT_BODY.to_owned(),
            max_frames: None,
        }
    }
}

impl WatchConfigBuilder {
    /// Override the fire class index.
    #[must_use]
    pub fn fire_class(mut self, class_id: u32) -> Self {
        self.fire_class = class_id;
        self
    }

    /// Override the strict confidence threshold.
    #[must_use]
    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Override how long each activation lasts.
    #[must_use]
    pub fn alarm_duration(mut self, duration: Duration) -> Self {
        self.alarm_duration = duration;
        self
    }

    /// Override the notification body.
    #[must_use]
    pub fn alert_body(mut self, body: impl Into<String>) -> Self {
        self.alert_body = body.into();
        self
    }

    /// Stop after `n` frames. Without this the loop runs until the source is
    /// exhausted or cancelled.
    #[must_use]
    pub fn max_frames(mut self, n: u64) -> Self {
        self.max_frames = Some(n);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidConfig`] when the threshold is outside
    /// `[0, 1]`, the alarm duration is zero, or the body is blank.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<WatchConfig, WatchError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(WatchError::InvalidConfig {
                reason: format!(
                    "confidence_threshold must be in [0, 1], got {}",
                    self.confidence_threshold
                ),
            });
        }
        if self.alarm_duration.is_zero() {
            return Err(WatchError::InvalidConfig {
                reason: "alarm_duration must be > 0".to_owned(),
            });
        }
        if self.alert_body.trim().is_empty() {
            return Err(WatchError::InvalidConfig {
                reason: "alert_body must not be empty".to_owned(),
            });
        }
        Ok(WatchConfig {
            fire_class: self.fire_class,
            confidence_threshold: self.confidence_threshold,
            alarm_duration: self.alarm_duration,
            alert_body: self.alert_body,
            max_frames: self.max_frames,
        })
    }
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Why [`DetectionLoop::run`] returned without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source reported end of stream.
    SourceExhausted,
    /// `max_frames` frames were processed.
    FrameLimit,
    /// The cancellation token fired.
    Interrupted,
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames fully processed.
    pub frames: u64,
    /// Activate+notify cycles completed.
    pub alerts: u64,
    /// Why the run ended.
    pub stop: StopReason,
}

// ---------------------------------------------------------------------------
// DetectionLoop
// ---------------------------------------------------------------------------

/// Applies the fire policy to a stream of frames.
///
/// Generic over all three hexagonal ports for static dispatch. Holds no
/// adapter references; dependencies are injected per call. Every qualifying
/// detection raises its own full alarm+notification cycle: there is no
/// deduplication or cooldown.
#[derive(Debug)]
pub struct DetectionLoop {
    config: WatchConfig,
}

impl DetectionLoop {
    /// Create a loop from `config`.
    #[must_use]
    pub fn new(config: WatchConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// `true` when `detection` is the fire class with confidence strictly above
    /// the threshold.
    #[must_use]
    pub fn is_fire(&self, detection: &Detection) -> bool {
        detection.class_id == self.config.fire_class
            && detection.confidence > self.config.confidence_threshold
    }

    /// Apply the policy to every detection in `frame`, in order.
    ///
    /// For each qualifying detection: log, sound the alarm for the configured
    /// duration, then send the alert. Returns the number of alerts raised.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Alarm`] or [`WatchError::Notification`] on the
    /// first failure; remaining detections in the frame are skipped.
    pub async fn process_frame<A, N>(
        &self,
        frame: &Frame,
        alarm: &mut A,
        notifier: &N,
    ) -> Result<u32, WatchError>
    where
        A: Alarm,
        N: Notifier,
    {
        let mut alerts = 0u32;
        for detection in frame.detections.iter().filter(|d| self.is_fire(d)) {
            tracing::warn!(
                class_id = detection.class_id,
                confidence = detection.confidence,
                "watcher.fire.detected"
            );
            alarm.activate(self.config.alarm_duration).await?;
            let message_id = notifier.send_alert(&self.config.alert_body).await?;
            tracing::info!(message_id = %message_id, "watcher.alert.sent");
            alerts += 1;
        }
        Ok(alerts)
    }

    /// Run the detection loop until the source ends, the frame limit is
    /// reached, or `cancel` fires.
    ///
    /// `cancel` is checked at every frame boundary and raced against both the
    /// pending frame read and the in-flight alert cycle, so cancellation takes
    /// effect immediately. An alarm interrupted this way is left sounding; the
    /// caller's shutdown path must silence it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] for any source, alarm, or notifier failure. None
    /// are retried.
    pub async fn run<S, A, N>(
        &self,
        source: &mut S,
        alarm: &mut A,
        notifier: &N,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, WatchError>
    where
        S: DetectionSource,
        A: Alarm,
        N: Notifier,
    {
        let mut frames = 0u64;
        let mut alerts = 0u64;

        let stop = loop {
            if cancel.is_cancelled() {
                break StopReason::Interrupted;
            }
            if let Some(max) = self.config.max_frames
                && frames >= max
            {
                break StopReason::FrameLimit;
            }

            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => break StopReason::Interrupted,
                next = source.next_frame() => next?,
            };
            let Some(frame) = next else {
                break StopReason::SourceExhausted;
            };
            tracing::debug!(
                frame = frames + 1,
                detections = frame.detections.len(),
                "watcher.frame.received"
            );

            let raised = tokio::select! {
                biased;
                () = cancel.cancelled() => break StopReason::Interrupted,
                raised = self.process_frame(&frame, alarm, notifier) => raised?,
            };
            frames += 1;
            alerts += u64::from(raised);
        };

        tracing::info!(frames, alerts, stop = ?stop, "watcher.run.stopped");
        Ok(RunSummary { frames, alerts, stop })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
