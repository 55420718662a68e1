// Rust guideline compliant 2026-10-12

//! Shared domain types for the fire-watch monitoring loop.
//!
//! Defines `Detection`, `Frame`, `DutyCycle`, `AlarmState`, the error enums,
//! and the hexagonal port traits: `DetectionSource`, `PwmPin`, `Alarm`, and
//! `Notifier`. Every other crate in the workspace depends on this one; adapters
//! for real hardware and remote services live in the binary crate.

use std::fmt;
use std::time::Duration;

/// One classified bounding box reported by the detector for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    /// Class index assigned by the detector.
    pub class_id: u32,
    /// Model-reported confidence, range `[0.0, 1.0]`.
    pub confidence: f32,
}

/// One detector result: zero or more detections for a single video frame.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    /// Detections in the order the detector reported them.
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl Frame {
    /// Build a frame from a list of detections.
    #[must_use]
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

/// PWM duty cycle as an integer percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DutyCycle(u8);

impl DutyCycle {
    /// Signal permanently low.
    pub const OFF: Self = Self(0);
    /// Signal permanently high; maximum buzzer volume.
    pub const FULL: Self = Self(100);

    /// Validate `percent`; returns `None` above 100.
    #[must_use]
    pub const fn new(percent: u8) -> Option<Self> {
        if percent <= 100 { Some(Self(percent)) } else { None }
    }

    /// Duty cycle as a percentage.
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Duty cycle as a fraction in `[0.0, 1.0]`, the form most PWM drivers expect.
    #[must_use]
    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Observable state of the alarm output.
///
/// After any activation or silence the duty cycle is [`DutyCycle::OFF`] and
/// stays there until the controller is explicitly re-armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmState {
    /// `true` only while an activation is sounding.
    pub is_active: bool,
    /// Duty cycle currently applied to the pin.
    pub duty_cycle: DutyCycle,
}

/// Provider-assigned identifier of a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from the alarm device and its controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlarmError {
    /// The output pin could not be claimed. Fatal at startup.
    #[error("cannot claim alarm pin {pin}: {reason}")]
    DeviceInit {
        /// Logical pin number.
        pin: u8,
        /// Human-readable description.
        reason: String,
    },
    /// A PWM update on an already claimed pin failed.
    #[error("alarm device error: {reason}")]
    Device {
        /// Human-readable description.
        reason: String,
    },
    /// The operation is not valid in the controller's current lifecycle stage.
    #[error("invalid alarm state: {reason}")]
    InvalidState {
        /// Human-readable description.
        reason: String,
    },
    /// Activation durations must be strictly positive.
    #[error("alarm duration must be positive")]
    InvalidDuration,
}

/// Errors from the detection source port.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Reading from the detector failed.
    #[error("detector i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A detector record could not be decoded.
    #[error("malformed detector output at line {line}: {reason}")]
    Malformed {
        /// 1-based line number in the detector stream.
        line: u64,
        /// Human-readable description.
        reason: String,
    },
    /// The detector process terminated unsuccessfully.
    #[error("detector process exited: {status}")]
    ProcessExited {
        /// Exit status as reported by the OS.
        status: String,
    },
}

/// Errors from the notification port.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("notification transport failed: {reason}")]
    Transport {
        /// Human-readable description.
        reason: String,
    },
    /// The provider answered with an error status.
    #[error("notification rejected (http {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Provider-specific error code, when supplied.
        code: Option<u32>,
        /// Provider error message.
        message: String,
    },
    /// The provider answered successfully but the body could not be understood.
    #[error("invalid notification response: {reason}")]
    InvalidResponse {
        /// Human-readable description.
        reason: String,
    },
}

/// Hexagonal port: lazy, ordered stream of detector frames.
///
/// `Ok(None)` signals that the source is exhausted. Live sources never return
/// it; replayed recordings do at end of file.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait DetectionSource {
    /// Wait for and return the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] when the detector fails or emits garbage.
    async fn next_frame(&mut self) -> Result<Option<Frame>, InferenceError>;
}

/// Hexagonal port: a digital output pin driven with pulse-width modulation.
///
/// `start` claims the pin; `stop` releases it.
pub trait PwmPin {
    /// Claim the pin in output mode and start the PWM signal.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::DeviceInit`] when the pin cannot be claimed.
    fn start(&mut self, frequency_hz: f64, duty: DutyCycle) -> Result<(), AlarmError>;

    /// Change the duty cycle of a running signal.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::Device`] when the update fails.
    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), AlarmError>;

    /// Stop the signal and release the pin.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::Device`] when the pin cannot be released cleanly.
    fn stop(&mut self) -> Result<(), AlarmError>;
}

/// Hexagonal port: the audible alarm as seen by the detection loop.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Alarm {
    /// Sound the alarm at full volume for `duration`, then turn it off.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError`] when the device rejects the change or the
    /// duration is zero.
    async fn activate(&mut self, duration: Duration) -> Result<(), AlarmError>;
}

/// Hexagonal port: out-of-band alert delivery (SMS).
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Notifier {
    /// Send `body` to the configured recipient.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] on transport, auth or provider failure.
    async fn send_alert(&self, body: &str) -> Result<MessageId, NotificationError>;
}
