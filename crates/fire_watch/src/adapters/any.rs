// Rust guideline compliant 2026-10-15

//! Runtime selection of adapters.
//!
//! The ports use `async fn` in traits and are not object safe, so the binary
//! picks an adapter through these enums instead of `Box<dyn _>`.

use super::demo_source::DemoSource;
use super::detector_process::DetectorProcessSource;
#[cfg(target_os = "linux")]
use super::gpio_buzzer::GpioBuzzer;
use super::json_lines_source::JsonLinesSource;
use super::log_buzzer::LogBuzzer;
use super::log_notifier::LogNotifier;
use super::twilio_notifier::TwilioNotifier;
use crate::settings::{BuzzerKind, NotifierKind, SourceKind};
use domain::{
    AlarmError, DetectionSource, DutyCycle, Frame, InferenceError, MessageId, NotificationError,
    Notifier, PwmPin,
};
use std::time::Duration;
use tokio::io::BufReader;

/// Pace of the demo source, roughly a webcam at 10 fps.
const DEMO_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Any configured frame source.
#[derive(Debug)]
pub enum AnySource {
    Demo(DemoSource),
    File(JsonLinesSource<BufReader<tokio::fs::File>>),
    Stdin(JsonLinesSource<BufReader<tokio::io::Stdin>>),
    Detector(DetectorProcessSource),
}

impl AnySource {
    /// Open the source described by `kind`.
    ///
    /// `fire_class` is only used by the demo source, which injects fires of
    /// that class.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Io`] when a file cannot be opened or the
    /// detector cannot be spawned.
    pub fn open(kind: &SourceKind, fire_class: u32) -> Result<Self, InferenceError> {
        Ok(match kind {
            SourceKind::Demo { seed } => {
                Self::Demo(DemoSource::new(*seed, DEMO_FRAME_INTERVAL, fire_class))
            }
            SourceKind::File(path) => Self::File(JsonLinesSource::open(path)?),
            SourceKind::Stdin => Self::Stdin(JsonLinesSource::stdin()),
            SourceKind::Detector(command) => Self::Detector(DetectorProcessSource::spawn(command)?),
        })
    }
}

impl DetectionSource for AnySource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, InferenceError> {
        match self {
            Self::Demo(s) => s.next_frame().await,
            Self::File(s) => s.next_frame().await,
            Self::Stdin(s) => s.next_frame().await,
            Self::Detector(s) => s.next_frame().await,
        }
    }
}

/// Any configured buzzer pin.
#[derive(Debug)]
pub enum AnyBuzzer {
    Log(LogBuzzer),
    #[cfg(target_os = "linux")]
    Gpio(GpioBuzzer),
}

impl AnyBuzzer {
    /// Wrap the buzzer described by `kind`; the pin is claimed later by `start`.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::DeviceInit`] when GPIO is requested on a platform
    /// without GPIO support.
    pub fn new(kind: BuzzerKind, pin: u8) -> Result<Self, AlarmError> {
        match kind {
            BuzzerKind::Log => Ok(Self::Log(LogBuzzer::new(pin))),
            #[cfg(target_os = "linux")]
            BuzzerKind::Gpio => Ok(Self::Gpio(GpioBuzzer::new(pin))),
            #[cfg(not(target_os = "linux"))]
            BuzzerKind::Gpio => Err(AlarmError::DeviceInit {
                pin,
                reason: "GPIO is only available on Linux".to_owned(),
            }),
        }
    }
}

impl PwmPin for AnyBuzzer {
    fn start(&mut self, frequency_hz: f64, duty: DutyCycle) -> Result<(), AlarmError> {
        match self {
            Self::Log(p) => p.start(frequency_hz, duty),
            #[cfg(target_os = "linux")]
            Self::Gpio(p) => p.start(frequency_hz, duty),
        }
    }

    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), AlarmError> {
        match self {
            Self::Log(p) => p.set_duty_cycle(duty),
            #[cfg(target_os = "linux")]
            Self::Gpio(p) => p.set_duty_cycle(duty),
        }
    }

    fn stop(&mut self) -> Result<(), AlarmError> {
        match self {
            Self::Log(p) => p.stop(),
            #[cfg(target_os = "linux")]
            Self::Gpio(p) => p.stop(),
        }
    }
}

/// Any configured notifier.
#[derive(Debug)]
pub enum AnyNotifier {
    Log(LogNotifier),
    Twilio(TwilioNotifier),
}

impl AnyNotifier {
    /// Build the notifier described by `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(kind: &NotifierKind) -> Result<Self, NotificationError> {
        Ok(match kind {
            NotifierKind::Log => Self::Log(LogNotifier::new()),
            NotifierKind::Twilio(config) => Self::Twilio(TwilioNotifier::new(config.clone())?),
        })
    }
}

impl Notifier for AnyNotifier {
    async fn send_alert(&self, body: &str) -> Result<MessageId, NotificationError> {
        match self {
            Self::Log(n) => n.send_alert(body).await,
            Self::Twilio(n) => n.send_alert(body).await,
        }
    }
}
