// Rust guideline compliant 2026-10-15

//! Process configuration read from environment variables.
//!
//! There is no configuration file and there are no command-line flags. Every
//! value has a default except the Twilio account, credentials and phone
//! numbers, which are required whenever the Twilio notifier is selected.
//! [`Settings::from_lookup`] takes the variable lookup as a function so tests
//! never touch the process environment.

use crate::adapters::detector_process::DetectorCommand;
use crate::adapters::twilio_notifier::{DEFAULT_API_BASE, TwilioConfig};
use alarm::{AlarmConfig, AlarmConfigError};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use watcher::{WatchConfig, WatchError};

/// Errors raised while reading [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required variable is unset or blank.
    #[error("missing required setting {key}")]
    Missing {
        /// Variable name.
        key: &'static str,
    },
    /// A variable could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value as found.
        value: String,
        /// Human-readable description.
        reason: String,
    },
    /// Alarm parameters are out of range.
    #[error(transparent)]
    Alarm(#[from] AlarmConfigError),
    /// Detection-loop parameters are out of range.
    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    /// Random frames; see `DemoSource`.
    Demo {
        /// Fixed RNG seed, if any.
        seed: Option<u64>,
    },
    /// JSON lines piped into stdin.
    Stdin,
    /// JSON lines replayed from a file.
    File(PathBuf),
    /// JSON lines printed by a detector subprocess.
    Detector(DetectorCommand),
}

/// Which `PwmPin` adapter drives the buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerKind {
    /// Raspberry Pi GPIO via `rppal`.
    Gpio,
    /// Log transitions only.
    Log,
}

/// Which `Notifier` adapter sends alerts.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifierKind {
    /// Log the alert only.
    Log,
    /// Send an SMS through Twilio.
    Twilio(TwilioConfig),
}

/// Everything `main` needs to wire the loop.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Frame source.
    pub source: SourceKind,
    /// Buzzer adapter.
    pub buzzer: BuzzerKind,
    /// BCM pin number of the buzzer.
    pub buzzer_pin: u8,
    /// PWM parameters.
    pub alarm: AlarmConfig,
    /// Detection policy.
    pub watch: WatchConfig,
    /// Notification adapter.
    pub notifier: NotifierKind,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`from_lookup`](Self::from_lookup).
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] for an absent required value,
    /// [`SettingsError::Invalid`] for an unparsable one, and
    /// [`SettingsError::Alarm`] / [`SettingsError::Watch`] when the parsed
    /// values fail validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let fire_class = env.parse_or("FIRE_WATCH_FIRE_CLASS", 0u32)?;
        let mut watch = WatchConfig::builder()
            .fire_class(fire_class)
            .confidence_threshold(env.parse_or("FIRE_WATCH_THRESHOLD", 0.6f32)?)
            .alarm_duration(Duration::from_secs(env.parse_or("FIRE_WATCH_ALARM_SECS", 20u64)?));
        if let Some(body) = env.get("FIRE_WATCH_ALERT_BODY") {
            watch = watch.alert_body(body);
        }
        if let Some(max) = env.parse_opt::<u64>("FIRE_WATCH_MAX_FRAMES")? {
            watch = watch.max_frames(max);
        }

        let alarm = AlarmConfig::builder()
            .frequency_hz(env.parse_or("FIRE_WATCH_PWM_HZ", 1000.0f64)?)
            .idle_duty(env.parse_or("FIRE_WATCH_IDLE_DUTY", 50u8)?)
            .build()?;

        Ok(Self {
            source: env.source()?,
            buzzer: env.buzzer()?,
            buzzer_pin: env.parse_or("FIRE_WATCH_BUZZER_PIN", 18u8)?,
            alarm,
            watch: watch.build()?,
            notifier: env.notifier()?,
        })
    }
}

/// Thin wrapper that treats blank values as unset.
struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, SettingsError> {
        self.get(key).ok_or(SettingsError::Missing { key })
    }

    fn parse_opt<T>(&self, key: &'static str) -> Result<Option<T>, SettingsError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse().map_err(|e: T::Err| SettingsError::Invalid {
                    key,
                    reason: e.to_string(),
                    value: raw.clone(),
                })
            })
            .transpose()
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, SettingsError>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse_opt(key)?.unwrap_or(default))
    }

    fn invalid(key: &'static str, value: String, expected: &str) -> SettingsError {
        SettingsError::Invalid { key, value, reason: format!("expected {expected}") }
    }

    fn source(&self) -> Result<SourceKind, SettingsError> {
        let raw = self.get("FIRE_WATCH_SOURCE").unwrap_or_else(|| "demo".to_owned());
        Ok(match raw.as_str() {
            "demo" => SourceKind::Demo { seed: self.parse_opt("FIRE_WATCH_DEMO_SEED")? },
            "stdin" => SourceKind::Stdin,
            "detector" => {
                let cmd = self.required("FIRE_WATCH_DETECTOR_CMD")?;
                // Whitespace-separated; no shell quoting.
                let mut parts = cmd.split_whitespace().map(str::to_owned);
                let program = parts.next().ok_or(SettingsError::Missing {
                    key: "FIRE_WATCH_DETECTOR_CMD",
                })?;
                SourceKind::Detector(DetectorCommand {
                    program,
                    extra_args: parts.collect(),
                    video_source: self
                        .get("FIRE_WATCH_VIDEO_SOURCE")
                        .unwrap_or_else(|| "0".to_owned()),
                    image_size: self.parse_or("FIRE_WATCH_IMGSZ", 640u32)?,
                    confidence_floor: self.parse_or("FIRE_WATCH_DETECTOR_CONF", 0.6f32)?,
                })
            }
            path => SourceKind::File(PathBuf::from(path)),
        })
    }

    fn buzzer(&self) -> Result<BuzzerKind, SettingsError> {
        match self.get("FIRE_WATCH_BUZZER").as_deref() {
            None | Some("gpio") => Ok(BuzzerKind::Gpio),
            Some("log") => Ok(BuzzerKind::Log),
            Some(other) => {
                Err(Self::invalid("FIRE_WATCH_BUZZER", other.to_owned(), "`gpio` or `log`"))
            }
        }
    }

    fn notifier(&self) -> Result<NotifierKind, SettingsError> {
        match self.get("FIRE_WATCH_NOTIFIER").as_deref() {
            None | Some("twilio") => Ok(NotifierKind::Twilio(TwilioConfig {
                api_base: self
                    .get("TWILIO_API_BASE")
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
                account_sid: self.required("TWILIO_ACCOUNT_SID")?,
                auth_token: self.required("TWILIO_AUTH_TOKEN")?,
                from_number: self.required("TWILIO_FROM_NUMBER")?,
                to_number: self.required("TWILIO_TO_NUMBER")?,
            })),
            Some("log") => Ok(NotifierKind::Log),
            Some(other) => {
                Err(Self::invalid("FIRE_WATCH_NOTIFIER", other.to_owned(), "`twilio` or `log`"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuzzerKind, NotifierKind, Settings, SettingsError, SourceKind};
    use domain::DutyCycle;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    const TWILIO: [(&str, &str); 4] = [
        ("TWILIO_ACCOUNT_SID", "AC123"),
        ("TWILIO_AUTH_TOKEN", "secret"),
        ("TWILIO_FROM_NUMBER", "+15550001111"),
        ("TWILIO_TO_NUMBER", "+15552223333"),
    ];

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, SettingsError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "literal round-trip")]
    fn defaults_with_twilio_credentials() {
        let s = settings(&TWILIO).unwrap();

        assert_eq!(s.source, SourceKind::Demo { seed: None });
        assert_eq!(s.buzzer, BuzzerKind::Gpio);
        assert_eq!(s.buzzer_pin, 18);
        assert_eq!(s.alarm.frequency_hz, 1000.0);
        assert_eq!(s.alarm.idle_duty, DutyCycle::new(50).unwrap());
        assert_eq!(s.watch.fire_class, 0);
        assert_eq!(s.watch.confidence_threshold, 0.6);
        assert_eq!(s.watch.alarm_duration, Duration::from_secs(20));
        assert_eq!(s.watch.max_frames, None);
        let NotifierKind::Twilio(twilio) = s.notifier else {
            panic!("twilio is the default notifier");
        };
        assert_eq!(twilio.api_base, "https://api.twilio.com");
        assert_eq!(twilio.to_number, "+15552223333");
    }

    #[test]
    fn phone_numbers_are_required_for_twilio() {
        let result = settings(&TWILIO[..3]);
        assert!(
            matches!(result, Err(SettingsError::Missing { key: "TWILIO_TO_NUMBER" })),
            "{result:?}"
        );
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut vars = TWILIO.to_vec();
        vars[2] = ("TWILIO_FROM_NUMBER", "   ");
        let result = settings(&vars);
        assert!(
            matches!(result, Err(SettingsError::Missing { key: "TWILIO_FROM_NUMBER" })),
            "{result:?}"
        );
    }

    #[test]
    fn log_adapters_need_no_credentials() {
        let s = settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_BUZZER", "log")]).unwrap();
        assert_eq!(s.notifier, NotifierKind::Log);
        assert_eq!(s.buzzer, BuzzerKind::Log);
    }

    #[test]
    fn detector_source_parses_command_line() {
        let s = settings(&[
            ("FIRE_WATCH_NOTIFIER", "log"),
            ("FIRE_WATCH_SOURCE", "detector"),
            ("FIRE_WATCH_DETECTOR_CMD", "python3  detect.py --weights best.pt"),
            ("FIRE_WATCH_VIDEO_SOURCE", "/dev/video2"),
            ("FIRE_WATCH_IMGSZ", "320"),
        ])
        .unwrap();

        let SourceKind::Detector(command) = s.source else {
            panic!("expected detector source, got {:?}", s.source);
        };
        assert_eq!(command.program, "python3");
        assert_eq!(command.extra_args, ["detect.py", "--weights", "best.pt"]);
        assert_eq!(command.video_source, "/dev/video2");
        assert_eq!(command.image_size, 320);
    }

    #[test]
    fn detector_source_requires_command() {
        let result = settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_SOURCE", "detector")]);
        assert!(
            matches!(result, Err(SettingsError::Missing { key: "FIRE_WATCH_DETECTOR_CMD" })),
            "{result:?}"
        );
    }

    #[test]
    fn other_sources() {
        let stdin = settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_SOURCE", "stdin")]);
        assert_eq!(stdin.unwrap().source, SourceKind::Stdin);

        let file = settings(&[
            ("FIRE_WATCH_NOTIFIER", "log"),
            ("FIRE_WATCH_SOURCE", "/var/lib/fire_watch/frames.jsonl"),
        ]);
        assert_eq!(
            file.unwrap().source,
            SourceKind::File(PathBuf::from("/var/lib/fire_watch/frames.jsonl"))
        );

        let demo = settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_DEMO_SEED", "9")]);
        assert_eq!(demo.unwrap().source, SourceKind::Demo { seed: Some(9) });
    }

    #[test]
    fn unparsable_number_is_invalid() {
        let result =
            settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_BUZZER_PIN", "eighteen")]);
        assert!(
            matches!(
                &result,
                Err(SettingsError::Invalid { key: "FIRE_WATCH_BUZZER_PIN", value, .. })
                    if value == "eighteen"
            ),
            "{result:?}"
        );
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let threshold =
            settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_THRESHOLD", "1.5")]);
        assert!(matches!(threshold, Err(SettingsError::Watch(_))), "{threshold:?}");

        let duty = settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_IDLE_DUTY", "150")]);
        assert!(matches!(duty, Err(SettingsError::Alarm(_))), "{duty:?}");

        let secs = settings(&[("FIRE_WATCH_NOTIFIER", "log"), ("FIRE_WATCH_ALARM_SECS", "0")]);
        assert!(matches!(secs, Err(SettingsError::Watch(_))), "{secs:?}");
    }

    #[test]
    fn unknown_adapter_names_are_rejected() {
        let result = settings(&[("FIRE_WATCH_NOTIFIER", "pager")]);
        assert!(
            matches!(result, Err(SettingsError::Invalid { key: "FIRE_WATCH_NOTIFIER", .. })),
            "{result:?}"
        );
    }

    #[test]
    fn custom_policy_values() {
        let s = settings(&[
            ("FIRE_WATCH_NOTIFIER", "log"),
            ("FIRE_WATCH_FIRE_CLASS", "3"),
            ("FIRE_WATCH_ALERT_BODY", "Smoke in the server room"),
            ("FIRE_WATCH_MAX_FRAMES", "100"),
        ])
        .unwrap();
        assert_eq!(s.watch.fire_class, 3);
        assert_eq!(s.watch.alert_body, "Smoke in the server room");
        assert_eq!(s.watch.max_frames, Some(100));
    }
}
