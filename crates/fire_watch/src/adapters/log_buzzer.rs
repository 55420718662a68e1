// Rust guideline compliant 2026-10-13

//! Demo adapter for the `PwmPin` port.
//!
//! Logs every signal transition via `tracing` instead of driving hardware, so
//! the loop can run on a host without GPIO. Claim rules match a real pin: a
//! second `start` fails with `AlarmError::DeviceInit`.

use domain::{AlarmError, DutyCycle, PwmPin};

/// `PwmPin` adapter that emits a log line for each transition.
#[derive(Debug)]
pub struct LogBuzzer {
    pin: u8,
    claimed: bool,
}

impl LogBuzzer {
    /// Create an unclaimed log buzzer reporting itself as `pin`.
    #[must_use]
    pub fn new(pin: u8) -> Self {
        Self { pin, claimed: false }
    }
}

impl PwmPin for LogBuzzer {
    fn start(&mut self, frequency_hz: f64, duty: DutyCycle) -> Result<(), AlarmError> {
        if self.claimed {
            return Err(AlarmError::DeviceInit {
                pin: self.pin,
                reason: "pin already claimed".to_owned(),
            });
        }
        self.claimed = true;
        tracing::info!(pin = self.pin, frequency_hz, duty = %duty, "log_buzzer.start");
        Ok(())
    }

    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), AlarmError> {
        if !self.claimed {
            return Err(AlarmError::Device { reason: format!("pin {} not claimed", self.pin) });
        }
        if duty == DutyCycle::FULL {
            tracing::warn!(pin = self.pin, duty = %duty, "log_buzzer.sounding");
        } else {
            tracing::info!(pin = self.pin, duty = %duty, "log_buzzer.duty");
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AlarmError> {
        if self.claimed {
            self.claimed = false;
            tracing::info!(pin = self.pin, "log_buzzer.stop");
        }
        Ok(())
    }
}
