// Rust guideline compliant 2026-10-13

//! Raspberry Pi adapter for the `PwmPin` port, backed by `rppal`.
//!
//! Uses software PWM on a BCM-numbered pin. The pin is claimed in `start` and
//! handed back in `stop`; dropping the `OutputPin` restores its original mode.

use domain::{AlarmError, DutyCycle, PwmPin};
use rppal::gpio::{Gpio, OutputPin};

/// Passive buzzer wired to a GPIO pin.
#[derive(Debug)]
pub struct GpioBuzzer {
    pin_number: u8,
    frequency_hz: f64,
    pin: Option<OutputPin>,
}

impl GpioBuzzer {
    /// Create an unclaimed buzzer on BCM pin `pin_number`.
    #[must_use]
    pub fn new(pin_number: u8) -> Self {
        Self { pin_number, frequency_hz: 0.0, pin: None }
    }

    fn claim_error(&self, e: &rppal::gpio::Error) -> AlarmError {
        AlarmError::DeviceInit { pin: self.pin_number, reason: e.to_string() }
    }
}

impl PwmPin for GpioBuzzer {
    fn start(&mut self, frequency_hz: f64, duty: DutyCycle) -> Result<(), AlarmError> {
        if self.pin.is_some() {
            return Err(AlarmError::DeviceInit {
                pin: self.pin_number,
                reason: "pin already claimed".to_owned(),
            });
        }
        let gpio = Gpio::new().map_err(|e| self.claim_error(&e))?;
        let mut pin = gpio
            .get(self.pin_number)
            .map_err(|e| self.claim_error(&e))?
            .into_output_low();
        pin.set_pwm_frequency(frequency_hz, duty.as_fraction())
            .map_err(|e| self.claim_error(&e))?;

        self.frequency_hz = frequency_hz;
        self.pin = Some(pin);
        tracing::info!(pin = self.pin_number, frequency_hz, duty = %duty, "gpio_buzzer.start");
        Ok(())
    }

    fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), AlarmError> {
        let pin = self.pin.as_mut().ok_or_else(|| AlarmError::Device {
            reason: format!("pin {} not claimed", self.pin_number),
        })?;
        pin.set_pwm_frequency(self.frequency_hz, duty.as_fraction())
            .map_err(|e| AlarmError::Device { reason: e.to_string() })?;
        tracing::debug!(pin = self.pin_number, duty = %duty, "gpio_buzzer.duty");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AlarmError> {
        let Some(mut pin) = self.pin.take() else {
            return Ok(());
        };
        let cleared = pin
            .clear_pwm()
            .map_err(|e| AlarmError::Device { reason: e.to_string() });
        pin.set_low();
        tracing::info!(pin = self.pin_number, "gpio_buzzer.stop");
        cleared
    }
}
