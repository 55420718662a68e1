// Rust guideline compliant 2026-10-12

//! Alarm controller for the fire-watch loop.
//!
//! [`AlarmController`] owns an injected `domain::PwmPin` adapter and its
//! duty-cycle state, and implements the `domain::Alarm` port on top of it.
//! Entry points: [`AlarmController::initialize`], `domain::Alarm::activate`,
//! [`AlarmController::silence`], [`AlarmController::rearm`],
//! [`AlarmController::shutdown`]. Configuration via [`AlarmConfig::builder`].

use domain::{AlarmError, AlarmState, DutyCycle, PwmPin};
use std::time::Duration;

// ---------------------------------------------------------------------------
// AlarmConfigError
// ---------------------------------------------------------------------------

/// Errors raised while building an [`AlarmConfig`].
#[derive(Debug, thiserror::Error)]
pub enum AlarmConfigError {
    /// The supplied configuration is invalid.
    #[error("invalid alarm configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// AlarmConfig + builder
// ---------------------------------------------------------------------------

/// PWM parameters applied by an [`AlarmController`].
///
/// Construct via [`AlarmConfig::builder`].
#[derive(Debug, Clone)]
pub struct AlarmConfig {
    /// PWM frequency in Hz; the buzzer pitch.
    pub frequency_hz: f64,
    /// Duty cycle applied at startup and on [`AlarmController::rearm`].
    pub idle_duty: DutyCycle,
}

/// Builder for [`AlarmConfig`].
///
/// Obtain via [`AlarmConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct AlarmConfigBuilder {
    frequency_hz: f64,
    idle_duty: u8,
}

impl AlarmConfig {
    /// Create a builder.
    ///
    /// Default values: `frequency_hz = 1000`, `idle_duty = 50`.
    #[must_use]
    pub fn builder() -> AlarmConfigBuilder {
        AlarmConfigBuilder { frequency_hz: 1000.0, idle_duty: 50 }
    }
}

impl AlarmConfigBuilder {
    /// Override the PWM frequency.
    #[must_use]
    pub fn frequency_hz(mut self, frequency_hz: f64) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Override the idle duty cycle, in percent.
    #[must_use]
    pub fn idle_duty(mut self, percent: u8) -> Self {
        self.idle_duty = percent;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmConfigError::InvalidConfig`] when the frequency is not a
    /// positive finite number or the idle duty cycle exceeds 100.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<AlarmConfig, AlarmConfigError> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(AlarmConfigError::InvalidConfig {
                reason: format!("frequency_hz must be > 0, got {}", self.frequency_hz),
            });
        }
        let idle_duty = DutyCycle::new(self.idle_duty).ok_or_else(|| {
            AlarmConfigError::InvalidConfig {
                reason: format!("idle_duty must be <= 100, got {}", self.idle_duty),
            }
        })?;
        Ok(AlarmConfig { frequency_hz: self.frequency_hz, idle_duty })
    }
}

// ---------------------------------------------------------------------------
// AlarmController
// ---------------------------------------------------------------------------

/// Lifecycle stage of an [`AlarmController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed; the pin has not been claimed.
    Uninitialized,
    /// The pin is claimed and the PWM signal is running.
    Running,
    /// The pin has been released. Terminal.
    ShutDown,
}

/// Owns the buzzer pin and guarantees it is released on every exit path.
///
/// Generic over any `PwmPin` adapter; carries no hardware-specific logic.
/// If the owner never calls [`shutdown`](Self::shutdown), `Drop` does.
#[derive(Debug)]
pub struct AlarmController<P: PwmPin> {
    pin: P,
    config: AlarmConfig,
    state: AlarmState,
    lifecycle: Lifecycle,
}

impl<P: PwmPin> AlarmController<P> {
    /// Create a controller around `pin`. The pin is not touched until
    /// [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(pin: P, config: AlarmConfig) -> Self {
        Self {
            pin,
            config,
            state: AlarmState::default(),
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Current output state.
    #[must_use]
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Claim the pin and start the PWM signal at the idle duty cycle.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::DeviceInit`] when the pin cannot be claimed, or
    /// [`AlarmError::InvalidState`] when called more than once.
    pub fn initialize(&mut self) -> Result<(), AlarmError> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(AlarmError::InvalidState {
                reason: format!("initialize called in stage {:?}", self.lifecycle),
            });
        }
        self.pin.start(self.config.frequency_hz, self.config.idle_duty)?;
        self.lifecycle = Lifecycle::Running;
        self.state = AlarmState { is_active: false, duty_cycle: self.config.idle_duty };
        tracing::info!(
            frequency_hz = self.config.frequency_hz,
            idle_duty = %self.config.idle_duty,
            "alarm.initialized"
        );
        Ok(())
    }

    /// Force the duty cycle to zero. Idempotent; a no-op when the pin is not
    /// claimed.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::Device`] when the pin rejects the update.
    pub fn silence(&mut self) -> Result<(), AlarmError> {
        if self.lifecycle != Lifecycle::Running {
            return Ok(());
        }
        self.apply(DutyCycle::OFF, false)?;
        tracing::debug!("alarm.silenced");
        Ok(())
    }

    /// Restore the configured idle duty cycle after an activation or silence.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::InvalidState`] unless the controller is running,
    /// or [`AlarmError::Device`] when the pin rejects the update.
    pub fn rearm(&mut self) -> Result<(), AlarmError> {
        self.ensure_running("rearm")?;
        self.apply(self.config.idle_duty, false)?;
        tracing::info!(idle_duty = %self.config.idle_duty, "alarm.rearmed");
        Ok(())
    }

    /// Silence the output, stop the signal and release the pin.
    ///
    /// The pin is released at most once; later calls return `Ok(())`. Both the
    /// silence and the release are attempted even if the first fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`AlarmError::Device`] raised while releasing.
    pub fn shutdown(&mut self) -> Result<(), AlarmError> {
        match self.lifecycle {
            Lifecycle::ShutDown => Ok(()),
            Lifecycle::Uninitialized => {
                self.lifecycle = Lifecycle::ShutDown;
                Ok(())
            }
            Lifecycle::Running => {
                // Marked first so a failed release is never retried from Drop.
                self.lifecycle = Lifecycle::ShutDown;
                let silenced = self.pin.set_duty_cycle(DutyCycle::OFF);
                self.state = AlarmState::default();
                let stopped = self.pin.stop();
                tracing::info!("alarm.shutdown");
                silenced.and(stopped)
            }
        }
    }

    fn ensure_running(&self, operation: &str) -> Result<(), AlarmError> {
        if self.lifecycle == Lifecycle::Running {
            Ok(())
        } else {
            Err(AlarmError::InvalidState {
                reason: format!("{operation} called in stage {:?}", self.lifecycle),
            })
        }
    }

    fn apply(&mut self, duty: DutyCycle, is_active: bool) -> Result<(), AlarmError> {
        self.pin.set_duty_cycle(duty)?;
        self.state = AlarmState { is_active, duty_cycle: duty };
        Ok(())
    }
}

impl<P: PwmPin> domain::Alarm for AlarmController<P> {
    /// Drive the buzzer at full duty for `duration`, then set it to zero.
    ///
    /// Holds the caller for the whole duration. If the returned future is
    /// dropped mid-way the output stays at full duty until
    /// [`silence`](AlarmController::silence) or
    /// [`shutdown`](AlarmController::shutdown).
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::InvalidDuration`] for a zero duration,
    /// [`AlarmError::InvalidState`] unless running, or
    /// [`AlarmError::Device`] when the pin rejects an update.
    async fn activate(&mut self, duration: Duration) -> Result<(), AlarmError> {
        if duration.is_zero() {
            return Err(AlarmError::InvalidDuration);
        }
        self.ensure_running("activate")?;
        self.apply(DutyCycle::FULL, true)?;
        tracing::info!(duration_secs = duration.as_secs_f64(), "alarm.activate.start");
        tokio::time::sleep(duration).await;
        self.apply(DutyCycle::OFF, false)?;
        tracing::info!("alarm.activate.end");
        Ok(())
    }
}

impl<P: PwmPin> Drop for AlarmController<P> {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            tracing::warn!("alarm.drop: controller dropped while running, releasing pin");
            if let Err(e) = self.shutdown() {
                tracing::error!(error = %e, "alarm.drop.shutdown_failed");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
