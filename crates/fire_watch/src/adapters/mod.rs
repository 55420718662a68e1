// Rust guideline compliant 2026-10-14

//! Adapters (secondary ports) for the fire-watch binary.
//!
//! Each sub-module implements one hexagonal port trait defined in the
//! `domain` crate. [`any`] bundles them into enums so `main` can pick
//! adapters from configuration while the core stays statically dispatched.

pub mod any;
pub mod demo_source;
pub mod detector_process;
#[cfg(target_os = "linux")]
pub mod gpio_buzzer;
pub mod json_lines_source;
pub mod log_buzzer;
pub mod log_notifier;
pub mod twilio_notifier;
