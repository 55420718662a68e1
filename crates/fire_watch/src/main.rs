// Rust guideline compliant 2026-10-15

//! Fire-watch entry point.
//!
//! Reads frames from the configured detection source, sounds the buzzer for
//! every fire detection above the confidence threshold and sends an SMS
//! alert. Runs until the source ends, the frame limit is reached, or CTRL+C.
//!
//! # Usage
//!
//! ```text
//! # Dry run on a workstation: random frames, logged buzzer and alerts
//! RUST_LOG=info FIRE_WATCH_BUZZER=log FIRE_WATCH_NOTIFIER=log cargo run
//!
//! # Replay a recording, stop after 500 frames
//! FIRE_WATCH_SOURCE=frames.jsonl FIRE_WATCH_MAX_FRAMES=500 \
//!     FIRE_WATCH_BUZZER=log FIRE_WATCH_NOTIFIER=log cargo run
//!
//! # On the Pi: camera detector, GPIO 18 buzzer, Twilio SMS
//! FIRE_WATCH_SOURCE=detector FIRE_WATCH_DETECTOR_CMD="python3 detect.py" \
//!     TWILIO_ACCOUNT_SID=AC... TWILIO_AUTH_TOKEN=... \
//!     TWILIO_FROM_NUMBER=+1... TWILIO_TO_NUMBER=+1... fire_watch
//! ```

mod adapters;
mod app;
mod settings;

use adapters::any::{AnyBuzzer, AnyNotifier, AnySource};
use alarm::AlarmController;
use anyhow::Context as _;
use settings::Settings;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use watcher::DetectionLoop;

/// How long runtime shutdown waits for blocking reads (stdin) to return.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let result = runtime.block_on(watch());
    // A pending stdin read holds a blocking-pool thread that cannot be
    // cancelled; do not wait for it.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn watch() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("failed to read settings")?;
    tracing::info!(
        source = ?settings.source,
        buzzer = ?settings.buzzer,
        pin = settings.buzzer_pin,
        threshold = %settings.watch.confidence_threshold,
        "main.start"
    );

    let notifier = AnyNotifier::new(&settings.notifier).context("failed to build notifier")?;
    let buzzer = AnyBuzzer::new(settings.buzzer, settings.buzzer_pin)
        .context("failed to select buzzer")?;
    let mut alarm = AlarmController::new(buzzer, settings.alarm);
    let fire_class = settings.watch.fire_class;
    let watcher = DetectionLoop::new(settings.watch);

    let cancel = CancellationToken::new();
    tokio::spawn(app::cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone()));

    let source = settings.source;
    let summary = app::run(
        &watcher,
        &mut alarm,
        || AnySource::open(&source, fire_class),
        &notifier,
        &cancel,
    )
    .await?;

    tracing::info!(
        frames = summary.frames,
        alerts = summary.alerts,
        stop = ?summary.stop,
        "main.exit"
    );
    Ok(())
}
