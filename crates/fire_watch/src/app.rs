// Rust guideline compliant 2026-10-15

//! Startup and shutdown ordering around the detection loop.
//!
//! The alarm pin is claimed before the source is opened, and released exactly
//! once after the loop ends, whatever the reason.

use alarm::AlarmController;
use anyhow::Context as _;
use domain::{DetectionSource, InferenceError, Notifier, PwmPin};
use tokio_util::sync::CancellationToken;
use watcher::{DetectionLoop, RunSummary};

/// Initialize `alarm`, open the source, run `watcher` until it stops, then
/// shut the alarm down.
///
/// The source is only opened once the alarm is running, so a pin that cannot
/// be claimed never starts a detector.
///
/// # Errors
///
/// Returns the initialization error, the source-open or loop error, or the
/// release error, in that order of precedence. A release failure after a
/// loop failure is logged, not returned.
pub async fn run<S, P, N, F>(
    watcher: &DetectionLoop,
    alarm: &mut AlarmController<P>,
    open_source: F,
    notifier: &N,
    cancel: &CancellationToken,
) -> anyhow::Result<RunSummary>
where
    S: DetectionSource,
    P: PwmPin,
    N: Notifier,
    F: FnOnce() -> Result<S, InferenceError>,
{
    alarm.initialize().context("failed to initialize alarm")?;

    let outcome = async {
        let mut source = open_source().context("failed to open detection source")?;
        tracing::info!("app.source.opened");
        watcher
            .run(&mut source, alarm, notifier, cancel)
            .await
            .context("detection loop failed")
    }
    .await;

    let released = alarm.shutdown();
    if let Err(e) = &released {
        tracing::error!(error = %e, "app.shutdown.failed");
    }

    let summary = outcome?;
    released.context("failed to release alarm")?;
    Ok(summary)
}

/// Cancel `cancel` once `interrupt` resolves, e.g. `tokio::signal::ctrl_c()`.
///
/// If the interrupt handler cannot be installed the run keeps going without
/// interrupt support; the failure is logged and the token is left alone.
pub async fn cancel_on_interrupt<F>(interrupt: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match interrupt.await {
        Ok(()) => {
            tracing::info!("app.interrupt: ctrl_c received");
            cancel.cancel();
        }
        Err(e) => tracing::error!(error = %e, "app.interrupt.unavailable"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{cancel_on_interrupt, run};
    use alarm::{AlarmConfig, AlarmController, Lifecycle};
    use domain::{
        AlarmError, Detection, DetectionSource, DutyCycle, Frame, InferenceError, MessageId,
        NotificationError, Notifier, PwmPin,
    };
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use watcher::{DetectionLoop, StopReason, WatchConfig};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum PinCall {
        Start(DutyCycle),
        Duty(DutyCycle),
        Stop,
    }

    type Journal = Rc<RefCell<Vec<PinCall>>>;

    #[derive(Debug)]
    struct FakePin {
        calls: Journal,
        fail_start: bool,
    }

    impl PwmPin for FakePin {
        fn start(&mut self, _frequency_hz: f64, duty: DutyCycle) -> Result<(), AlarmError> {
            if self.fail_start {
                return Err(AlarmError::DeviceInit { pin: 18, reason: "busy".to_owned() });
            }
            self.calls.borrow_mut().push(PinCall::Start(duty));
            Ok(())
        }

        fn set_duty_cycle(&mut self, duty: DutyCycle) -> Result<(), AlarmError> {
            self.calls.borrow_mut().push(PinCall::Duty(duty));
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AlarmError> {
            self.calls.borrow_mut().push(PinCall::Stop);
            Ok(())
        }
    }

    struct Frames(VecDeque<Frame>);

    impl DetectionSource for Frames {
        async fn next_frame(&mut self) -> Result<Option<Frame>, InferenceError> {
            Ok(self.0.pop_front())
        }
    }

    struct Hanging;

    impl DetectionSource for Hanging {
        async fn next_frame(&mut self) -> Result<Option<Frame>, InferenceError> {
            std::future::pending().await
        }
    }

    struct Sms {
        fail: bool,
    }

    impl Notifier for Sms {
        async fn send_alert(&self, _body: &str) -> Result<MessageId, NotificationError> {
            if self.fail {
                Err(NotificationError::Transport { reason: "offline".to_owned() })
            } else {
                Ok(MessageId("SM1".to_owned()))
            }
        }
    }

    fn controller(fail_start: bool) -> (AlarmController<FakePin>, Journal) {
        let calls = Journal::default();
        let pin = FakePin { calls: Rc::clone(&calls), fail_start };
        (AlarmController::new(pin, AlarmConfig::builder().build().unwrap()), calls)
    }

    fn watcher() -> DetectionLoop {
        DetectionLoop::new(WatchConfig::builder().build().unwrap())
    }

    fn fire_scenario() -> Frames {
        Frames(VecDeque::from([
            Frame::new(vec![Detection { class_id: 2, confidence: 0.9 }]),
            Frame::new(vec![Detection { class_id: 0, confidence: 0.75 }]),
            Frame::default(),
        ]))
    }

    fn stops(calls: &Journal) -> usize {
        calls.borrow().iter().filter(|c| **c == PinCall::Stop).count()
    }

    fn idle() -> DutyCycle {
        DutyCycle::new(50).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn normal_exit_releases_pin_once() {
        let (mut alarm, calls) = controller(false);
        let cancel = CancellationToken::new();
        let sms = Sms { fail: false };

        let summary = run(&watcher(), &mut alarm, || Ok(fire_scenario()), &sms, &cancel)
            .await
            .unwrap();

        assert_eq!(
            (summary.frames, summary.alerts, summary.stop),
            (3, 1, StopReason::SourceExhausted)
        );
        assert_eq!(alarm.lifecycle(), Lifecycle::ShutDown);
        drop(alarm);
        assert_eq!(
            *calls.borrow(),
            [
                PinCall::Start(idle()),
                PinCall::Duty(DutyCycle::FULL),
                PinCall::Duty(DutyCycle::OFF),
                PinCall::Duty(DutyCycle::OFF),
                PinCall::Stop,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_mid_alarm_silences_and_releases() {
        let (mut alarm, calls) = controller(false);
        let cancel = CancellationToken::new();
        let fire = Frame::new(vec![Detection { class_id: 0, confidence: 0.9 }]);
        let frames = Frames(VecDeque::from([fire]));
        let watch = watcher();
        let sms = Sms { fail: false };

        let (result, ()) = tokio::join!(
            run(&watch, &mut alarm, || Ok(frames), &sms, &cancel),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                cancel.cancel();
            }
        );

        let summary = result.unwrap();
        assert_eq!(summary.stop, StopReason::Interrupted);
        assert_eq!(summary.alerts, 0);
        drop(alarm);
        assert_eq!(
            *calls.borrow(),
            [
                PinCall::Start(idle()),
                PinCall::Duty(DutyCycle::FULL),
                PinCall::Duty(DutyCycle::OFF),
                PinCall::Stop,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_while_waiting_releases_pin() {
        let (mut alarm, calls) = controller(false);
        let cancel = CancellationToken::new();

        let watch = watcher();
        let sms = Sms { fail: false };

        let (result, ()) = tokio::join!(
            run(&watch, &mut alarm, || Ok(Hanging), &sms, &cancel),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                cancel.cancel();
            }
        );

        assert_eq!(result.unwrap().stop, StopReason::Interrupted);
        drop(alarm);
        assert_eq!(stops(&calls), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notifier_failure_still_releases_pin() {
        let (mut alarm, calls) = controller(false);
        let cancel = CancellationToken::new();
        let sms = Sms { fail: true };

        let err = run(&watcher(), &mut alarm, || Ok(fire_scenario()), &sms, &cancel)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("offline"), "{err:#}");
        drop(alarm);
        assert_eq!(stops(&calls), 1);
    }

    #[tokio::test]
    async fn source_open_failure_releases_pin() {
        let (mut alarm, calls) = controller(false);
        let cancel = CancellationToken::new();

        let err = run::<Frames, _, _, _>(
            &watcher(),
            &mut alarm,
            || Err(InferenceError::Io(std::io::Error::other("no camera"))),
            &Sms { fail: false },
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(format!("{err:#}").contains("failed to open detection source"), "{err:#}");
        drop(alarm);
        assert_eq!(
            *calls.borrow(),
            [PinCall::Start(idle()), PinCall::Duty(DutyCycle::OFF), PinCall::Stop]
        );
    }

    #[tokio::test]
    async fn init_failure_never_opens_source() {
        let (mut alarm, calls) = controller(true);
        let cancel = CancellationToken::new();
        let opened = RefCell::new(false);

        let err = run(
            &watcher(),
            &mut alarm,
            || {
                *opened.borrow_mut() = true;
                Ok(fire_scenario())
            },
            &Sms { fail: false },
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(format!("{err:#}").contains("cannot claim alarm pin 18"), "{err:#}");
        assert!(!*opened.borrow());
        drop(alarm);
        assert!(calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn interrupt_cancels_the_run() {
        let cancel = CancellationToken::new();
        cancel_on_interrupt(async { Ok(()) }, cancel.clone()).await;
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_interrupt_handler_keeps_monitoring() {
        let (mut alarm, calls) = controller(false);
        let cancel = CancellationToken::new();
        let sms = Sms { fail: false };

        cancel_on_interrupt(
            async { Err(std::io::Error::other("signal handler unavailable")) },
            cancel.clone(),
        )
        .await;
        assert!(!cancel.is_cancelled());

        let summary = run(&watcher(), &mut alarm, || Ok(fire_scenario()), &sms, &cancel)
            .await
            .unwrap();
        assert_eq!(summary.stop, StopReason::SourceExhausted);
        assert_eq!(summary.alerts, 1);
        drop(alarm);
        assert_eq!(stops(&calls), 1);
    }
}
