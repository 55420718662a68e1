// Rust guideline compliant 2026-10-14

//! Detector subprocess adapter for the `DetectionSource` port.
//!
//! Spawns an external object detector that reads the camera itself and
//! prints one JSON frame per line on stdout (see `json_lines_source`). The
//! detector is invoked as
//! `<program> [extra args...] --source <video> --imgsz <n> --conf <floor>`
//! and is killed when the source is dropped.

use super::json_lines_source::JsonLinesSource;
use domain::{DetectionSource, Frame, InferenceError};
use std::process::Stdio;
use tokio::io::BufReader;
use tokio::process::{Child, ChildStdout, Command};

/// How to launch the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorCommand {
    /// Executable to run.
    pub program: String,
    /// Arguments placed before the standard ones (e.g. a script path).
    pub extra_args: Vec<String>,
    /// Video input identifier; `"0"` is the first camera.
    pub video_source: String,
    /// Square inference resolution in pixels.
    pub image_size: u32,
    /// Detector-side confidence floor.
    pub confidence_floor: f32,
}

impl DetectorCommand {
    /// Full argument list passed to `program`.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend([
            "--source".to_owned(),
            self.video_source.clone(),
            "--imgsz".to_owned(),
            self.image_size.to_string(),
            "--conf".to_owned(),
            self.confidence_floor.to_string(),
        ]);
        args
    }
}

/// Frames read from a running detector process.
#[derive(Debug)]
pub struct DetectorProcessSource {
    child: Child,
    frames: JsonLinesSource<BufReader<ChildStdout>>,
}

impl DetectorProcessSource {
    /// Start the detector.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Io`] when the process cannot be spawned.
    pub fn spawn(command: &DetectorCommand) -> Result<Self, InferenceError> {
        let mut child = Command::new(&command.program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("detector stdout was not captured"))?;
        tracing::info!(
            program = %command.program,
            pid = child.id(),
            video_source = %command.video_source,
            image_size = command.image_size,
            "detector_process.spawned"
        );
        Ok(Self { child, frames: JsonLinesSource::new(BufReader::new(stdout)) })
    }
}

impl DetectionSource for DetectorProcessSource {
    /// Next frame from the detector's stdout.
    ///
    /// When stdout closes, the exit status decides: success ends the stream,
    /// anything else is an error.
    async fn next_frame(&mut self) -> Result<Option<Frame>, InferenceError> {
        if let Some(frame) = self.frames.next_frame().await? {
            return Ok(Some(frame));
        }
        let status = self.child.wait().await?;
        if status.success() {
            tracing::info!("detector_process.finished");
            Ok(None)
        } else {
            Err(InferenceError::ProcessExited { status: status.to_string() })
        }
    }
}
