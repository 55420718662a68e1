// Rust guideline compliant 2026-10-14

//! JSON-lines adapter for the `DetectionSource` port.
//!
//! One line per frame: `{"detections":[{"class_id":0,"confidence":0.75}]}`.
//! A blank line is an empty frame. End of input ends the stream. Used to
//! replay recordings from a file or stdin, and as the decoder behind the
//! detector subprocess adapter.

use domain::{DetectionSource, Frame, InferenceError};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, BufReader, Lines};

/// Frames decoded from any buffered async reader.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line: u64,
}

impl<R: AsyncBufRead + Unpin> JsonLinesSource<R> {
    /// Decode frames from `reader`.
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line: 0 }
    }
}

impl JsonLinesSource<BufReader<tokio::fs::File>> {
    /// Replay a recording from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Io`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, InferenceError> {
        let file = std::fs::File::open(path)?;
        tracing::info!(path = %path.display(), "json_lines_source.open");
        Ok(Self::new(BufReader::new(tokio::fs::File::from_std(file))))
    }
}

impl JsonLinesSource<BufReader<tokio::io::Stdin>> {
    /// Read frames piped into the process.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

/// Decode one line; `line` is only used for error reporting.
fn decode(text: &str, line: u64) -> Result<Frame, InferenceError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Frame::default());
    }
    let frame: Frame = serde_json::from_str(text)
        .map_err(|e| InferenceError::Malformed { line, reason: e.to_string() })?;
    if let Some(bad) = frame.detections.iter().find(|d| !(0.0..=1.0).contains(&d.confidence)) {
        return Err(InferenceError::Malformed {
            line,
            reason: format!("confidence {} outside [0, 1]", bad.confidence),
        });
    }
    Ok(frame)
}

impl<R: AsyncBufRead + Unpin> DetectionSource for JsonLinesSource<R> {
    async fn next_frame(&mut self) -> Result<Option<Frame>, InferenceError> {
        let Some(text) = self.lines.next_line().await? else {
            tracing::debug!(lines = self.line, "json_lines_source.eof");
            return Ok(None);
        };
        self.line += 1;
        decode(&text, self.line).map(Some)
    }
}
