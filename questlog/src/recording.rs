//! Sample recording and playback
//!
//! A recording is JSON lines, one `{"at": <ms>, "sample": {...}}` object per
//! tick, in the order the samples were taken. Replaying a recording through a
//! fresh session reproduces the live run exactly, since detectors depend on
//! nothing but the samples and their timestamps.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::domain::{RecordingError, Timestamp};
use crate::sampling::Sample;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedTick {
    pub at: Timestamp,
    pub sample: Sample,
}

#[derive(Serialize)]
struct RecordedTickRef<'a> {
    at: Timestamp,
    sample: &'a Sample,
}

/// Appends ticks to a JSON-lines recording
pub struct SampleRecorder<W: Write> {
    writer: W,
    ticks: u64,
}

impl SampleRecorder<BufWriter<File>> {
    /// Create (or truncate) a recording file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> SampleRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, ticks: 0 }
    }

    /// Append one tick.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn record(&mut self, at: Timestamp, sample: &Sample) -> Result<(), RecordingError> {
        serde_json::to_writer(&mut self.writer, &RecordedTickRef { at, sample })?;
        self.writer.write_all(b"\n")?;
        self.ticks += 1;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the underlying writer fails to flush.
    pub fn flush(&mut self) -> Result<(), RecordingError> {
        self.writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Read every tick of a recording. Blank lines are skipped.
///
/// # Errors
/// Returns an error on I/O failure or on the first line that does not parse,
/// reporting its 1-based line number.
pub fn read_recording<R: BufRead>(reader: R) -> Result<Vec<RecordedTick>, RecordingError> {
    let mut ticks = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let tick = serde_json::from_str(&line)
            .map_err(|error| RecordingError::InvalidLine { line: index + 1, error })?;
        ticks.push(tick);
    }
    Ok(ticks)
}
