//! Polling loop
//!
//! The driver owns cadence and ordering: it is the only caller of the
//! [`Sampler`], decides which ticks are slow, stamps every sample with a
//! timestamp and hands it to the current [`Session`]. A seed change discards
//! the session and starts a new one from the same sample.

use log::{debug, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use crate::catalog::Catalog;
use crate::domain::{Duration, FinalizeError, SourceError, Timestamp};
use crate::export::RunSummary;
use crate::recording::{RecordedTick, SampleRecorder};
use crate::sampling::{Sample, Sampler};
use crate::session::{Session, SessionEvent};
use crate::source::MemorySource;

/// Fast tick interval plus the slow-cadence divisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub interval: Duration,
    /// Every Nth tick also reads the slow block
    pub slow_every: u32,
}

impl Default for Cadence {
    fn default() -> Self {
        Self { interval: Duration::from_millis(50), slow_every: 10 }
    }
}

impl Cadence {
    /// Tick 0 is always slow so the first sample is complete.
    #[must_use]
    pub fn is_slow_tick(&self, tick: u64) -> bool {
        self.slow_every <= 1 || tick % u64::from(self.slow_every) == 0
    }
}

/// Why the live loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished,
    Interrupted,
    DurationLimit,
}

/// Feed one sample to the session, abandoning it on a seed change.
pub fn apply_sample(
    session: &mut Session,
    catalog: &Catalog,
    sample: &Sample,
    now: Timestamp,
) -> Vec<SessionEvent> {
    let mut events = session.on_tick(catalog, sample, now);
    if events.iter().any(|e| matches!(e, SessionEvent::SeedChanged { .. })) {
        info!("Abandoning session after seed change");
        *session = Session::new(now);
        events.push(SessionEvent::Abandoned);
        events.push(SessionEvent::Started);
        events.extend(session.on_tick(catalog, sample, now));
    }
    events
}

/// Live tracker: sampler, catalog and current session
pub struct Tracker<S> {
    sampler: Sampler<S>,
    catalog: Catalog,
    session: Session,
    cadence: Cadence,
    tick: u64,
    recorder: Option<SampleRecorder<BufWriter<File>>>,
}

impl<S: MemorySource> Tracker<S> {
    pub fn new(source: S, catalog: Catalog, cadence: Cadence, started_at: Timestamp) -> Self {
        Self {
            sampler: Sampler::new(source),
            catalog,
            session: Session::new(started_at),
            cadence,
            tick: 0,
            recorder: None,
        }
    }

    #[must_use]
    pub fn with_recorder(mut self, recorder: SampleRecorder<BufWriter<File>>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Sample once and run the session's detectors.
    ///
    /// # Errors
    /// Returns the transport error if the read failed; the session is untouched.
    pub fn step(&mut self, now: Timestamp) -> Result<Vec<SessionEvent>, SourceError> {
        let slow = self.cadence.is_slow_tick(self.tick);
        self.tick += 1;

        let encounter_active = self.session.state().encounter.is_active();
        let sample = self.sampler.sample(&self.catalog, slow, encounter_active)?;
        self.record(now, &sample);
        Ok(apply_sample(&mut self.session, &self.catalog, &sample, now))
    }

    /// Do the end-of-session slow read and build the report.
    ///
    /// # Errors
    /// See [`Session::finalize`]. The session is kept either way.
    pub fn finalize(&mut self, now: Timestamp) -> Result<RunSummary, FinalizeError> {
        let read = self.sampler.sample_slow();
        if let Ok(slow) = &read {
            let tick = Sample { fast: Default::default(), slow: Some(slow.clone()) };
            self.record(now, &tick);
        }
        if let Some(recorder) = &mut self.recorder {
            if let Err(e) = recorder.flush() {
                warn!("Failed to flush recording: {e}");
            }
        }
        self.session.finalize(&self.catalog, read)
    }

    fn record(&mut self, now: Timestamp, sample: &Sample) {
        if let Some(recorder) = &mut self.recorder {
            if let Err(e) = recorder.record(now, sample) {
                warn!("Recording stopped: {e}");
                self.recorder = None;
            }
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn short_reads(&self) -> u64 {
        self.sampler.short_reads
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

fn millis_since(origin: Instant) -> Timestamp {
    Timestamp(u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX))
}

/// Poll until the session finishes, Ctrl+C, or the duration limit.
///
/// Failed reads are logged and the tick is skipped. `on_events` sees every
/// non-empty batch of events together with the session that produced them.
pub async fn run_live<S, F>(
    tracker: &mut Tracker<S>,
    duration_limit: Option<std::time::Duration>,
    origin: Instant,
    mut on_events: F,
) -> RunOutcome
where
    S: MemorySource,
    F: FnMut(&[SessionEvent], &Session),
{
    let interval = std::time::Duration::from_millis(tracker.cadence.interval.as_millis());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut failed_reads: u64 = 0;
    loop {
        if let Some(limit) = duration_limit {
            if origin.elapsed() >= limit {
                return RunOutcome::DurationLimit;
            }
        }

        match tracker.step(millis_since(origin)) {
            Ok(events) => {
                if failed_reads > 0 {
                    info!("Reads recovered after {failed_reads} failures");
                    failed_reads = 0;
                }
                if !events.is_empty() {
                    on_events(&events, tracker.session());
                }
                if tracker.session().is_finished() {
                    return RunOutcome::Finished;
                }
            }
            Err(e) => {
                failed_reads += 1;
                if failed_reads == 1 {
                    warn!("Skipping tick: {e}");
                } else {
                    debug!("Skipping tick ({failed_reads} in a row): {e}");
                }
            }
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = &mut ctrl_c => {
                return RunOutcome::Interrupted;
            }
        }
    }
}

/// Run a recording through a fresh session.
///
/// The session starts at the clock origin, as a live session does, so
/// elapsed times match the recorded run. A slow read recorded after the
/// finish is used as the final read.
pub fn replay<I, F>(catalog: &Catalog, ticks: I, mut on_events: F) -> Session
where
    I: IntoIterator<Item = RecordedTick>,
    F: FnMut(&[SessionEvent], &Session),
{
    let mut session = Session::new(Timestamp(0));
    let mut final_read = None;

    for tick in ticks {
        if session.is_finished() {
            if tick.sample.slow.is_some() {
                final_read = tick.sample.slow;
            }
            continue;
        }
        let events = apply_sample(&mut session, catalog, &tick.sample, tick.at);
        if !events.is_empty() {
            on_events(&events, &session);
        }
    }

    if let Some(slow) = final_read {
        if let Err(e) = session.finalize(catalog, Ok(slow)) {
            warn!("Replay finalize failed: {e}");
        }
    }
    session
}
