//! Sampling: raw memory reads to immutable per-tick snapshots

pub mod sample;
pub mod sampler;

pub use sample::{DialogState, FastSample, Sample, SlowSample, TerminalSignals};
pub use sampler::Sampler;
