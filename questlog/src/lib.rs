//! # questlog - Session tracker for a polled game process
//!
//! questlog polls an emulator's memory at a fixed cadence and turns noisy byte
//! snapshots into a timestamped record of a play session: time spent in
//! menus, shops, encounters and on transport, the areas visited, which
//! milestones were completed or merely glimpsed, and how much currency was
//! spent and earned.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Emulator (RetroArch, UDP 55355)                 │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ READ_CORE_MEMORY
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    questlog (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │    Source    │──▶│   Sampler    │──▶│   Session    │         │
//! │  │ (UDP, retry) │   │ (fast/slow)  │   │ (detectors)  │         │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘         │
//! │                            │                  │ events          │
//! │                            ▼                  ▼                 │
//! │                     ┌──────────────┐   ┌──────────────┐         │
//! │                     │  Recording   │   │   Display    │         │
//! │                     │   (JSONL)    │   │   Export     │         │
//! │                     └──────────────┘   └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! ### Core Pipeline Modules
//!
//! - [`source`]: The [`source::MemorySource`] trait, the RetroArch client and
//!   a retry wrapper with exponential backoff
//! - [`sampling`]: Reads one tick's signals into an immutable
//!   [`sampling::Sample`]; short reads leave fields empty
//! - [`detect`]: Edge detectors and their guards
//!   - `timers`: menu/shop, encounter and transport timers
//!   - `formation`, `location`, `milestones`, `ledger`, `reset`
//! - [`session`]: [`session::RunState`], the append-only
//!   [`session::Timeline`] and the per-tick pipeline in [`session::Session`]
//! - [`driver`]: Cadence, polling loop, abandonment, replay
//!
//! ### Data and Output Modules
//!
//! - [`catalog`]: Lookup tables (names, milestone bits) loaded from JSON
//! - [`recording`]: JSON-lines sample recordings
//! - [`export`]: The run report
//! - [`display`]: Headless event printing
//! - [`cli`]: Command-line argument parsing
//! - [`domain`]: Core domain types and errors
//!
//! ## Cadences
//!
//! Timers and the dialog probe run every tick (50ms by default). Location,
//! milestones, currency and reset follow-up run every Nth tick, and once more
//! after the session finishes.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Track a session and write the report at the end
//! questlog --catalog catalog.json --export run.json
//!
//! # Record samples, then analyze them again later
//! questlog --catalog catalog.json --record run.jsonl
//! questlog --catalog catalog.json --replay run.jsonl
//! ```

// Expose modules for testing
pub mod catalog;
pub mod cli;
pub mod detect;
pub mod display;
pub mod domain;
pub mod driver;
pub mod export;
pub mod recording;
pub mod sampling;
pub mod session;
pub mod source;
