//! Input recording and deterministic replay.
//!
//! Steering is held across ticks, so a [`ReplayLog`] stores only the ticks
//! where the input *changed*, plus periodic state-hash checkpoints. Replaying
//! restores the initial snapshot, re-applies each input change on its tick
//! and compares hashes at every checkpoint.
//!
//! # Recording and replaying
//!
//! ```
//! use roadgen_sim::prelude::*;
//! use roadgen_sim::replay::{replay, ReplayRecorder};
//!
//! let mut drive = DriveLoop::new(SimConfig::default()).unwrap();
//! let mut recorder = ReplayRecorder::new(drive.capture_snapshot(), 30);
//!
//! for tick in 0..240u64 {
//!     let steering = if tick < 80 { Steering::Right } else { Steering::None };
//!     drive.set_input(InputFrame { steering });
//!     recorder.record(&drive);
//!     drive.tick();
//! }
//! let log = recorder.finish();
//!
//! let mut fresh = DriveLoop::new(SimConfig::default()).unwrap();
//! let result = replay(&mut fresh, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(fresh.state_hash(), drive.state_hash());
//! ```

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::snapshot::SimSnapshot;
use crate::tick::{DriveEvent, DriveLoop, InputFrame};

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A recorded run: the starting state, input changes and checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// State the run started from.
    pub initial_snapshot: SimSnapshot,
    /// Number of ticks executed after the snapshot.
    pub total_ticks: u64,
    /// Input changes and checkpoints in tick order.
    pub entries: Vec<ReplayEntry>,
}

/// One entry of a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// The held input changed to `input` before `tick` ran.
    Input {
        /// Tick the new input first applies to.
        tick: u64,
        /// The new input.
        input: InputFrame,
    },
    /// State hash before `tick` ran (after its input was applied).
    Checkpoint {
        /// Tick of the checkpoint.
        tick: u64,
        /// BLAKE3 hex digest at that point.
        state_hash: String,
    },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// Outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every recorded tick was replayed.
    pub completed: bool,
    /// Ticks executed before stopping.
    pub ticks_replayed: u64,
    /// The first checkpoint that did not match, if any.
    pub first_divergence: Option<ReplayDivergence>,
    /// Events produced by the replayed ticks.
    pub events: Vec<DriveEvent>,
}

/// A checkpoint whose hash differed on replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    /// Tick of the checkpoint.
    pub tick: u64,
    /// Hash stored in the log.
    pub expected_hash: String,
    /// Hash computed during replay.
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayLog`] while a [`DriveLoop`] runs.
///
/// Call [`record`](Self::record) once per tick, after setting that tick's
/// input and before calling [`DriveLoop::tick`].
pub struct ReplayRecorder {
    log: ReplayLog,
    checkpoint_interval: u64,
    held: InputFrame,
    last_tick: Option<u64>,
}

impl ReplayRecorder {
    /// Start recording from `snapshot`.
    ///
    /// A checkpoint is written every `checkpoint_interval` ticks, counted on
    /// the loop's absolute tick number. Zero disables checkpoints.
    pub fn new(snapshot: SimSnapshot, checkpoint_interval: u64) -> Self {
        let held = snapshot.current_input.clone();
        Self {
            log: ReplayLog {
                initial_snapshot: snapshot,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            held,
            last_tick: None,
        }
    }

    /// Record the tick `drive` is about to run.
    ///
    /// # Panics
    ///
    /// Panics if the loop's tick number did not advance since the last call.
    pub fn record(&mut self, drive: &DriveLoop) {
        let tick = drive.tick_count();
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ticks must be recorded in increasing order: {tick} after {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.log.total_ticks += 1;

        let input = drive.current_input();
        if *input != self.held {
            self.held = input.clone();
            self.log.entries.push(ReplayEntry::Input {
                tick,
                input: input.clone(),
            });
        }

        if self.checkpoint_interval > 0 && tick % self.checkpoint_interval == 0 {
            self.log.entries.push(ReplayEntry::Checkpoint {
                tick,
                state_hash: drive.state_hash(),
            });
        }
    }

    /// Stop recording and return the log.
    pub fn finish(self) -> ReplayLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `drive` and check every checkpoint.
///
/// Stops at the first divergence, reporting how many ticks ran.
///
/// # Errors
///
/// Fails without touching `drive` if the log has two entries of the same
/// kind on one tick, or if its tick range overflows. Fails if the initial
/// snapshot cannot be restored.
pub fn replay(drive: &mut DriveLoop, log: &ReplayLog) -> Result<ReplayResult, anyhow::Error> {
    let mut inputs: BTreeMap<u64, &InputFrame> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();
    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { tick, input } => {
                if inputs.insert(*tick, input).is_some() {
                    bail!("replay log has two input changes at tick {tick}");
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoints.insert(*tick, state_hash).is_some() {
                    bail!("replay log has two checkpoints at tick {tick}");
                }
            }
        }
    }

    let start = log.initial_snapshot.tick_counter;
    let Some(end) = start.checked_add(log.total_ticks) else {
        bail!(
            "replay range overflows: start {start} + {} ticks",
            log.total_ticks
        );
    };

    drive
        .restore_from_snapshot(&log.initial_snapshot)
        .context("restoring the initial replay snapshot")?;

    let mut events = Vec::new();
    let mut ticks_replayed = 0;
    for tick in start..end {
        if let Some(input) = inputs.get(&tick) {
            drive.set_input((*input).clone());
        }

        if let Some(expected) = checkpoints.get(&tick) {
            let actual = drive.state_hash();
            if actual != *expected {
                tracing::warn!(tick, expected, actual = %actual, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    ticks_replayed,
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: (*expected).to_owned(),
                        actual_hash: actual,
                    }),
                    events,
                });
            }
        }

        events.extend(drive.tick());
        ticks_replayed += 1;
    }

    Ok(ReplayResult {
        completed: true,
        ticks_replayed,
        first_divergence: None,
        events,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
