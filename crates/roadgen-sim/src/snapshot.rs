//! Drive loop snapshot and restore with BLAKE3 hashing.
//!
//! [`SimSnapshot`] holds everything that affects how the simulation
//! continues: the config, both track segments, the PCG generator state, the
//! vehicle, the camera, the tick counter and the held input. A BLAKE3 digest
//! over that state makes two runs comparable with a single string.
//!
//! # Usage
//!
//! ```
//! use roadgen_sim::prelude::*;
//!
//! let mut drive = DriveLoop::new(SimConfig::default()).unwrap();
//! drive.run_ticks(100);
//!
//! let snapshot = drive.capture_snapshot();
//! assert_eq!(snapshot.tick_counter, 100);
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! drive.run_ticks(100);
//! let later = drive.state_hash();
//!
//! drive.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(drive.tick_count(), 100);
//! drive.run_ticks(100);
//! assert_eq!(drive.state_hash(), later);
//! ```
//!
//! Diagnostics are transient and not part of a snapshot.

use roadgen_track::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::tick::{DriveLoop, InputFrame, SimConfig, TickDiagnostics};
use crate::vehicle::Vehicle;
use crate::SimError;

// ---------------------------------------------------------------------------
// SimSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of the full drive loop state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Loop configuration, including the track config.
    pub config: SimConfig,
    /// Segments A and B.
    pub segments: [CurveSegment; 2],
    /// Generator state for future rerolls.
    pub rng: SeededSource,
    /// Vehicle position and wheel.
    pub vehicle: Vehicle,
    /// Camera framing, zoom and shake.
    pub camera: Camera,
    /// Number of ticks executed at the time of capture.
    pub tick_counter: u64,
    /// Whether the vehicle was off-road.
    pub off_road: bool,
    /// Input held at the time of capture.
    pub current_input: InputFrame,
    /// BLAKE3 hex digest (64 lowercase hex chars) of all fields above.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HashableState<'a> {
    config: &'a SimConfig,
    segments: &'a [CurveSegment; 2],
    rng: &'a SeededSource,
    vehicle: &'a Vehicle,
    camera: &'a Camera,
    tick_counter: u64,
    off_road: bool,
    current_input: &'a InputFrame,
}

impl HashableState<'_> {
    fn digest(&self) -> String {
        let json_bytes =
            serde_json::to_vec(self).expect("simulation state should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

impl SimSnapshot {
    /// Recompute the digest from the snapshot's fields.
    pub fn compute_hash(&self) -> String {
        HashableState {
            config: &self.config,
            segments: &self.segments,
            rng: &self.rng,
            vehicle: &self.vehicle,
            camera: &self.camera,
            tick_counter: self.tick_counter,
            off_road: self.off_road,
            current_input: &self.current_input,
        }
        .digest()
    }

    /// Whether the stored hash matches the snapshot's contents.
    pub fn verify(&self) -> bool {
        self.compute_hash() == self.hash
    }
}

// ---------------------------------------------------------------------------
// DriveLoop snapshot/restore methods
// ---------------------------------------------------------------------------

impl DriveLoop {
    fn hashable(&self) -> HashableState<'_> {
        HashableState {
            config: &self.config,
            segments: self.track.segments(),
            rng: &self.rng,
            vehicle: &self.vehicle,
            camera: &self.camera,
            tick_counter: self.tick_counter,
            off_road: self.off_road,
            current_input: &self.current_input,
        }
    }

    /// Capture the full simulation state.
    pub fn capture_snapshot(&self) -> SimSnapshot {
        let hash = self.hashable().digest();
        SimSnapshot {
            config: self.config.clone(),
            segments: *self.track.segments(),
            rng: self.rng.clone(),
            vehicle: self.vehicle.clone(),
            camera: self.camera.clone(),
            tick_counter: self.tick_counter,
            off_road: self.off_road,
            current_input: self.current_input.clone(),
            hash,
        }
    }

    /// Restore the simulation from `snapshot`.
    ///
    /// The hash and the config are checked before anything is modified, so a
    /// failed restore leaves the loop untouched.
    ///
    /// # Errors
    ///
    /// - [`SimError::SnapshotHashMismatch`] if the contents were altered.
    /// - [`SimError::InvalidConfig`] or [`SimError::Track`] if the stored
    ///   config does not validate.
    /// - [`SimError::Track`] if the stored segments do not form a track.
    pub fn restore_from_snapshot(&mut self, snapshot: &SimSnapshot) -> Result<(), SimError> {
        let computed = snapshot.compute_hash();
        if computed != snapshot.hash {
            tracing::warn!(stored = %snapshot.hash, %computed, "snapshot hash mismatch");
            return Err(SimError::SnapshotHashMismatch {
                stored: snapshot.hash.clone(),
                computed,
            });
        }

        snapshot.config.validate()?;
        let [a, b] = snapshot.segments;
        self.track = TrackManager::from_segments(snapshot.config.track.clone(), a, b)?;
        self.config = snapshot.config.clone();
        self.rng = snapshot.rng.clone();
        self.vehicle = snapshot.vehicle.clone();
        self.camera = snapshot.camera.clone();
        self.tick_counter = snapshot.tick_counter;
        self.off_road = snapshot.off_road;
        self.current_input = snapshot.current_input.clone();
        self.last_diagnostics = TickDiagnostics::default();

        tracing::debug!(tick = self.tick_counter, "restored from snapshot");
        Ok(())
    }

    /// BLAKE3 digest of the current state, equal to `capture_snapshot().hash`.
    pub fn state_hash(&self) -> String {
        self.hashable().digest()
    }

    /// Capture a branch point. Identical to [`capture_snapshot`](Self::capture_snapshot).
    pub fn fork_snapshot(&self) -> SimSnapshot {
        self.capture_snapshot()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::Steering;

    fn drive() -> DriveLoop {
        DriveLoop::new(SimConfig {
            seed: 77,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn snapshot_hash_matches_state_hash() {
        let mut drive = drive();
        drive.run_ticks(25);
        let snapshot = drive.capture_snapshot();
        assert_eq!(snapshot.hash, drive.state_hash());
        assert!(snapshot.verify());
    }

    #[test]
    fn hash_changes_every_tick() {
        let mut drive = drive();
        let before = drive.state_hash();
        drive.tick();
        assert_ne!(before, drive.state_hash());
    }

    #[test]
    fn restore_then_rerun_is_identical() {
        let mut drive = drive();
        drive.set_input(InputFrame {
            steering: Steering::Left,
        });
        drive.run_ticks(50);
        let fork = drive.fork_snapshot();

        let first = drive.run_ticks(900);
        let first_hash = drive.state_hash();

        drive.restore_from_snapshot(&fork).unwrap();
        let second = drive.run_ticks(900);
        assert_eq!(first, second);
        assert_eq!(first_hash, drive.state_hash());
    }

    #[test]
    fn restore_onto_a_fresh_loop() {
        let mut source = drive();
        source.run_ticks(300);
        let snapshot = source.capture_snapshot();

        let mut target = DriveLoop::new(SimConfig::default()).unwrap();
        target.restore_from_snapshot(&snapshot).unwrap();
        assert_eq!(target.state_hash(), source.state_hash());
        assert_eq!(target.track(), source.track());
    }

    #[test]
    fn snapshot_survives_json() {
        let mut drive = drive();
        drive.run_ticks(40);
        let snapshot = drive.capture_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SimSnapshot = serde_json::from_str(&json).unwrap();
        assert!(back.verify());
        assert_eq!(back, snapshot);
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let mut drive = drive();
        drive.run_ticks(10);
        let mut snapshot = drive.capture_snapshot();
        snapshot.vehicle.cx += 1.0;

        drive.run_ticks(5);
        let hash_before = drive.state_hash();
        let err = drive.restore_from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, SimError::SnapshotHashMismatch { .. }));
        assert_eq!(drive.state_hash(), hash_before);
    }

    #[test]
    fn rehashed_snapshot_with_bad_config_is_rejected() {
        let mut drive = drive();
        drive.run_ticks(10);
        let mut snapshot = drive.capture_snapshot();
        snapshot.config.zoom_levels = (0.0, 1.4);
        snapshot.hash = snapshot.compute_hash();

        let hash_before = drive.state_hash();
        assert!(matches!(
            drive.restore_from_snapshot(&snapshot),
            Err(SimError::InvalidConfig { field: "zoom_levels", .. })
        ));
        assert_eq!(drive.state_hash(), hash_before);
    }

    #[test]
    fn rehashed_snapshot_with_detached_segments_is_rejected() {
        let mut drive = drive();
        drive.run_ticks(10);
        let mut snapshot = drive.capture_snapshot();
        snapshot.segments[1].origin.x += 3.0;
        snapshot.hash = snapshot.compute_hash();

        let hash_before = drive.state_hash();
        assert!(matches!(
            drive.restore_from_snapshot(&snapshot),
            Err(SimError::Track(TrackError::InvalidTrack { .. }))
        ));
        assert_eq!(drive.state_hash(), hash_before);
    }
}
