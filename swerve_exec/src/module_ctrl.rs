//! Swerve module controller
//!
//! A module is one wheel's independent drive and steer actuator pair. The
//! controller owns the actuator handles, tracks the drive position baseline
//! and converts steering angle targets into continuous position setpoints
//! with shortest-path wraparound.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use crate::hw::{CalibStore, DriveActuator, SteerActuator};
use crate::swerve_ctrl::NUM_WHEELS;
use util::maths::wrap_degrees;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Calibration store keys for the steering zero positions, in wheel order
/// (FL, FR, RR, RL).
pub const STEER_CALIB_KEYS: [&str; NUM_WHEELS] = [
    "steer_zero_fl",
    "steer_zero_fr",
    "steer_zero_rr",
    "steer_zero_rl",
];

/// Value returned by the calibration store when a key is absent. A stored
/// zero position can never legitimately take this value.
pub const CALIB_SENTINEL: f64 = -1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Controller for a single swerve module.
pub struct SwerveModule<D, S> {
    drive: D,
    steer: S,

    /// Baseline subtracted from the raw drive position, captured by
    /// `reset_drive_position`.
    drive_zero_position: f64,

    /// Raw steering position at which the wheel points straight ahead.
    /// Immutable for the lifetime of the module.
    steer_zero_position: f64,

    /// Steering sensor ticks per full steering revolution.
    steer_ticks_per_rev: f64,

    /// The steering angle most recently commanded, in degrees.
    target_angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: DriveActuator, S: SteerActuator> SwerveModule<D, S> {
    /// Create a new module with the given steering zero position.
    ///
    /// The steering actuator is commanded to its zero position so the wheel
    /// starts the session pointing straight ahead.
    pub fn new(drive: D, mut steer: S, steer_zero_position: f64, steer_ticks_per_rev: f64) -> Self {
        steer.set_position_setpoint(steer_zero_position);

        Self {
            drive,
            steer,
            drive_zero_position: 0.0,
            steer_zero_position,
            steer_ticks_per_rev,
            target_angle_deg: 0.0,
        }
    }

    /// Create a new module, loading its steering zero position from the
    /// calibration store.
    ///
    /// A missing calibration value is not fatal: the module degrades to a
    /// zero offset and the condition is reported as a warning.
    pub fn from_calib(
        drive: D,
        steer: S,
        store: &dyn CalibStore,
        key: &str,
        steer_ticks_per_rev: f64,
    ) -> Self {
        let mut zero_position = store.get_f64(key, CALIB_SENTINEL);

        if zero_position == CALIB_SENTINEL {
            warn!(
                "Failed to get steering zero position \"{}\" from the calibration store, \
                 continuing uncalibrated",
                key
            );
            zero_position = 0.0;
        }

        Self::new(drive, steer, zero_position, steer_ticks_per_rev)
    }

    /// Capture the current raw drive position as the new zero baseline.
    pub fn reset_drive_position(&mut self) {
        self.drive_zero_position = self.drive.position();
    }

    /// The drive position relative to the last reset, in raw sensor units.
    pub fn drive_position(&self) -> f64 {
        self.drive.position() - self.drive_zero_position
    }

    /// Set the open loop drive power.
    ///
    /// `power` must be in [-1, +1]; values outside this range are the
    /// caller's responsibility.
    pub fn set_power(&mut self, power: f64) {
        self.drive.set_power(power);
    }

    /// The drive actuator velocity, in raw sensor units per cycle.
    /// Diagnostic use only.
    pub fn drive_velocity(&self) -> f64 {
        self.drive.velocity()
    }

    /// The current steering angle in degrees.
    ///
    /// Unbounded: the value can leave [0, 360) after repeated full rotations
    /// of the steering axis.
    pub fn angle_deg(&self) -> f64 {
        (self.steer.position() - self.steer_zero_position) / self.steer_ticks_per_rev * 360.0
    }

    /// Command the steering actuator to the target angle via the shortest
    /// rotation.
    ///
    /// Orientations are only defined modulo 360 degrees and the direction of
    /// rotation is free, so the actuator must never traverse more than half
    /// a revolution to reach a target.
    pub fn set_angle(&mut self, target_angle_deg: f64) {
        let angle_diff = wrap_degrees(target_angle_deg - self.angle_deg());
        let adjusted_deg = self.angle_deg() + angle_diff;

        let target_position =
            adjusted_deg / 360.0 * self.steer_ticks_per_rev + self.steer_zero_position;
        self.steer.set_position_setpoint(target_position);

        self.target_angle_deg = adjusted_deg;
    }

    /// The steering angle most recently commanded, in degrees.
    pub fn target_angle_deg(&self) -> f64 {
        self.target_angle_deg
    }

    /// The raw steering sensor value, used externally to persist a new zero
    /// position.
    pub fn steer_raw_position(&self) -> f64 {
        self.steer.position()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hw::sim::{MemCalibStore, SimDriveActuator, SimSteerActuator};

    const TICKS_PER_REV: f64 = 1024.0;

    fn test_module(
        steer_zero: f64,
        initial_angle_deg: f64,
    ) -> SwerveModule<SimDriveActuator, SimSteerActuator> {
        let steer = SimSteerActuator::new(initial_angle_deg / 360.0 * TICKS_PER_REV + steer_zero);
        let mut module =
            SwerveModule::new(SimDriveActuator::new(), steer.clone(), steer_zero, TICKS_PER_REV);

        // Undo the construction-time move to zero so the module starts at the
        // requested angle
        let mut steer = steer;
        steer.set_position_setpoint(initial_angle_deg / 360.0 * TICKS_PER_REV + steer_zero);
        module.target_angle_deg = initial_angle_deg;

        module
    }

    #[test]
    fn test_set_angle_shortest_path() {
        // For any combination of current and target angle the actuator delta
        // must not exceed half a revolution, and the reached orientation must
        // match the target modulo 360.
        for current in (-720..=720).step_by(45) {
            for target in (-720..=720).step_by(45) {
                let mut module = test_module(512.0, current as f64);

                let before = module.steer_raw_position();
                module.set_angle(target as f64);
                let after = module.steer_raw_position();

                let delta_deg = (after - before) / TICKS_PER_REV * 360.0;
                assert!(
                    delta_deg.abs() <= 180.0 + 1e-9,
                    "delta {} too large for current {} target {}",
                    delta_deg,
                    current,
                    target
                );

                let orientation_err = wrap_degrees(module.angle_deg() - target as f64);
                assert!(
                    orientation_err.abs() < 1e-9,
                    "orientation error {} for current {} target {}",
                    orientation_err,
                    current,
                    target
                );
            }
        }
    }

    #[test]
    fn test_set_angle_wraps_through_zero() {
        // 350 -> 10 degrees is a +20 rotation, not a -340 one
        let mut module = test_module(512.0, 350.0);

        module.set_angle(10.0);

        assert!((module.angle_deg() - 370.0).abs() < 1e-9);
    }

    #[test]
    fn test_drive_position_baseline() {
        let drive = SimDriveActuator::new();
        let mut module =
            SwerveModule::new(drive.clone(), SimSteerActuator::new(0.0), 0.0, TICKS_PER_REV);

        module.set_power(1.0);
        drive.step(100.0);
        drive.step(100.0);
        assert!((module.drive_position() - 200.0).abs() < 1e-9);

        module.reset_drive_position();
        assert!(module.drive_position().abs() < 1e-9);

        drive.step(100.0);
        assert!((module.drive_position() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_calibration_degrades_to_zero() {
        let store = MemCalibStore::default();

        let module = SwerveModule::from_calib(
            SimDriveActuator::new(),
            SimSteerActuator::new(0.0),
            &store,
            STEER_CALIB_KEYS[0],
            TICKS_PER_REV,
        );

        assert_eq!(module.steer_zero_position, 0.0);
        assert!(module.angle_deg().abs() < 1e-9);
    }

    #[test]
    fn test_calibrated_zero_applied() {
        let mut store = MemCalibStore::default();
        store.put_f64(STEER_CALIB_KEYS[1], 256.0);

        let steer = SimSteerActuator::new(256.0);
        let module = SwerveModule::from_calib(
            SimDriveActuator::new(),
            steer,
            &store,
            STEER_CALIB_KEYS[1],
            TICKS_PER_REV,
        );

        // At the calibrated zero the wheel reads straight ahead
        assert!(module.angle_deg().abs() < 1e-9);
    }
}
