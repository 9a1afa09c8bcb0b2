//! Diagnostics and maintenance operations
//!
//! Bring-up and calibration helpers which depend on the core but are kept
//! outside its control contract: nothing here is invoked from the cyclic
//! processing path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use crate::hw::{CalibStore, DriveActuator, SteerActuator};
use crate::mech_driver::MechDriver;
use crate::module_ctrl::STEER_CALIB_KEYS;
use crate::swerve_ctrl::NUM_WHEELS;
use util::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of the raw steering sensor values and commanded targets, in
/// wheel order (FL, FR, RR, RL).
#[derive(Clone, Copy, Serialize, Debug)]
pub struct SteerSnapshot {
    /// Raw steering sensor values.
    pub raw_positions: [f64; NUM_WHEELS],

    /// Most recently commanded steering angles in degrees.
    pub target_angles_deg: [f64; NUM_WHEELS],
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Persist the current raw steering positions as the new zero positions.
///
/// The new zeros take effect at the next startup: a running module's zero
/// position is never changed.
pub fn calibrate_steer_zeros<D: DriveActuator, S: SteerActuator>(
    driver: &MechDriver<D, S>,
    store: &mut dyn CalibStore,
) {
    warn!("Calibrating steering zero positions");

    let raw_positions = driver.steer_raw_positions();

    for i in 0..NUM_WHEELS {
        store.put_f64(STEER_CALIB_KEYS[i], raw_positions[i]);
    }
}

/// Take a steering snapshot and save it into the session as JSON.
pub fn save_steer_snapshot<D: DriveActuator, S: SteerActuator>(
    session: &Session,
    driver: &MechDriver<D, S>,
) {
    let snapshot = SteerSnapshot {
        raw_positions: driver.steer_raw_positions(),
        target_angles_deg: driver.target_angles_deg(),
    };

    session.save_json("diag/steer_snapshot.json", &snapshot);
}

/// Drive a single wheel open loop. Bring-up testing only.
pub fn run_single_wheel<D: DriveActuator, S: SteerActuator>(
    driver: &mut MechDriver<D, S>,
    wheel: usize,
    power: f64,
) {
    warn!("Open loop test drive on wheel {} at power {}", wheel, power);
    driver.set_single_power(wheel, power);
}
