//! # Mechanisms driver module
//!
//! Applies wheel command sets to the four swerve module controllers. This is
//! the hardware binding boundary of the control core: everything below it is
//! an external collaborator reached through the `hw` contracts.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Deserialize;

// Internal
use crate::hw::{DriveActuator, SteerActuator};
use crate::module_ctrl::SwerveModule;
use crate::swerve_ctrl::{WheelCommand, NUM_WHEELS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Driver for the four wheel modules.
pub struct MechDriver<D, S> {
    modules: [SwerveModule<D, S>; NUM_WHEELS],
}

/// Parameters for the mechanisms driver.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Steering sensor ticks per full steering revolution.
    pub steer_ticks_per_rev: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: DriveActuator, S: SteerActuator> MechDriver<D, S> {
    pub fn new(modules: [SwerveModule<D, S>; NUM_WHEELS]) -> Self {
        Self { modules }
    }

    /// Apply a wheel command set to the modules.
    ///
    /// # Notes
    /// - If `safe_mode` is true drive power is zeroed and the steering is
    ///   held so that no driving is performed.
    /// - Wheels with a zero speed demand keep their current steering angle.
    pub fn apply(&mut self, wheel_cmds: &[WheelCommand; NUM_WHEELS], safe_mode: bool) {
        for i in 0..NUM_WHEELS {
            if safe_mode {
                self.modules[i].set_power(0.0);
                continue;
            }

            self.modules[i].set_power(wheel_cmds[i].speed);

            if wheel_cmds[i].speed != 0.0 {
                self.modules[i].set_angle(wheel_cmds[i].angle_deg);
            }
        }

        trace!("wheel commands out: {:?}", wheel_cmds);
    }

    /// The measured drive position of each wheel relative to its last reset,
    /// in raw sensor units.
    pub fn drive_positions(&self) -> [f64; NUM_WHEELS] {
        let mut positions = [0f64; NUM_WHEELS];

        for i in 0..NUM_WHEELS {
            positions[i] = self.modules[i].drive_position();
        }

        positions
    }

    /// Capture the current drive positions as the new zero baselines, done
    /// at the start of every following run.
    pub fn reset_drive_positions(&mut self) {
        for module in self.modules.iter_mut() {
            module.reset_drive_position();
        }
    }

    /// The drive actuator velocity of each wheel, in raw sensor units per
    /// cycle. Diagnostic use only.
    pub fn drive_velocities(&self) -> [f64; NUM_WHEELS] {
        let mut velocities = [0f64; NUM_WHEELS];

        for i in 0..NUM_WHEELS {
            velocities[i] = self.modules[i].drive_velocity();
        }

        velocities
    }

    /// The raw steering sensor value of each module, used by the calibration
    /// procedure.
    pub fn steer_raw_positions(&self) -> [f64; NUM_WHEELS] {
        let mut positions = [0f64; NUM_WHEELS];

        for i in 0..NUM_WHEELS {
            positions[i] = self.modules[i].steer_raw_position();
        }

        positions
    }

    /// The steering angle most recently commanded on each module.
    pub fn target_angles_deg(&self) -> [f64; NUM_WHEELS] {
        let mut angles = [0f64; NUM_WHEELS];

        for i in 0..NUM_WHEELS {
            angles[i] = self.modules[i].target_angle_deg();
        }

        angles
    }

    /// Open loop power on a single module. Bring-up testing only.
    pub fn set_single_power(&mut self, wheel: usize, power: f64) {
        self.modules[wheel].set_power(power);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hw::sim::{SimDriveActuator, SimSteerActuator};

    const TICKS_PER_REV: f64 = 1024.0;

    fn test_driver() -> (
        MechDriver<SimDriveActuator, SimSteerActuator>,
        [SimDriveActuator; NUM_WHEELS],
        [SimSteerActuator; NUM_WHEELS],
    ) {
        let drives = [
            SimDriveActuator::new(),
            SimDriveActuator::new(),
            SimDriveActuator::new(),
            SimDriveActuator::new(),
        ];
        let steers = [
            SimSteerActuator::new(0.0),
            SimSteerActuator::new(0.0),
            SimSteerActuator::new(0.0),
            SimSteerActuator::new(0.0),
        ];

        let modules = [
            SwerveModule::new(drives[0].clone(), steers[0].clone(), 0.0, TICKS_PER_REV),
            SwerveModule::new(drives[1].clone(), steers[1].clone(), 0.0, TICKS_PER_REV),
            SwerveModule::new(drives[2].clone(), steers[2].clone(), 0.0, TICKS_PER_REV),
            SwerveModule::new(drives[3].clone(), steers[3].clone(), 0.0, TICKS_PER_REV),
        ];

        (MechDriver::new(modules), drives, steers)
    }

    #[test]
    fn test_apply_commands() {
        let (mut driver, drives, steers) = test_driver();

        let cmds = [WheelCommand::new(0.5, 90.0); NUM_WHEELS];
        driver.apply(&cmds, false);

        for (drive, steer) in drives.iter().zip(steers.iter()) {
            assert!((drive.velocity() - 0.0).abs() < 1e-9);
            drive.step(100.0);
            assert!((drive.velocity() - 50.0).abs() < 1e-9);
            assert!((steer.position() - 90.0 / 360.0 * TICKS_PER_REV).abs() < 1e-9);
        }
    }

    #[test]
    fn test_safe_mode_zeroes_power_and_holds_steering() {
        let (mut driver, drives, steers) = test_driver();

        let cmds = [WheelCommand::new(1.0, 45.0); NUM_WHEELS];
        driver.apply(&cmds, true);

        for (drive, steer) in drives.iter().zip(steers.iter()) {
            drive.step(100.0);
            assert_eq!(drive.velocity(), 0.0);
            // Steering was never commanded away from zero
            assert_eq!(steer.position(), 0.0);
        }
    }

    #[test]
    fn test_zero_speed_does_not_steer() {
        let (mut driver, _drives, steers) = test_driver();

        let cmds = [WheelCommand::new(0.0, 90.0); NUM_WHEELS];
        driver.apply(&cmds, false);

        for steer in steers.iter() {
            assert_eq!(steer.position(), 0.0);
        }
    }
}
