//! Implementations for the SwerveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    DriveCommand, DriveType, HeadingHold, Params, WheelCommand, NUM_WHEELS};
use util::{
    module::State,
    params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Swerve drive control module state
#[derive(Default)]
pub struct SwerveCtrl {

    pub(crate) params: Params,

    pub(crate) heading_hold: HeadingHold,

    pub(crate) report: StatusReport,

    pub(crate) current_cmd: Option<DriveCommand>,

    pub(crate) target_wheel_cmds: Option<[WheelCommand; NUM_WHEELS]>,

    pub(crate) output: Option<OutputData>,
}

/// Input data to Swerve drive control.
#[derive(Default)]
pub struct InputData {
    /// The drive command to be executed, or `None` if there is no new
    /// command on this cycle.
    pub cmd: Option<DriveCommand>,

    /// The measured heading of the vehicle.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// Output command from SwerveCtrl that the mechanisms driver must execute.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// Demand for each wheel module, in wheel order (FL, FR, RR, RL).
    pub wheel_cmds: [WheelCommand; NUM_WHEELS],
}

/// Status report for SwerveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the wheel speed demands had to be scaled down to the maximum.
    pub speed_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SwerveCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::SwerveCtrlError;

    /// Initialise the SwerveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {

        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e)
        };

        // Build the heading hold controller from the loaded gains
        self.heading_hold = HeadingHold::new(self.params.heading_kp, self.params.heading_kd);

        Ok(())
    }

    /// Perform cyclic processing of Swerve drive control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            if !cmd.is_valid() {
                return Err(super::SwerveCtrlError::InvalidDriveCmd(cmd));
            }

            // Update the interal copy of the command
            self.current_cmd = Some(cmd);
        }

        // Calculate the target wheel commands for the current command. This
        // happens every cycle, not just on command arrival: the field
        // oriented and heading hold calculations depend on the live heading
        // reading.
        if let Some(cmd) = self.current_cmd {
            match cmd.drive_type {
                DriveType::None => self.calc_none()?,
                DriveType::Stop => self.calc_stop()?,
                DriveType::FieldOriented =>
                    self.calc_field_oriented(input_data.heading_deg)?,
                DriveType::RobotFrame => self.calc_robot_frame()?,
            }
        }

        let output: OutputData;

        // If there's a target to move to
        if let Some(mut wheel_cmds) = self.target_wheel_cmds {

            // A wheel with a zero speed demand must not be re-steered to an
            // arbitrary angle: hold the angle from the previous output.
            if let Some(prev) = self.output {
                for i in 0..NUM_WHEELS {
                    if wheel_cmds[i].speed == 0.0 {
                        wheel_cmds[i].angle_deg = prev.wheel_cmds[i].angle_deg;
                    }
                }
            }

            output = OutputData { wheel_cmds };
        }
        else {
            // If no target keep the previous output with the speeds zeroed.
            // If there is no previous output use the default (zero) command.
            output = match self.output {
                Some(po) => {
                    let mut o = po;
                    for cmd in o.wheel_cmds.iter_mut() {
                        cmd.speed = 0.0;
                    }
                    o
                },
                None => OutputData::default()
            }
        }

        trace!("SwerveCtrl output: {:?}", output.wheel_cmds);

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl SwerveCtrl {

    /// Bring the drive to a safe state.
    ///
    /// Replaces the current command with a stop, which zeroes all drive
    /// power while holding the wheel angles.
    pub fn make_safe(&mut self) {
        self.current_cmd = Some(DriveCommand {
            drive_type: DriveType::Stop,
            magnitude: None,
            direction_deg: None,
            target_heading_deg: None,
            intent: None,
        });
    }

    /// Perform the stop command calculations.
    ///
    /// The stop command shall:
    ///     1. Maintain the current wheel angles
    ///     2. Set all drive speeds to zero.
    ///
    /// Stop shall never error and must always succeed in bringing the
    /// vehicle to a full and complete stop.
    fn calc_stop(&mut self) -> Result<(), super::SwerveCtrlError> {

        // Get the current target with its speeds zeroed, or an all zero
        // target if no target is currently set.
        let target = match self.target_wheel_cmds {
            Some(mut t) => {
                for cmd in t.iter_mut() {
                    cmd.speed = 0.0;
                }
                t
            },
            None => [WheelCommand::default(); NUM_WHEELS]
        };

        // Update the target
        self.target_wheel_cmds = Some(target);

        Ok(())
    }

    /// Perform the none command calculations.
    ///
    /// The None command shall not change the current target.
    fn calc_none(&mut self) -> Result<(), super::SwerveCtrlError> {

        // Simply exit as there's nothing to do.
        Ok(())
    }

}

#[cfg(test)]
mod test {
    use super::*;
    use crate::swerve_ctrl::{Geometry, RobotMotionIntent};

    fn test_ctrl() -> SwerveCtrl {
        SwerveCtrl {
            params: Params {
                max_wheel_speed: 1.0,
                heading_kp: 1.0 / 18.0,
                heading_kd: 0.0,
                geom: Geometry {
                    wheelbase_length_m: 1.0,
                    wheelbase_width_m: 1.0,
                },
            },
            heading_hold: HeadingHold::new(1.0 / 18.0, 0.0),
            ..Default::default()
        }
    }

    fn robot_frame_cmd(vx: f64, vy: f64, omega: f64) -> DriveCommand {
        DriveCommand {
            drive_type: DriveType::RobotFrame,
            magnitude: None,
            direction_deg: None,
            target_heading_deg: None,
            intent: Some(RobotMotionIntent { vx, vy, omega }),
        }
    }

    #[test]
    fn test_robot_frame_straight() {
        let mut ctrl = test_ctrl();

        let (output, report) = ctrl
            .proc(&InputData {
                cmd: Some(robot_frame_cmd(1.0, 0.0, 0.0)),
                heading_deg: 0.0,
            })
            .unwrap();

        assert!(!report.speed_limited);
        for cmd in output.wheel_cmds.iter() {
            assert!((cmd.speed - 1.0).abs() < 1e-9);
            assert!(cmd.angle_deg.abs() < 1e-9);
        }
    }

    #[test]
    fn test_field_oriented_rotates_by_heading() {
        let mut ctrl = test_ctrl();

        // Operator pushes towards field +X while the vehicle faces +90; with
        // the target heading equal to the measured heading no correction is
        // produced and the wheels must point to -90 in the robot frame
        let (output, _) = ctrl
            .proc(&InputData {
                cmd: Some(DriveCommand {
                    drive_type: DriveType::FieldOriented,
                    magnitude: Some(0.5),
                    direction_deg: Some(0.0),
                    target_heading_deg: Some(90.0),
                    intent: None,
                }),
                heading_deg: 90.0,
            })
            .unwrap();

        for cmd in output.wheel_cmds.iter() {
            assert!((cmd.speed - 0.5).abs() < 1e-9);
            assert!((cmd.angle_deg + 90.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_speed_holds_angle() {
        let mut ctrl = test_ctrl();

        // Drive diagonally so all wheels point to 45 degrees
        ctrl.proc(&InputData {
            cmd: Some(robot_frame_cmd(0.5, 0.5, 0.0)),
            heading_deg: 0.0,
        })
        .unwrap();

        // A zero intent must not re-steer the stationary wheels
        let (output, _) = ctrl
            .proc(&InputData {
                cmd: Some(robot_frame_cmd(0.0, 0.0, 0.0)),
                heading_deg: 0.0,
            })
            .unwrap();

        for cmd in output.wheel_cmds.iter() {
            assert_eq!(cmd.speed, 0.0);
            assert!((cmd.angle_deg - 45.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stop_holds_angles() {
        let mut ctrl = test_ctrl();

        ctrl.proc(&InputData {
            cmd: Some(robot_frame_cmd(0.0, 1.0, 0.0)),
            heading_deg: 0.0,
        })
        .unwrap();

        let (output, _) = ctrl
            .proc(&InputData {
                cmd: Some(DriveCommand {
                    drive_type: DriveType::Stop,
                    magnitude: None,
                    direction_deg: None,
                    target_heading_deg: None,
                    intent: None,
                }),
                heading_deg: 0.0,
            })
            .unwrap();

        for cmd in output.wheel_cmds.iter() {
            assert_eq!(cmd.speed, 0.0);
            assert!((cmd.angle_deg - 90.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_command_rejected() {
        let mut ctrl = test_ctrl();

        let result = ctrl.proc(&InputData {
            cmd: Some(DriveCommand {
                drive_type: DriveType::FieldOriented,
                magnitude: Some(0.5),
                direction_deg: None,
                target_heading_deg: None,
                intent: None,
            }),
            heading_deg: 0.0,
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_no_command_outputs_zero() {
        let mut ctrl = test_ctrl();

        let (output, _) = ctrl
            .proc(&InputData {
                cmd: None,
                heading_deg: 0.0,
            })
            .unwrap();

        for cmd in output.wheel_cmds.iter() {
            assert_eq!(cmd.speed, 0.0);
        }
    }

    #[test]
    fn test_over_speed_reported() {
        let mut ctrl = test_ctrl();

        let (output, report) = ctrl
            .proc(&InputData {
                cmd: Some(robot_frame_cmd(2.0, 0.0, 0.0)),
                heading_deg: 0.0,
            })
            .unwrap();

        assert!(report.speed_limited);
        for cmd in output.wheel_cmds.iter() {
            assert!((cmd.speed - 1.0).abs() < 1e-9);
        }
    }
}
