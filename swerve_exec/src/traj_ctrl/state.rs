//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::{Deserialize, Serialize};

// Internal
use super::{TrajCtrlError, WheelFollower};
use crate::swerve_ctrl::{
    calc_wheel_commands, compose_commands, Geometry, HeadingHold, RobotMotionIntent,
    WheelCommand, NUM_WHEELS};
use util::{
    maths::rad_to_deg,
    module::State,
    params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory control module state
#[derive(Default)]
pub struct TrajCtrl {
    params: Params,

    /// Executing mode
    mode: Mode,

    /// Correction controller driven by the trajectory's commanded heading
    heading_hold: HeadingHold,

    /// The per wheel followers for the current run, present only while
    /// following.
    followers: Option<[Box<dyn WheelFollower>; NUM_WHEELS]>,

    /// The heading to hold for the current run.
    ///
    /// Units: degrees
    target_heading_deg: f64,

    report: StatusReport,
}

/// Parameters for Trajectory control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {

    /// Proportional gain for the path correction controller.
    ///
    /// Units: rotation rate per degree of error
    pub correction_kp: f64,

    /// Derivative gain for the path correction controller.
    ///
    /// Units: rotation rate per degree of error change
    pub correction_kd: f64,

    /// Maximum wheel speed demand for the correction term (normalised
    /// units).
    pub max_wheel_speed: f64,

    /// The wheelbase geometry, used to distribute the correction across the
    /// wheels.
    pub geom: Geometry,
}

/// Input data to the module
#[derive(Clone, Copy, Default)]
pub struct InputData {
    /// Measured drive position of each wheel relative to the last reset, in
    /// encoder ticks, in wheel order (FL, FR, RR, RL).
    pub drive_positions: [f64; NUM_WHEELS],

    /// The measured heading of the vehicle.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// Output command from TrajCtrl that the mechanisms driver must execute.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// The composed wheel commands, or `None` when no run is in progress.
    pub wheel_cmds: Option<[WheelCommand; NUM_WHEELS]>,

    /// True on the cycle in which all followers reported a zero speed.
    pub finished: bool,
}

/// The status report containing monitoring quantities.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The rotation rate correction applied on this cycle.
    pub correction: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of TrajCtrl.
#[derive(Clone, Copy, Debug)]
pub enum Mode {
    /// No run in progress.
    Idle,

    /// A trajectory is being followed.
    Following,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Idle
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TrajCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = TrajCtrlError;

    /// Intiailise the TrajCtrl module.
    ///
    /// Expected init data is a path to the parameter file.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e)
        };

        // Initialise the correction controller
        self.heading_hold =
            HeadingHold::new(self.params.correction_kp, self.params.correction_kd);

        Ok(())
    }

    /// Process trajectory control.
    ///
    /// While following, processing involves:
    ///  1. Getting each follower's speed demand for the wheel's measured
    ///     drive position, and the desired heading from the trajectory.
    ///  2. Calculating the heading correction and expanding it into per
    ///     wheel commands through the inverse kinematics.
    ///  3. Composing the two command sets in the vector domain.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        match self.mode {
            Mode::Idle => Ok((OutputData::default(), self.report)),
            Mode::Following => self.proc_following(input_data)
        }
    }
}

impl TrajCtrl {

    /// Begin following a trajectory.
    ///
    /// Each follower and the correction controller are reset so the run
    /// starts fresh. The caller must also reset the drive position baselines
    /// of the wheel modules so the position inputs to `proc` start from
    /// zero.
    ///
    /// Starting a new run before the current one has finished results in an
    /// error; to stop a run early call `abort`.
    pub fn start_following(
        &mut self,
        mut followers: [Box<dyn WheelFollower>; NUM_WHEELS],
        target_heading_deg: f64,
    ) -> Result<(), TrajCtrlError> {
        if let Mode::Following = self.mode {
            return Err(TrajCtrlError::AlreadyFollowing);
        }

        for follower in followers.iter_mut() {
            follower.reset();
        }
        self.heading_hold.reset();

        self.followers = Some(followers);
        self.target_heading_deg = target_heading_deg;
        self.mode = Mode::Following;

        info!("Trajectory following started");

        Ok(())
    }

    /// Abort the current following run.
    ///
    /// The next call to `proc` will output nothing; the caller should issue
    /// a stop command to the drive.
    pub fn abort(&mut self) {
        if let Mode::Following = self.mode {
            info!("Trajectory following aborted");
        }

        self.mode = Mode::Idle;
        self.followers = None;
    }

    /// True while a following run is in progress.
    pub fn is_following(&self) -> bool {
        matches!(self.mode, Mode::Following)
    }

    /// Perform one following cycle.
    fn proc_following(&mut self, input_data: &InputData)
        -> Result<(OutputData, StatusReport), TrajCtrlError>
    {
        // Followers are always present in Following mode
        let followers = self.followers.as_mut().unwrap();

        // Get each wheel's trajectory command. The run is finished when
        // every follower reports a zero speed, judged before the correction
        // is composed in.
        let mut traj_cmds = [WheelCommand::default(); NUM_WHEELS];
        let mut finished = true;

        for i in 0..NUM_WHEELS {
            let speed = followers[i].calculate(input_data.drive_positions[i] as i32);
            finished = finished && speed == 0.0;

            traj_cmds[i] = WheelCommand {
                speed,
                angle_deg: rad_to_deg(followers[i].heading_rad()),
            };
        }

        // Whole body rotation correction. A single kinematics call
        // distributes the scalar correction across the wheels with the
        // correct per wheel directions and magnitudes.
        let correction = self
            .heading_hold
            .correction(input_data.heading_deg, self.target_heading_deg);
        self.report.correction = correction;

        let (correction_cmds, _) = calc_wheel_commands(
            &RobotMotionIntent {
                vx: 0.0,
                vy: 0.0,
                omega: correction,
            },
            &self.params.geom,
            self.params.max_wheel_speed,
        );

        // Merge the trajectory and correction command sets in the vector
        // domain
        let wheel_cmds = compose_commands(&traj_cmds, &correction_cmds);

        if finished {
            info!("Trajectory following finished");
            self.mode = Mode::Idle;
            self.followers = None;
        }

        trace!("TrajCtrl output: {:?}", wheel_cmds);

        Ok((
            OutputData {
                wheel_cmds: Some(wheel_cmds),
                finished,
            },
            self.report,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hw::sim::{ScriptedFollower, TrajSample};

    fn test_params() -> Params {
        Params {
            correction_kp: 1.0 / 18.0,
            correction_kd: 0.0,
            max_wheel_speed: 1.0,
            geom: Geometry {
                wheelbase_length_m: 1.0,
                wheelbase_width_m: 1.0,
            },
        }
    }

    fn test_ctrl() -> TrajCtrl {
        let params = test_params();
        TrajCtrl {
            heading_hold: HeadingHold::new(params.correction_kp, params.correction_kd),
            params,
            ..Default::default()
        }
    }

    fn followers_with_speeds(speeds: &[f64]) -> [Box<dyn WheelFollower>; NUM_WHEELS] {
        let samples: Vec<TrajSample> = speeds
            .iter()
            .map(|&speed| TrajSample {
                speed,
                heading_rad: 0.0,
            })
            .collect();

        [
            Box::new(ScriptedFollower::new(samples.clone())),
            Box::new(ScriptedFollower::new(samples.clone())),
            Box::new(ScriptedFollower::new(samples.clone())),
            Box::new(ScriptedFollower::new(samples)),
        ]
    }

    fn zero_input() -> InputData {
        InputData::default()
    }

    #[test]
    fn test_finishes_when_all_speeds_zero() {
        let mut ctrl = test_ctrl();

        ctrl.start_following(followers_with_speeds(&[1.0, 0.5, 0.0]), 0.0)
            .unwrap();

        let (output, _) = ctrl.proc(&zero_input()).unwrap();
        assert!(!output.finished);

        let (output, _) = ctrl.proc(&zero_input()).unwrap();
        assert!(!output.finished);

        let (output, _) = ctrl.proc(&zero_input()).unwrap();
        assert!(output.finished);
        assert!(!ctrl.is_following());

        // Once idle the module outputs nothing
        let (output, _) = ctrl.proc(&zero_input()).unwrap();
        assert!(output.wheel_cmds.is_none());
    }

    #[test]
    fn test_single_moving_wheel_keeps_following() {
        let mut ctrl = test_ctrl();

        let followers: [Box<dyn WheelFollower>; NUM_WHEELS] = [
            Box::new(ScriptedFollower::new(vec![TrajSample {
                speed: 0.5,
                heading_rad: 0.0,
            }])),
            Box::new(ScriptedFollower::new(vec![])),
            Box::new(ScriptedFollower::new(vec![])),
            Box::new(ScriptedFollower::new(vec![])),
        ];
        ctrl.start_following(followers, 0.0).unwrap();

        let (output, _) = ctrl.proc(&zero_input()).unwrap();

        assert!(!output.finished);
    }

    #[test]
    fn test_no_correction_passes_trajectory_through() {
        let mut ctrl = test_ctrl();

        ctrl.start_following(followers_with_speeds(&[0.5, 0.5]), 0.0)
            .unwrap();

        // Heading matches the target so the correction is zero and the
        // output equals the follower commands
        let (output, report) = ctrl.proc(&zero_input()).unwrap();

        assert_eq!(report.correction, 0.0);
        for cmd in output.wheel_cmds.unwrap().iter() {
            assert!((cmd.speed - 0.5).abs() < 1e-9);
            assert!(cmd.angle_deg.abs() < 1e-9);
        }
    }

    #[test]
    fn test_correction_composed_in() {
        let mut ctrl = test_ctrl();

        ctrl.start_following(followers_with_speeds(&[0.5, 0.5]), 0.0)
            .unwrap();

        // A heading error produces a correction which changes the composed
        // commands away from the pure trajectory ones
        let input = InputData {
            drive_positions: [0.0; NUM_WHEELS],
            heading_deg: 18.0,
        };
        let (output, report) = ctrl.proc(&input).unwrap();

        assert!((report.correction - 1.0).abs() < 1e-9);

        // Expected: the trajectory command composed with the pure rotation
        // command for this geometry
        let (correction_cmds, _) = calc_wheel_commands(
            &RobotMotionIntent {
                vx: 0.0,
                vy: 0.0,
                omega: 1.0,
            },
            &test_params().geom,
            1.0,
        );
        let traj_cmds = [WheelCommand::new(0.5, 0.0); NUM_WHEELS];
        let expected = compose_commands(&traj_cmds, &correction_cmds);

        for (cmd, exp) in output.wheel_cmds.unwrap().iter().zip(expected.iter()) {
            assert!((cmd.speed - exp.speed).abs() < 1e-9);
            assert!((cmd.angle_deg - exp.angle_deg).abs() < 1e-9);
        }
    }

    #[test]
    fn test_start_while_following_rejected() {
        let mut ctrl = test_ctrl();

        ctrl.start_following(followers_with_speeds(&[1.0]), 0.0)
            .unwrap();

        let result = ctrl.start_following(followers_with_speeds(&[1.0]), 0.0);

        assert!(matches!(result, Err(TrajCtrlError::AlreadyFollowing)));
    }

    #[test]
    fn test_abort_returns_to_idle() {
        let mut ctrl = test_ctrl();

        ctrl.start_following(followers_with_speeds(&[1.0, 1.0]), 0.0)
            .unwrap();
        ctrl.abort();

        assert!(!ctrl.is_following());

        let (output, _) = ctrl.proc(&zero_input()).unwrap();
        assert!(output.wheel_cmds.is_none());
        assert!(!output.finished);
    }
}
