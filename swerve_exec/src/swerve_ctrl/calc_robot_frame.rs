//! Robot frame drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::*;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveCtrl {
    /// Perform the robot frame drive calculations.
    ///
    /// The motion intent is already expressed in the robot frame so it is
    /// passed straight through the inverse kinematics.
    pub(crate) fn calc_robot_frame(&mut self) -> Result<(), super::SwerveCtrlError> {
        // Command has previously been verified so the payload can be taken
        // directly.
        let intent = self.current_cmd.unwrap().intent.unwrap();

        let (wheel_cmds, limited) =
            calc_wheel_commands(&intent, &self.params.geom, self.params.max_wheel_speed);

        self.report.speed_limited = limited;
        self.target_wheel_cmds = Some(wheel_cmds);

        Ok(())
    }
}
