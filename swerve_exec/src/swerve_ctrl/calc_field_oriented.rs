//! Field oriented drive calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use super::*;
use util::maths::deg_to_rad;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveCtrl {
    /// Perform the field oriented drive calculations.
    ///
    /// The operator demand is a (magnitude, direction) vector in the field
    /// frame. Rotating it by the negative of the measured heading gives the
    /// equivalent robot frame demand, which is combined with the heading
    /// hold correction and passed through the inverse kinematics.
    pub(crate) fn calc_field_oriented(
        &mut self,
        heading_deg: f64,
    ) -> Result<(), super::SwerveCtrlError> {
        // Command has previously been verified so the payload can be taken
        // directly.
        let cmd = self.current_cmd.unwrap();
        let magnitude = cmd.magnitude.unwrap();
        let direction_deg = cmd.direction_deg.unwrap();
        let target_heading_deg = cmd.target_heading_deg.unwrap();

        // Rotate the operator vector into the robot frame
        let robot_dir_rad = deg_to_rad(direction_deg - heading_deg);

        let intent = RobotMotionIntent {
            vx: magnitude * robot_dir_rad.cos(),
            vy: magnitude * robot_dir_rad.sin(),
            omega: self.heading_hold.correction(heading_deg, target_heading_deg),
        };

        let (wheel_cmds, limited) =
            calc_wheel_commands(&intent, &self.params.geom, self.params.max_wheel_speed);

        self.report.speed_limited = limited;
        self.target_wheel_cmds = Some(wheel_cmds);

        Ok(())
    }
}
