//! Parameters structure for SwerveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::NUM_WHEELS;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Swerve drive control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {

    // ---- CAPABILITIES ----

    /// Maximum wheel speed demand (normalised units). Kinematics outputs
    /// exceeding this are scaled down uniformly across all wheels.
    pub max_wheel_speed: f64,

    // ---- HEADING HOLD ----

    /// Proportional gain on the wrapped heading error.
    ///
    /// Units: rotation rate per degree of error
    pub heading_kp: f64,

    /// Derivative gain on the per-cycle change in heading error.
    ///
    /// Units: rotation rate per degree of error change
    pub heading_kd: f64,

    // ---- GEOMETRY ----

    pub geom: Geometry,
}

/// The wheelbase geometry.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct Geometry {
    /// Front-rear separation of the wheel modules.
    ///
    /// Units: meters
    pub wheelbase_length_m: f64,

    /// Left-right separation of the wheel modules.
    ///
    /// Units: meters
    pub wheelbase_width_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Geometry {
    /// The position of each wheel module in the robot body frame (X forward,
    /// Y left), in wheel order (FL, FR, RR, RL).
    ///
    /// Units: meters
    pub fn wheel_positions_m(&self) -> [[f64; 2]; NUM_WHEELS] {
        let x = self.wheelbase_length_m / 2.0;
        let y = self.wheelbase_width_m / 2.0;

        [[x, y], [x, -y], [-x, -y], [-x, y]]
    }
}
