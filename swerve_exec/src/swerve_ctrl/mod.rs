//! Swerve drive control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_field_oriented;
mod calc_kinematics;
mod calc_robot_frame;
mod cmd;
mod heading_hold;
mod params;
mod state;
mod wheel_cmd;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use calc_kinematics::*;
pub use cmd::*;
pub use heading_hold::*;
pub use params::*;
pub use state::*;
pub use wheel_cmd::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of wheel modules on the vehicle.
pub const NUM_WHEELS: usize = 4;

/// Wheel module indices. The order matches the trajectory follower outputs:
/// front left, front right, rear right, rear left.
pub const WHEEL_FL: usize = 0;
pub const WHEEL_FR: usize = 1;
pub const WHEEL_RR: usize = 2;
pub const WHEEL_RL: usize = 3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SwerveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SwerveCtrlError {
    #[error("Recieved an invalid drive command: {0:#?}")]
    InvalidDriveCmd(DriveCommand),
}
