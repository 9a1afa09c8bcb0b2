//! Commands passed into SwerveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command to execute a particular drive manouvre
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DriveCommand {
    /// The type of manouvre to perform
    pub drive_type: DriveType,

    /// The operator demand magnitude, between 0 and 1. Used for
    /// FieldOriented only.
    pub magnitude: Option<f64>,

    /// The operator demand direction in the field frame. Used for
    /// FieldOriented only.
    ///
    /// Units: degrees
    pub direction_deg: Option<f64>,

    /// The heading the vehicle shall hold during the manouvre. Used for
    /// FieldOriented only.
    ///
    /// Units: degrees
    pub target_heading_deg: Option<f64>,

    /// The robot frame motion intent. Used for RobotFrame only.
    pub intent: Option<RobotMotionIntent>,
}

/// A robot frame velocity and rotation rate demand, the canonical input to
/// the inverse kinematics.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RobotMotionIntent {
    /// Velocity demand along the body X (forward) axis (normalised units).
    pub vx: f64,

    /// Velocity demand along the body Y (left) axis (normalised units).
    pub vy: f64,

    /// Rotation rate demand about the body Z (up) axis, positive
    /// counter-clockwise viewed from above (normalised units).
    pub omega: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible manouvres to be executed by SwerveCtrl.
#[derive(Clone, Copy, Debug, Serialize)]
pub enum DriveType {
    /// No manouvre - interpreted as continue with last manouvre.
    None,
    /// Stop - zero all drive power while holding the wheel angles.
    Stop,
    /// Field oriented drive - operator demand in the field frame, translated
    /// through the heading sensor, with heading hold.
    FieldOriented,
    /// Robot frame drive - a raw motion intent passed straight to the
    /// inverse kinematics.
    RobotFrame,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCommand {
    /// Determine if the command is valid (i.e. contains all required data).
    pub fn is_valid(&self) -> bool {
        match self.drive_type {
            DriveType::Stop | DriveType::None => true,
            DriveType::FieldOriented => !vec![
                self.magnitude,
                self.direction_deg,
                self.target_heading_deg,
            ]
            .contains(&None),
            DriveType::RobotFrame => self.intent.is_some(),
        }
    }
}
