//! Trajectory following control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use state::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract for a single wheel's trajectory follower.
///
/// Followers are constructed externally from a generated trajectory; the
/// module consumes only these three operations.
pub trait WheelFollower {
    /// Reset the follower to the start of its trajectory.
    fn reset(&mut self);

    /// Advance one control cycle and return the drive speed demand for the
    /// wheel, given its measured drive position in encoder ticks.
    ///
    /// A returned speed of exactly 0.0 indicates the follower has finished
    /// its trajectory.
    fn calculate(&mut self, position_ticks: i32) -> f64;

    /// The desired wheel heading for the current trajectory sample.
    ///
    /// Units: radians
    fn heading_rad(&self) -> f64;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TrajCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("A trajectory is already being followed")]
    AlreadyFollowing,
}
