//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};

use crate::{swerve_ctrl, traj_ctrl};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the drive has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeCmd,
    CycleOverrunLimit,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // Safe mode variables
    /// Determines if the drive is in safe mode.
    pub safe: bool,

    /// Gives the reason for the drive being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // SwerveCtrl
    pub swerve_ctrl: swerve_ctrl::SwerveCtrl,
    pub swerve_ctrl_input: swerve_ctrl::InputData,
    pub swerve_ctrl_output: swerve_ctrl::OutputData,
    pub swerve_ctrl_status_rpt: swerve_ctrl::StatusReport,

    // TrajCtrl
    pub traj_ctrl: traj_ctrl::TrajCtrl,
    pub traj_ctrl_input: traj_ctrl::InputData,
    pub traj_ctrl_output: traj_ctrl::OutputData,
    pub traj_ctrl_status_rpt: traj_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the drive into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make the control modules safe
            self.swerve_ctrl.make_safe();
            self.traj_ctrl.abort();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled,
    /// or `Err(())` otherwise. To remove safe mode the provided cause must
    /// match the initial reason for safe mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => {
                self.safe = false;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_safe_mode_cause_tracking() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::MakeSafeCmd);
        assert!(ds.safe);
        assert!(!ds.traj_ctrl.is_following());

        // The wrong cause does not clear safe mode
        assert!(ds.make_unsafe(SafeModeCause::CycleOverrunLimit).is_err());
        assert!(ds.safe);

        // The root cause does
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeCmd).is_ok());
        assert!(!ds.safe);
    }
}
