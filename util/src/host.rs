//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable which points at the software root
/// directory.
pub const SW_ROOT_ENV_VAR: &str = "SWERVE_SW_ROOT";

/// Get the software root directory from the host environment.
///
/// The root is the directory containing the `params` and `sessions`
/// directories.
pub fn get_swerve_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
