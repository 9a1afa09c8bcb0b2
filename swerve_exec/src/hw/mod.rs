//! Hardware contracts
//!
//! The control core reaches the vehicle hardware only through the narrow
//! contracts in this module. Actuator firmware, sensor electronics and the
//! persistence backing the calibration store are all external collaborators.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod sim;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A wheel's drive actuator with an integrated position sensor.
///
/// Positions are in raw sensor units (ticks); conversion constants are
/// configuration inputs to the core.
pub trait DriveActuator {
    /// Set the open loop power demand.
    fn set_power(&mut self, power: f64);

    /// Read the position sensor, in raw sensor units.
    fn position(&self) -> f64;

    /// Read the velocity of the actuator, in raw sensor units per cycle.
    /// Diagnostic use only.
    fn velocity(&self) -> f64;
}

/// A wheel's steering actuator with an integrated position sensor and an
/// onboard closed loop position controller.
pub trait SteerActuator {
    /// Set the closed loop position setpoint, in raw sensor units.
    fn set_position_setpoint(&mut self, setpoint: f64);

    /// Read the position sensor, in raw sensor units.
    fn position(&self) -> f64;
}

/// The vehicle's heading sensor.
pub trait HeadingSensor {
    /// Read the current yaw in degrees.
    fn yaw_deg(&self) -> f64;

    /// Reset the sensor so that the current physical heading reads as the
    /// given yaw.
    fn reset_yaw(&mut self, yaw_deg: f64);
}

/// Store of calibration values persisted between executions.
///
/// Used only at module construction and during the explicit calibration
/// operation. The store is always an explicitly injected handle, never an
/// ambient global.
pub trait CalibStore {
    /// Get the value for `key`, or `default` if the key is absent.
    fn get_f64(&self, key: &str, default: f64) -> f64;

    /// Set the value for `key`.
    fn put_f64(&mut self, key: &str, value: f64);
}
