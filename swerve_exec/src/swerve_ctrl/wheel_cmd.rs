//! Per-wheel command representations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::NUM_WHEELS;
use util::maths::{deg_to_rad, rad_to_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Polar demand for a single wheel module.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct WheelCommand {
    /// Drive speed demand (normalised units).
    pub speed: f64,

    /// Steering angle demand. Unconstrained; wraparound is applied at the
    /// steering actuator boundary, not here.
    ///
    /// Units: degrees
    pub angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelCommand {
    pub fn new(speed: f64, angle_deg: f64) -> Self {
        Self { speed, angle_deg }
    }

    /// The Cartesian equivalent of this command.
    pub fn to_vector(&self) -> Vector2<f64> {
        let angle_rad = deg_to_rad(self.angle_deg);

        Vector2::new(self.speed * angle_rad.cos(), self.speed * angle_rad.sin())
    }

    /// Build a command from a Cartesian wheel vector.
    ///
    /// A zero vector maps to a zero speed command with a zero angle, never a
    /// NaN angle.
    pub fn from_vector(vector: &Vector2<f64>) -> Self {
        Self {
            speed: vector.norm(),
            angle_deg: rad_to_deg(vector.y.atan2(vector.x)),
        }
    }

    /// Compose this command with another.
    ///
    /// Wheel commands are vectors: merging two of them must sum their
    /// Cartesian components. Summing speeds or angles independently gives
    /// the wrong resultant whenever the two commands point in different
    /// directions.
    pub fn compose(&self, other: &Self) -> Self {
        Self::from_vector(&(self.to_vector() + other.to_vector()))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compose two full wheel command sets element-wise in the vector domain.
pub fn compose_commands(
    a: &[WheelCommand; NUM_WHEELS],
    b: &[WheelCommand; NUM_WHEELS],
) -> [WheelCommand; NUM_WHEELS] {
    let mut composed = [WheelCommand::default(); NUM_WHEELS];

    for i in 0..NUM_WHEELS {
        composed[i] = a[i].compose(&b[i]);
    }

    composed
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compose_with_zero_is_identity() {
        // The angle of a zero speed command is don't-care
        for zero_angle in [0.0f64, 45.0, 90.0, 237.0].iter() {
            let original = WheelCommand::new(1.0, 30.0);
            let zero = WheelCommand::new(0.0, *zero_angle);

            let composed = original.compose(&zero);

            assert!((composed.speed - 1.0).abs() < 1e-9);
            assert!((composed.angle_deg - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_compose_perpendicular() {
        let a = WheelCommand::new(1.0, 0.0);
        let b = WheelCommand::new(1.0, 90.0);

        let composed = a.compose(&b);

        assert!((composed.speed - 2f64.sqrt()).abs() < 1e-9);
        assert!((composed.angle_deg - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_vector_has_defined_angle() {
        let cmd = WheelCommand::from_vector(&nalgebra::Vector2::new(0.0, 0.0));

        assert_eq!(cmd.speed, 0.0);
        assert!(cmd.angle_deg.is_finite());
    }

    #[test]
    fn test_polar_round_trip() {
        let original = WheelCommand::new(0.75, -120.0);

        let round_tripped = WheelCommand::from_vector(&original.to_vector());

        assert!((round_tripped.speed - original.speed).abs() < 1e-9);
        assert!((round_tripped.angle_deg - original.angle_deg).abs() < 1e-9);
    }
}
