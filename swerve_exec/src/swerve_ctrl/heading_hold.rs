//! Heading hold controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::wrap_degrees;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Proportional-derivative controller producing a rotation rate correction
/// from the error between the measured and target headings.
///
/// The error is wrapped into [-180, +180] so the correction always acts
/// through the shortest rotation. There is no integral term. The retained
/// previous error is the controller's only state.
///
/// The same law serves both the teleoperated heading lock and the autonomous
/// path correction; only the source of the target heading differs.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingHold {
    kp: f64,
    kd: f64,
    prev_error_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingHold {
    pub fn new(kp: f64, kd: f64) -> Self {
        Self {
            kp,
            kd,
            prev_error_deg: 0.0,
        }
    }

    /// Clear the retained error, e.g. at the start of a following run.
    pub fn reset(&mut self) {
        self.prev_error_deg = 0.0;
    }

    /// Calculate the rotation rate correction for one control cycle.
    pub fn correction(&mut self, heading_deg: f64, target_heading_deg: f64) -> f64 {
        let error_deg = wrap_degrees(heading_deg - target_heading_deg);

        let correction = error_deg * self.kp + (error_deg - self.prev_error_deg) * self.kd;
        self.prev_error_deg = error_deg;

        correction
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_constant_error() {
        // With no derivative gain a steady error gives a steady correction
        let mut ctrl = HeadingHold::new(1.0 / 18.0, 0.0);

        for _ in 0..3 {
            let correction = ctrl.correction(10.0, 0.0);
            assert!((correction - 0.5555555555555556).abs() < 1e-9);
        }
    }

    #[test]
    fn test_derivative_contribution() {
        let mut ctrl = HeadingHold::new(0.0, 1.0);

        // First cycle sees the full error as a change
        assert!((ctrl.correction(10.0, 0.0) - 10.0).abs() < 1e-9);
        // Steady error, no further derivative contribution
        assert!(ctrl.correction(10.0, 0.0).abs() < 1e-9);
        // Error growing by 2 degrees per cycle
        assert!((ctrl.correction(12.0, 0.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_wraps() {
        let mut ctrl = HeadingHold::new(1.0, 0.0);

        // 350 degrees against a 0 degree target is a -10 degree error, not
        // +350
        assert!((ctrl.correction(350.0, 0.0) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_error() {
        let mut ctrl = HeadingHold::new(0.0, 1.0);

        ctrl.correction(10.0, 0.0);
        ctrl.reset();

        // After a reset the derivative term sees the error as fresh
        assert!((ctrl.correction(10.0, 0.0) - 10.0).abs() < 1e-9);
    }
}
