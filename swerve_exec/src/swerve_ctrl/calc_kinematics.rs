//! Inverse kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{Geometry, RobotMotionIntent, WheelCommand, NUM_WHEELS};
use util::maths::rad_to_deg;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the wheel commands which achieve the given robot frame motion
/// intent.
///
/// Each wheel's velocity is the body velocity plus the contribution of the
/// body rotation at the wheel's mounting position:
///
/// ```text
/// vx_i = vx - omega * y_i
/// vy_i = vy + omega * x_i
/// ```
///
/// converted to a (speed, angle) pair with atan2 to respect signs. The
/// returned flag is true if the speeds had to be limited.
///
/// A zero intent produces four zero speed commands; the wheel angle is
/// don't-care in that case and callers must not re-steer stationary wheels.
pub fn calc_wheel_commands(
    intent: &RobotMotionIntent,
    geom: &Geometry,
    max_wheel_speed: f64,
) -> ([WheelCommand; NUM_WHEELS], bool) {
    let mut wheel_cmds = [WheelCommand::default(); NUM_WHEELS];

    for (i, pos_m) in geom.wheel_positions_m().iter().enumerate() {
        let vx = intent.vx - intent.omega * pos_m[1];
        let vy = intent.vy + intent.omega * pos_m[0];

        wheel_cmds[i] = WheelCommand {
            speed: vx.hypot(vy),
            angle_deg: rad_to_deg(vy.atan2(vx)),
        };
    }

    let limited = normalise_speeds(&mut wheel_cmds, max_wheel_speed);

    (wheel_cmds, limited)
}

/// Scale all wheel speeds down uniformly if any exceeds the maximum.
///
/// The scale-down must be uniform: clamping wheels individually would change
/// the speed ratios between the wheels and with them the direction of
/// travel. Returns true if a scale-down was applied.
pub fn normalise_speeds(wheel_cmds: &mut [WheelCommand; NUM_WHEELS], max_wheel_speed: f64) -> bool {
    let max_speed = wheel_cmds
        .iter()
        .map(|c| c.speed.abs())
        .fold(0.0, f64::max);

    if max_speed > max_wheel_speed {
        let scale = max_wheel_speed / max_speed;

        for cmd in wheel_cmds.iter_mut() {
            cmd.speed *= scale;
        }

        true
    }
    else {
        false
    }
}
