//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap an angle in degrees into the range [-180, +180].
///
/// The wrapped angle describes the shortest rotation which reaches the same
/// physical orientation, since orientations are only defined modulo 360
/// degrees.
pub fn wrap_degrees<T>(angle_deg: T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem
{
    let full: T = T::from(360.0).unwrap();
    let half: T = T::from(180.0).unwrap();

    rem_euclid(angle_deg + half, full) - half
}

/// Convert an angle in degrees into radians.
pub fn deg_to_rad<T>(angle_deg: T) -> T
where
    T: Float
{
    angle_deg * T::from(std::f64::consts::PI).unwrap() / T::from(180.0).unwrap()
}

/// Convert an angle in radians into degrees.
pub fn rad_to_deg<T>(angle_rad: T) -> T
where
    T: Float
{
    angle_rad * T::from(180.0).unwrap() / T::from(std::f64::consts::PI).unwrap()
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}
